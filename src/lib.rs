//! Library exports for onlyoffice-pipedrive, shared between the binary and tests.

pub mod actions;
pub mod clients;
pub mod config;
pub mod editor;
pub mod error;
pub mod formats;
pub mod models;
pub mod queries;
pub mod routes;
pub mod sdk;
pub mod session;
pub mod startup;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
