//! File classification backed by the ONLYOFFICE document-formats table.
//!
//! The table is the single source of truth: families, capabilities, MIME types
//! and icons are all derived from it.

pub mod classifier;
pub mod icon;
pub mod table;

pub use classifier::*;
pub use icon::{Favicon, Icon};
pub use table::{DocumentFamily, FormatAction, FormatDescriptor, FormatTable};
