pub mod base;
pub mod configured_sdk;

pub use base::*;
pub use configured_sdk::ConfiguredSdk;
