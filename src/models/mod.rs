//! Wire types exchanged with the backend gateway and the CRM REST API.

pub mod editor;
pub mod file;
pub mod settings;
pub mod token;
pub mod user;

pub use editor::*;
pub use file::*;
pub use settings::*;
pub use token::*;
pub use user::*;
