//! Data fetching on behalf of the UI: file listings, user lookups and editor configuration.

pub mod editor_config;
pub mod file_search;
pub mod user_search;

pub use editor_config::EditorWindow;
pub use file_search::FileSearch;
pub use user_search::UserSearch;
