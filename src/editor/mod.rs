//! Everything needed to open a file in the embedded document editor.

pub mod lifecycle;
pub mod link;
pub mod request;

pub use lifecycle::{EditorEvent, EditorPhase};
pub use link::*;
pub use request::{parse_query, EditorOpenRequest, LinkFormat};
