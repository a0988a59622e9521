//! Error types for the Focus Partner protocol layer.
//!
//! None of these cross a context boundary: receivers turn them into fallback
//! payloads before anything is sent back.

mod provider;
mod store;
mod transport;

pub use provider::*;
pub use store::*;
pub use transport::*;
