//! Persisted line-format reader/writer (spec §6): a thin collaborator over
//! [`gridkernel_core::Sheet`] that never touches dependency bookkeeping
//! directly.

mod error;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::{load_file, load_into};
pub use writer::{save_file, save_into};
