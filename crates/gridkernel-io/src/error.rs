//! Errors surfaced by the load/save collaborator (spec §6 "Persisted
//! format"). Malformed individual lines are never an error here — load
//! quietly skips them (spec §7 "permissive recovery"); this type only
//! covers I/O and kernel-allocation failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Kernel(#[from] gridkernel_common::KernelError),
}
