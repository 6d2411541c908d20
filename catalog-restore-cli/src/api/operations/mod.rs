//! Store write operations
//!
//! Every write the restore executor issues is one of these operations; each
//! can be executed on its own and yields an `OperationResult`.

pub mod operation;

pub use operation::{Operation, OperationResult};
