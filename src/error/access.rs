//! Errors raised by read-only views of otherwise mutable containers.

use snafu::Snafu;

/// An error raised when a mutation is attempted through a read-only view.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum AccessError {
    /// The entry view is immutable.
    #[snafu(display("entry view is immutable"))]
    Immutable,
}
