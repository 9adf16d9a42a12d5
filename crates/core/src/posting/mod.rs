//! Cross-module posting outcomes: the error taxonomy and best-effort warnings.

pub mod error;
pub mod warning;

pub use error::{ErrorKind, PostingError, PostingResult};
pub use warning::{PostingWarning, WarningCode};
