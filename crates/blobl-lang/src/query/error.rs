use compact_str::CompactString;
use thiserror::Error;

/// An evaluation failure.
///
/// Whether a failure is recoverable is decided by its producer, not by the
/// variant: a producer that can supply a best-effort value returns
/// [`EvalResult::Recovered`](crate::EvalResult::Recovered) carrying one of
/// these as the cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("message has no payload")]
    NoInput,
    #[error("path `{0}` does not exist")]
    PathNotFound(String),
    #[error("metadata key `{0}` does not exist")]
    MetaNotFound(CompactString),
}
