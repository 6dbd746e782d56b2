use thiserror::Error;

/// Recoverable failures reported by the checked handle and arena APIs.
///
/// Dereferencing an empty `Shared` through `Deref` is not one of these; it is
/// a caller bug and panics.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum HandleError {
    /// The handle does not reference any storage.
    #[error("handle is empty")]
    Empty,
    /// The observed object has already been destroyed.
    #[error("observed object has been destroyed")]
    Expired,
    /// An arena key refers to a node that has been removed.
    #[error("arena key refers to a removed node")]
    StaleKey,
}
