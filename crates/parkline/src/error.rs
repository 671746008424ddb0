//! Unified error type for the Parkline client.

use parkline_api::ApiError;
use parkline_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the `parkline` facade deal with this single type instead
/// of importing errors from each sub-crate. The `#[from]` attribute on
/// each variant auto-generates `From` impls, so `?` converts sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParklineError {
    /// A classified remote failure (rejection, network, decode).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session persistence failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ParklineError {
    /// Returns `true` when the underlying cause was a rejected
    /// credential. The session is already cleared by the time a caller
    /// sees this.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_error() {
        let err: ParklineError = ApiError::Unauthorized.into();
        assert!(matches!(err, ParklineError::Api(_)));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_from_session_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let err: ParklineError = SessionError::Storage(io).into();
        assert!(matches!(err, ParklineError::Session(_)));
        assert!(!err.is_unauthorized());
    }
}
