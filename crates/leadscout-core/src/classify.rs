//! Retry classification shared by the backoff controller and both clients.
//!
//! Each transport boundary translates its raw failure into a typed error and
//! assigns the class there, so the backoff controller switches on a tag
//! instead of probing error internals.

/// How the backoff controller should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connection reset, timeout, 503/504 — worth retrying after a delay.
    TransientNetwork,
    /// 429 or an API-level quota rejection — worth retrying, the server asked
    /// us to slow down.
    TransientRateLimit,
    /// Retrying cannot change the outcome; propagate immediately.
    Permanent,
}

impl ErrorClass {
    #[must_use]
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorClass::Permanent)
    }
}

/// Implemented by every error type that flows through the backoff controller.
pub trait Retryable {
    fn error_class(&self) -> ErrorClass;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_is_not_transient() {
        assert!(!ErrorClass::Permanent.is_transient());
        assert!(ErrorClass::TransientNetwork.is_transient());
        assert!(ErrorClass::TransientRateLimit.is_transient());
    }
}
