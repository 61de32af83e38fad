//! Error observers for the enqueue path.
//!
//! A dispatcher owns one [`ErrorHandler`] and notifies it once for every
//! failed dispatch call before the error is returned to the caller. Handlers
//! only observe: they cannot swallow or replace the error.

use crate::error::KiqError;

/// Observer invoked with every error raised on the enqueue path.
pub trait ErrorHandler: Send + Sync {
    /// Observe `error`. `context` describes the operation that failed.
    fn handle(&self, context: &str, error: &KiqError);
}

/// Handler that ignores all errors. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullErrorHandler;

impl ErrorHandler for NullErrorHandler {
    fn handle(&self, _context: &str, _error: &KiqError) {}
}

/// Handler that reports errors through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, context: &str, error: &KiqError) {
        tracing::error!(kind = ?error.kind(), "{}: {}", context, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl ErrorHandler for Recording {
        fn handle(&self, context: &str, error: &KiqError) {
            self.0.lock().unwrap().push(format!("{context}: {error}"));
        }
    }

    #[test]
    fn test_handlers_observe_without_consuming() {
        let error = KiqError::store_message("connection refused");

        NullErrorHandler.handle("push", &error);
        TracingErrorHandler.handle("push", &error);

        let recording = Recording::default();
        recording.handle("push", &error);
        assert_eq!(
            recording.0.lock().unwrap().as_slice(),
            ["push: Store error: connection refused"]
        );
    }
}
