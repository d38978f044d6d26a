//! Error types for queue operations.

/// Queue operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The queue has been closed and accepts no more samples.
    #[error("queue: closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        assert_eq!(BufferError::Closed.to_string(), "queue: closed");
    }
}
