//! Thread-safe sample queue for streaming audio.
//!
//! [`SampleQueue<T>`] is an unbounded FIFO shared between a producer that
//! appends whole blocks (a synthesis call, a decoder) and a consumer that is
//! driven by a hardware clock and must never wait for data.
//!
//! - **Write**: appends a block under the lock, never blocks on the consumer
//! - **Drain**: copies out up to `n` elements and pads the rest with
//!   `T::default()` (silence); never blocks on data, never allocates
//! - **Wait**: blocks a third party until the queue has been drained empty
//!
//! ```
//! use narrate_buffer::SampleQueue;
//!
//! let queue = SampleQueue::<i16>::new();
//! queue.write(&[1, 2, 3]).unwrap();
//!
//! let mut period = [0i16; 5];
//! let n = queue.drain(&mut period);
//! assert_eq!(n, 3);
//! assert_eq!(period, [1, 2, 3, 0, 0]);
//! assert!(queue.is_empty());
//! ```
//!
//! # Closing
//!
//! `close()` rejects further writes, keeps whatever is queued drainable and
//! releases every thread blocked in `wait_empty()`.
//!
//! # Thread Safety
//!
//! `SampleQueue` is `Send + Sync`; `Clone` shares the same underlying queue
//! via `Arc`.

mod error;
mod queue;

pub use error::BufferError;
pub use queue::SampleQueue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SampleQueue<i16>>();
    }

    #[test]
    fn test_queue_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<SampleQueue<i16>>();
    }
}
