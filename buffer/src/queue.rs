//! Growable sample queue implementation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::BufferError;

/// A thread-safe growable FIFO of samples.
///
/// The producer appends blocks with [`write`](Self::write); the consumer pulls
/// fixed-size periods with [`drain`](Self::drain). Both take the same lock and
/// hold it only while copying.
///
/// # Semantics
///
/// - **Write**: never blocks (auto-grows), fails only when closed
/// - **Drain**: never blocks on data; shortfall is padded with `T::default()`
/// - **Wait**: [`wait_empty`](Self::wait_empty) blocks until a drain empties
///   the queue or the queue is closed
///
/// # Example
///
/// ```
/// use narrate_buffer::SampleQueue;
/// use std::thread;
///
/// let queue = SampleQueue::<i16>::new();
/// queue.write(&[7; 64]).unwrap();
///
/// let consumer = queue.clone();
/// let handle = thread::spawn(move || {
///     let mut period = [0i16; 16];
///     while !consumer.is_empty() {
///         consumer.drain(&mut period);
///     }
/// });
///
/// queue.wait_empty();
/// handle.join().unwrap();
/// assert!(queue.is_empty());
/// ```
pub struct SampleQueue<T> {
    inner: Arc<QueueInner<T>>,
}

struct QueueInner<T> {
    state: Mutex<QueueState<T>>,
    empty_notify: Condvar,
}

struct QueueState<T> {
    buf: VecDeque<T>,
    closed: bool,
}

impl<T> Clone for SampleQueue<T> {
    fn clone(&self) -> Self {
        SampleQueue {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SampleQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SampleQueue<T> {
    /// Creates a new queue with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new queue with the specified initial capacity.
    ///
    /// Reserving a few seconds of audio up front keeps the first appends from
    /// reallocating while the consumer is waiting on the lock.
    pub fn with_capacity(capacity: usize) -> Self {
        SampleQueue {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    buf: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                empty_notify: Condvar::new(),
            }),
        }
    }

    /// Returns the number of samples currently queued.
    pub fn len(&self) -> usize {
        self.inner.state.lock().buf.len()
    }

    /// Returns true if no samples are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Closes the queue.
    ///
    /// Further writes fail with [`BufferError::Closed`]. Samples already
    /// queued stay drainable. Every thread blocked in `wait_empty` returns.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        self.inner.empty_notify.notify_all();
    }

    /// Blocks until the queue is empty or closed.
    ///
    /// Returns immediately if the queue is already empty.
    pub fn wait_empty(&self) {
        let mut state = self.inner.state.lock();
        while !state.buf.is_empty() && !state.closed {
            self.inner.empty_notify.wait(&mut state);
        }
    }

    /// Blocks until the queue is empty or closed, or `timeout` elapses.
    ///
    /// Returns true if the queue was empty (or closed) before the deadline.
    pub fn wait_empty_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        while !state.buf.is_empty() && !state.closed {
            if self
                .inner
                .empty_notify
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.buf.is_empty() || state.closed;
            }
        }
        true
    }
}

impl<T: Copy> SampleQueue<T> {
    /// Appends `data` to the back of the queue.
    ///
    /// Returns the number of samples written (always `data.len()` on success).
    /// Returns an error if the queue is closed.
    pub fn write(&self, data: &[T]) -> Result<usize, BufferError> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(BufferError::Closed);
        }
        state.buf.extend(data.iter().copied());
        Ok(data.len())
    }

    /// Returns a copy of all queued samples, front first.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.state.lock().buf.iter().copied().collect()
    }
}

impl<T: Copy + Default> SampleQueue<T> {
    /// Fills `out` from the front of the queue.
    ///
    /// Pops up to `out.len()` samples in FIFO order; any slots left over when
    /// the queue runs dry are set to `T::default()`. Returns the number of
    /// queued samples copied, so `out.len() - n` is the underrun length.
    ///
    /// This is the consumer's real-time path: it never waits for data and
    /// never allocates.
    pub fn drain(&self, out: &mut [T]) -> usize {
        let mut state = self.inner.state.lock();
        let n = out.len().min(state.buf.len());
        let (front, back) = state.buf.as_slices();
        if n <= front.len() {
            out[..n].copy_from_slice(&front[..n]);
        } else {
            let split = front.len();
            out[..split].copy_from_slice(front);
            out[split..n].copy_from_slice(&back[..n - split]);
        }
        state.buf.drain(..n);
        if n > 0 && state.buf.is_empty() {
            self.inner.empty_notify.notify_all();
        }
        drop(state);

        out[n..].fill(T::default());
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_write_then_drain_preserves_order() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1, 2, 3]).unwrap();
        queue.write(&[4, 5]).unwrap();
        queue.write(&[6, 7, 8, 9]).unwrap();

        let mut out = Vec::new();
        let mut period = [0i16; 4];
        while !queue.is_empty() {
            let n = queue.drain(&mut period);
            out.extend_from_slice(&period[..n]);
        }
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_drain_pads_with_silence() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[10, 20]).unwrap();

        let mut period = [99i16; 5];
        assert_eq!(queue.drain(&mut period), 2);
        assert_eq!(period, [10, 20, 0, 0, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empty_returns_silence() {
        let queue = SampleQueue::<i16>::new();
        let mut period = [-1i16; 4096];
        assert_eq!(queue.drain(&mut period), 0);
        assert!(period.iter().all(|&s| s == 0));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_across_wrapped_storage() {
        // Head sits mid-buffer, so the second write may wrap.
        let queue = SampleQueue::<i16>::with_capacity(8);
        queue.write(&[1, 2, 3, 4, 5, 6]).unwrap();
        let mut period = [0i16; 5];
        queue.drain(&mut period);
        queue.write(&[7, 8, 9, 10, 11]).unwrap();

        let mut period = [0i16; 6];
        assert_eq!(queue.drain(&mut period), 6);
        assert_eq!(period, [6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_len_tracks_writes_and_drains() {
        let queue = SampleQueue::<i16>::new();
        assert!(queue.is_empty());
        queue.write(&[0; 10]).unwrap();
        assert_eq!(queue.len(), 10);
        queue.drain(&mut [0; 3]);
        assert_eq!(queue.len(), 7);
    }

    #[test]
    fn test_write_empty_slice_is_noop() {
        let queue = SampleQueue::<i16>::new();
        assert_eq!(queue.write(&[]).unwrap(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_rejects_writes_keeps_data() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1, 2]).unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.write(&[3]), Err(BufferError::Closed));

        let mut period = [0i16; 2];
        assert_eq!(queue.drain(&mut period), 2);
        assert_eq!(period, [1, 2]);
    }

    #[test]
    fn test_wait_empty_returns_immediately_when_empty() {
        let queue = SampleQueue::<i16>::new();
        queue.wait_empty();
        assert!(queue.wait_empty_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_empty_wakes_after_drain() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1; 100]).unwrap();

        let consumer = queue.clone();
        let handle = thread::spawn(move || {
            let mut period = [0i16; 10];
            for _ in 0..10 {
                thread::sleep(Duration::from_millis(2));
                consumer.drain(&mut period);
            }
        });

        queue.wait_empty();
        assert!(queue.is_empty());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_empty_timeout_expires() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1; 4]).unwrap();
        assert!(!queue.wait_empty_timeout(Duration::from_millis(20)));
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_close_wakes_waiters() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1; 4]).unwrap();

        let waiter = queue.clone();
        let handle = thread::spawn(move || waiter.wait_empty());

        thread::sleep(Duration::from_millis(10));
        queue.close();
        handle.join().unwrap();
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        let queue = SampleQueue::<i16>::new();
        let producer_queue = queue.clone();

        let producer = thread::spawn(move || {
            for block in 0..50i16 {
                let data: Vec<i16> = (0..20).map(|i| block * 20 + i).collect();
                producer_queue.write(&data).unwrap();
                thread::sleep(Duration::from_micros(50));
            }
        });

        let mut collected = Vec::new();
        let mut period = [0i16; 7];
        while collected.len() < 1000 {
            let n = queue.drain(&mut period);
            collected.extend_from_slice(&period[..n]);
        }

        producer.join().unwrap();
        let expected: Vec<i16> = (0..1000).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_to_vec_does_not_consume() {
        let queue = SampleQueue::<i16>::new();
        queue.write(&[1, 2, 3]).unwrap();
        assert_eq!(queue.to_vec(), vec![1, 2, 3]);
        assert_eq!(queue.len(), 3);
    }
}
