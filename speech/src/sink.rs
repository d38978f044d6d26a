//! Render callback that feeds the device from the sample queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use narrate_audio::device::Render;
use narrate_buffer::SampleQueue;
use tracing::trace;

/// Drains the queue into each device period, padding with silence.
///
/// Runs on the device thread: no synthesis, no allocation and no locking
/// beyond the queue's own critical section.
pub struct CallbackSink {
    queue: SampleQueue<i16>,
    underruns: Arc<AtomicU64>,
    starved: bool,
}

impl CallbackSink {
    /// Creates a sink that drains `queue`.
    pub fn new(queue: SampleQueue<i16>) -> Self {
        Self {
            queue,
            underruns: Arc::new(AtomicU64::new(0)),
            starved: false,
        }
    }

    /// Returns a counter of underruns, shared with the sink.
    ///
    /// An underrun is counted when a period runs out of data partway
    /// through. Fully silent periods are not counted.
    pub fn underruns(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.underruns)
    }

    /// Fills `out` from the queue; slots without data are set to 0.
    pub fn render(&mut self, out: &mut [i16]) {
        let n = self.queue.drain(out);
        let starved = n < out.len();
        if starved && n > 0 {
            self.underruns.fetch_add(1, Ordering::Relaxed);
            trace!(filled = n, period = out.len(), "sink: underrun");
        } else if !starved && self.starved {
            trace!("sink: playing");
        }
        self.starved = starved;
    }

    /// Converts the sink into a device callback.
    pub fn into_render(mut self) -> Render {
        Box::new(move |out: &mut [i16]| self.render(out))
    }
}

#[cfg(test)]
mod sink_tests {
    use super::*;

    #[test]
    fn test_render_drains_then_silence() {
        let queue = SampleQueue::new();
        queue.write(&[1, 2, 3, 4, 5, 6]).unwrap();
        let mut sink = CallbackSink::new(queue.clone());

        let mut period = [9i16; 4];
        sink.render(&mut period);
        assert_eq!(period, [1, 2, 3, 4]);

        sink.render(&mut period);
        assert_eq!(period, [5, 6, 0, 0]);

        sink.render(&mut period);
        assert_eq!(period, [0, 0, 0, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_underrun_counted_once_per_starvation() {
        let queue = SampleQueue::new();
        let mut sink = CallbackSink::new(queue.clone());
        let underruns = sink.underruns();
        let mut period = [0i16; 4];

        // Idle queue is not an underrun.
        sink.render(&mut period);
        assert_eq!(underruns.load(Ordering::Relaxed), 0);

        queue.write(&[1, 2]).unwrap();
        sink.render(&mut period);
        sink.render(&mut period);
        assert_eq!(underruns.load(Ordering::Relaxed), 1);

        queue.write(&[1, 2, 3, 4, 5]).unwrap();
        sink.render(&mut period);
        sink.render(&mut period);
        assert_eq!(underruns.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_underrun_after_idle_period() {
        let queue = SampleQueue::new();
        let mut sink = CallbackSink::new(queue.clone());
        let underruns = sink.underruns();
        let mut period = [0i16; 4];

        sink.render(&mut period);
        sink.render(&mut period);
        queue.write(&[1, 2]).unwrap();
        sink.render(&mut period);
        assert_eq!(period, [1, 2, 0, 0]);
        assert_eq!(underruns.load(Ordering::Relaxed), 1);

        sink.render(&mut period);
        assert_eq!(underruns.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_into_render() {
        let queue = SampleQueue::new();
        queue.write(&[7, 8]).unwrap();
        let mut render = CallbackSink::new(queue).into_render();

        let mut period = [0i16; 3];
        render(&mut period);
        assert_eq!(period, [7, 8, 0]);
    }
}
