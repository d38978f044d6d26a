//! Software output device paced by the system clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::debug;

use super::{DeviceError, Host, OutputStream, Render, StreamConfig};

/// A host whose streams call the render callback from a background thread
/// once every `frames_per_buffer / sample_rate` seconds and discard the
/// result.
///
/// Useful headless and in tests: the queue drains at exactly the rate real
/// hardware would drain it. Any requested config is accepted as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockHost;

impl ClockHost {
    /// Creates a new clock host.
    pub fn new() -> Self {
        Self
    }
}

impl Host for ClockHost {
    fn open_output(
        &self,
        config: StreamConfig,
        render: Render,
    ) -> Result<Box<dyn OutputStream>, DeviceError> {
        Ok(Box::new(ClockStream::open(config, render)?))
    }
}

/// A running clock-driven stream.
pub struct ClockStream {
    config: StreamConfig,
    paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClockStream {
    /// Spawns the clock thread and starts rendering immediately.
    pub fn open(config: StreamConfig, mut render: Render) -> Result<Self, DeviceError> {
        if config.frames_per_buffer == 0 || config.format.sample_rate == 0 {
            return Err(DeviceError::Unsupported(format!("{:?}", config)));
        }

        let paused = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let period = config.period();

        let thread_paused = Arc::clone(&paused);
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("narrate-clock".to_string())
            .spawn(move || {
                let mut buf = vec![0i16; config.frames_per_buffer];
                let mut deadline = Instant::now();
                while !thread_stop.load(Ordering::Acquire) {
                    if !thread_paused.load(Ordering::Acquire) {
                        render(&mut buf);
                    }
                    deadline += period;
                    let now = Instant::now();
                    if deadline <= now {
                        // Fell behind; restart the schedule instead of bursting.
                        deadline = now;
                        continue;
                    }
                    loop {
                        let now = Instant::now();
                        if now >= deadline || thread_stop.load(Ordering::Acquire) {
                            break;
                        }
                        thread::park_timeout(deadline - now);
                    }
                }
            })?;

        debug!(
            sample_rate = config.format.sample_rate,
            frames = config.frames_per_buffer,
            "clock: stream started"
        );

        Ok(Self {
            config,
            paused,
            stop,
            handle: Some(handle),
        })
    }
}

impl OutputStream for ClockStream {
    fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn pause(&mut self, paused: bool) -> Result<(), DeviceError> {
        if self.handle.is_none() {
            return Err(DeviceError::Closed);
        }
        self.paused.store(paused, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        handle
            .join()
            .map_err(|_| DeviceError::Control("clock thread panicked".to_string()))?;
        debug!("clock: stream closed");
        Ok(())
    }
}

impl Drop for ClockStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Format;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_render(counter: Arc<AtomicUsize>) -> Render {
        Box::new(move |out: &mut [i16]| {
            counter.fetch_add(out.len(), Ordering::SeqCst);
        })
    }

    #[test]
    fn test_clock_renders_periodically() {
        let counter = Arc::new(AtomicUsize::new(0));
        // 240 frames at 24kHz = 10ms per period
        let config = StreamConfig::new(Format::MONO_24K, 240);
        let mut stream = ClockStream::open(config, counting_render(counter.clone())).unwrap();

        thread::sleep(Duration::from_millis(100));
        stream.close().unwrap();

        let frames = counter.load(Ordering::SeqCst);
        assert!(frames >= 240 * 3, "rendered only {} frames", frames);
        assert_eq!(frames % 240, 0);
    }

    #[test]
    fn test_clock_pause_stops_rendering() {
        let counter = Arc::new(AtomicUsize::new(0));
        let config = StreamConfig::new(Format::MONO_24K, 240);
        let mut stream = ClockStream::open(config, counting_render(counter.clone())).unwrap();

        stream.pause(true).unwrap();
        thread::sleep(Duration::from_millis(30));
        let before = counter.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(counter.load(Ordering::SeqCst), before);

        stream.pause(false).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(counter.load(Ordering::SeqCst) > before);
        stream.close().unwrap();
    }

    #[test]
    fn test_clock_close_is_idempotent() {
        let config = StreamConfig::new(Format::MONO_24K, 240);
        let mut stream = ClockStream::open(config, Box::new(|_: &mut [i16]| {})).unwrap();
        stream.close().unwrap();
        stream.close().unwrap();
        assert!(matches!(stream.pause(true), Err(DeviceError::Closed)));
    }

    #[test]
    fn test_clock_rejects_zero_period() {
        let config = StreamConfig::new(Format::MONO_24K, 0);
        let result = ClockStream::open(config, Box::new(|_: &mut [i16]| {}));
        assert!(matches!(result, Err(DeviceError::Unsupported(_))));
    }

    #[test]
    fn test_clock_host_keeps_requested_config() {
        let config = StreamConfig::new(Format::MONO_16K, 160);
        let mut stream = ClockHost::new()
            .open_output(config, Box::new(|_: &mut [i16]| {}))
            .unwrap();
        assert_eq!(*stream.config(), config);
        stream.close().unwrap();
    }
}
