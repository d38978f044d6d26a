//! Output device stepped by the caller.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{DeviceError, Host, OutputStream, Render, StreamConfig};

/// A host whose stream renders only when its [`ManualDriver`] is ticked.
///
/// Offline rendering and deterministic tests use it to play the part of the
/// hardware clock.
///
/// ```
/// use narrate_audio::device::{Host, ManualHost, StreamConfig};
///
/// let (host, driver) = ManualHost::new();
/// let _stream = host
///     .open_output(StreamConfig::default(), Box::new(|out: &mut [i16]| out.fill(3)))
///     .unwrap();
///
/// let mut period = [0i16; 4];
/// assert!(driver.tick(&mut period));
/// assert_eq!(period, [3; 4]);
/// ```
pub struct ManualHost {
    shared: Arc<Mutex<ManualState>>,
    available: bool,
}

/// Steps the stream opened on a [`ManualHost`].
#[derive(Clone)]
pub struct ManualDriver {
    shared: Arc<Mutex<ManualState>>,
}

/// Handle to the stream opened on a [`ManualHost`].
pub struct ManualStream {
    config: StreamConfig,
    shared: Arc<Mutex<ManualState>>,
    closed: bool,
}

#[derive(Default)]
struct ManualState {
    render: Option<Render>,
    config: Option<StreamConfig>,
    paused: bool,
}

impl ManualHost {
    /// Creates a host and the driver that steps its stream.
    pub fn new() -> (Self, ManualDriver) {
        let shared = Arc::new(Mutex::new(ManualState::default()));
        let driver = ManualDriver {
            shared: Arc::clone(&shared),
        };
        (
            Self {
                shared,
                available: true,
            },
            driver,
        )
    }

    /// Creates a host that has no device; every open fails with
    /// [`DeviceError::NotFound`].
    pub fn unavailable() -> Self {
        Self {
            shared: Arc::new(Mutex::new(ManualState::default())),
            available: false,
        }
    }
}

impl Host for ManualHost {
    fn open_output(
        &self,
        config: StreamConfig,
        render: Render,
    ) -> Result<Box<dyn OutputStream>, DeviceError> {
        if !self.available {
            return Err(DeviceError::NotFound);
        }
        let mut state = self.shared.lock();
        if state.render.is_some() {
            return Err(DeviceError::Build("device busy".to_string()));
        }
        state.render = Some(render);
        state.config = Some(config);
        state.paused = false;
        drop(state);

        Ok(Box::new(ManualStream {
            config,
            shared: Arc::clone(&self.shared),
            closed: false,
        }))
    }
}

impl ManualDriver {
    /// Runs one period: invokes the render callback on `out`.
    ///
    /// Returns false, leaving `out` zeroed, when no stream is open or the
    /// stream is paused.
    pub fn tick(&self, out: &mut [i16]) -> bool {
        let mut state = self.shared.lock();
        if state.paused {
            out.fill(0);
            return false;
        }
        match state.render.as_mut() {
            Some(render) => {
                render(out);
                true
            }
            None => {
                out.fill(0);
                false
            }
        }
    }

    /// Runs periods of the stream's configured size until `done` returns
    /// true or `max_periods` have run, collecting everything rendered.
    pub fn run_until<F>(&self, max_periods: usize, mut done: F) -> Vec<i16>
    where
        F: FnMut() -> bool,
    {
        let frames = self.config().map(|c| c.frames_per_buffer).unwrap_or(0);
        let mut rendered = Vec::new();
        let mut period = vec![0i16; frames];
        for _ in 0..max_periods {
            if done() || !self.tick(&mut period) {
                break;
            }
            rendered.extend_from_slice(&period);
        }
        rendered
    }

    /// Returns the config of the open stream, if any.
    pub fn config(&self) -> Option<StreamConfig> {
        let state = self.shared.lock();
        state.render.as_ref().and(state.config)
    }

    /// Returns true while a stream is open.
    pub fn is_open(&self) -> bool {
        self.shared.lock().render.is_some()
    }

    /// Returns true while the open stream is paused.
    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }
}

impl OutputStream for ManualStream {
    fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn pause(&mut self, paused: bool) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed);
        }
        self.shared.lock().paused = paused;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut state = self.shared.lock();
        state.render = None;
        state.config = None;
        state.paused = false;
        Ok(())
    }
}

impl Drop for ManualStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
