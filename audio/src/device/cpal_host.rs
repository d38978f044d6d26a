//! Hardware output through cpal.
//!
//! `cpal::Stream` is not `Send` on every platform, so each stream is built,
//! driven and dropped on a dedicated thread; the handle returned to callers
//! only holds a command channel to it.
//!
//! Devices that cannot run at the requested rate are opened at their default
//! rate and fed through a [`RateConverter`].

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use tracing::{info, warn};

use super::{
    DeviceError, Host, OutputStream, RateConverter, Render, StreamConfig, SupportedRange,
    select_output,
};
use crate::pcm::Format;

/// Channel/sample-format combinations tried, most preferred first.
const PREFERENCES: [(u16, SampleFormat); 4] = [
    (1, SampleFormat::I16),
    (1, SampleFormat::F32),
    (2, SampleFormat::I16),
    (2, SampleFormat::F32),
];

/// Opens streams on a cpal output device.
#[derive(Debug, Clone, Default)]
pub struct CpalHost {
    device_name: Option<String>,
}

impl CpalHost {
    /// Uses the system's default output device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the output device with the given name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }
}

enum Command {
    Pause(bool, mpsc::Sender<Result<(), DeviceError>>),
    Close,
}

impl Host for CpalHost {
    fn open_output(
        &self,
        config: StreamConfig,
        render: Render,
    ) -> Result<Box<dyn OutputStream>, DeviceError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let device_name = self.device_name.clone();

        let handle = thread::Builder::new()
            .name("narrate-cpal".to_string())
            .spawn(move || {
                let stream = match build_stream(device_name.as_deref(), config, render) {
                    Ok((stream, negotiated)) => {
                        let _ = ready_tx.send(Ok(negotiated));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for cmd in cmd_rx {
                    match cmd {
                        Command::Pause(paused, reply) => {
                            let result = if paused {
                                stream.pause().map_err(|e| DeviceError::Control(e.to_string()))
                            } else {
                                stream.play().map_err(|e| DeviceError::Control(e.to_string()))
                            };
                            let _ = reply.send(result);
                        }
                        Command::Close => break,
                    }
                }
                drop(stream);
            })?;

        let negotiated = match ready_rx.recv() {
            Ok(Ok(negotiated)) => negotiated,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(DeviceError::Build("device thread exited".to_string()));
            }
        };

        Ok(Box::new(CpalStream {
            config: negotiated,
            commands: cmd_tx,
            handle: Some(handle),
        }))
    }
}

/// Handle to a stream running on its device thread.
pub struct CpalStream {
    config: StreamConfig,
    commands: mpsc::Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl OutputStream for CpalStream {
    fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn pause(&mut self, paused: bool) -> Result<(), DeviceError> {
        if self.handle.is_none() {
            return Err(DeviceError::Closed);
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(Command::Pause(paused, reply_tx))
            .map_err(|_| DeviceError::Closed)?;
        reply_rx.recv().map_err(|_| DeviceError::Closed)?
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.commands.send(Command::Close);
        handle
            .join()
            .map_err(|_| DeviceError::Control("device thread panicked".to_string()))?;
        info!("cpal: stream closed");
        Ok(())
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn build_stream(
    device_name: Option<&str>,
    requested: StreamConfig,
    render: Render,
) -> Result<(cpal::Stream, StreamConfig), DeviceError> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(name) => host
            .output_devices()
            .map_err(|e| DeviceError::Build(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or(DeviceError::NotFound)?,
        None => host.default_output_device().ok_or(DeviceError::NotFound)?,
    };

    let rate = requested.format.sample_rate;
    let frames = requested.frames_per_buffer.max(1);
    let supported: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| DeviceError::Build(e.to_string()))?
        .collect();
    let ranges: Vec<_> = supported
        .iter()
        .map(|r| SupportedRange {
            channels: r.channels(),
            format: r.sample_format(),
            min_rate: r.min_sample_rate().0,
            max_rate: r.max_sample_rate().0,
        })
        .collect();
    let fallback = device
        .default_output_config()
        .map(|c| c.sample_rate().0)
        .unwrap_or(rate);

    let (index, device_rate) =
        select_output(&ranges, &PREFERENCES, rate, fallback).ok_or_else(|| {
            DeviceError::Unsupported(format!(
                "no mono/stereo i16/f32 config at {} or {} Hz",
                rate, fallback
            ))
        })?;
    let range = &supported[index];

    let render = if device_rate == rate {
        render
    } else {
        info!(requested = rate, device = device_rate, "cpal: converting to device rate");
        RateConverter::new(render, rate, device_rate, frames)?.into_render()
    };

    // Device frames covering one render call.
    let period = (frames as u64 * device_rate as u64 / rate.max(1) as u64).max(1) as u32;
    let buffer_size = match range.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&period) => {
            cpal::BufferSize::Fixed(period)
        }
        _ => cpal::BufferSize::Default,
    };
    let stream_config = cpal::StreamConfig {
        channels: range.channels(),
        sample_rate: cpal::SampleRate(device_rate),
        buffer_size,
    };

    let stream = match range.sample_format() {
        SampleFormat::I16 => build_typed::<i16>(&device, &stream_config, frames, render)?,
        SampleFormat::F32 => build_typed::<f32>(&device, &stream_config, frames, render)?,
        other => return Err(DeviceError::Unsupported(format!("{:?}", other))),
    };
    stream
        .play()
        .map_err(|e| DeviceError::Control(e.to_string()))?;

    let format = Format {
        sample_rate: rate,
        stereo: stream_config.channels == 2,
    };
    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate = device_rate,
        channels = stream_config.channels,
        sample_format = ?range.sample_format(),
        buffer_size = ?stream_config.buffer_size,
        "cpal: stream started"
    );
    // Render calls carry at most `frames` frames whatever buffer size the
    // device settled on.
    Ok((stream, StreamConfig::new(format, frames)))
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: usize,
    mut render: Render,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0i16; frames.max(1)];
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for block in data.chunks_mut(scratch.len() * channels) {
                    let mono = &mut scratch[..block.len() / channels];
                    render(mono);
                    for (frame, &sample) in block.chunks_mut(channels).zip(mono.iter()) {
                        frame.fill(T::from_sample(sample));
                    }
                }
            },
            |err| warn!(error = %err, "cpal: output stream error"),
            None,
        )
        .map_err(|e| DeviceError::Build(e.to_string()))
}
