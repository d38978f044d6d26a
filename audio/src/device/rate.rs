//! Playing a render callback on a device that runs at another rate.

use rubato::{FftFixedIn, Resampler};
use tracing::warn;

use super::{DeviceError, Render};

/// An output layout a device reports as supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedRange<F> {
    pub channels: u16,
    pub format: F,
    pub min_rate: u32,
    pub max_rate: u32,
}

impl<F> SupportedRange<F> {
    fn covers(&self, rate: u32) -> bool {
        self.min_rate <= rate && rate <= self.max_rate
    }
}

/// Chooses which supported layout to open and at what rate.
///
/// `preferences` lists `(channels, format)` pairs, most preferred first.
/// The requested `rate` wins whenever some preferred layout covers it;
/// otherwise the device is opened at `fallback`, usually its default rate.
/// Returns the index into `supported` and the device rate.
pub fn select_output<F: Copy + PartialEq>(
    supported: &[SupportedRange<F>],
    preferences: &[(u16, F)],
    rate: u32,
    fallback: u32,
) -> Option<(usize, u32)> {
    let find = |rate: u32| {
        preferences.iter().find_map(|&(channels, format)| {
            supported
                .iter()
                .position(|r| r.channels == channels && r.format == format && r.covers(rate))
        })
    };
    find(rate)
        .map(|i| (i, rate))
        .or_else(|| find(fallback).map(|i| (i, fallback)))
}

/// Converts a mono render callback from one sample rate to another.
///
/// The wrapped callback is always asked for the same number of frames.
/// All buffers are allocated up front.
pub struct RateConverter {
    render: Render,
    resampler: FftFixedIn<f32>,
    source: Vec<i16>,
    input: Vec<Vec<f32>>,
    output: Vec<Vec<f32>>,
    ready: usize,
    pos: usize,
    failed: bool,
}

impl RateConverter {
    /// Wraps `render`, which produces audio at `from` Hz, for a device at
    /// `to` Hz. `render` is called with `frames` frames at a time.
    pub fn new(render: Render, from: u32, to: u32, frames: usize) -> Result<Self, DeviceError> {
        let resampler = FftFixedIn::<f32>::new(from as usize, to as usize, frames.max(1), 1, 1)
            .map_err(|e| DeviceError::Unsupported(e.to_string()))?;
        let source = vec![0; resampler.input_frames_next()];
        let input = vec![vec![0.0; source.len()]];
        let output = vec![vec![0.0; resampler.output_frames_max()]];
        Ok(Self {
            render,
            resampler,
            source,
            input,
            output,
            ready: 0,
            pos: 0,
            failed: false,
        })
    }

    /// Frames the wrapped callback receives per call.
    pub fn source_frames(&self) -> usize {
        self.source.len()
    }

    /// Fills `out` with converted audio, calling the wrapped callback as
    /// often as needed.
    pub fn render(&mut self, out: &mut [i16]) {
        let mut written = 0;
        while written < out.len() {
            if self.pos == self.ready && !self.refill() {
                out[written..].fill(0);
                return;
            }
            let n = (self.ready - self.pos).min(out.len() - written);
            let converted = &self.output[0][self.pos..self.pos + n];
            for (slot, &sample) in out[written..written + n].iter_mut().zip(converted) {
                *slot = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            }
            self.pos += n;
            written += n;
        }
    }

    fn refill(&mut self) -> bool {
        if self.failed {
            return false;
        }
        (self.render)(&mut self.source);
        for (dst, &s) in self.input[0].iter_mut().zip(self.source.iter()) {
            *dst = s as f32 / 32768.0;
        }
        match self.resampler.process_into_buffer(&self.input, &mut self.output, None) {
            Ok((_, produced)) => {
                self.ready = produced;
                self.pos = 0;
                true
            }
            Err(e) => {
                warn!(error = %e, "rate: conversion failed, output silenced");
                self.failed = true;
                false
            }
        }
    }

    /// Converts into a device callback.
    pub fn into_render(mut self) -> Render {
        Box::new(move |out: &mut [i16]| self.render(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Fmt {
        I16,
        F32,
    }

    const PREFS: [(u16, Fmt); 3] = [(1, Fmt::I16), (1, Fmt::F32), (2, Fmt::F32)];

    fn range(channels: u16, format: Fmt, min_rate: u32, max_rate: u32) -> SupportedRange<Fmt> {
        SupportedRange {
            channels,
            format,
            min_rate,
            max_rate,
        }
    }

    #[test]
    fn test_select_requested_rate() {
        let supported = [range(2, Fmt::F32, 8000, 96000), range(1, Fmt::I16, 24000, 24000)];
        assert_eq!(select_output(&supported, &PREFS, 24000, 48000), Some((1, 24000)));
    }

    #[test]
    fn test_select_falls_back_to_device_rate() {
        let supported = [range(2, Fmt::F32, 48000, 48000), range(2, Fmt::I16, 48000, 48000)];
        assert_eq!(select_output(&supported, &PREFS, 24000, 48000), Some((0, 48000)));
    }

    #[test]
    fn test_select_nothing_usable() {
        let supported = [range(6, Fmt::F32, 48000, 48000)];
        assert_eq!(select_output(&supported, &PREFS, 24000, 48000), None);
    }

    fn constant_render(value: i16, pulled: Arc<AtomicUsize>) -> Render {
        Box::new(move |out: &mut [i16]| {
            pulled.fetch_add(out.len(), Ordering::Relaxed);
            out.fill(value);
        })
    }

    #[test]
    fn test_upsample_pulls_half_the_frames() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let render = constant_render(8000, pulled.clone());
        let mut converter = RateConverter::new(render, 24000, 48000, 256).unwrap();
        assert_eq!(converter.source_frames(), 256);

        let mut period = [0i16; 480];
        let mut last = Vec::new();
        for _ in 0..100 {
            converter.render(&mut period);
            last.clear();
            last.extend_from_slice(&period);
        }

        let pulled = pulled.load(Ordering::Relaxed);
        assert!(pulled >= 24000, "pulled {}", pulled);
        assert!(pulled <= 24000 + 4 * 256, "pulled {}", pulled);
        for &s in &last {
            assert!((s as i32 - 8000).abs() < 400, "sample {}", s);
        }
    }

    #[test]
    fn test_silence_stays_silent() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let mut render = RateConverter::new(constant_render(0, pulled), 24000, 44100, 1024)
            .unwrap()
            .into_render();

        let mut period = [1i16; 441];
        for _ in 0..10 {
            render(&mut period);
            assert!(period.iter().all(|&s| s == 0));
        }
    }
}
