// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Places where rendered audio ends up.

use std::io;

use crate::wave::Stereo;

pub mod sox;

pub use sox::{SoxSink, SoxTarget};

/// Consumer of the samples produced by the destination of an audio graph.
pub trait AudioSink {
    fn write(&mut self, samples: &[Stereo<f64>]) -> io::Result<()>;

    /// Called once after the last samples have been written.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps all samples in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<Stereo<f64>>,
}

impl AudioSink for MemorySink {
    fn write(&mut self, samples: &[Stereo<f64>]) -> io::Result<()> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

/// Throws all samples away.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write(&mut self, _samples: &[Stereo<f64>]) -> io::Result<()> {
        Ok(())
    }
}

/// Copy the stereo `f64` samples to bytes, interleaving the left and right samples.
///
/// Could probably be implemented with some sort of unsafe transmute,
/// but copying is safe and likely not the bottleneck.
///
/// Returns the number of samples that were actually copied.
/// Might be less than the number of input samples if the output buffer was not large enough.
pub fn copy_f64_bytes(audio: &[Stereo<f64>], bytes: &mut [u8]) -> usize {
    let mut processed = 0;
    for (sample, target) in audio.iter().zip(bytes.chunks_exact_mut(16)) {
        target[0..8].copy_from_slice(&sample.left.to_le_bytes());
        target[8..16].copy_from_slice(&sample.right.to_le_bytes());
        processed += 1;
    }
    processed
}
