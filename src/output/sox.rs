// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use log::{debug, warn};

use crate::wave::Stereo;

use super::{copy_f64_bytes, AudioSink};

pub enum SoxTarget<'a> {
    /// Play on the default speakers.
    Play,
    /// Write to a file in any format sox supports.
    File(&'a Path),
}

/// Streams interleaved stereo `f64` samples into `play` or `sox`.
pub struct SoxSink {
    player: Child,
    audio_stream: Option<ChildStdin>,
    buffer: Vec<u8>,
}

impl SoxSink {
    /// Spawn the sox subprocess. Fails if sox is not installed.
    pub fn new(sample_rate: u32, target: SoxTarget) -> io::Result<Self> {
        let sample_rate_str = format!("{}", sample_rate);
        let input_args = &[
            "-R", // make the output reproducible
            "--channels",
            "2",
            "--rate",
            &sample_rate_str,
            "--type",
            "f64",
            "/dev/stdin",
        ];

        // For properly recording the sox dependency on nix:
        let (play, sox): (PathBuf, PathBuf) = if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
            debug!("using sox from nix store {}", sox_bin);
            (Path::new(sox_bin).join("play"), Path::new(sox_bin).join("sox"))
        } else {
            ("play".into(), "sox".into())
        };

        let mut player = match target {
            SoxTarget::Play => Command::new(&play)
                .args(input_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?,
            SoxTarget::File(outfile) => Command::new(&sox)
                .args(input_args)
                .arg(outfile)
                .stdin(Stdio::piped())
                .spawn()?,
        };

        let audio_stream = player.stdin.take();
        if audio_stream.is_none() {
            let _ = player.kill();
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "sox subprocess has no input stream",
            ));
        }

        Ok(Self {
            player,
            audio_stream,
            buffer: Vec::new(),
        })
    }
}

impl AudioSink for SoxSink {
    fn write(&mut self, samples: &[Stereo<f64>]) -> io::Result<()> {
        let stream = self
            .audio_stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sox input already closed"))?;

        let byte_len = samples.len() * 16;
        if self.buffer.len() < byte_len {
            self.buffer.resize(byte_len, 0);
        }
        copy_f64_bytes(samples, &mut self.buffer);
        stream.write_all(&self.buffer[..byte_len])
    }

    /// Close the input stream and wait until sox has played or written everything.
    fn finish(&mut self) -> io::Result<()> {
        if let Some(mut stream) = self.audio_stream.take() {
            stream.flush()?;
        }
        let status = self.player.wait()?;
        if !status.success() {
            warn!("sox exited with {}", status);
        }
        Ok(())
    }
}

impl Drop for SoxSink {
    fn drop(&mut self) {
        // sox exits by itself once its input is closed
        if let Some(stream) = self.audio_stream.take() {
            drop(stream);
            let _ = self.player.wait();
        }
    }
}
