// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `organ` - plays the organ melody once, on the speakers or into a file.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use log::{error, info};
use snafu::{ensure, ResultExt, Snafu};
use structopt::StructOpt;

use syn_organ::graph::{AudioContext, GraphError, RenderContext};
use syn_organ::output::{SoxSink, SoxTarget};
use syn_organ::render::ToneRenderer;
use syn_organ::sequencer::Sequencer;
use syn_organ::song::SONG;

#[derive(Debug, StructOpt)]
#[structopt(name = "organ", about = "Playing a melody on a synthesized organ")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Output file (any sox-supported format). Music is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Sample rate of the rendered audio in Hz.
    #[structopt(long, default_value = "44100")]
    rate: u32,

    /// Dump the song with the frequencies of its notes.
    #[structopt(long)]
    #[allow(clippy::option_option)]
    dump_song: Option<Option<PathBuf>>,
}

#[derive(Debug, Snafu)]
enum OrganError {
    #[snafu(display("Sample rate must be positive, got {}", rate))]
    InvalidRate { rate: u32 },
    #[snafu(display("Audio output is not available: {}", source))]
    AudioUnavailable { source: io::Error },
    #[snafu(display("Failed to dump the song to {}: {}", path.display(), source))]
    DumpSong { path: PathBuf, source: io::Error },
    #[snafu(display("Playback failed: {}", source))]
    Playback { source: GraphError },
}

fn run(opt: Opt) -> Result<(), OrganError> {
    ensure!(opt.rate > 0, InvalidRate { rate: opt.rate });

    if let Some(path) = opt.dump_song {
        let path = path.unwrap_or_else(|| "/dev/stdout".into());
        File::create(&path)
            .and_then(|mut out| SONG.dump(&mut out))
            .context(DumpSong { path })?;
    }

    let target = match opt.output.as_deref() {
        Some(path) => SoxTarget::File(path),
        None => SoxTarget::Play,
    };
    let sink = SoxSink::new(opt.rate, target).context(AudioUnavailable)?;
    let mut context = RenderContext::new(opt.rate, sink);

    let report = {
        let mut renderer = ToneRenderer::new(&mut context);
        Sequencer::new(SONG).play(&mut renderer).context(Playback)?
    };
    info!(
        "Played {} notes and {} rests in {:.2} s",
        report.tones,
        report.rests,
        context.current_time()
    );
    if !report.unknown_notes.is_empty() {
        info!("Skipped unknown notes: {}", report.unknown_notes.join(", "));
    }

    context.finish().context(Playback)?;
    Ok(())
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("Failed to initialize logging: {}", err);
    }

    if let Err(err) = run(opt) {
        error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        let opt = Opt::from_iter(&["organ", "--rate", "0"]);
        assert_eq!(opt.rate, 0);
        assert!(matches!(run(opt), Err(OrganError::InvalidRate { rate: 0 })));
    }
}
