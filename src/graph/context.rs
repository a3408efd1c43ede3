// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The interface through which music is made, and its implementation on top of a graph.

use log::trace;
use snafu::{ensure, ResultExt};

use crate::automation::AudioParam;
use crate::oscillator::WaveShape;
use crate::output::AudioSink;

use super::*;

/// An audio rendering engine with its own clock.
///
/// Nodes are created, wired up and scheduled relative to `current_time`.
/// The clock only advances while the caller sleeps.
pub trait AudioContext {
    /// Seconds since the context was created.
    fn current_time(&self) -> f64;

    /// The node where all audible signals must end up.
    fn destination(&self) -> NodeId;

    fn create_gain(&mut self) -> NodeId;

    fn create_oscillator(&mut self, shape: WaveShape) -> NodeId;

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError>;

    /// Remove all outgoing connections of a node.
    fn disconnect(&mut self, node: NodeId) -> Result<(), GraphError>;

    /// Free a node. Its handle is invalid afterwards.
    fn release(&mut self, node: NodeId) -> Result<(), GraphError>;

    fn param_mut(&mut self, node: NodeId, kind: ParamKind)
        -> Result<&mut AudioParam, GraphError>;

    /// Start a source node at an absolute time. A source can only be started once.
    fn start(&mut self, node: NodeId, when: f64) -> Result<(), GraphError>;

    /// Stop a started source node at an absolute time.
    fn stop(&mut self, node: NodeId, when: f64) -> Result<(), GraphError>;

    /// Let `seconds` pass on the context clock.
    fn sleep(&mut self, seconds: f64) -> Result<(), GraphError>;
}

/// Renders a graph into an [`AudioSink`].
///
/// Sleeping renders the audio of the slept time into the sink,
/// so a sink consuming audio in real time also makes the context run in real time.
pub struct RenderContext<S> {
    graph: Graph,
    sink: S,
    /// Part of a sample that was slept, but not rendered yet. Between -0.5 and 0.5.
    pending: f64,
}

impl<S: AudioSink> RenderContext<S> {
    /// Create a context that renders in chunks of 10 ms.
    pub fn new(sample_rate: u32, sink: S) -> Self {
        let buffer_size = (sample_rate as usize / 100).max(1);
        Self::with_buffer_size(sample_rate, buffer_size, sink)
    }

    pub fn with_buffer_size(sample_rate: u32, buffer_size: Sample, sink: S) -> Self {
        Self {
            graph: Graph::new(sample_rate as f64, buffer_size.max(1)),
            sink,
            pending: 0.0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of nodes allocated right now, not counting the destination.
    pub fn live_nodes(&self) -> usize {
        self.graph.live_nodes()
    }

    /// Number of nodes ever allocated, not counting the destination.
    pub fn nodes_created(&self) -> usize {
        self.graph.nodes_created()
    }

    /// Flush the sink and hand it back.
    pub fn finish(mut self) -> Result<S, GraphError> {
        self.sink.finish().context(SinkWrite)?;
        Ok(self.sink)
    }
}

impl<S: AudioSink> AudioContext for RenderContext<S> {
    fn current_time(&self) -> f64 {
        self.graph.time() as f64 / self.graph.sample_rate()
    }

    fn destination(&self) -> NodeId {
        self.graph.destination()
    }

    fn create_gain(&mut self) -> NodeId {
        self.graph.add_node(GainNode::new())
    }

    fn create_oscillator(&mut self, shape: WaveShape) -> NodeId {
        let sample_rate = self.graph.sample_rate();
        self.graph.add_node(OscillatorNode::new(shape, sample_rate))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.graph.connect(from, to)
    }

    fn disconnect(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.graph.disconnect(node)
    }

    fn release(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.graph.release(node)
    }

    fn param_mut(
        &mut self,
        node: NodeId,
        kind: ParamKind,
    ) -> Result<&mut AudioParam, GraphError> {
        self.graph.param_mut(node, kind)
    }

    fn start(&mut self, node: NodeId, when: f64) -> Result<(), GraphError> {
        let source = self.graph.source_mut(node)?;
        ensure!(source.start_time().is_none(), AlreadyStarted { node });
        trace!("start {:?} at {:.3}", node, when);
        source.start(when);
        Ok(())
    }

    fn stop(&mut self, node: NodeId, when: f64) -> Result<(), GraphError> {
        let source = self.graph.source_mut(node)?;
        ensure!(source.start_time().is_some(), NotStarted { node });
        trace!("stop {:?} at {:.3}", node, when);
        source.stop(when);
        Ok(())
    }

    fn sleep(&mut self, seconds: f64) -> Result<(), GraphError> {
        // also maps NaN to zero
        let seconds = seconds.max(0.0);
        let exact = seconds * self.graph.sample_rate() + self.pending;
        let frames = exact.round().max(0.0);
        self.pending = exact - frames;

        let mut remaining = frames as Sample;
        while remaining > 0 {
            let chunk = remaining.min(self.graph.buffer_size());
            let audio = self.graph.render(chunk);
            self.sink.write(audio).context(SinkWrite)?;
            remaining -= chunk;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::automation::ParamSchedule;
    use crate::output::MemorySink;
    use crate::wave::Stereo;
    use std::io;

    fn context() -> RenderContext<MemorySink> {
        RenderContext::with_buffer_size(1000, 64, MemorySink::default())
    }

    #[test]
    fn sleeping_advances_the_clock() {
        let mut ctx = context();
        assert_eq!(ctx.current_time(), 0.0);
        ctx.sleep(0.5).unwrap();
        assert_eq!(ctx.current_time(), 0.5);
        ctx.sleep(-1.0).unwrap();
        ctx.sleep(std::f64::NAN).unwrap();
        assert_eq!(ctx.current_time(), 0.5);
        assert_eq!(ctx.sink().samples.len(), 500);
        assert_eq!(ctx.finish().unwrap().samples.len(), 500);
    }

    #[test]
    fn fractional_samples_do_not_drift() {
        let mut ctx = RenderContext::new(8000, MemorySink::default());
        // 5333.33 samples each
        for _ in 0..3 {
            ctx.sleep(4.0 / 6.0).unwrap();
        }
        assert_eq!(ctx.graph().time(), 16000);
        assert_eq!(ctx.current_time(), 2.0);

        let mut ctx = context();
        for _ in 0..300 {
            ctx.sleep(1.0 / 3000.0).unwrap();
        }
        assert_eq!(ctx.graph().time(), 100);
    }

    #[test]
    fn sources_start_once_and_stop_after_start() {
        let mut ctx = context();
        let osc = ctx.create_oscillator(WaveShape::Sine);
        let gain = ctx.create_gain();

        assert!(matches!(ctx.stop(osc, 1.0), Err(GraphError::NotStarted { .. })));
        ctx.start(osc, 0.0).unwrap();
        assert!(matches!(ctx.start(osc, 0.0), Err(GraphError::AlreadyStarted { .. })));
        ctx.stop(osc, 1.0).unwrap();
        assert!(matches!(ctx.start(gain, 0.0), Err(GraphError::NotASource { .. })));
    }

    #[test]
    fn scheduled_tone_is_audible_only_while_playing() {
        let mut ctx = context();
        let dest = ctx.destination();
        let osc = ctx.create_oscillator(WaveShape::Square);
        ctx.param_mut(osc, ParamKind::Frequency)
            .unwrap()
            .set_value_at_time(1.0, 0.0);
        ctx.connect(osc, dest).unwrap();
        ctx.start(osc, 0.1).unwrap();
        ctx.stop(osc, 0.2).unwrap();
        ctx.sleep(0.3).unwrap();

        let samples = ctx.finish().unwrap().samples;
        assert_eq!(samples.len(), 300);
        assert!(samples[..100].iter().all(|s| *s == Stereo::mono(0.0)));
        assert!(samples[100..200].iter().all(|s| *s == Stereo::mono(1.0)));
        assert!(samples[200..].iter().all(|s| *s == Stereo::mono(0.0)));
    }

    struct BrokenSink;

    impl AudioSink for BrokenSink {
        fn write(&mut self, _samples: &[Stereo<f64>]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn sink_failures_are_reported() {
        let mut ctx = RenderContext::new(1000, BrokenSink);
        assert!(matches!(ctx.sleep(0.1), Err(GraphError::SinkWrite { .. })));
        // no time passes without rendering
        ctx.sleep(0.0).unwrap();
    }
}
