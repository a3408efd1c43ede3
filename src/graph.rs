// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A graph describes the audio equipment.
//! Nodes can be added, connected and removed while the graph is running.
//! All signals end up in the destination node, whose output is the music.

use std::io;

use log::trace;
use snafu::{ensure, OptionExt, Snafu};

use crate::automation::AudioParam;
use crate::wave::{AudioBuffer, Stereo};

mod context;
mod source;
mod transducers;

pub use context::{AudioContext, RenderContext};
pub use source::{OscillatorNode, SourceSchedule};
pub use transducers::{Destination, GainNode};

/// Time measured in samples.
pub type Sample = usize;

/// Handle to a node in the graph.
/// Handles of released nodes are never valid again, even if their slot is reused.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// The automatable parameters of nodes.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ParamKind {
    Gain,
    Frequency,
}

/// Possible errors when manipulating or rendering a graph.
#[derive(Debug, Snafu)]
pub enum GraphError {
    #[snafu(display("Referenced node {:?} does not exist", node))]
    UnknownNode { node: NodeId },
    #[snafu(display("Node {:?} has no parameter {:?}", node, param))]
    NoSuchParam { node: NodeId, param: ParamKind },
    #[snafu(display("Node {:?} is not a source and cannot be started or stopped", node))]
    NotASource { node: NodeId },
    #[snafu(display("Source {:?} was already started", node))]
    AlreadyStarted { node: NodeId },
    #[snafu(display("Source {:?} must be started before it is stopped", node))]
    NotStarted { node: NodeId },
    #[snafu(display("Cannot connect {:?} to {:?}", from, to))]
    InvalidConnection { from: NodeId, to: NodeId },
    #[snafu(display("Connecting {:?} to {:?} would create a cycle", from, to))]
    Cycle { from: NodeId, to: NodeId },
    #[snafu(display("Node {:?} belongs to the graph and cannot be released", node))]
    Permanent { node: NodeId },
    #[snafu(display("Failed to write rendered audio: {}", source))]
    SinkWrite { source: io::Error },
}

pub trait Node {
    /// Short name for log messages.
    fn name(&self) -> &'static str;

    /// Number of input nodes.
    fn num_inputs(&self) -> usize;

    /// Number of ouput nodes.
    fn num_outputs(&self) -> usize;

    fn render(&mut self, rio: &mut RenderIo);

    fn param_mut(&mut self, _kind: ParamKind) -> Option<&mut AudioParam> {
        None
    }

    /// Nodes producing sound on their own can be started and stopped.
    fn source_mut(&mut self) -> Option<&mut SourceSchedule> {
        None
    }
}

/// References to inputs and outputs while rendering a node.
pub struct RenderIo<'a> {
    /// Sample time of the first sample in these buffers.
    start: Sample,
    /// Number of samples to render. The buffers might be larger.
    length: Sample,
    sample_rate: f64,
    /// Sum of all connected inputs.
    input: &'a AudioBuffer,
    output: &'a mut AudioBuffer,
}

impl<'a> RenderIo<'a> {
    pub fn start(&self) -> Sample {
        self.start
    }

    pub fn length(&self) -> Sample {
        self.length
    }

    /// Absolute time in seconds of the sample at `offset` in the buffers.
    pub fn time_at(&self, offset: Sample) -> f64 {
        (self.start + offset) as f64 / self.sample_rate
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn input(&self) -> &[Stereo<f64>] {
        &self.input.samples()[..self.length]
    }

    pub fn output(&mut self) -> &mut [Stereo<f64>] {
        &mut self.output.samples_mut()[..self.length]
    }

    /// Both buffers at once, for nodes transforming their input.
    pub fn io(&mut self) -> (&[Stereo<f64>], &mut [Stereo<f64>]) {
        (
            &self.input.samples()[..self.length],
            &mut self.output.samples_mut()[..self.length],
        )
    }
}

struct NodeHolder {
    node: Box<dyn Node>,
    output: AudioBuffer,
}

struct Slot {
    generation: u32,
    holder: Option<NodeHolder>,
}

pub struct Graph {
    slots: Vec<Slot>,
    free: Vec<usize>,
    edges: Vec<(NodeId, NodeId)>,
    evaluation_order: Vec<NodeId>,
    destination: NodeId,
    /// Scratch buffer for summing the inputs of a node.
    input: AudioBuffer,
    time: Sample,
    buffer_size: Sample,
    sample_rate: f64,
    created: usize,
}

impl Graph {
    /// Create a graph containing only the destination node.
    /// At most `buffer_size` samples can be rendered at once.
    pub fn new(sample_rate: f64, buffer_size: Sample) -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            edges: Vec::new(),
            evaluation_order: Vec::new(),
            destination: NodeId {
                index: 0,
                generation: 0,
            },
            input: AudioBuffer::new(buffer_size),
            time: 0,
            buffer_size,
            sample_rate,
            created: 0,
        };
        graph.destination = graph.insert(Box::new(Destination));
        graph
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Sample time of the next sample to be rendered.
    pub fn time(&self) -> Sample {
        self.time
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> Sample {
        self.buffer_size
    }

    /// Number of nodes currently in the graph, not counting the destination.
    pub fn live_nodes(&self) -> usize {
        self.evaluation_order.len() - 1
    }

    /// Number of nodes ever added to the graph, not counting the destination.
    pub fn nodes_created(&self) -> usize {
        self.created
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn add_node<N: Node + 'static>(&mut self, node: N) -> NodeId {
        let id = self.insert(Box::new(node));
        self.created += 1;
        id
    }

    fn insert(&mut self, node: Box<dyn Node>) -> NodeId {
        trace!("add {} node", node.name());
        let holder = NodeHolder {
            node,
            output: AudioBuffer::new(self.buffer_size),
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.holder = Some(holder);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    holder: Some(holder),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        // Without edges, any position in the evaluation order is fine.
        self.evaluation_order.push(id);
        id
    }

    fn holder(&self, node: NodeId) -> Result<&NodeHolder, GraphError> {
        self.slots
            .get(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.holder.as_ref())
            .context(UnknownNode { node })
    }

    fn holder_mut(&mut self, node: NodeId) -> Result<&mut NodeHolder, GraphError> {
        self.slots
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.holder.as_mut())
            .context(UnknownNode { node })
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.holder(node).is_ok()
    }

    pub fn param_mut(
        &mut self,
        node: NodeId,
        param: ParamKind,
    ) -> Result<&mut AudioParam, GraphError> {
        self.holder_mut(node)?
            .node
            .param_mut(param)
            .context(NoSuchParam { node, param })
    }

    pub fn source_mut(&mut self, node: NodeId) -> Result<&mut SourceSchedule, GraphError> {
        self.holder_mut(node)?
            .node
            .source_mut()
            .context(NotASource { node })
    }

    /// Feed the output of `from` into the input of `to`.
    /// Connecting the same nodes twice has no further effect.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let outputs = self.holder(from)?.node.num_outputs();
        let inputs = self.holder(to)?.node.num_inputs();
        ensure!(
            from != to && outputs > 0 && inputs > 0,
            InvalidConnection { from, to }
        );
        if self.edges.contains(&(from, to)) {
            return Ok(());
        }

        self.edges.push((from, to));
        match self.sorted_nodes() {
            Some(order) => {
                trace!("connect {:?} -> {:?}", from, to);
                self.evaluation_order = order;
                Ok(())
            }
            None => {
                self.edges.pop();
                Err(GraphError::Cycle { from, to })
            }
        }
    }

    /// Remove all outgoing connections of a node.
    pub fn disconnect(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.holder(node)?;
        trace!("disconnect {:?}", node);
        self.edges.retain(|(from, _)| *from != node);
        Ok(())
    }

    /// Remove a node and all of its connections from the graph.
    pub fn release(&mut self, node: NodeId) -> Result<(), GraphError> {
        ensure!(node != self.destination, Permanent { node });
        self.holder(node)?;
        trace!("release {:?}", node);

        self.edges.retain(|(from, to)| *from != node && *to != node);
        self.evaluation_order.retain(|n| *n != node);
        let slot = &mut self.slots[node.index];
        slot.holder = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index);
        Ok(())
    }

    /// Topological sort of all nodes using Kahn's algorithm.
    /// Returns `None` if there is a cycle.
    fn sorted_nodes(&self) -> Option<Vec<NodeId>> {
        let mut incoming = vec![0usize; self.slots.len()];
        for (_, to) in self.edges.iter() {
            incoming[to.index] += 1;
        }

        let mut without_incoming: Vec<NodeId> = self
            .evaluation_order
            .iter()
            .copied()
            .filter(|n| incoming[n.index] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.evaluation_order.len());

        while let Some(n) = without_incoming.pop() {
            sorted.push(n);
            for (_, to) in self.edges.iter().filter(|(from, _)| *from == n) {
                incoming[to.index] -= 1;
                if incoming[to.index] == 0 {
                    without_incoming.push(*to);
                }
            }
        }

        if sorted.len() == self.evaluation_order.len() {
            Some(sorted)
        } else {
            None
        }
    }

    /// Render the next `length` samples (at most the buffer size) and return the
    /// output of the destination node.
    pub fn render(&mut self, length: Sample) -> &[Stereo<f64>] {
        let length = length.min(self.buffer_size);

        for id in self.evaluation_order.iter() {
            self.input.fill_zero();
            for (from, _) in self.edges.iter().filter(|(_, to)| to == id) {
                if let Some(source) = self.slots[from.index].holder.as_ref() {
                    self.input.mix_from(&source.output);
                }
            }

            if let Some(holder) = self.slots[id.index].holder.as_mut() {
                let mut rio = RenderIo {
                    start: self.time,
                    length,
                    sample_rate: self.sample_rate,
                    input: &self.input,
                    output: &mut holder.output,
                };
                holder.node.render(&mut rio);
            }
        }
        self.time += length;

        match self.slots[self.destination.index].holder.as_ref() {
            Some(holder) => &holder.output.samples()[..length],
            None => &[],
        }
    }
}
