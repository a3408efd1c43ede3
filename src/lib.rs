// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

pub mod envelope;
pub mod graph;
pub mod instrument;
pub mod note;
pub mod output;
pub mod render;
pub mod sequencer;
pub mod song;
pub mod tuning;
pub mod wave;

// Utility modules
pub mod automation;
pub mod oscillator;
pub mod util;
