// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

use std::ops;

/// A buffer holding floating point audio data.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<Stereo<f64>>,
}

#[allow(clippy::len_without_is_empty)]
impl AudioBuffer {
    pub fn new(sample_count: usize) -> Self {
        Self {
            samples: vec![Stereo::mono(0.0); sample_count],
        }
    }

    /// Set all samples to zero.
    pub fn fill_zero(&mut self) {
        self.samples
            .iter_mut()
            .for_each(|s| *s = Stereo::mono(0.0));
    }

    /// Size of the buffer in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[Stereo<f64>] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [Stereo<f64>] {
        &mut self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stereo<f64>> {
        self.samples.iter()
    }

    /// Add the samples of another buffer to this one.
    pub fn mix_from(&mut self, other: &AudioBuffer) {
        for (o, i) in self.samples.iter_mut().zip(other.samples.iter()) {
            *o += *i;
        }
    }
}

/// Convenience type for making things stereo, e.g. individual samples or whole buffers.
///
/// ```
/// use syn_organ::wave::*;
///
/// let stereo = Stereo::new(0.25, 0.5);
/// let stereo2 = stereo + Stereo::new(0.5, -0.25);
/// assert_eq!(stereo2 * 2.0, Stereo::new(1.5, 0.5));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stereo<T> {
    pub left: T,
    pub right: T,
}

impl<T> Stereo<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn mono(mono: T) -> Self
    where
        T: Copy,
    {
        Self::new(mono, mono)
    }
}

impl<T: ops::Add> ops::Add for Stereo<T> {
    type Output = Stereo<T::Output>;

    fn add(self, rhs: Self) -> Self::Output {
        Stereo {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl<T: ops::AddAssign> ops::AddAssign for Stereo<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl<T: ops::Mul + Copy> ops::Mul<T> for Stereo<T> {
    type Output = Stereo<T::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Stereo {
            left: self.left * rhs,
            right: self.right * rhs,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mixing_adds_samples() {
        let mut a = AudioBuffer::new(3);
        let mut b = AudioBuffer::new(3);
        b.samples_mut()[1] = Stereo::new(0.5, -0.5);
        a.mix_from(&b);
        a.mix_from(&b);
        assert_eq!(a.samples()[1], Stereo::new(1.0, -1.0));
        a.fill_zero();
        assert!(a.iter().all(|s| *s == Stereo::mono(0.0)));
    }
}
