use crate::{ensure_interval, error::Result};

/// An implementation of a value that decays in discrete steps
pub trait Decay {
    /// Value after one more decay step from `value`
    fn step(&self, value: f32) -> f32;
}

/// v<sub>n+1</sub> = max(v<sub>n</sub> * r, v<sub>f</sub>)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplicative {
    rate: f32,
    vf: f32,
}

impl Multiplicative {
    /// Decay by multiplying with `rate` each step, never going below the floor `vf`
    pub fn new(rate: f32, vf: f32) -> Result<Self> {
        ensure_interval!(rate, 0.0, 1.0);
        ensure_interval!(vf, 0.0, 1.0);
        Ok(Self { rate, vf })
    }
}

impl Decay for Multiplicative {
    fn step(&self, value: f32) -> f32 {
        (value * self.rate).max(self.vf)
    }
}
