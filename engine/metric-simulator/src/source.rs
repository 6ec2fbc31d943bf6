//! Uniform random sources for the walk rules

use rand::Rng;

/// A source of uniform draws in `[0, 1)`.
///
/// The simulator never touches an ambient generator. Anything implementing this trait can
/// be injected, which is how tests replay exact tick sequences.
pub trait UniformSource: Send {
    /// Next draw, uniformly distributed over `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

impl<R> UniformSource for R
where
    R: rand::RngCore + Send,
{
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws, then falls back to `0.0`.
///
/// `0.0` never crosses a step threshold, so an exhausted script leaves step walks untouched.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self { draws: draws.into(), cursor: 0 }
    }

    /// Draws not yet consumed
    pub fn remaining(&self) -> usize {
        self.draws.len().saturating_sub(self.cursor)
    }
}

impl UniformSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws.get(self.cursor).copied().unwrap_or(0.0);
        self.cursor += 1;
        draw
    }
}
