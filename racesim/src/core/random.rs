use rand::{Rng, RngCore};

/// RandomSource delivers the uniform random numbers in [0, 1) that drive the race simulation.
/// Every rand generator is a random source, tests may insert fixed sequences instead.
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
