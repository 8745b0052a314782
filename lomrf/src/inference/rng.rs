/*!
A minimal pseudorandom source for stochastic local search.

`rand = { default-features = false }` carries no built-in generator, so
this implements `RngCore` directly over a tiny PCG32 state. `MaxWalkSat`
needs the same thing for its flip/noise decisions.
*/

use rand::SeedableRng;
use rand_core::{impls, RngCore};

#[derive(Default)]
pub struct MinimalPcg32 {
    state: u64,
    inc: u64,
}

impl MinimalPcg32 {
    pub fn seeded(seed: u64) -> Self {
        Self::from_seed(seed.to_le_bytes())
    }

    /// A uniform index in `0..bound`. `bound` must be nonzero.
    pub fn random_range(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }

    /// A uniform `f64` in `[0, 1)`.
    pub fn random_f64(&mut self) -> f64 {
        (self.next_u32() as f64) / (u32::MAX as f64 + 1.0)
    }
}

impl RngCore for MinimalPcg32 {
    fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(6364136223846793005_u64).wrapping_add(self.inc);

        let xorshifted = ((old_state >> 18) ^ old_state) >> 27;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot) as u32
    }

    fn next_u64(&mut self) -> u64 {
        ((self.next_u32() as u64) << 32) | self.next_u32() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for MinimalPcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        const INCREMENT: u64 = 1442695040888963407;
        MinimalPcg32 {
            state: u64::from_le_bytes(seed).wrapping_add(INCREMENT),
            inc: INCREMENT,
        }
    }
}
