//! Seeded xorshift32 PRNG for instance scattering

/// Deterministic generator: the same seed yields the same draw sequence on
/// every platform.
#[derive(Debug, Clone)]
pub struct ScatterRng {
    state: u32,
}

impl ScatterRng {
    pub fn new(seed: u32) -> Self {
        // Spread the seed bits; xorshift needs a non-zero state and its first
        // outputs for tiny states are tiny too.
        let mut s = seed ^ 0x9E37_79B9;
        s = (s ^ (s >> 16)).wrapping_mul(0x85EB_CA6B);
        s = (s ^ (s >> 13)).wrapping_mul(0xC2B2_AE35);
        s ^= s >> 16;
        Self {
            state: if s == 0 { 1 } else { s },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}
