use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Backs the `RND` function with the reference's seed/replay/fresh-draw semantics.
/// Owned by the interpreter instance (the reference seeds a process-global with
/// `time(NULL)`; here the equivalent happens once, at construction).
pub struct Rng {
    inner: StdRng,
    last_value: f64,
}

impl Default for Rng {
    fn default() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            inner: StdRng::seed_from_u64(seed),
            last_value: 0.0,
        }
    }
}

impl Rng {
    pub fn new() -> Self {
        Self::default()
    }

    /// `RND(x)`: negative reseeds and draws fresh; zero replays the last draw;
    /// positive draws a fresh uniform value in `[0, 1)`.
    pub fn rnd(&mut self, x: f64) -> f64 {
        if x < 0.0 {
            let seed = (-x) as u32 as u64;
            self.inner = StdRng::seed_from_u64(seed);
            self.last_value = self.inner.gen_range(0.0..1.0);
        } else if x == 0.0 {
            // replay: nothing to draw, `last_value` already holds it.
        } else {
            self.last_value = self.inner.gen_range(0.0..1.0);
        }
        self.last_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_replays_the_previous_draw() {
        let mut rng = Rng::new();
        let first = rng.rnd(-5.0);
        assert_eq!(rng.rnd(0.0), first);
        assert_eq!(rng.rnd(0.0), first);
    }

    #[test]
    fn negative_seed_is_deterministic() {
        let mut a = Rng::new();
        let mut b = Rng::new();
        assert_eq!(a.rnd(-42.0), b.rnd(-42.0));
    }
}
