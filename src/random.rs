/// Small linear congruential generator used by the lessons.
///
/// Produces the same sequence as the classic C runtime `rand()` so that star
/// fields and particle bursts look the same on every platform.
#[derive(Clone, Debug)]
pub struct Random {
    state: u32,
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl Random {
    /// Largest value [`Random::next`] can return.
    pub const MAX: i32 = 0x7FFF;

    pub fn new() -> Self {
        Self { state: 1 }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn seed(&mut self, seed: u32) {
        self.state = seed;
    }

    /// Next value in `0..=Random::MAX`.
    pub fn next(&mut self) -> i32 {
        self.state = self.state.wrapping_mul(214013).wrapping_add(2531011);
        ((self.state >> 16) & 0x7FFF) as i32
    }

    /// Next value in `0..bound`, for `bound` in `1..=Random::MAX + 1`.
    pub fn below(&mut self, bound: i32) -> i32 {
        self.next() % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seed_sequence() {
        let mut rng = Random::new();
        let values: Vec<i32> = (0..5).map(|_| rng.next()).collect();
        assert_eq!(values, [41, 18467, 6334, 26500, 19169]);
    }

    #[test]
    fn reseeding_restarts_sequence() {
        let mut rng = Random::with_seed(1234);
        let first: Vec<i32> = (0..3).map(|_| rng.next()).collect();
        rng.seed(1234);
        let second: Vec<i32> = (0..3).map(|_| rng.next()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn values_stay_in_range() {
        let mut rng = Random::with_seed(0xDEAD_BEEF);
        for _ in 0..1000 {
            let v = rng.next();
            assert!((0..=Random::MAX).contains(&v));
            assert!((0..10).contains(&rng.below(10)));
        }
    }
}
