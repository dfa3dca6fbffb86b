//! Uniform random helpers shared by shape generation and color selection.
//!
//! Every random draw in the crate goes through [`rand01`] on a caller supplied
//! [`Rng`], so a seeded generator reproduces a run exactly.
use rand::Rng;

/// Generate a random float in the range [0, 1).
///
/// Uses the top 53 bits of [`Rng::next_u64`], which is exactly the
/// mantissa width of an `f64`.
#[inline]
pub fn rand01(rng: &mut dyn Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform float in `[lo, hi)`. Returns `lo` when the range is empty.
#[inline]
pub fn rand_range(rng: &mut dyn Rng, lo: f64, hi: f64) -> f64 {
    lo + rand01(rng) * (hi - lo)
}

/// Uniform index in `[0, len)`. `len` must be > 0.
#[inline]
pub fn rand_index(rng: &mut dyn Rng, len: usize) -> usize {
    debug_assert!(len > 0, "rand_index over an empty range");
    ((rand01(rng) * len as f64) as usize).min(len.saturating_sub(1))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FixedRng {
        pub(crate) value: u64,
    }

    impl rand::TryRng for FixedRng {
        type Error = core::convert::Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok((self.value >> 32) as u32)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.value)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 8];
            }
            Ok(())
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_stays_below_one_for_max_input() {
        let mut rng = FixedRng { value: u64::MAX };
        let result = rand01(&mut rng);
        assert!(result < 1.0);
        assert!(result > 0.999_999);
    }

    #[test]
    fn rand01_midpoint() {
        let mut rng = FixedRng {
            value: u64::MAX / 2,
        };
        assert!((rand01(&mut rng) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rand_range_handles_degenerate_range() {
        let mut rng = FixedRng { value: u64::MAX };
        assert_eq!(rand_range(&mut rng, 5.0, 5.0), 5.0);
    }

    #[test]
    fn rand_index_covers_bounds() {
        let mut low = FixedRng { value: 0 };
        assert_eq!(rand_index(&mut low, 3), 0);
        let mut high = FixedRng { value: u64::MAX };
        assert_eq!(rand_index(&mut high, 3), 2);
    }
}
