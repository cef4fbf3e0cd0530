use crate::operator::Op;

/// Fixed-width histogram over an integer column, used for selectivity
/// estimation. Space and time stay constant in the number of values:
/// only the per-bucket counts are kept.
///
/// Estimates are bucket-granular: an EQUALS probe is charged the whole
/// bucket it falls into, and the range operators sum whole buckets on
/// their side of it. That keeps `lt + eq + gt = 1` exact.
pub struct IntHistogram {
    buckets: Vec<usize>,
    min: i64,
    max: i64,
    width: i64,
    total: usize,
}

impl IntHistogram {
    /// A histogram of `buckets` buckets over the inclusive value range
    /// `[min, max]`.
    pub fn new(buckets: usize, min: i64, max: i64) -> Self {
        let span = max - min + 1;
        let width = ((span + buckets as i64 - 1) / buckets as i64).max(1);
        Self {
            buckets: vec![0; buckets],
            min,
            max,
            width,
            total: 0,
        }
    }

    fn bucket_of(&self, v: i64) -> usize {
        ((v - self.min) / self.width) as usize
    }

    /// Record one value; `v` must lie in `[min, max]`.
    pub fn add_value(&mut self, v: i64) {
        debug_assert!(v >= self.min && v <= self.max);
        let index = self.bucket_of(v);
        self.buckets[index] += 1;
        self.total += 1;
    }

    /// Estimated fraction of recorded values satisfying `value <op> v`,
    /// in `[0, 1]`. Probes outside `[min, max]` resolve to 0 or 1
    /// depending on the direction of the predicate.
    pub fn estimate_selectivity(&self, op: Op, v: i64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;

        match op {
            Op::Equals => {
                if v < self.min || v > self.max {
                    return 0.0;
                }
                self.buckets[self.bucket_of(v)] as f64 / total
            }
            Op::NotEquals => 1.0 - self.estimate_selectivity(Op::Equals, v),
            Op::GreaterThan => {
                if v < self.min {
                    return 1.0;
                }
                if v > self.max {
                    return 0.0;
                }
                let index = self.bucket_of(v);
                self.buckets[index + 1..].iter().sum::<usize>() as f64 / total
            }
            Op::GreaterThanOrEq => {
                if v < self.min {
                    return 1.0;
                }
                if v > self.max {
                    return 0.0;
                }
                let index = self.bucket_of(v);
                self.buckets[index..].iter().sum::<usize>() as f64 / total
            }
            Op::LessThan => {
                if v < self.min {
                    return 0.0;
                }
                if v > self.max {
                    return 1.0;
                }
                let index = self.bucket_of(v);
                self.buckets[..index].iter().sum::<usize>() as f64 / total
            }
            Op::LessThanOrEq => {
                if v < self.min {
                    return 0.0;
                }
                if v > self.max {
                    return 1.0;
                }
                let index = self.bucket_of(v);
                self.buckets[..=index].iter().sum::<usize>() as f64 / total
            }
        }
    }
}
