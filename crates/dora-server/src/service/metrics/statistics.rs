//! Summary statistics over duration samples.

/// Median, mean and size of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Middle value; the mean of the two middle values for even sizes.
    pub median: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Number of samples.
    pub count: u64,
}

impl Summary {
    /// Summarizes the samples, or returns `None` when there are none.
    ///
    /// The slice is sorted in place.
    pub fn of(samples: &mut [i64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        samples.sort_unstable();
        let len = samples.len();
        let middle = len / 2;
        let median = if len % 2 == 0 {
            (samples[middle - 1] as f64 + samples[middle] as f64) / 2.0
        } else {
            samples[middle] as f64
        };

        let sum: i128 = samples.iter().map(|&value| i128::from(value)).sum();
        let mean = sum as f64 / len as f64;

        Some(Self {
            median,
            mean,
            count: len as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_has_no_summary() {
        assert_eq!(Summary::of(&mut []), None);
    }

    #[test]
    fn odd_sample() {
        let summary = Summary::of(&mut [300, 100, 200]).unwrap();
        assert_eq!(summary.median, 200.0);
        assert_eq!(summary.mean, 200.0);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn even_sample_averages_middle_values() {
        let summary = Summary::of(&mut [10, 40, 20, 1000]).unwrap();
        assert_eq!(summary.median, 30.0);
        assert_eq!(summary.mean, 267.5);
    }

    #[test]
    fn single_sample() {
        let summary = Summary::of(&mut [253]).unwrap();
        assert_eq!(summary.median, 253.0);
        assert_eq!(summary.count, 1);
    }
}
