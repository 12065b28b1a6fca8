use crate::config::Config;
use crate::ring_history::RingHistory;
use crate::sample::Sample;

/// Outcome of a convergence check between two fingers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    pub converging: bool,
    /// Number of sampled steps where the distance grew.
    pub increases: usize,
    /// Number of sampled distances compared.
    pub points: usize,
}

/// Decides whether two fingertips have been moving towards each other.
///
/// The oldest `window` retained samples of both fingers are visited with the
/// given stride; each visit yields the squared distance between the two tips.
/// The pair is rejected once more than `fail_threshold` of those distances
/// grew relative to the previous one.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceEvaluator {
    pub window: usize,
    pub stride: usize,
    pub fail_threshold: usize,
}

impl Default for ConvergenceEvaluator {
    fn default() -> Self {
        Self::new(15, 2, 4)
    }
}

impl ConvergenceEvaluator {
    pub fn new(window: usize, stride: usize, fail_threshold: usize) -> Self {
        Self {
            window,
            stride: stride.max(1),
            fail_threshold,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.convergence_window,
            config.convergence_stride,
            config.convergence_fail_threshold,
        )
    }

    pub fn evaluate(&self, a: &RingHistory<Sample>, b: &RingHistory<Sample>) -> Convergence {
        let mut last: Option<f64> = None;
        let mut increases = 0;
        let mut points = 0;

        for i in (0..self.window).step_by(self.stride) {
            // shorter histories end the walk early
            let (pa, pb) = match (a.read_from_oldest(i), b.read_from_oldest(i)) {
                (Ok(pa), Ok(pb)) => (pa, pb),
                _ => break,
            };

            let dist = pa.point.distance_squared(&pb.point);
            if matches!(last, Some(prev) if prev < dist) {
                increases += 1;
            }

            last = Some(dist);
            points += 1;
        }

        Convergence {
            converging: increases <= self.fail_threshold,
            increases,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Point;

    // two fingers on the x axis, `gaps[k]` apart at step k
    fn pair(gaps: &[f64]) -> (RingHistory<Sample>, RingHistory<Sample>) {
        let mut a = RingHistory::with_capacity(15);
        let mut b = RingHistory::with_capacity(15);

        for (k, gap) in gaps.iter().enumerate() {
            let ts = k as u64 * 5_000;
            a.push(Sample::new(1, Point::new(0.0, 0.0, 0.0, 7), ts));
            b.push(Sample::new(2, Point::new(*gap, 0.0, 0.0, 7), ts));
        }

        (a, b)
    }

    #[test]
    fn strictly_decreasing_distance_converges() {
        let gaps: Vec<f64> = (0..15).map(|k| 60.0 - 3.0 * k as f64).collect();
        let (a, b) = pair(&gaps);

        let res = ConvergenceEvaluator::default().evaluate(&a, &b);
        assert!(res.converging);
        assert_eq!(res.increases, 0);
        assert_eq!(res.points, 8);
    }

    #[test]
    fn oscillating_distance_is_rejected() {
        // at even indexes the gap alternates 10, 20: four rises
        let gaps = [
            10.0, 0.0, 20.0, 0.0, 10.0, 0.0, 20.0, 0.0, 10.0, 0.0, 20.0, 0.0, 10.0, 0.0, 20.0,
        ];
        let (a, b) = pair(&gaps);

        let res = ConvergenceEvaluator::default().evaluate(&a, &b);
        assert_eq!(res.increases, 4);
        assert!(res.converging);

        let res = ConvergenceEvaluator::new(15, 2, 3).evaluate(&a, &b);
        assert!(!res.converging);
    }

    #[test]
    fn more_rises_than_threshold_is_rejected() {
        let gaps: Vec<f64> = (0..15).map(|k| 5.0 + 2.0 * k as f64).collect();
        let (a, b) = pair(&gaps);

        let res = ConvergenceEvaluator::default().evaluate(&a, &b);
        assert_eq!(res.increases, 7);
        assert!(!res.converging);
    }

    #[test]
    fn short_history_stops_at_retained_window() {
        let gaps: Vec<f64> = (0..10).map(|k| 40.0 - k as f64).collect();
        let (a, b) = pair(&gaps);

        let res = ConvergenceEvaluator::default().evaluate(&a, &b);
        assert_eq!(res.points, 5);
        assert!(res.converging);
    }

    #[test]
    fn walks_from_oldest_retained_after_wrap() {
        // 20 samples: the first 5 (rising) are overwritten
        let mut gaps: Vec<f64> = (0..5).map(|k| 10.0 + 10.0 * k as f64).collect();
        gaps.extend((0..15).map(|k| 100.0 - 5.0 * k as f64));
        let (a, b) = pair(&gaps);

        let res = ConvergenceEvaluator::default().evaluate(&a, &b);
        assert_eq!(res.increases, 0);
        assert!(res.converging);
    }
}
