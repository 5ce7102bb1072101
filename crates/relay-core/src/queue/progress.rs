//! Aggregate progress of a queue.

/// `(completed + sum of in-flight fractions) / max(1, total)`, clamped to 0..=1.
pub fn aggregate<I>(completed: usize, total: usize, in_flight: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let unit = 1.0 / (total.max(1) as f64);
    let ongoing: f64 = in_flight.into_iter().sum();
    let value = (completed as f64 + ongoing) * unit;
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, 0, vec![], 0.0)]
    #[case::half_done(1, 2, vec![], 0.5)]
    #[case::partial_upload(1, 4, vec![0.5, 0.5], 0.5)]
    #[case::all_done(3, 3, vec![], 1.0)]
    #[case::overshoot(2, 2, vec![1.0], 1.0)]
    fn aggregate_progress(
        #[case] completed: usize,
        #[case] total: usize,
        #[case] in_flight: Vec<f64>,
        #[case] expected: f64,
    ) {
        let got = aggregate(completed, total, in_flight);
        assert!((got - expected).abs() < 1e-9, "got {got}, expected {expected}");
    }
}
