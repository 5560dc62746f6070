use crate::errors::ProbeError;
use crate::types::SampleSeries;

/// Average utilization over the whole series.
///
/// Averages each core over time first, then averages those per-core means.
/// An empty series is an error rather than NaN.
pub fn average_usage(series: &SampleSeries) -> Result<f64, ProbeError> {
    let cores = match series.cores() {
        Some(cores) if !series.is_empty() => cores,
        _ => return Err(ProbeError::EmptySeries),
    };

    let per_core = per_core_average(series, cores);
    Ok(per_core.iter().sum::<f64>() / cores as f64)
}

/// Mean of each core's readings across the series, indexed by core.
pub fn per_core_average(series: &SampleSeries, cores: usize) -> Vec<f64> {
    let mut column_sums = vec![0.0; cores];
    for sample in series.samples() {
        for (sum, reading) in column_sums.iter_mut().zip(sample.readings()) {
            *sum += reading;
        }
    }

    let count = series.len() as f64;
    column_sums.iter().map(|sum| sum / count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rows: &[&[f64]]) -> SampleSeries {
        SampleSeries::try_from(rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    /// Small deterministic generator so the property test needs no extra crate.
    struct Lcg(u64);

    impl Lcg {
        fn next_u64(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn range(&mut self, lo: usize, hi: usize) -> usize {
            lo + (self.next_u64() as usize) % (hi - lo + 1)
        }

        fn percent(&mut self) -> f64 {
            (self.next_u64() % 10_001) as f64 / 100.0
        }
    }

    #[test]
    fn two_by_three_example() {
        let s = series(&[&[10.0, 20.0], &[30.0, 40.0], &[50.0, 60.0]]);
        assert_eq!(average_usage(&s).unwrap(), 35.0);
    }

    #[test]
    fn per_core_means() {
        let s = series(&[&[10.0, 20.0], &[30.0, 40.0], &[50.0, 60.0]]);
        assert_eq!(per_core_average(&s, 2), vec![30.0, 40.0]);
    }

    #[test]
    fn single_sample_single_core() {
        let s = series(&[&[42.5]]);
        assert_eq!(average_usage(&s).unwrap(), 42.5);
    }

    #[test]
    fn constant_readings_return_constant_exactly() {
        for v in [0.0, 12.5, 37.25, 100.0] {
            let rows: Vec<Vec<f64>> = (0..7).map(|_| vec![v; 5]).collect();
            let s = SampleSeries::try_from(rows).unwrap();
            assert_eq!(average_usage(&s).unwrap(), v, "constant {}", v);
        }
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = average_usage(&SampleSeries::new()).unwrap_err();
        assert!(matches!(err, ProbeError::EmptySeries));
    }

    #[test]
    fn empty_series_with_known_cores_is_an_error() {
        let err = average_usage(&SampleSeries::with_cores(8)).unwrap_err();
        assert!(matches!(err, ProbeError::EmptySeries));
    }

    #[test]
    fn equals_flat_mean_of_random_matrices() {
        let mut rng = Lcg(0x5eed_cafe);
        for _ in 0..500 {
            let samples = rng.range(1, 40);
            let cores = rng.range(1, 64);
            let rows: Vec<Vec<f64>> = (0..samples)
                .map(|_| (0..cores).map(|_| rng.percent()).collect())
                .collect();

            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            let flat_mean = flat.iter().sum::<f64>() / flat.len() as f64;

            let s = SampleSeries::try_from(rows).unwrap();
            let two_stage = average_usage(&s).unwrap();
            assert!(
                (two_stage - flat_mean).abs() < 1e-9,
                "{}x{}: two-stage {} vs flat {}",
                samples,
                cores,
                two_stage,
                flat_mean
            );
        }
    }
}
