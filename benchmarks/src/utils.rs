use rental_insights::stats::percentile;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Accumulating stopwatch for timing several stages of one run.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Instant>,
    total: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Stop the timer and add the elapsed time to the total.
    pub fn stop(&mut self) -> Duration {
        match self.start.take() {
            Some(start) => {
                let elapsed = start.elapsed();
                self.total += elapsed;
                elapsed
            }
            None => Duration::ZERO,
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Run a function and measure its execution time.
pub fn time_fn<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Run `f` `warmup` times unmeasured, then `iterations` times measured.
///
/// Returns the last result and timing statistics of the measured runs.
pub fn benchmark_with_warmup<F, R>(
    warmup: usize,
    iterations: usize,
    mut f: F,
) -> (R, BenchmarkStats)
where
    F: FnMut() -> R,
{
    for _ in 0..warmup {
        let _ = f();
    }

    let (mut last, elapsed) = time_fn(&mut f);
    let mut times = vec![elapsed.as_secs_f64() * 1000.0];
    for _ in 1..iterations.max(1) {
        let (result, elapsed) = time_fn(&mut f);
        last = result;
        times.push(elapsed.as_secs_f64() * 1000.0);
    }

    (last, BenchmarkStats::from_times(times))
}

/// Statistics for benchmarking results.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkStats {
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
}

impl BenchmarkStats {
    /// Calculate statistics from a non-empty list of times in milliseconds.
    pub fn from_times(mut times: Vec<f64>) -> Self {
        times.sort_by(f64::total_cmp);

        let n = times.len() as f64;
        let mean = times.iter().sum::<f64>() / n;
        let variance = times.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean_ms: mean,
            std_dev_ms: variance.sqrt(),
            min_ms: times.first().copied().unwrap_or(0.0),
            max_ms: times.last().copied().unwrap_or(0.0),
            median_ms: percentile(&times, 0.5),
            p95_ms: percentile(&times, 0.95),
        }
    }
}
