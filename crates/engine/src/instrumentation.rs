//! Refresh-loop instrumentation
//!
//! Feature-gated to avoid overhead in production.
//! Enable with: cargo build --features perf-trace
//!
//! # Usage
//!
//! ```ignore
//! use svj_engine::instrumentation::RefreshTrace;
//!
//! let mut trace = RefreshTrace::new();
//!
//! // Time a section
//! perf_time!(trace, load_ns, {
//!     source.load(index)
//! })?;
//!
//! println!("{}", trace.summary());
//! ```

/// Timing of a single `advance`
///
/// When `perf-trace` feature is enabled, this struct captures
/// timing information for each phase of the call.
#[cfg(feature = "perf-trace")]
#[derive(Debug, Default, Clone)]
pub struct RefreshTrace {
    /// Time spent in the record source's `load` (ns)
    pub load_ns: u64,
    /// Time spent checking component lengths (ns)
    pub validate_ns: u64,
    /// Time spent rebuilding slots (ns)
    pub refresh_ns: u64,
    /// Number of variables refreshed
    pub variables: usize,
}

#[cfg(feature = "perf-trace")]
impl RefreshTrace {
    /// Create new empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all phases (ns)
    pub fn total_ns(&self) -> u64 {
        self.load_ns + self.validate_ns + self.refresh_ns
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "load: {}ns, validate: {}ns, refresh: {}ns, total: {}ns ({} variables)",
            self.load_ns,
            self.validate_ns,
            self.refresh_ns,
            self.total_ns(),
            self.variables,
        )
    }
}

/// No-op trace for production builds
#[cfg(not(feature = "perf-trace"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshTrace;

#[cfg(not(feature = "perf-trace"))]
impl RefreshTrace {
    /// Create new empty trace (no-op)
    pub fn new() -> Self {
        Self
    }

    /// Format as human-readable string (no-op)
    pub fn summary(&self) -> &'static str {
        "perf-trace disabled"
    }
}

/// Macro for conditional timing
///
/// When `perf-trace` is enabled, times the expression and stores in trace.
/// When disabled, just evaluates the expression with zero overhead.
#[cfg(feature = "perf-trace")]
#[macro_export]
macro_rules! perf_time {
    ($trace:expr, $field:ident, $expr:expr) => {{
        let start = std::time::Instant::now();
        let result = $expr;
        $trace.$field = start.elapsed().as_nanos() as u64;
        result
    }};
}

/// No-op version of perf_time! macro when `perf-trace` feature is disabled.
///
/// Simply evaluates the expression with zero overhead.
#[cfg(not(feature = "perf-trace"))]
#[macro_export]
macro_rules! perf_time {
    ($trace:expr, $field:ident, $expr:expr) => {
        $expr
    };
}

/// Buckets of the total-time histogram: bucket 0 holds zero, bucket `b`
/// holds `[2^(b-1), 2^b)`.
#[cfg(feature = "perf-trace")]
const HISTOGRAM_BUCKETS: usize = 65;

/// Aggregate refresh statistics across many `advance` calls
///
/// Memory is fixed regardless of how many entries are scanned: running sums
/// for the means and a power-of-two histogram for the percentile. `p99` is
/// therefore the upper edge of the bucket holding the 99th percentile,
/// capped at the largest observed total.
#[cfg(feature = "perf-trace")]
#[derive(Debug, Clone)]
pub struct RefreshStats {
    count: u64,
    total_sum_ns: u128,
    refresh_sum_ns: u128,
    max_total_ns: u64,
    histogram: [u64; HISTOGRAM_BUCKETS],
}

#[cfg(feature = "perf-trace")]
impl Default for RefreshStats {
    fn default() -> Self {
        Self {
            count: 0,
            total_sum_ns: 0,
            refresh_sum_ns: 0,
            max_total_ns: 0,
            histogram: [0; HISTOGRAM_BUCKETS],
        }
    }
}

#[cfg(feature = "perf-trace")]
impl RefreshStats {
    /// Create new empty stats collector
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bucket(ns: u64) -> usize {
        (u64::BITS - ns.leading_zeros()) as usize
    }

    fn bucket_upper(bucket: usize) -> u64 {
        match bucket {
            0 => 0,
            b if b >= 64 => u64::MAX,
            b => (1u64 << b) - 1,
        }
    }

    /// Record a trace
    #[inline]
    pub fn record(&mut self, trace: RefreshTrace) {
        let total = trace.total_ns();
        self.count += 1;
        self.total_sum_ns += u128::from(total);
        self.refresh_sum_ns += u128::from(trace.refresh_ns);
        self.max_total_ns = self.max_total_ns.max(total);
        self.histogram[Self::bucket(total)] += 1;
    }

    /// Get number of recorded traces
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Mean total time per advance (ns)
    pub fn mean_total_ns(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_sum_ns as f64 / self.count as f64
    }

    /// Largest total time of a single advance (ns)
    pub fn max_total_ns(&self) -> u64 {
        self.max_total_ns
    }

    /// p99 total time per advance (ns), at histogram resolution
    pub fn p99_total_ns(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let rank = self.count - self.count / 100;
        let mut seen = 0u64;
        for (bucket, &n) in self.histogram.iter().enumerate() {
            seen += n;
            if seen >= rank {
                return Self::bucket_upper(bucket).min(self.max_total_ns);
            }
        }
        self.max_total_ns
    }

    /// Mean slot-rebuild time per advance (ns)
    pub fn mean_refresh_ns(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.refresh_sum_ns as f64 / self.count as f64
    }

    /// Format as summary string
    pub fn summary(&self) -> String {
        format!(
            "advances: {}, mean: {:.0}ns (refresh {:.0}ns), p99: {}ns, max: {}ns",
            self.count(),
            self.mean_total_ns(),
            self.mean_refresh_ns(),
            self.p99_total_ns(),
            self.max_total_ns
        )
    }
}

/// No-op stats collector for production builds
#[cfg(not(feature = "perf-trace"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshStats;

#[cfg(not(feature = "perf-trace"))]
impl RefreshStats {
    /// Create new empty stats collector (no-op)
    pub fn new() -> Self {
        Self
    }

    /// Discard the trace
    #[inline(always)]
    pub fn record(&mut self, _trace: RefreshTrace) {}

    /// Always zero
    pub fn count(&self) -> usize {
        0
    }

    /// Format as summary string (no-op)
    pub fn summary(&self) -> String {
        "perf-trace disabled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_trace_creation() {
        let trace = RefreshTrace::new();
        let _ = trace.summary();
    }

    #[test]
    fn test_perf_time_returns_value() {
        #[allow(unused_mut, unused_variables)]
        let mut trace = RefreshTrace::new();
        let result = perf_time!(trace, refresh_ns, 21 * 2);
        assert_eq!(result, 42);
    }

    #[cfg(feature = "perf-trace")]
    #[test]
    fn test_perf_time_macro_records() {
        let mut trace = RefreshTrace::new();
        let result = perf_time!(trace, load_ns, {
            std::thread::sleep(std::time::Duration::from_micros(10));
            42
        });
        assert_eq!(result, 42);
        assert!(trace.load_ns > 0);
    }

    #[cfg(feature = "perf-trace")]
    #[test]
    fn test_refresh_stats() {
        let mut stats = RefreshStats::new();

        for i in 1..=100 {
            let mut trace = RefreshTrace::new();
            trace.refresh_ns = i * 1000;
            stats.record(trace);
        }

        assert_eq!(stats.count(), 100);
        assert_eq!(stats.mean_total_ns(), 50_500.0);
        assert_eq!(stats.mean_refresh_ns(), 50_500.0);
        assert!(stats.p99_total_ns() >= 99_000);
        assert!(stats.p99_total_ns() <= stats.max_total_ns());
        assert_eq!(stats.max_total_ns(), 100_000);
    }

    #[cfg(feature = "perf-trace")]
    #[test]
    fn test_refresh_stats_size_is_fixed() {
        let size = std::mem::size_of::<RefreshStats>();
        let mut stats = RefreshStats::new();
        for i in 0..1_000_000u64 {
            let mut trace = RefreshTrace::new();
            trace.load_ns = 100;
            trace.refresh_ns = if i % 1000 == 0 { 1_000_000 } else { 400 };
            stats.record(trace);
        }
        assert_eq!(std::mem::size_of_val(&stats), size);
        assert_eq!(stats.count(), 1_000_000);
        // 0.1% slow advances stay above the 99th percentile
        assert!(stats.p99_total_ns() < 1024);
        assert!(stats.p99_total_ns() >= 500);
        assert_eq!(stats.max_total_ns(), 1_000_100);
    }

    #[cfg(feature = "perf-trace")]
    #[test]
    fn test_empty_stats() {
        let stats = RefreshStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.p99_total_ns(), 0);
        assert_eq!(stats.mean_total_ns(), 0.0);
    }

    #[cfg(not(feature = "perf-trace"))]
    #[test]
    fn test_disabled_stats_are_empty() {
        let mut stats = RefreshStats::new();
        stats.record(RefreshTrace::new());
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.summary(), "perf-trace disabled");
    }
}
