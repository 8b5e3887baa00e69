use chrono::{DateTime, Local};

/// Cumulative byte counters of one interface at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Bytes received since the interface/driver was reset
    pub inbound_bytes: u64,
    /// Bytes transmitted since the interface/driver was reset
    pub outbound_bytes: u64,
    /// Wall-clock time taken right after the counters were read
    pub sampled_at: DateTime<Local>,
}

/// Throughput derived from two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSample {
    pub timestamp: DateTime<Local>,
    /// Bytes received per second
    pub in_rate: u64,
    /// Bytes transmitted per second
    pub out_rate: u64,
}

impl RateSample {
    fn idle(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            in_rate: 0,
            out_rate: 0,
        }
    }
}

/// Compute bytes/sec between `prev` and `curr`.
///
/// The first sample (`prev == None`) and a non-positive elapsed interval
/// both yield zero rates. A counter that went backwards (driver reset or
/// wraparound) contributes a zero delta instead of a huge bogus one.
/// Rates are truncated to whole bytes per second.
pub fn compute(prev: Option<&CounterSnapshot>, curr: &CounterSnapshot) -> RateSample {
    let Some(prev) = prev else {
        return RateSample::idle(curr.sampled_at);
    };

    let elapsed = elapsed_secs(prev, curr);
    if elapsed <= 0.0 {
        log::warn!(
            "non-positive sampling interval ({elapsed:.6}s), reporting zero throughput"
        );
        return RateSample::idle(curr.sampled_at);
    }

    let in_delta = counter_delta("input", prev.inbound_bytes, curr.inbound_bytes);
    let out_delta = counter_delta("output", prev.outbound_bytes, curr.outbound_bytes);

    RateSample {
        timestamp: curr.sampled_at,
        in_rate: (in_delta as f64 / elapsed) as u64,
        out_rate: (out_delta as f64 / elapsed) as u64,
    }
}

/// Fractional seconds from `prev` to `curr`; negative if the clock stepped back
fn elapsed_secs(prev: &CounterSnapshot, curr: &CounterSnapshot) -> f64 {
    let delta = curr.sampled_at.signed_duration_since(prev.sampled_at);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        // Only overflows for spans of ~292k years
        None => delta.num_seconds() as f64,
    }
}

fn counter_delta(direction: &str, prev: u64, curr: u64) -> u64 {
    if curr < prev {
        log::warn!("{direction} byte counter decreased ({prev} -> {curr}), treating as reset");
    }
    curr.saturating_sub(prev)
}
