use crate::decode::frames::FrameSequence;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::foundation::math::mul_div_floor;

/// One output frame: which source frame to show and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePick {
    /// Index into the source sequence.
    pub source: usize,
    /// Output display duration in milliseconds.
    pub delay_ms: u32,
}

/// Exactly `N` picks in output order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemporalPlan {
    picks: Vec<FramePick>,
}

impl TemporalPlan {
    /// Picks in output order.
    pub fn picks(&self) -> &[FramePick] {
        &self.picks
    }

    /// Number of output frames.
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Whether the plan has no picks.
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Sum of output delays in milliseconds.
    pub fn total_delay_ms(&self) -> u64 {
        self.picks.iter().map(|p| u64::from(p.delay_ms)).sum()
    }

    /// Sorted, deduplicated source indices referenced by the plan.
    pub fn distinct_sources(&self) -> Vec<usize> {
        let mut v: Vec<usize> = self.picks.iter().map(|p| p.source).collect();
        v.sort_unstable();
        v.dedup();
        v
    }
}

/// Resample `seq` to exactly `frames` output frames.
///
/// Timestamps `t_k = k * T / N` are sampled over `[0, T)` and each selects the source frame whose
/// interval `[start, end)` contains it. Output delays split the playback time with
/// `floor((k + 1) * T / N) - floor(k * T / N)`, so they sum to exactly that time.
///
/// Untimed sequences select over one unit per frame. A single untimed frame (a still) shows each
/// output frame for `untimed_delay_ms`; several untimed frames play for `M * untimed_delay_ms` in
/// total regardless of `N`.
#[tracing::instrument(skip(seq), fields(source_frames = seq.len()))]
pub fn resample_temporal(
    seq: &FrameSequence,
    frames: u32,
    untimed_delay_ms: u32,
) -> SpeakifyResult<TemporalPlan> {
    if seq.is_empty() {
        return Err(SpeakifyError::empty_source("no frames to resample"));
    }
    if frames == 0 {
        return Err(SpeakifyError::invalid_argument("frame count must be >= 1"));
    }

    let n = u64::from(frames);
    let spans: Vec<u64> = if seq.is_timed() {
        seq.frames().iter().map(|f| u64::from(f.delay_ms())).collect()
    } else {
        vec![1; seq.len()]
    };
    let total: u64 = spans.iter().sum();
    let playback = match (seq.is_timed(), spans.len()) {
        (true, _) => Some(total),
        (false, 1) => None,
        (false, m) => Some((m as u64).saturating_mul(u64::from(untimed_delay_ms))),
    };

    let mut picks = Vec::with_capacity(frames as usize);
    let mut src = 0usize;
    // End of `src`'s interval scaled by N; u128 keeps `k * T` exact for any u32 delays.
    let n_wide = u128::from(n);
    let mut end_scaled = u128::from(spans[0]) * n_wide;

    for k in 0..n {
        let t_scaled = u128::from(k) * u128::from(total);
        while t_scaled >= end_scaled && src + 1 < spans.len() {
            src += 1;
            end_scaled += u128::from(spans[src]) * n_wide;
        }

        let delay_ms = match playback {
            Some(t) => {
                let d = mul_div_floor(k + 1, t, n) - mul_div_floor(k, t, n);
                u32::try_from(d).unwrap_or(u32::MAX)
            }
            None => untimed_delay_ms,
        };
        picks.push(FramePick {
            source: src,
            delay_ms,
        });
    }

    tracing::debug!(
        output_frames = picks.len(),
        total_units = total,
        playback_ms = ?playback,
        timed = seq.is_timed(),
        "temporal plan"
    );
    Ok(TemporalPlan { picks })
}

#[cfg(test)]
#[path = "../../tests/unit/resample/temporal.rs"]
mod tests;
