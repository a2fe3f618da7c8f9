//! Speech metrics.

use metrics::counter;

pub mod names {
    /// Cues processed, by synthesis outcome.
    pub const CUES_TOTAL: &str = "kada_speech_cues_total";
}

/// Record one processed cue.
pub fn record_cue(synthesized: bool) {
    let outcome = if synthesized { "synthesized" } else { "skipped" };
    counter!(names::CUES_TOTAL, "outcome" => outcome).increment(1);
}
