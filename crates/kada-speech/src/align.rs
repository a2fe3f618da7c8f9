//! Playhead alignment of synthesized speech against cue timing.
//!
//! Every cue is placed in a single forward pass. The playhead is the end of
//! the committed output so far: silence fills the gap up to a cue's start,
//! and speech longer than the cue window is cut at the window end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use kada_media::{render_timeline, FfmpegRunner};
use kada_models::{AudioTimeline, SubtitleCue};

use crate::error::{SpeechError, SpeechResult};
use crate::metrics::record_cue;
use crate::subtitle::load_cues;
use crate::synth::SpeechSynthesizer;

/// Playhead handling for a cue whose synthesis failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthesisFailurePolicy {
    /// Commit the silence inserted before the cue, moving the playhead to
    /// the cue start. The output duration always equals the playhead.
    #[default]
    CommitSilence,
    /// Leave the playhead where it was. The next cue's silence is measured
    /// from the old playhead, so the output can run past it.
    HoldPlayhead,
}

/// What alignment did with one cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueAlignment {
    pub cue_index: usize,
    /// Silence inserted before the cue
    pub silence_ms: u64,
    /// Speech kept for the cue; `None` when nothing was synthesized
    pub speech_ms: Option<u64>,
    /// Playhead after the cue
    pub playhead_ms: u64,
}

/// Result of aligning a cue list.
#[derive(Debug, Clone, Default)]
pub struct AlignmentOutcome {
    pub timeline: AudioTimeline,
    /// Final playhead
    pub last_end_ms: u64,
    pub cues: Vec<CueAlignment>,
}

impl AlignmentOutcome {
    /// Indexes of cues that produced no speech.
    pub fn skipped(&self) -> Vec<usize> {
        self.cues
            .iter()
            .filter(|c| c.speech_ms.is_none())
            .map(|c| c.cue_index)
            .collect()
    }
}

/// Align `cues` in order, synthesizing each into `scratch`.
///
/// A cue whose window starts before the playhead is placed at the playhead
/// and cut at its window end, so the playhead never moves backwards. Blank
/// cues are skipped without calling the synthesizer.
pub async fn align_cues(
    cues: &[SubtitleCue],
    synthesizer: &dyn SpeechSynthesizer,
    voice: &str,
    scratch: &Path,
    policy: SynthesisFailurePolicy,
    progress: &ProgressBar,
) -> AlignmentOutcome {
    let mut outcome = AlignmentOutcome::default();
    let mut last_end = 0u64;

    for (position, cue) in cues.iter().enumerate() {
        let silence_ms = cue.start_ms.saturating_sub(last_end);
        outcome.timeline.push_silence(silence_ms);

        let speech = if cue.text.trim().is_empty() {
            debug!("Cue {} is blank", cue.index);
            None
        } else {
            let output = scratch.join(format!("cue-{:05}.mp3", position));
            match synthesizer.synthesize(&cue.text, voice, &output).await {
                Ok(speech) => Some(speech),
                Err(e) => {
                    warn!("Speech synthesis failed for cue {}: {}", cue.index, e);
                    None
                }
            }
        };

        let speech_ms = match speech {
            Some(speech) => {
                let start = cue.start_ms.max(last_end);
                let kept = speech.duration_ms.min(cue.end_ms.saturating_sub(start));
                if kept > 0 {
                    outcome.timeline.push_speech(cue.index, speech.path, kept);
                }
                last_end = start + kept;
                Some(kept)
            }
            None => {
                if policy == SynthesisFailurePolicy::CommitSilence {
                    last_end = last_end.max(cue.start_ms);
                }
                None
            }
        };

        record_cue(speech_ms.is_some());
        outcome.cues.push(CueAlignment {
            cue_index: cue.index,
            silence_ms,
            speech_ms,
            playhead_ms: last_end,
        });
        progress.inc(1);
    }

    outcome.last_end_ms = last_end;
    outcome
}

/// `<dir>/<stem>_synced.mp3` next to the cue file.
pub fn synced_output_path(cue_path: &Path) -> PathBuf {
    let stem = cue_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    cue_path.with_file_name(format!("{}_synced.mp3", stem))
}

/// Turns a subtitle file into one synchronized speech track.
#[derive(Clone)]
pub struct SpeechAligner {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    runner: FfmpegRunner,
    policy: SynthesisFailurePolicy,
    progress: ProgressBar,
}

impl SpeechAligner {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, runner: FfmpegRunner) -> Self {
        Self {
            synthesizer,
            runner,
            policy: SynthesisFailurePolicy::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_policy(mut self, policy: SynthesisFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report per-cue progress on `progress`. Its length is set to the cue count.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Align the cues of `cue_path` and write `<stem>_synced.mp3` beside it.
    pub async fn align(&self, cue_path: &Path, voice: &str) -> SpeechResult<PathBuf> {
        let cues = load_cues(cue_path).await?;
        if cues.is_empty() {
            return Err(SpeechError::parse(format!("no cues found in {}", cue_path.display())));
        }

        let scratch = tempfile::Builder::new().prefix("kada-tts-").tempdir()?;
        self.progress.set_length(cues.len() as u64);

        let outcome = align_cues(
            &cues,
            self.synthesizer.as_ref(),
            voice,
            scratch.path(),
            self.policy,
            &self.progress,
        )
        .await;
        self.progress.finish_and_clear();

        let skipped = outcome.skipped();
        if !skipped.is_empty() {
            warn!("{} of {} cues produced no speech: {:?}", skipped.len(), cues.len(), skipped);
        }

        let output = synced_output_path(cue_path);
        render_timeline(&self.runner, &outcome.timeline, &output).await?;

        info!(
            "Aligned {} cues into {} ms ({} ms silence)",
            cues.len(),
            outcome.last_end_ms,
            outcome.timeline.silence_ms()
        );
        Ok(output)
    }
}
