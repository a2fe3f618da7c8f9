//! Subtitle-timed speech synthesis.
//!
//! This crate provides:
//! - SRT and plain-text cue parsing
//! - A speech synthesis seam with an Amazon Polly implementation
//! - The playhead alignment of synthesized speech against cue timing
//! - Rendering of the aligned timeline into `<stem>_synced.mp3`

pub mod align;
pub mod error;
pub mod metrics;
pub mod subtitle;
pub mod synth;

pub use align::{
    align_cues, synced_output_path, AlignmentOutcome, CueAlignment, SpeechAligner,
    SynthesisFailurePolicy,
};
pub use error::{SpeechError, SpeechResult};
pub use subtitle::{load_cues, parse_srt, parse_txt, CueFormat};
pub use synth::{PollyConfig, PollySynthesizer, SpeechSynthesizer, SynthesizedSpeech};
