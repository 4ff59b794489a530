//! CrisisBrief speech-to-text
//!
//! Whisper.cpp based transcription behind the [`Transcriber`] trait

pub mod audio;
pub mod postprocess;
pub mod transcriber;
pub mod types;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use transcriber::{
    create_transcriber, transcribe_bytes, transcribe_file, Transcriber, UnavailableTranscriber,
    EMPTY_TRANSCRIPT,
};
pub use types::{Segment, Transcription, TranscriptionOptions};
#[cfg(feature = "whisper")]
pub use whisper::{GpuDevice, WhisperEngine};
