use crisisbrief_common::{AppConfig, CrisisBriefError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audio::{temp_path, TempFile};
use crate::types::Transcription;

pub const EMPTY_TRANSCRIPT: &str = "No text was transcribed from the audio file";

const WHISPER_DISABLED_REMEDIATION: &str =
    "Rebuild with `cargo build --features whisper` (needs a C/C++ toolchain and libclang) \
     and download a ggml Whisper model";

/// Speech-to-text backend
///
/// Calls block; async callers should use `spawn_blocking`.
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file; `language` of `None` means auto-detect
    fn transcribe(&self, path: &Path, language: Option<&str>) -> Result<Transcription>;

    fn name(&self) -> &str;
}

/// Transcribe a file, rejecting an empty transcript
pub fn transcribe_file(
    transcriber: &dyn Transcriber,
    path: &Path,
    language: Option<&str>,
) -> Result<Transcription> {
    let transcription = transcriber.transcribe(path, language)?;

    if transcription.is_empty() {
        return Err(CrisisBriefError::invalid_input(EMPTY_TRANSCRIPT));
    }
    Ok(transcription)
}

/// File extension for a temp file; anything odd falls back to `wav`
fn sanitize_suffix(suffix: &str) -> String {
    let ext = suffix.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return "wav".to_string();
    }
    ext
}

/// Transcribe in-memory audio through a uniquely named temp file
///
/// The temp file is removed whether or not transcription succeeds.
pub fn transcribe_bytes(
    transcriber: &dyn Transcriber,
    bytes: &[u8],
    suffix: &str,
    language: Option<&str>,
) -> Result<Transcription> {
    if bytes.is_empty() {
        return Err(CrisisBriefError::invalid_input("Audio payload is empty"));
    }

    let file = TempFile(temp_path(&sanitize_suffix(suffix)));
    std::fs::write(&file.0, bytes)?;

    transcribe_file(transcriber, &file.0, language)
}

/// Stands in when no recognizer can be loaded
///
/// Every call fails with the same missing-dependency error so callers can
/// show install guidance.
#[derive(Debug, Clone)]
pub struct UnavailableTranscriber {
    dependency: String,
    remediation: String,
}

impl UnavailableTranscriber {
    pub fn new(dependency: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            remediation: remediation.into(),
        }
    }

    /// Built without the `whisper` feature
    pub fn whisper_disabled() -> Self {
        Self::new("whisper", WHISPER_DISABLED_REMEDIATION)
    }
}

impl Transcriber for UnavailableTranscriber {
    fn transcribe(&self, _path: &Path, _language: Option<&str>) -> Result<Transcription> {
        Err(CrisisBriefError::dependency_missing(
            self.dependency.clone(),
            self.remediation.clone(),
        ))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Build the configured recognizer
///
/// Never fails: a missing model or disabled backend yields an
/// [`UnavailableTranscriber`] so text-only features keep working.
pub fn create_transcriber(config: &AppConfig) -> Arc<dyn Transcriber> {
    #[cfg(feature = "whisper")]
    {
        use crate::types::TranscriptionOptions;
        use crate::whisper::WhisperEngine;

        let options = TranscriptionOptions::default().with_language(config.whisper_language.clone());
        match WhisperEngine::new(config.whisper_model_path()) {
            Ok(engine) => {
                info!("Speech transcription ready ({})", config.whisper_model);
                Arc::new(engine.with_options(options))
            }
            Err(CrisisBriefError::DependencyMissing {
                dependency,
                remediation,
            }) => {
                warn!("Speech transcription unavailable: {}", remediation);
                Arc::new(UnavailableTranscriber::new(dependency, remediation))
            }
            Err(e) => {
                warn!("Speech transcription unavailable: {}", e);
                Arc::new(UnavailableTranscriber::new("whisper model", e.to_string()))
            }
        }
    }

    #[cfg(not(feature = "whisper"))]
    {
        info!(
            "Speech transcription disabled (model '{}' not loaded)",
            config.whisper_model
        );
        warn!("Built without the `whisper` feature; audio input is unavailable");
        Arc::new(UnavailableTranscriber::whisper_disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Returns a fixed transcript and remembers the files it saw
    struct FixedTranscriber {
        text: String,
        seen: Mutex<Vec<(PathBuf, bool, Option<String>)>>,
    }

    impl FixedTranscriber {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transcriber for FixedTranscriber {
        fn transcribe(&self, path: &Path, language: Option<&str>) -> Result<Transcription> {
            self.seen.lock().unwrap().push((
                path.to_path_buf(),
                path.exists(),
                language.map(str::to_string),
            ));
            Ok(Transcription::from_text(self.text.clone()))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_transcribe_bytes_cleans_up() {
        let transcriber = FixedTranscriber::new("River has burst its banks");
        let result = transcribe_bytes(&transcriber, b"RIFF....", ".mp3", Some("en")).unwrap();
        assert_eq!(result.text, "River has burst its banks");

        let seen = transcriber.seen.lock().unwrap();
        let (path, existed, language) = &seen[0];
        assert!(*existed);
        assert!(!path.exists());
        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(language.as_deref(), Some("en"));
    }

    #[test]
    fn test_temp_files_are_unique() {
        let transcriber = FixedTranscriber::new("ok");
        transcribe_bytes(&transcriber, b"a", "wav", None).unwrap();
        transcribe_bytes(&transcriber, b"b", "wav", None).unwrap();

        let seen = transcriber.seen.lock().unwrap();
        assert_ne!(seen[0].0, seen[1].0);
    }

    #[test]
    fn test_empty_transcript_is_invalid_input() {
        let transcriber = FixedTranscriber::new("   ");
        let err = transcribe_bytes(&transcriber, b"a", "wav", None).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert!(err.to_string().contains(EMPTY_TRANSCRIPT));
        assert!(!transcriber.seen.lock().unwrap()[0].0.exists());
    }

    #[test]
    fn test_empty_payload_rejected() {
        let transcriber = FixedTranscriber::new("ok");
        assert!(transcribe_bytes(&transcriber, b"", "wav", None).is_err());
        assert!(transcriber.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_reports_dependency() {
        let err = transcribe_bytes(&UnavailableTranscriber::whisper_disabled(), b"a", "wav", None)
            .unwrap_err();
        assert!(err.is_dependency_missing());
        assert!(err.remediation().unwrap().contains("--features whisper"));
    }

    #[test]
    fn test_sanitize_suffix() {
        assert_eq!(sanitize_suffix(".M4A"), "m4a");
        assert_eq!(sanitize_suffix("../../etc"), "wav");
        assert_eq!(sanitize_suffix(""), "wav");
    }
}
