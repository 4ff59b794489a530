use crisisbrief_common::{CrisisBriefError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Span};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio;
use crate::postprocess;
use crate::transcriber::Transcriber;
use crate::types::{Segment, Transcription, TranscriptionOptions};

/// Backend whisper.cpp was compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuDevice {
    Cuda,
    Metal,
    Cpu,
}

impl GpuDevice {
    /// CUDA > Metal > CPU, decided by enabled features
    pub fn detect() -> Self {
        if cfg!(feature = "cuda") {
            GpuDevice::Cuda
        } else if cfg!(feature = "metal") {
            GpuDevice::Metal
        } else {
            GpuDevice::Cpu
        }
    }
}

/// Maximum gap (seconds) between duplicate segments that get merged
const MERGE_GAP_SECS: f32 = 0.2;

pub fn model_remediation(path: &Path) -> String {
    format!(
        "Download a ggml Whisper model (e.g. ggml-base.bin from \
         https://huggingface.co/ggerganov/whisper.cpp) to {}, or set CRISISBRIEF_WHISPER_MODEL",
        path.display()
    )
}

/// whisper.cpp speech recognizer
pub struct WhisperEngine {
    ctx: WhisperContext,
    model_path: PathBuf,
    gpu_device: GpuDevice,
    options: TranscriptionOptions,
    span: Span,
}

impl WhisperEngine {
    /// Load a ggml model
    ///
    /// A missing model file is reported as a missing dependency.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CrisisBriefError::dependency_missing(
                "whisper model",
                model_remediation(path),
            ));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| CrisisBriefError::config(format!("Model path is not UTF-8: {}", path.display())))?;

        let gpu_device = GpuDevice::detect();
        info!("Loading Whisper model from {} ({:?})", path.display(), gpu_device);

        let ctx = match WhisperContext::new_with_params(path_str, WhisperContextParameters::default()) {
            Ok(ctx) => ctx,
            Err(e) if gpu_device != GpuDevice::Cpu => {
                warn!("Failed to load model with {:?}: {}; retrying", gpu_device, e);
                WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
                    .map_err(|e| CrisisBriefError::transcription(format!("Failed to load Whisper model: {}", e)))?
            }
            Err(e) => {
                return Err(CrisisBriefError::transcription(format!(
                    "Failed to load Whisper model: {}",
                    e
                )))
            }
        };

        info!("Whisper model loaded");

        Ok(Self {
            ctx,
            model_path: path.to_path_buf(),
            gpu_device,
            options: TranscriptionOptions::default(),
            span: info_span!("transcriber", model = %path.display()),
        })
    }

    pub fn with_options(mut self, options: TranscriptionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn gpu_device(&self) -> GpuDevice {
        self.gpu_device
    }

    fn run(&self, samples: &[f32], options: &TranscriptionOptions) -> Result<Vec<Segment>> {
        let failed = |what: &str, e: whisper_rs::WhisperError| {
            CrisisBriefError::transcription(format!("{}: {}", what, e))
        };

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(options.language.as_deref().unwrap_or("auto")));
        params.set_temperature(options.temperature);
        params.set_no_speech_thold(options.no_speech_threshold);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| failed("Failed to create Whisper state", e))?;

        debug!("Starting Whisper inference on {} samples", samples.len());
        state
            .full(params, samples)
            .map_err(|e| failed("Transcription failed", e))?;

        let count = state
            .full_n_segments()
            .map_err(|e| failed("Failed to get segment count", e))?;

        let mut segments = Vec::new();
        for i in 0..count {
            let raw = state
                .full_get_segment_text(i)
                .map_err(|e| failed("Failed to get segment text", e))?;
            let start = state
                .full_get_segment_t0(i)
                .map_err(|e| failed("Failed to get segment start", e))?;
            let end = state
                .full_get_segment_t1(i)
                .map_err(|e| failed("Failed to get segment end", e))?;

            let text = postprocess::process_segment_text(&raw, options);
            if !text.is_empty() {
                // centiseconds
                segments.push(Segment::new(start as f32 / 100.0, end as f32 / 100.0, text));
            }
        }

        Ok(postprocess::merge_segments(segments, MERGE_GAP_SECS))
    }
}

impl Transcriber for WhisperEngine {
    fn transcribe(&self, path: &Path, language: Option<&str>) -> Result<Transcription> {
        let _entered = self.span.enter();

        let options = match language {
            Some(lang) => self.options.clone().with_language(Some(lang.to_string())),
            None => self.options.clone(),
        };

        info!("Transcribing audio file: {}", path.display());
        let samples = audio::load_audio(path)?;
        let segments = self.run(&samples, &options)?;
        let text = postprocess::join_segments(&segments);

        info!(
            "Transcription completed: {} segments, {} characters",
            segments.len(),
            text.len()
        );
        Ok(Transcription::new(text, segments, options.language))
    }

    fn name(&self) -> &str {
        "whisper.cpp"
    }
}
