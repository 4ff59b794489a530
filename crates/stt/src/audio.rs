//! Audio decoding and conversion
//!
//! Containers symphonia understands are decoded in-process; everything else
//! goes through the `ffmpeg` CLI first. Output is always mono 16 kHz f32.

use crisisbrief_common::{CrisisBriefError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

/// Sample rate Whisper expects
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Extensions decoded without ffmpeg
pub const NATIVE_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "ogg", "oga", "m4a", "mp4", "aac"];

/// Extensions accepted for upload
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm", "aac",
];

pub const FFMPEG_REMEDIATION: &str = "FFmpeg is not installed or not in PATH. Install it with \
    'sudo apt-get install ffmpeg' (Linux), 'brew install ffmpeg' (macOS) or \
    'choco install ffmpeg' (Windows), or set FFMPEG_PATH";

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub fn is_supported_audio(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Interleaved PCM samples
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,

    pub sample_rate: u32,

    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f32 / self.sample_rate as f32
    }

    /// Down-mix by averaging channels
    pub fn to_mono(mut self) -> Self {
        if self.channels <= 1 {
            return self;
        }

        debug!("Down-mixing {} channels to mono", self.channels);
        let channels = self.channels as usize;
        self.samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        self.channels = 1;
        self
    }

    /// Linear-interpolation resampler
    pub fn resample(mut self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            self.sample_rate = target_rate;
            return self;
        }

        debug!("Resampling from {}Hz to {}Hz", self.sample_rate, target_rate);
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let new_length = (self.samples.len() as f64 / ratio) as usize;
        let last = self.samples.len() - 1;

        self.samples = (0..new_length)
            .map(|i| {
                let position = i as f64 * ratio;
                let floor = (position.floor() as usize).min(last);
                let ceil = (floor + 1).min(last);
                let fraction = (position - floor as f64) as f32;
                self.samples[floor] * (1.0 - fraction) + self.samples[ceil] * fraction
            })
            .collect();
        self.sample_rate = target_rate;
        self
    }

    /// Mono 16 kHz copy for the recognizer
    pub fn into_whisper_input(self) -> Vec<f32> {
        self.to_mono().resample(TARGET_SAMPLE_RATE).samples
    }
}

/// Decode a file with symphonia
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_of(path) {
        hint.with_extension(&ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| CrisisBriefError::transcription(format!("Unsupported audio container: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| CrisisBriefError::transcription("No audio track found"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| CrisisBriefError::transcription("Audio track has no sample rate"))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CrisisBriefError::transcription(format!("Unsupported audio codec: {}", e)))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(CrisisBriefError::transcription(format!(
                    "Failed to read audio packet: {}",
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => warn!("Skipping undecodable packet: {}", e),
            Err(e) => {
                return Err(CrisisBriefError::transcription(format!(
                    "Audio decoding failed: {}",
                    e
                )))
            }
        }
    }

    debug!(
        "Decoded {} samples ({}Hz, {} channels)",
        samples.len(),
        sample_rate,
        channels
    );
    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

fn ffmpeg_command() -> String {
    std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
}

/// Convert any ffmpeg-readable file to 16 kHz mono PCM WAV
pub fn convert_to_wav_ffmpeg(input_path: &Path, output_path: &Path) -> Result<()> {
    convert_with(&ffmpeg_command(), input_path, output_path)
}

fn convert_with(ffmpeg: &str, input_path: &Path, output_path: &Path) -> Result<()> {
    info!("Converting {} to WAV using {}", input_path.display(), ffmpeg);

    let output = Command::new(ffmpeg)
        .arg("-i")
        .arg(input_path)
        .args(["-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le", "-y"])
        .arg(output_path)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CrisisBriefError::dependency_missing("ffmpeg", FFMPEG_REMEDIATION)
            }
            _ => CrisisBriefError::transcription(format!("Failed to run FFmpeg: {}", e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CrisisBriefError::transcription(format!(
            "FFmpeg conversion failed: {}",
            stderr.trim()
        )));
    }

    Ok(())
}

/// Removes the file when dropped
pub(crate) struct TempFile(pub(crate) PathBuf);

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(e) = std::fs::remove_file(&self.0) {
                warn!("Failed to remove temporary file {}: {}", self.0.display(), e);
            }
        }
    }
}

pub(crate) fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("crisisbrief-{}.{}", uuid::Uuid::new_v4(), extension))
}

/// Load an audio file as mono 16 kHz samples
pub fn load_audio(path: &Path) -> Result<Vec<f32>> {
    load_audio_with(&ffmpeg_command(), path)
}

fn load_audio_with(ffmpeg: &str, path: &Path) -> Result<Vec<f32>> {
    if !path.exists() {
        return Err(CrisisBriefError::not_found(format!(
            "Audio file not found: {}",
            path.display()
        )));
    }

    let native = extension_of(path)
        .map(|ext| NATIVE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    if native {
        match decode_file(path) {
            Ok(buffer) => return Ok(buffer.into_whisper_input()),
            Err(e) => warn!("Native decoding failed, falling back to FFmpeg: {}", e),
        }
    }

    let wav = TempFile(temp_path("wav"));
    convert_with(ffmpeg, path, &wav.0)?;
    let buffer = decode_file(&wav.0)?;

    info!("Loaded {:.1}s of audio", buffer.duration());
    Ok(buffer.into_whisper_input())
}
