use serde::{Deserialize, Serialize};

/// Single transcription segment with timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f32,

    /// End time in seconds
    pub end: f32,

    pub text: String,
}

impl Segment {
    pub fn new(start: f32, end: f32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f32 {
        self.end - self.start
    }

    /// Format timestamp as HH:MM:SS
    pub fn format_timestamp(seconds: f32) -> String {
        let seconds = seconds as u32;
        format!(
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }

    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            Self::format_timestamp(self.start),
            Self::format_timestamp(self.end)
        )
    }
}

/// Transcript of one audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Full transcript text
    pub text: String,

    pub segments: Vec<Segment>,

    /// Language hint the transcript was produced with; `None` means auto-detect
    pub language: Option<String>,
}

impl Transcription {
    pub fn new(text: String, segments: Vec<Segment>, language: Option<String>) -> Self {
        Self {
            text,
            segments,
            language,
        }
    }

    /// Transcript without segment timing
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: Vec::new(),
            language: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// End time of the last segment
    pub fn duration(&self) -> f32 {
        self.segments.last().map(|seg| seg.end).unwrap_or(0.0)
    }

    /// Transcript with `[HH:MM:SS - HH:MM:SS]` segment stamps
    pub fn to_timestamped_text(&self) -> String {
        if self.segments.is_empty() {
            return self.text.clone();
        }

        self.segments
            .iter()
            .map(|segment| format!("[{}] {}", segment.time_range(), segment.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decoding and post-processing options
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    /// Language hint (e.g. "en"); `None` lets the model detect it
    pub language: Option<String>,

    /// Temperature for sampling (0.0 = greedy)
    pub temperature: f32,

    /// Drop standalone filler words
    pub filter_fillers: bool,

    /// Minimum segment length (characters)
    pub min_segment_length: usize,

    pub normalize_punctuation: bool,

    pub no_speech_threshold: f32,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language: None,
            temperature: 0.0,
            filter_fillers: false,
            min_segment_length: 2,
            normalize_punctuation: true,
            no_speech_threshold: 0.6,
        }
    }
}

impl TranscriptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn filter_fillers(mut self, enable: bool) -> Self {
        self.filter_fillers = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_time_range() {
        let seg = Segment::new(0.0, 5.5, "Water is rising");
        assert_eq!(seg.duration(), 5.5);
        assert_eq!(seg.time_range(), "00:00:00 - 00:00:05");
        assert_eq!(Segment::format_timestamp(3661.0), "01:01:01");
    }

    #[test]
    fn test_timestamped_text() {
        let transcription = Transcription::new(
            "Caller reports flooding. Road is closed.".to_string(),
            vec![
                Segment::new(0.0, 2.0, "Caller reports flooding."),
                Segment::new(2.0, 65.0, "Road is closed."),
            ],
            Some("en".to_string()),
        );

        assert_eq!(
            transcription.to_timestamped_text(),
            "[00:00:00 - 00:00:02] Caller reports flooding.\n[00:00:02 - 00:01:05] Road is closed."
        );
        assert_eq!(transcription.duration(), 65.0);
    }

    #[test]
    fn test_default_language_is_auto() {
        assert_eq!(TranscriptionOptions::default().language, None);
        assert!(Transcription::from_text("  ").is_empty());
    }
}
