use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::types::{Segment, TranscriptionOptions};

/// Segments Whisper tends to invent on silence or music
const DISCARD_PHRASES: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "please subscribe",
    "subtitles by the amara.org community",
    "[blank_audio]",
    "[music]",
    "(music)",
    "[silence]",
];

const FILLER_WORDS: &[&str] = &["um", "umm", "uh", "uhh", "er", "erm", "ah", "hmm", "mm", "uh-huh"];

/// Consecutive repeats of one word kept before the rest are dropped
const MAX_CONSECUTIVE_REPEATS: usize = 2;

/// Total occurrences of one word kept in a segment
const MAX_WORD_OCCURRENCES: usize = 5;

fn canonical(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
        .to_lowercase()
}

/// Clean one segment; an empty result means the segment is dropped
pub fn process_segment_text(text: &str, options: &TranscriptionOptions) -> String {
    let text = text.trim();

    if !should_keep_segment(text, options.filter_fillers, options.min_segment_length) {
        return String::new();
    }

    normalize_text(text, options.normalize_punctuation)
}

fn should_keep_segment(text: &str, filter_fillers: bool, min_length: usize) -> bool {
    if text.is_empty() || text.chars().count() < min_length {
        return false;
    }

    let canonical_text = canonical(text);
    if DISCARD_PHRASES.contains(&canonical_text.as_str()) {
        debug!("Discarding hallucinated phrase: {}", text);
        return false;
    }

    if !filter_fillers {
        return true;
    }

    let stripped = canonical_text.trim_end_matches(',');
    if FILLER_WORDS.contains(&stripped) {
        debug!("Filtering filler word: {}", text);
        return false;
    }

    // 10+ words built from at most two distinct ones
    let words: Vec<String> = text.split_whitespace().map(canonical).collect();
    if words.len() >= 10 {
        let unique: HashSet<&String> = words.iter().collect();
        if unique.len() <= 2 {
            debug!("Discarding repetitive segment ({} words)", words.len());
            return false;
        }
    }

    true
}

fn normalize_text(text: &str, normalize_punct: bool) -> String {
    let text = remove_word_repetitions(text);
    if !normalize_punct {
        return text;
    }

    let mut result = text;
    while result.contains("....") {
        result = result.replace("....", "...");
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse runaway repetition of single words
fn remove_word_repetitions(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut run = 0;
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    for word in text.split_whitespace() {
        let key = canonical(word);

        run = match kept.last() {
            Some(prev) if canonical(prev) == key => run + 1,
            _ => 1,
        };
        if run > MAX_CONSECUTIVE_REPEATS {
            continue;
        }

        let seen = occurrences.entry(key).or_insert(0);
        if *seen >= MAX_WORD_OCCURRENCES {
            continue;
        }
        *seen += 1;

        kept.push(word);
    }

    kept.join(" ")
}

/// Merge consecutive segments with the same text and close timestamps
pub fn merge_segments(segments: Vec<Segment>, max_gap: f32) -> Vec<Segment> {
    let total = segments.len();
    let mut merged: Vec<Segment> = Vec::with_capacity(total);

    for segment in segments {
        match merged.last_mut() {
            Some(current)
                if segment.text.trim() == current.text.trim()
                    && segment.start <= current.end + max_gap =>
            {
                current.end = current.end.max(segment.end);
            }
            _ => merged.push(segment),
        }
    }

    debug!("Merged {} segments into {}", total, merged.len());
    merged
}

/// Join segment texts into the transcript body
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
