//! Word sanitation and greedy caption grouping.

use sreel_models::{CaptionStylePreset, Word};

/// Gap under which a group's display end snaps to the next group's start,
/// preventing visible caption flicker between adjacent groups.
pub const SNAP_THRESHOLD_MS: u64 = 200;

/// Trailing hold added after the last spoken word of a group when the
/// following gap is too large to snap.
pub const TRAIL_HOLD_MS: u64 = 150;

/// A contiguous run of words displayed together as one caption event.
///
/// `start_ms` is the first word's spoken start; `end_ms` is the display end
/// after snap/hold adjustment. Groups are built greedily and never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionGroup {
    pub words: Vec<Word>,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl CaptionGroup {
    /// Spoken end of the last word in the group.
    pub fn spoken_end_ms(&self) -> u64 {
        self.words.last().map(|w| w.end_ms).unwrap_or(self.start_ms)
    }
}

/// Normalize stray punctuation and whitespace in a transcribed word.
///
/// Transcription services occasionally emit leading commas, doubled periods
/// or zero-width characters attached to words.
pub fn sanitize_word(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() && *c != '\u{200B}' && *c != '\u{FEFF}')
        .collect();

    cleaned
        .trim()
        .trim_start_matches([',', ';', ':', '…'])
        .replace("..", ".")
        .trim()
        .to_string()
}

/// Group words greedily into caption groups per the style's behavioral
/// parameters.
///
/// A word joins the current group if the group is under its max-word cap AND
/// the silence since the previous word's end is within the style's gap
/// threshold; otherwise the group is flushed and a new one starts. Empty
/// words (after sanitation) are dropped.
pub fn group_words(words: &[Word], style: &CaptionStylePreset) -> Vec<CaptionGroup> {
    let mut groups: Vec<CaptionGroup> = Vec::new();
    let mut current: Vec<Word> = Vec::new();

    for raw in words {
        let text = sanitize_word(&raw.text);
        if text.is_empty() {
            continue;
        }
        let word = Word::new(text, raw.start_ms, raw.end_ms);

        let should_flush = match current.last() {
            None => false,
            Some(prev) => {
                current.len() >= style.max_words
                    || word.start_ms.saturating_sub(prev.end_ms) > style.max_gap_ms as u64
            }
        };

        if should_flush {
            flush(&mut groups, &mut current);
        }
        current.push(word);
    }
    flush(&mut groups, &mut current);

    apply_display_timing(&mut groups);
    groups
}

fn flush(groups: &mut Vec<CaptionGroup>, current: &mut Vec<Word>) {
    if current.is_empty() {
        return;
    }
    let words = std::mem::take(current);
    let start_ms = words.first().map(|w| w.start_ms).unwrap_or(0);
    let end_ms = words.last().map(|w| w.end_ms).unwrap_or(start_ms);
    groups.push(CaptionGroup {
        words,
        start_ms,
        end_ms,
    });
}

/// Compute display end times: snap to the next group's start when the
/// natural gap is small, otherwise add a short trailing hold capped at the
/// next group's start. The final group always gets a defined end.
fn apply_display_timing(groups: &mut [CaptionGroup]) {
    for i in 0..groups.len() {
        let spoken_end = groups[i].spoken_end_ms();
        let next_start = groups.get(i + 1).map(|g| g.start_ms);

        groups[i].end_ms = match next_start {
            Some(next) => {
                let gap = next.saturating_sub(spoken_end);
                if gap <= SNAP_THRESHOLD_MS {
                    next
                } else {
                    (spoken_end + TRAIL_HOLD_MS).min(next)
                }
            }
            None => spoken_end + TRAIL_HOLD_MS,
        };
    }
}
