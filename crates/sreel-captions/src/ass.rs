//! ASS subtitle script generation.
//!
//! Emits a structural subtitle document: a script header with the caption
//! canvas resolution, one named visual style, and an ordered list of
//! time-coded Dialogue events carrying either plain fade markup or per-word
//! progressive-highlight (karaoke) markup.

use std::fmt::Write as _;

use sreel_models::{AspectRatio, CaptionAnimation, CaptionStylePreset};

use crate::group::CaptionGroup;

/// Name of the single style every event references.
const STYLE_NAME: &str = "Narration";

/// Fade in/out duration for the group-fade animation, in milliseconds.
const FADE_MS: u32 = 150;

/// Duration of the scale pulse per word for bounce highlight, in ms.
const BOUNCE_MS: u64 = 120;

/// Format milliseconds as an ASS timestamp, exact to hundredths: `H:MM:SS.CC`.
pub fn format_ass_time(ms: u64) -> String {
    let cs = ms / 10;
    let hours = cs / 360000;
    let minutes = (cs / 6000) % 60;
    let seconds = (cs / 100) % 60;
    let centis = cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Render a complete ASS script for the given groups.
pub fn render_script(
    groups: &[CaptionGroup],
    style: &CaptionStylePreset,
    aspect: AspectRatio,
) -> String {
    let (play_x, play_y) = aspect.frame_size();
    let margin_v = aspect.caption_margin_v();

    let mut script = String::new();

    // Script header
    writeln!(script, "[Script Info]").unwrap();
    writeln!(script, "ScriptType: v4.00+").unwrap();
    writeln!(script, "PlayResX: {}", play_x).unwrap();
    writeln!(script, "PlayResY: {}", play_y).unwrap();
    writeln!(script, "WrapStyle: 0").unwrap();
    writeln!(script, "ScaledBorderAndShadow: yes").unwrap();
    writeln!(script).unwrap();

    // Style block
    writeln!(script, "[V4+ Styles]").unwrap();
    writeln!(
        script,
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
         OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, \
         ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
         Alignment, MarginL, MarginR, MarginV, Encoding"
    )
    .unwrap();
    writeln!(
        script,
        "Style: {name},{font},{size},{primary},{secondary},{outline},{back},\
         {bold},0,0,0,100,100,0,0,1,{outline_w},{shadow},{align},60,60,{margin_v},1",
        name = STYLE_NAME,
        font = style.font_name,
        size = style.font_size,
        primary = style.primary_color,
        secondary = style.secondary_color,
        outline = style.outline_color,
        back = style.back_color,
        bold = if style.bold { -1 } else { 0 },
        outline_w = style.outline_width,
        shadow = style.shadow,
        align = style.alignment,
        margin_v = margin_v,
    )
    .unwrap();
    writeln!(script).unwrap();

    // Events
    writeln!(script, "[Events]").unwrap();
    writeln!(
        script,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    )
    .unwrap();
    for group in groups {
        writeln!(
            script,
            "Dialogue: 0,{start},{end},{style},,0,0,0,,{text}",
            start = format_ass_time(group.start_ms),
            end = format_ass_time(group.end_ms),
            style = STYLE_NAME,
            text = render_group_text(group, style.animation),
        )
        .unwrap();
    }

    script
}

/// Render one group's event text per the style's animation type.
fn render_group_text(group: &CaptionGroup, animation: CaptionAnimation) -> String {
    match animation {
        CaptionAnimation::GroupFade => {
            let text = group
                .words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            format!("{{\\fad({FADE_MS},{FADE_MS})}}{}", text)
        }
        CaptionAnimation::BlockHighlight => render_karaoke(group, false),
        CaptionAnimation::BounceHighlight => render_karaoke(group, true),
    }
}

/// Render per-word karaoke markup.
///
/// Each word carries its own spoken duration; inter-word silence is encoded
/// as a separate filler tick so the highlight visually pauses during gaps.
/// Durations are centiseconds, relative to the event start.
fn render_karaoke(group: &CaptionGroup, bounce: bool) -> String {
    let mut text = String::new();
    let mut cursor_ms = group.start_ms;
    let mut elapsed_ms: u64 = 0;

    for (i, word) in group.words.iter().enumerate() {
        // Filler tick for silence before this word.
        let gap_ms = word.start_ms.saturating_sub(cursor_ms);
        if gap_ms > 0 {
            write!(text, "{{\\k{}}}", ms_to_cs(gap_ms)).unwrap();
            elapsed_ms += gap_ms;
        }

        let dur_ms = word.duration_ms().max(10);
        if bounce {
            // Scale pulse synced to the word's own start within the line.
            write!(
                text,
                "{{\\k{dur}\\t({t0},{t1},\\fscx112\\fscy112)\\t({t1},{t2},\\fscx100\\fscy100)}}",
                dur = ms_to_cs(dur_ms),
                t0 = elapsed_ms,
                t1 = elapsed_ms + BOUNCE_MS,
                t2 = elapsed_ms + 2 * BOUNCE_MS,
            )
            .unwrap();
        } else {
            write!(text, "{{\\kf{}}}", ms_to_cs(dur_ms)).unwrap();
        }
        text.push_str(&word.text);
        if i + 1 < group.words.len() {
            text.push(' ');
        }

        elapsed_ms += dur_ms;
        cursor_ms = word.start_ms + dur_ms;
    }

    text
}

fn ms_to_cs(ms: u64) -> u64 {
    // Round to the nearest centisecond; karaoke ticks are integer cs.
    (ms + 5) / 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use sreel_models::Word;

    fn group(words: &[(&str, u64, u64)]) -> CaptionGroup {
        let words: Vec<Word> = words.iter().map(|(t, s, e)| Word::new(*t, *s, *e)).collect();
        let start_ms = words.first().unwrap().start_ms;
        let end_ms = words.last().unwrap().end_ms;
        CaptionGroup {
            words,
            start_ms,
            end_ms,
        }
    }

    #[test]
    fn test_time_format_hundredths() {
        assert_eq!(format_ass_time(0), "0:00:00.00");
        assert_eq!(format_ass_time(120), "0:00:00.12");
        assert_eq!(format_ass_time(61_230), "0:01:01.23");
        assert_eq!(format_ass_time(3_600_000), "1:00:00.00");
        assert_eq!(format_ass_time(3_725_450), "1:02:05.45");
    }

    #[test]
    fn test_header_uses_portrait_canvas() {
        let style = CaptionStylePreset::by_id("impact");
        let g = group(&[("hi", 0, 300)]);
        let script = render_script(&[g], style, AspectRatio::Portrait);

        assert!(script.contains("PlayResX: 1080"));
        assert!(script.contains("PlayResY: 1920"));
        assert!(script.contains(&format!(",{},1", AspectRatio::Portrait.caption_margin_v())));
    }

    #[test]
    fn test_landscape_margin_is_smaller() {
        let style = CaptionStylePreset::by_id("impact");
        let g = group(&[("hi", 0, 300)]);
        let portrait = render_script(&[g.clone()], style, AspectRatio::Portrait);
        let landscape = render_script(&[g], style, AspectRatio::Landscape);

        assert!(landscape.contains("PlayResX: 1920"));
        assert_ne!(portrait, landscape);
    }

    #[test]
    fn test_fade_markup() {
        let g = group(&[("hello", 0, 300), ("world", 320, 700)]);
        let text = render_group_text(&g, CaptionAnimation::GroupFade);
        assert_eq!(text, "{\\fad(150,150)}hello world");
    }

    #[test]
    fn test_block_highlight_word_durations() {
        // 300ms word, 20ms gap, 380ms word
        let g = group(&[("hello", 0, 300), ("world", 320, 700)]);
        let text = render_group_text(&g, CaptionAnimation::BlockHighlight);

        // 30cs sweep, 2cs filler for the gap, 38cs sweep
        assert_eq!(text, "{\\kf30}hello {\\k2}{\\kf38}world");
    }

    #[test]
    fn test_karaoke_pauses_during_silence() {
        // 500ms gap between words becomes a 50cs filler tick
        let g = group(&[("wait", 1000, 1300), ("what", 1800, 2100)]);
        let text = render_group_text(&g, CaptionAnimation::BlockHighlight);
        assert!(text.contains("{\\k50}"));
    }

    #[test]
    fn test_bounce_markup_has_scale_pulse() {
        let g = group(&[("pop", 0, 250)]);
        let text = render_group_text(&g, CaptionAnimation::BounceHighlight);
        assert!(text.contains("\\fscx112"));
        assert!(text.contains("\\t(0,120,"));
    }

    #[test]
    fn test_event_lines_are_ordered_and_timed() {
        let style = CaptionStylePreset::by_id("subtle");
        let groups = vec![group(&[("one", 0, 400)]), group(&[("two", 900, 1300)])];
        let script = render_script(&groups, style, AspectRatio::Portrait);

        let first = script.find("Dialogue: 0,0:00:00.00").unwrap();
        let second = script.find("Dialogue: 0,0:00:00.90").unwrap();
        assert!(first < second);
    }
}
