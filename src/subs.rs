// src/subs.rs
// Turns the subtitle files yt-dlp leaves behind (.srt, sometimes .vtt) into text.
//
// Two views of the same file:
//   transcript_from_subtitles(..) -> plain text, one caption line per line
//   parse_srt_to_cues(..)         -> timed cues, for "[HH:MM:SS] text" output

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub s: f32, // start seconds
    pub e: f32, // end seconds
    pub t: String,
}

fn strip_tags(line: &str) -> String {
    TAG_RE.replace_all(line, "").into_owned()
}

fn is_counter(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// A WebVTT comment block opens with `NOTE` alone or followed by whitespace.
fn is_vtt_note(line: &str) -> bool {
    line.strip_prefix("NOTE")
        .map(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
        .unwrap_or(false)
}

/// Plain-text transcript: counters, timing lines and blanks dropped, every
/// remaining line trimmed. Rolling auto-captions repeat the previous line,
/// so consecutive duplicates are collapsed.
///
/// For WebVTT input the `WEBVTT` header block and `NOTE` blocks are skipped;
/// SRT caption text is never treated as a header.
pub fn transcript_from_subtitles(contents: &str) -> String {
    let contents = contents.trim_start_matches('\u{feff}');
    let is_vtt = contents.trim_start().starts_with("WEBVTT");

    let mut lines: Vec<String> = Vec::new();
    let mut seen_content = false;
    let mut block_start = true;
    let mut skipping_block = false;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() {
            block_start = true;
            skipping_block = false;
            continue;
        }
        let first_line = !seen_content;
        let opens_block = block_start;
        seen_content = true;
        block_start = false;

        if skipping_block {
            continue;
        }
        let header = first_line && line.starts_with("WEBVTT");
        if is_vtt && (header || (opens_block && is_vtt_note(line))) {
            skipping_block = true;
            continue;
        }
        if is_counter(line) || line.contains("-->") {
            continue;
        }

        let text = strip_tags(line);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if lines.last().map(|prev| prev == text).unwrap_or(false) {
            continue;
        }
        lines.push(text.to_string());
    }

    lines.join("\n")
}

fn parse_ts_to_seconds(ts: &str) -> f32 {
    // Accept: "HH:MM:SS,mmm", "HH:MM:SS.mmm" or the short VTT "MM:SS.mmm".
    // We keep it permissive; return 0 on failure.
    let ts = ts.trim();
    let (clock, frac) = match ts.rfind([',', '.']) {
        Some(i) => (&ts[..i], &ts[i + 1..]),
        None => (ts, ""),
    };

    let mut fields: Vec<u32> = clock
        .split(':')
        .map(|p| p.trim().parse::<u32>().unwrap_or(0))
        .collect();
    while fields.len() < 3 {
        fields.insert(0, 0);
    }
    let (hh, mm, ss) = (fields[0], fields[1], fields[2]);

    let ms = {
        // normalize to 3 digits
        let mut s = frac.to_string();
        if s.len() < 3 {
            s.push_str(&"0".repeat(3 - s.len()));
        }
        s.truncate(3);
        s.parse::<u32>().unwrap_or(0)
    };

    (hh as f32) * 3600.0 + (mm as f32) * 60.0 + (ss as f32) + (ms as f32) / 1000.0
}

pub fn parse_srt_to_cues(srt_text: &str) -> Vec<Cue> {
    let norm = srt_text.replace("\r\n", "\n").replace('\r', "\n");
    let blocks = norm
        .split("\n\n")
        .map(|b| b.trim())
        .filter(|b| !b.is_empty());

    let mut cues = Vec::new();

    for block in blocks {
        let lines: Vec<&str> = block.lines().map(|l| l.trim_end()).collect();
        if lines.len() < 2 {
            continue;
        }

        // Blocks come with or without a numeric index (VTT usually omits it):
        //   1
        //   00:00:01,000 --> 00:00:02,000
        //   text...
        let time_line_idx = if lines.get(1).map(|l| l.contains("-->")).unwrap_or(false) {
            1
        } else {
            0
        };

        let time_line = match lines.get(time_line_idx) {
            Some(x) => *x,
            None => continue,
        };

        if !time_line.contains("-->") {
            continue;
        }

        let mut parts = time_line.split("-->").map(|s| s.trim());
        let start_ts = parts.next().unwrap_or("");
        // VTT may append cue settings ("align:start position:0%").
        let end_ts = parts
            .next()
            .and_then(|s| s.split_whitespace().next())
            .unwrap_or("");
        if start_ts.is_empty() || end_ts.is_empty() {
            continue;
        }

        let s = parse_ts_to_seconds(start_ts);
        let e = parse_ts_to_seconds(end_ts);

        let t = lines[(time_line_idx + 1)..]
            .iter()
            .map(|l| strip_tags(l.trim()))
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if t.is_empty() {
            continue;
        }

        cues.push(Cue { s, e, t });
    }

    cues.sort_by(|a, b| a.s.partial_cmp(&b.s).unwrap_or(std::cmp::Ordering::Equal));
    cues
}

/// `HH:MM:SS`, fractions dropped.
pub fn format_timestamp(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n2\n00:00:03,000 --> 00:00:04,000\n  General Kenobi  \nsecond line\n\n";

    const VTT: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00:00.160 --> 00:00:02.110 align:start position:0%\nwe're<00:00:00.560><c> no</c><00:00:00.880><c> strangers</c>\n\n00:00:02.110 --> 00:00:02.120 align:start position:0%\nwe're no strangers\n\n00:00:02.120 --> 00:00:04.000 align:start position:0%\nto love\n";

    #[test]
    fn srt_transcript_drops_counters_and_timings() {
        assert_eq!(
            transcript_from_subtitles(SRT),
            "Hello there\nGeneral Kenobi\nsecond line"
        );
    }

    #[test]
    fn srt_transcript_handles_crlf() {
        let crlf = SRT.replace('\n', "\r\n");
        assert_eq!(transcript_from_subtitles(&crlf), transcript_from_subtitles(SRT));
    }

    #[test]
    fn vtt_transcript_strips_headers_tags_and_repeats() {
        assert_eq!(transcript_from_subtitles(VTT), "we're no strangers\nto love");
    }

    #[test]
    fn srt_captions_that_look_like_vtt_headers_are_kept() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nLanguage: it's all about context\n\n\
                   2\n00:00:02,000 --> 00:00:03,000\nNOTEBOOKS are on the desk\n\n\
                   3\n00:00:03,000 --> 00:00:04,000\nKind: of\n\n\
                   4\n00:00:04,000 --> 00:00:05,000\nNOTE to self\n\n\
                   5\n00:00:05,000 --> 00:00:06,000\nNo.\n\n\
                   6\n00:00:06,000 --> 00:00:07,000\nNo.\n";
        assert_eq!(
            transcript_from_subtitles(srt),
            "Language: it's all about context\nNOTEBOOKS are on the desk\nKind: of\nNOTE to self\nNo."
        );
    }

    #[test]
    fn vtt_note_blocks_are_skipped() {
        let vtt = "\u{feff}WEBVTT - captions\n\n\
                   NOTE this cue was\nreviewed twice\n\n\
                   00:00.000 --> 00:01.000\nNOTEBOOKS out\n\n\
                   NOTE\n\n\
                   00:01.000 --> 00:02.000\nLanguage: French\n";
        assert_eq!(transcript_from_subtitles(vtt), "NOTEBOOKS out\nLanguage: French");
    }

    #[test]
    fn empty_input_gives_empty_transcript() {
        assert_eq!(transcript_from_subtitles(""), "");
        assert_eq!(transcript_from_subtitles("1\n00:00:01,000 --> 00:00:02,000\n\n"), "");
    }

    #[test]
    fn cues_from_srt() {
        let cues = parse_srt_to_cues(SRT);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].s, 1.0);
        assert_eq!(cues[0].e, 2.5);
        assert_eq!(cues[0].t, "Hello there");
        assert_eq!(cues[1].t, "General Kenobi\nsecond line");
    }

    #[test]
    fn cues_without_index_and_out_of_order() {
        let text = "00:01:00,000 --> 00:01:01,000\nlater\n\n00:00:05.5 --> 00:00:06\nearlier\n";
        let cues = parse_srt_to_cues(text);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].t, "earlier");
        assert_eq!(cues[0].s, 5.5);
        assert_eq!(cues[1].s, 60.0);
    }

    #[test]
    fn cues_from_vtt_skip_header_and_settings() {
        let cues = parse_srt_to_cues(VTT);
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].t, "we're no strangers");
        assert!((cues[0].e - 2.11).abs() < 1e-4);
        assert_eq!(cues[2].t, "to love");
    }

    #[test]
    fn short_vtt_timestamps() {
        assert_eq!(parse_ts_to_seconds("01:02.250"), 62.25);
        assert_eq!(parse_ts_to_seconds("garbage"), 0.0);
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(61.9), "00:01:01");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
        assert_eq!(format_timestamp(-3.0), "00:00:00");
    }
}
