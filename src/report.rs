// src/report.rs
// Merged text files offered for download, one section per video:
//
//   --- Transcription pour '<title>' ---
//   URL: <url>
//
//   <transcript>
//

use std::borrow::Borrow;

use crate::{fetch::VideoData, subs::format_timestamp};

pub const TRANSCRIPTS_FILE_NAME: &str = "transcriptions_fusionnees.txt";
pub const COMMENTS_FILE_NAME: &str = "commentaires_fusionnes.txt";

fn timestamped(video: &VideoData) -> String {
    video
        .cues
        .iter()
        .map(|cue| format!("[{}] {}", format_timestamp(cue.s), cue.t.replace('\n', " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Videos without a transcript are left out entirely.
pub fn merge_transcripts<V: Borrow<VideoData>>(videos: &[V], timestamps: bool) -> String {
    let mut out = String::new();
    for video in videos {
        let video: &VideoData = video.borrow();
        if video.transcript.is_empty() {
            continue;
        }
        let body = if timestamps && !video.cues.is_empty() {
            timestamped(video)
        } else {
            video.transcript.clone()
        };
        out.push_str(&format!(
            "--- Transcription pour '{}' ---\nURL: {}\n\n{}\n\n",
            video.title, video.url, body
        ));
    }
    out
}

pub fn merge_comments<V: Borrow<VideoData>>(videos: &[V]) -> String {
    let mut out = String::new();
    for video in videos {
        let video: &VideoData = video.borrow();
        if video.comments.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "--- Commentaires pour '{}' ---\nURL: {}\n\n",
            video.title, video.url
        ));
        for comment in &video.comments {
            out.push_str(&format!("Auteur: {}\n{}\n\n", comment.author, comment.text));
        }
    }
    out
}
