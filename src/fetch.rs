use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::FetchError,
    subs::{parse_srt_to_cues, transcript_from_subtitles, Cue},
    video_id::extract_video_id,
    ytdlp::{build_args, DownloadPlan, ToolRunner},
};

pub const UNKNOWN_TITLE: &str = "Titre inconnu";
pub const UNKNOWN_AUTHOR: &str = "Auteur inconnu";

/// Subtitle extensions we can read, in order of preference.
const SUBTITLE_EXTS: [&str; 2] = ["srt", "vtt"];

/// What to pull for a video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FetchOptions {
    pub transcript: bool,
    pub comments: bool,
}

impl FetchOptions {
    pub fn both() -> Self {
        Self {
            transcript: true,
            comments: true,
        }
    }

    pub fn any(&self) -> bool {
        self.transcript || self.comments
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct VideoData {
    pub url: String,
    pub title: String,
    pub transcript: String,
    pub cues: Vec<Cue>,
    pub comments: Vec<Comment>,
    /// Language of the subtitle file yt-dlp actually wrote (e.g. "fr").
    pub actual_lang: String,
}

#[derive(Debug, Deserialize)]
struct InfoJson {
    title: Option<String>,
    comments: Option<Vec<RawComment>>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    text: Option<String>,
    txt: Option<String>,
    author: Option<String>,
}

impl RawComment {
    fn into_comment(self) -> Option<Comment> {
        let text = self
            .text
            .filter(|t| !t.is_empty())
            .or(self.txt)
            .unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        let author = self.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        Some(Comment {
            author: author.trim().to_string(),
            text: text.trim().to_string(),
        })
    }
}

/// First `<id>.<lang>.<ext>` file in `dir`, preferring `.srt` over `.vtt`.
fn find_subtitle_file(dir: &Path, video_id: &str) -> Result<Option<PathBuf>, FetchError> {
    let prefix = format!("{video_id}.");
    let entries = fs::read_dir(dir).map_err(|source| FetchError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with(&prefix))
        .collect();
    names.sort();

    for ext in SUBTITLE_EXTS {
        let suffix = format!(".{ext}");
        // <id>.<lang>.<ext>: something must sit between the prefix and the extension
        if let Some(name) = names
            .iter()
            .find(|n| n.ends_with(&suffix) && n.len() > prefix.len() + suffix.len())
        {
            return Ok(Some(dir.join(name)));
        }
    }
    Ok(None)
}

/// "abc.fr.srt" -> "fr"
fn language_from_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        parts[parts.len() - 2].to_string()
    } else {
        String::new()
    }
}

fn read_to_string(path: &Path) -> Result<String, FetchError> {
    fs::read_to_string(path).map_err(|source| FetchError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Run yt-dlp once for `url` and collect the title, transcript and comments
/// from the files it leaves in `work_dir`.
pub fn fetch_video_data(
    runner: &dyn ToolRunner,
    work_dir: &Path,
    url: &str,
    language: &str,
    options: FetchOptions,
) -> Result<VideoData, FetchError> {
    let video_id = extract_video_id(url)?;
    let plan = DownloadPlan {
        url,
        video_id: &video_id,
        work_dir,
        language,
        options,
    };

    runner.run(&build_args(&plan))?;

    let mut transcript = String::new();
    let mut cues = Vec::new();
    let mut actual_lang = String::new();
    if options.transcript {
        match find_subtitle_file(work_dir, &video_id)? {
            Some(path) => {
                let raw = read_to_string(&path)?;
                transcript = transcript_from_subtitles(&raw);
                cues = parse_srt_to_cues(&raw);
                actual_lang = language_from_file_name(&path);
                info!(
                    "📝 {video_id}: {} transcript lines ({actual_lang})",
                    transcript.lines().count()
                );
            }
            None => warn!("{video_id}: no subtitles in '{language}'"),
        }
    }

    let mut title = String::new();
    let mut comments = Vec::new();
    if options.any() {
        let json_path = plan.info_json_path();
        if !json_path.exists() {
            return Err(FetchError::MissingInfoJson { path: json_path });
        }
        let raw = read_to_string(&json_path)?;
        let info: InfoJson = serde_json::from_str(&raw).map_err(|source| FetchError::InfoJson {
            path: json_path.clone(),
            source,
        })?;

        title = info.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        if options.comments {
            comments = info
                .comments
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawComment::into_comment)
                .collect();
            info!("💬 {video_id}: {} comments", comments.len());
        }
    }

    Ok(VideoData {
        url: url.to_string(),
        title,
        transcript,
        cues,
        comments,
        actual_lang,
    })
}
