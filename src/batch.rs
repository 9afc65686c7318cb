use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cache::{CacheKey, ResultCache},
    error::FetchError,
    fetch::{fetch_video_data, FetchOptions, VideoData},
    report::{merge_comments, merge_transcripts},
    ytdlp::ToolRunner,
};

fn yes() -> bool {
    true
}

/// One row of the form.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoEntry {
    #[serde(default)]
    pub url: String,
    #[serde(default = "yes")]
    pub download_transcript: bool,
    #[serde(default = "yes")]
    pub download_comments: bool,
}

/// The whole form, as posted by the page.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    pub language: Option<String>,
    #[serde(default)]
    pub videos: Vec<VideoEntry>,
    /// Prefix transcript lines with `[HH:MM:SS]`.
    #[serde(default)]
    pub timestamps: bool,
    /// Ignore cached results and run yt-dlp again.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Merci de fournir au moins une URL valide.")]
    NoUrls,

    #[error("Pour la vidéo {url}, veuillez sélectionner au moins une option de téléchargement.")]
    NoOption { url: String },

    #[error("Langue de sous-titres non prise en charge : {language}")]
    UnsupportedLanguage { language: String },
}

#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub url: String,
    pub options: FetchOptions,
}

/// A validated request, ready to run.
#[derive(Debug, Clone)]
pub struct Batch {
    pub language: String,
    pub videos: Vec<VideoRequest>,
    pub timestamps: bool,
    pub refresh: bool,
}

impl JobRequest {
    pub fn validate(self, languages: &[String], default_language: &str) -> Result<Batch, ValidationError> {
        let language = self
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default_language.to_string());
        if !languages.iter().any(|l| *l == language) {
            return Err(ValidationError::UnsupportedLanguage { language });
        }

        let videos: Vec<VideoRequest> = self
            .videos
            .into_iter()
            .filter(|v| !v.url.trim().is_empty())
            .map(|v| VideoRequest {
                url: v.url.trim().to_string(),
                options: FetchOptions {
                    transcript: v.download_transcript,
                    comments: v.download_comments,
                },
            })
            .collect();

        if videos.is_empty() {
            return Err(ValidationError::NoUrls);
        }
        if let Some(v) = videos.iter().find(|v| !v.options.any()) {
            return Err(ValidationError::NoOption { url: v.url.clone() });
        }

        Ok(Batch {
            language,
            videos,
            timestamps: self.timestamps,
            refresh: self.refresh,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub videos: Vec<Arc<VideoData>>,
    /// `None` when no video asked for a transcript; `Some("")` when some did
    /// but nothing was found.
    pub transcripts: Option<String>,
    pub comments: Option<String>,
}

/// Every requested section has content. Partial results are not cached.
fn is_complete(data: &VideoData, options: FetchOptions) -> bool {
    !(options.transcript && data.transcript.is_empty())
        && !(options.comments && data.comments.is_empty())
}

/// Fetch every video of the batch in turn, sharing one scratch directory.
/// The first failure aborts the batch.
pub fn run_batch(
    runner: &dyn ToolRunner,
    cache: &ResultCache,
    batch: &Batch,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<BatchOutput, FetchError> {
    let work_dir = tempfile::tempdir().map_err(FetchError::WorkDir)?;
    let total = batch.videos.len();
    let mut videos = Vec::with_capacity(total);

    for (i, video) in batch.videos.iter().enumerate() {
        let key = CacheKey::new(&video.url, &batch.language, video.options);
        let cached = if batch.refresh { None } else { cache.get(&key) };

        let data = match cached {
            Some(hit) => {
                info!("♻️  {}/{} cached: {}", i + 1, total, video.url);
                hit
            }
            None => {
                info!("⬇️  {}/{} fetching: {}", i + 1, total, video.url);
                let fetched = Arc::new(fetch_video_data(
                    runner,
                    work_dir.path(),
                    &video.url,
                    &batch.language,
                    video.options,
                )?);
                if is_complete(&fetched, video.options) {
                    cache.insert(key, fetched.clone());
                } else {
                    debug!("{}: a requested section came back empty, not cached", video.url);
                }
                fetched
            }
        };
        videos.push(data);
        on_progress(i + 1, total);
    }

    let transcripts = batch
        .videos
        .iter()
        .any(|v| v.options.transcript)
        .then(|| merge_transcripts(&videos, batch.timestamps));
    let comments = batch
        .videos
        .iter()
        .any(|v| v.options.comments)
        .then(|| merge_comments(&videos));

    Ok(BatchOutput {
        videos,
        transcripts,
        comments,
    })
}
