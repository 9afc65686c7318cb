//! Web front-end around `yt-dlp` for pulling transcripts and comments out of
//! YouTube videos.
//!
//! The HTTP layer lives in [`api`]; the per-video pipeline is
//! [`video_id`] → [`ytdlp`] → [`subs`] → [`fetch`] → [`report`].

pub mod api;
pub mod batch;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod jobs;
pub mod report;
pub mod settings;
pub mod sound;
pub mod subs;
pub mod video_id;
pub mod ytdlp;

pub use error::FetchError;
pub use fetch::{fetch_video_data, Comment, FetchOptions, VideoData};
