// src/ytdlp.rs
// Builds the yt-dlp command line and runs it.
//
// One invocation per video writes everything we need next to each other:
//   <work_dir>/<id>.<lang>.srt   (subtitles, when requested)
//   <work_dir>/<id>.info.json    (title + comments)

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;

use crate::{error::FetchError, fetch::FetchOptions};

pub const DEFAULT_PROGRAM: &str = "yt-dlp";

#[derive(Clone, Debug)]
pub struct DownloadPlan<'a> {
    pub url: &'a str,
    pub video_id: &'a str,
    pub work_dir: &'a Path,
    pub language: &'a str,
    pub options: FetchOptions,
}

impl DownloadPlan<'_> {
    /// Output template handed to `-o`; yt-dlp appends `.<lang>.srt` etc.
    pub fn output_base(&self) -> PathBuf {
        self.work_dir.join(self.video_id)
    }

    pub fn info_json_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.info.json", self.video_id))
    }
}

pub fn build_args(plan: &DownloadPlan<'_>) -> Vec<String> {
    let mut args = vec![
        "--skip-download".to_string(),
        "-o".to_string(),
        plan.output_base().to_string_lossy().into_owned(),
    ];

    if plan.options.transcript {
        args.extend(
            [
                "--write-sub",
                "--write-auto-subs",
                "--sub-format",
                "srt",
                "--sub-lang",
                plan.language,
            ]
            .map(String::from),
        );
    }

    if plan.options.comments {
        args.push("--write-comments".to_string());
    }

    // The info JSON carries the title, so it is needed for either option.
    if plan.options.any() {
        args.push("--write-info-json".to_string());
    }

    args.push(plan.url.to_string());
    args
}

/// Something that can execute the extraction tool with a list of arguments.
pub trait ToolRunner: Send + Sync {
    fn run(&self, args: &[String]) -> Result<(), FetchError>;
}

#[derive(Clone, Debug)]
pub struct YtDlp {
    program: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `yt-dlp --version`, trimmed.
    pub fn version(&self) -> Result<String, FetchError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|source| FetchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(self.failure(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn failure(&self, output: &std::process::Output) -> FetchError {
        FetchError::ToolFailed {
            program: self.program.display().to_string(),
            status: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl ToolRunner for YtDlp {
    fn run(&self, args: &[String]) -> Result<(), FetchError> {
        debug!("{} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| FetchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(self.failure(&output));
        }
        Ok(())
    }
}
