use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while fetching a single video.
///
/// Messages are shown as-is in the web page, hence the French wording.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Impossible d'extraire l'identifiant de la vidéo : {url}")]
    InvalidUrl { url: String },

    #[error("Impossible de lancer {program} : {source}")]
    Spawn { program: String, source: io::Error },

    /// The tool ran but exited unsuccessfully.
    #[error("{program} failed with status {status}:\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error(
        "Fichier JSON introuvable : {}. Assurez-vous que yt-dlp est correctement installé.",
        path.display()
    )]
    MissingInfoJson { path: PathBuf },

    #[error("Lecture impossible de {} : {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("JSON invalide dans {} : {source}", path.display())]
    InfoJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Impossible de créer le dossier de travail : {0}")]
    WorkDir(#[source] io::Error),
}
