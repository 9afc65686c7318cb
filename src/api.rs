// src/api.rs
// JSON endpoints behind the page in static/.
//
//   GET  /api/info                          version + languages for the form
//   POST /api/jobs                          submit the form, returns { job_id }
//   GET  /api/jobs/{id}                     progress / merged results
//   GET  /api/jobs/{id}/transcripts.txt     download
//   GET  /api/jobs/{id}/comments.txt        download
//   GET  /api/notification.wav              "done" beep

use std::sync::Arc;

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    web, HttpRequest, HttpResponse, ResponseError,
};
use log::{error, info};
use serde::Serialize;
use thiserror::Error;

use crate::{
    batch::{run_batch, BatchOutput, JobRequest, ValidationError},
    cache::ResultCache,
    jobs::{JobId, JobState, JobStore},
    report::{COMMENTS_FILE_NAME, TRANSCRIPTS_FILE_NAME},
    settings::Settings,
    sound::notification_wav,
    ytdlp::ToolRunner,
};

pub struct AppState {
    pub runner: Arc<dyn ToolRunner>,
    pub cache: ResultCache,
    pub jobs: JobStore,
    pub settings: Settings,
    notification: web::Bytes,
}

impl AppState {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        settings: Settings,
        cache_capacity: usize,
        max_jobs: usize,
    ) -> Self {
        Self {
            runner,
            cache: ResultCache::new(cache_capacity),
            jobs: JobStore::new(max_jobs),
            settings,
            notification: web::Bytes::from(notification_wav()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Tâche introuvable : {0}")]
    JobNotFound(JobId),

    #[error("La tâche {0} est encore en cours.")]
    JobRunning(JobId),

    #[error("{1}")]
    JobFailed(JobId, String),

    #[error("Rien à télécharger.")]
    NothingToDownload,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::JobNotFound(_) | ApiError::NothingToDownload => StatusCode::NOT_FOUND,
            ApiError::JobRunning(_) | ApiError::JobFailed(..) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Serialize)]
struct JobCreated {
    job_id: JobId,
}

#[derive(Debug, Serialize)]
pub struct VideoSummary {
    pub url: String,
    pub title: String,
    pub actual_lang: String,
    pub has_transcript: bool,
    pub comment_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobView {
    Running {
        processed: usize,
        total: usize,
    },
    Done {
        total: usize,
        videos: Vec<VideoSummary>,
        transcripts: Option<String>,
        comments: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl From<&JobState> for JobView {
    fn from(state: &JobState) -> Self {
        match state {
            JobState::Running { processed, total } => JobView::Running {
                processed: *processed,
                total: *total,
            },
            JobState::Done(out) => JobView::Done {
                total: out.videos.len(),
                videos: out
                    .videos
                    .iter()
                    .map(|v| VideoSummary {
                        url: v.url.clone(),
                        title: v.title.clone(),
                        actual_lang: v.actual_lang.clone(),
                        has_transcript: !v.transcript.is_empty(),
                        comment_count: v.comments.len(),
                    })
                    .collect(),
                transcripts: out.transcripts.clone(),
                comments: out.comments.clone(),
            },
            JobState::Failed(error) => JobView::Failed {
                error: error.clone(),
            },
        }
    }
}

async fn info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.settings)
}

async fn create_job(
    state: web::Data<AppState>,
    body: web::Json<JobRequest>,
) -> Result<HttpResponse, ApiError> {
    let settings = &state.settings;
    let batch = body
        .into_inner()
        .validate(&settings.languages, &settings.default_language)?;

    let id = state.jobs.create(batch.videos.len());
    info!(
        "🎬 job {id}: {} video(s), language '{}'",
        batch.videos.len(),
        batch.language
    );

    // yt-dlp blocks for as long as it takes; keep it off the async workers.
    let worker = state.clone();
    tokio::task::spawn_blocking(move || {
        let result = run_batch(worker.runner.as_ref(), &worker.cache, &batch, |done, _| {
            worker.jobs.set_progress(id, done)
        });
        match &result {
            Ok(_) => info!("✅ job {id} done"),
            Err(e) => error!("❌ job {id} failed: {e}"),
        }
        worker.jobs.finish(id, result.map_err(|e| e.to_string()));
    });

    Ok(HttpResponse::Accepted().json(JobCreated { job_id: id }))
}

async fn job_status(
    state: web::Data<AppState>,
    path: web::Path<JobId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let job = state.jobs.get(id).ok_or(ApiError::JobNotFound(id))?;
    Ok(HttpResponse::Ok().json(JobView::from(&job)))
}

fn finished(state: &AppState, id: JobId) -> Result<Arc<BatchOutput>, ApiError> {
    match state.jobs.get(id) {
        None => Err(ApiError::JobNotFound(id)),
        Some(JobState::Running { .. }) => Err(ApiError::JobRunning(id)),
        Some(JobState::Failed(msg)) => Err(ApiError::JobFailed(id, msg)),
        Some(JobState::Done(out)) => Ok(out),
    }
}

fn attachment(file_name: &str, text: Option<&str>) -> Result<HttpResponse, ApiError> {
    let text = text
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::NothingToDownload)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(text.to_string()))
}

async fn download_transcripts(
    state: web::Data<AppState>,
    path: web::Path<JobId>,
) -> Result<HttpResponse, ApiError> {
    let out = finished(&state, path.into_inner())?;
    attachment(TRANSCRIPTS_FILE_NAME, out.transcripts.as_deref())
}

async fn download_comments(
    state: web::Data<AppState>,
    path: web::Path<JobId>,
) -> Result<HttpResponse, ApiError> {
    let out = finished(&state, path.into_inner())?;
    attachment(COMMENTS_FILE_NAME, out.comments.as_deref())
}

async fn notification(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("audio/wav")
        .body(state.notification.clone())
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorBody {
        error: format!("Requête invalide : {err}"),
    };
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/info", web::get().to(info))
            .route("/jobs", web::post().to(create_job))
            .route("/jobs/{id}", web::get().to(job_status))
            .route("/jobs/{id}/transcripts.txt", web::get().to(download_transcripts))
            .route("/jobs/{id}/comments.txt", web::get().to(download_comments))
            .route("/notification.wav", web::get().to(notification)),
    );
}
