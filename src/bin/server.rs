use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::{path::PathBuf, sync::Arc};
use tube_transcript::{
    api::{self, AppState},
    settings::{default_languages, load_version, Settings},
    ytdlp::{YtDlp, DEFAULT_PROGRAM},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding index.html and its assets
    #[arg(long, default_value = "static")]
    static_dir: String,

    /// yt-dlp executable (name on PATH or full path)
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    yt_dlp: String,

    /// Subtitle languages offered in the form (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = default_languages())]
    languages: Vec<String>,

    /// Preselected language; defaults to the first of --languages
    #[arg(long)]
    default_language: Option<String>,

    /// Fetched videos kept in memory for resubmissions (0 disables)
    #[arg(long, default_value_t = 64)]
    cache_capacity: usize,

    /// Finished jobs kept around for polling and downloads
    #[arg(long, default_value_t = 32)]
    max_jobs: usize,

    /// File whose contents are shown as the version in the footer
    #[arg(long, default_value = "version.txt")]
    version_file: String,

    /// Bind host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let version = load_version(&PathBuf::from(&args.version_file))?;
    let settings = Settings::new(version, args.languages.clone(), args.default_language.clone())
        .context("invalid language settings")?;

    let tool = YtDlp::new(&args.yt_dlp);
    match tool.version() {
        Ok(v) => info!("🔧 {} {}", tool.program().display(), v),
        Err(e) => warn!("⚠️ yt-dlp is not usable, every fetch will fail: {e}"),
    }

    let state = web::Data::new(AppState::new(
        Arc::new(tool),
        settings,
        args.cache_capacity,
        args.max_jobs,
    ));

    let static_dir = PathBuf::from(&args.static_dir);
    if !static_dir.join("index.html").exists() {
        warn!("⚠️ no index.html in {}", static_dir.display());
    }

    let bind_addr = format!("{}:{}", args.host, args.port);
    info!(
        "📡 Serving '{}' at http://{} (version {})",
        args.static_dir, bind_addr, state.settings.version
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .configure(api::configure)
            .service(
                Files::new("/", &static_dir)
                    .index_file("index.html")
                    .prefer_utf8(true)
                    .use_last_modified(true),
            )
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed binding {bind_addr}"))?
    .run()
    .await?;

    Ok(())
}
