use credmatch::badge_client::BadgeServiceClient;
use credmatch::config::{AppConfig, BadgeSourceConfig, load_config};
use credmatch::diagnostics::{Diagnostics, TracingDiagnostics};
use credmatch::fetcher::{HttpFetcher, ResourceFetcher};
use credmatch::pipeline::{BadgeSource, CourseSource, Pipeline};
use credmatch::report::{RunSummary, build_reporters};
use credmatch::retry::{RetryPolicy, TokioSleeper};
use credmatch::storage::SqliteStorage;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    // Load configuration from file
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let fetcher: Arc<dyn ResourceFetcher> = match HttpFetcher::new(&config.http, diagnostics.clone()) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (courses, badges) = sources(&config, fetcher.clone());
    let pipeline = Pipeline::new(
        fetcher,
        diagnostics,
        Arc::new(TokioSleeper),
        RetryPolicy::from(&config.retry),
        config.predicate,
    );

    // Open the history once: read the previous run now, record this one later
    let history = config.report.sqlite_path.as_deref().and_then(|path| match SqliteStorage::new(path) {
        Ok(storage) => Some(storage),
        Err(e) => {
            warn!("Failed to initialize storage: {}", e);
            None
        }
    });
    if let Some(storage) = &history {
        if let Ok(Some(prev)) = storage.latest_run() {
            info!(
                "Previous run #{}: {} course(s) | predicate: {} | at {}",
                prev.id, prev.course_count, prev.predicate, prev.generated_at
            );
        }
    }

    info!("🚀 Matching courses to badges...");
    let result = match pipeline.run(&courses, &badges).await {
        Ok(result) => result,
        // The pipeline has already reported the cause.
        Err(_) => return ExitCode::FAILURE,
    };

    let summary = RunSummary {
        result: &result,
        predicate: config.predicate,
        generated_at: chrono::Utc::now(),
    };
    let mut status = ExitCode::SUCCESS;
    for reporter in build_reporters(&config.report, history) {
        match reporter.emit(&summary) {
            Ok(()) => info!("📤 Report written: {}", reporter.name()),
            Err(e) => {
                warn!("❌ {} report failed: {}", reporter.name(), e);
                status = ExitCode::FAILURE;
            }
        }
    }
    status
}

fn sources(config: &AppConfig, fetcher: Arc<dyn ResourceFetcher>) -> (CourseSource, BadgeSource) {
    let courses = match &config.course_feed_url {
        Some(url) => CourseSource::Remote {
            feed_url: url.clone(),
            cache_path: config.course_cache_path.clone(),
        },
        None => CourseSource::Local(config.course_cache_path.clone()),
    };
    let badges = match &config.badges {
        BadgeSourceConfig::Api { base_url, authorization_token } => BadgeSource::Api(
            BadgeServiceClient::new(base_url.clone(), authorization_token.clone(), fetcher),
        ),
        BadgeSourceConfig::File { path } => BadgeSource::File(path.clone()),
    };
    (courses, badges)
}

