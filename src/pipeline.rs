// Fetch -> load -> validate -> match, one run at a time
use crate::badge_client::BadgeServiceClient;
use crate::diagnostics::Diagnostics;
use crate::fetcher::ResourceFetcher;
use crate::matcher::{MatchPredicate, match_catalogs};
use crate::model::{Course, LoadError, MatchResult, PipelineFailure, RawDocument, SchemaError};
use crate::retry::{Exhausted, RetryPolicy, Sleeper, retry_fetch};
use crate::store::JsonStore;
use crate::validate::{extract_badges, extract_courses};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const COURSE_RESOURCE: &str = "course feed";
const BADGE_RESOURCE: &str = "badge list";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Loading,
    Validating,
    Matching,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub enum CourseSource {
    /// Download `feed_url` to `cache_path`, then load the cached copy.
    Remote { feed_url: String, cache_path: PathBuf },
    /// Load an existing file without touching the network.
    Local(PathBuf),
}

#[derive(Debug)]
pub enum BadgeSource {
    Api(BadgeServiceClient),
    File(PathBuf),
}

/// Badge data either already downloaded (API) or still on disk.
enum BadgeInput<'a> {
    Fetched { origin: String, bytes: Vec<u8> },
    Stored(&'a Path),
}

pub struct Pipeline {
    fetcher: Arc<dyn ResourceFetcher>,
    store: JsonStore,
    diagnostics: Arc<dyn Diagnostics>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    predicate: MatchPredicate,
    stages: Mutex<Vec<Stage>>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        diagnostics: Arc<dyn Diagnostics>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        predicate: MatchPredicate,
    ) -> Self {
        Self {
            fetcher,
            store: JsonStore::new(diagnostics.clone()),
            diagnostics,
            sleeper,
            policy,
            predicate,
            stages: Mutex::new(Vec::new()),
        }
    }

    /// Stages entered by the most recent run, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn enter(&self, stage: Stage) {
        if let Ok(mut stages) = self.stages.lock() {
            stages.push(stage);
        }
        self.diagnostics.info(&format!("➡️ Stage: {:?}", stage));
    }

    /// Runs every stage once. On failure the cause is reported as a single
    /// error and the matcher is never reached.
    pub async fn run(&self, courses: &CourseSource, badges: &BadgeSource) -> Result<MatchResult, PipelineFailure> {
        if let Ok(mut stages) = self.stages.lock() {
            stages.clear();
        }

        match self.execute(courses, badges).await {
            Ok(result) => {
                self.enter(Stage::Done);
                self.diagnostics.info(&format!(
                    "✅ Matched {} course(s) using '{}'",
                    result.len(),
                    self.predicate.as_str()
                ));
                Ok(result)
            }
            Err(failure) => {
                self.enter(Stage::Failed);
                self.diagnostics
                    .error(&format!("❌ Pipeline failed ({}): {}", failure.cause(), failure));
                Err(failure)
            }
        }
    }

    async fn execute(&self, courses: &CourseSource, badges: &BadgeSource) -> Result<MatchResult, PipelineFailure> {
        self.enter(Stage::Fetching);
        let course_path = self.acquire_courses(courses).await?;
        let badge_input = match badges {
            BadgeSource::Api(client) => BadgeInput::Fetched {
                origin: client.badges_url(),
                bytes: self.acquire_badges(client).await?,
            },
            BadgeSource::File(path) => BadgeInput::Stored(path),
        };

        self.enter(Stage::Loading);
        let course_doc = self.load(COURSE_RESOURCE, course_path).await?;
        let badge_doc = match badge_input {
            BadgeInput::Fetched { origin, bytes } => self
                .store
                .parse(&bytes, &origin)
                .map_err(|e| parse_failure(BADGE_RESOURCE, e))?,
            BadgeInput::Stored(path) => self.load(BADGE_RESOURCE, path).await?,
        };

        self.enter(Stage::Validating);
        let course_list = extract_courses(&course_doc, self.diagnostics.as_ref())
            .map_err(|e| schema_invalid(COURSE_RESOURCE, e))?;
        let badge_list = extract_badges(&badge_doc, self.diagnostics.as_ref())
            .map_err(|e| schema_invalid(BADGE_RESOURCE, e))?;
        self.diagnostics.info(&format!(
            "📦 Validated {} course(s) and {} badge(s)",
            course_list.len(),
            badge_list.len()
        ));
        self.warn_duplicates(&course_list);

        self.enter(Stage::Matching);
        Ok(match_catalogs(&course_list, &badge_list, self.predicate))
    }

    async fn acquire_courses<'a>(&self, source: &'a CourseSource) -> Result<&'a Path, PipelineFailure> {
        match source {
            CourseSource::Local(path) => Ok(path.as_path()),
            CourseSource::Remote { feed_url, cache_path } => {
                retry_fetch(
                    &self.policy,
                    self.sleeper.as_ref(),
                    self.diagnostics.as_ref(),
                    COURSE_RESOURCE,
                    |_| self.fetcher.fetch_and_persist(feed_url, cache_path),
                )
                .await
                .map_err(|e| fetch_failed(COURSE_RESOURCE, e))?;
                Ok(cache_path.as_path())
            }
        }
    }

    async fn acquire_badges(&self, client: &BadgeServiceClient) -> Result<Vec<u8>, PipelineFailure> {
        retry_fetch(
            &self.policy,
            self.sleeper.as_ref(),
            self.diagnostics.as_ref(),
            BADGE_RESOURCE,
            |_| client.fetch_badges_raw(),
        )
        .await
        .map_err(|e| fetch_failed(BADGE_RESOURCE, e))
    }

    async fn load(&self, resource: &str, path: &Path) -> Result<RawDocument, PipelineFailure> {
        self.store
            .load(path)
            .await
            .map_err(|e| parse_failure(resource, e))
    }

    fn warn_duplicates(&self, courses: &[Course]) {
        let mut seen = HashSet::new();
        for course in courses {
            if !seen.insert(course.name.as_str()) {
                self.diagnostics.warning(&format!(
                    "⚠️ Duplicate course name '{}': later entry replaces earlier matches",
                    course.name
                ));
            }
        }
    }
}

fn fetch_failed(resource: &str, exhausted: Exhausted) -> PipelineFailure {
    PipelineFailure::FetchExhausted {
        resource: resource.to_string(),
        attempts: exhausted.attempts,
        last: exhausted.last,
    }
}

fn parse_failure(resource: &str, err: LoadError) -> PipelineFailure {
    PipelineFailure::ParseFailure {
        resource: resource.to_string(),
        reason: err.to_string(),
    }
}

fn schema_invalid(resource: &str, source: SchemaError) -> PipelineFailure {
    PipelineFailure::SchemaInvalid {
        resource: resource.to_string(),
        source,
    }
}
