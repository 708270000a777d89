//! The interactions both front ends offer, wired over one repository and one model.

use crate::config::Settings;
use crate::error::CoreError;
use crate::extraction::Extractor;
use crate::llm::{LanguageModel, OllamaClient};
use crate::models::{truncate_to_seconds, NewSchedule, QueryOutcome, QueryRow, Schedule};
use crate::prompt::summary_messages;
use crate::query::{fallback_statement, gate_strict, QueryTranslator};
use crate::repository::{ScheduleRepository, SqliteRepository};
use crate::timezone::TimestampNormalizer;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Bounds of the window accepted by [`ScheduleService::upcoming`].
pub const MIN_UPCOMING_DAYS: u32 = 1;
pub const MAX_UPCOMING_DAYS: u32 = 90;

#[derive(Clone)]
pub struct ScheduleService {
    repo: SqliteRepository,
    model: Arc<dyn LanguageModel>,
    extractor: Extractor,
    translator: QueryTranslator,
}

impl ScheduleService {
    pub fn new(
        repo: SqliteRepository,
        model: Arc<dyn LanguageModel>,
        normalizer: TimestampNormalizer,
        fallback_days: u32,
    ) -> Self {
        Self {
            extractor: Extractor::new(model.clone(), normalizer),
            translator: QueryTranslator::new(model.clone(), fallback_days),
            repo,
            model,
        }
    }

    /// Opens the database and connects the Ollama client described by `settings`.
    pub async fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let normalizer = TimestampNormalizer::from_name(&settings.timezone)?;
        let model = OllamaClient::new(&settings.llm).map_err(CoreError::LanguageModel)?;
        let repo = SqliteRepository::open(&settings.database_path).await?;

        tracing::debug!(
            database = %settings.database_path,
            model = %settings.llm.model,
            timezone = %settings.timezone,
            "schedule service ready"
        );
        Ok(Self::new(repo, Arc::new(model), normalizer, settings.fallback_days))
    }

    pub fn repository(&self) -> &SqliteRepository {
        &self.repo
    }

    /// Extracts a record from `text` and stores it.
    pub async fn extract_and_save(&self, text: &str) -> Result<Schedule, CoreError> {
        self.extract_and_save_at(text, Utc::now()).await
    }

    pub async fn extract_and_save_at(
        &self,
        text: &str,
        reference: DateTime<Utc>,
    ) -> Result<Schedule, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::InvalidInput("Text cannot be empty".to_string()));
        }
        let record = self.extractor.extract_at(text, reference).await?;
        self.repo.add_schedule(record).await
    }

    /// Translates a question, runs the gated statement and reports which statement ran.
    pub async fn ask(&self, question: &str) -> Result<QueryOutcome, CoreError> {
        if question.trim().is_empty() {
            return Err(CoreError::InvalidInput("Question cannot be empty".to_string()));
        }
        let gated = self.translator.translate(question).await?;
        let rows = self.repo.run_read_only(&gated.sql).await?;

        Ok(QueryOutcome {
            fallback_used: gated.is_fallback(),
            sql: gated.sql,
            rows,
        })
    }

    /// Asks the model for a short bullet summary of query results.
    /// No rows means nothing to summarize and no model call.
    pub async fn summarize(
        &self,
        question: &str,
        rows: &[QueryRow],
    ) -> Result<Option<String>, CoreError> {
        if rows.is_empty() {
            return Ok(None);
        }
        let rows_json = serde_json::to_string(rows)
            .map_err(|e| CoreError::InvalidInput(format!("rows are not serializable: {e}")))?;

        let summary = self
            .model
            .complete(&summary_messages(question, &rows_json))
            .await
            .map_err(CoreError::LanguageModel)?;
        Ok(Some(summary.trim().to_string()))
    }

    /// The deterministic upcoming query over the next `days` days.
    pub async fn upcoming(&self, days: u32) -> Result<QueryOutcome, CoreError> {
        if !(MIN_UPCOMING_DAYS..=MAX_UPCOMING_DAYS).contains(&days) {
            return Err(CoreError::InvalidInput(format!(
                "days must be between {MIN_UPCOMING_DAYS} and {MAX_UPCOMING_DAYS}, got {days}"
            )));
        }
        let sql = fallback_statement(days);
        let rows = self.repo.run_read_only(&sql).await?;
        Ok(QueryOutcome { sql, rows, fallback_used: false })
    }

    /// Runs an operator-typed statement. Unlike [`ScheduleService::ask`], an
    /// unsafe statement is an error here.
    pub async fn run_admin_sql(&self, sql: &str) -> Result<QueryOutcome, CoreError> {
        let sql = gate_strict(sql)?;
        let rows = self.repo.run_read_only(&sql).await?;
        Ok(QueryOutcome { sql, rows, fallback_used: false })
    }

    pub async fn add_schedule(&self, data: NewSchedule) -> Result<Schedule, CoreError> {
        self.repo.add_schedule(data).await
    }

    pub async fn list_schedules(&self, limit: u32) -> Result<Vec<Schedule>, CoreError> {
        self.repo.list_schedules(limit).await
    }

    pub async fn purge_all(&self) -> Result<u64, CoreError> {
        self.repo.purge_schedules().await
    }

    pub async fn seed_samples(&self) -> Result<Vec<Schedule>, CoreError> {
        let mut saved = Vec::new();
        for sample in sample_schedules(Utc::now()) {
            saved.push(self.repo.add_schedule(sample).await?);
        }
        Ok(saved)
    }
}

/// Three demo entries placed relative to `now`.
pub fn sample_schedules(now: DateTime<Utc>) -> Vec<NewSchedule> {
    let now = truncate_to_seconds(now);
    let tags = |names: &[&str]| names.iter().map(|t| t.to_string()).collect::<Vec<_>>();
    let coffee = now + Duration::days(5) + Duration::hours(10);

    vec![
        NewSchedule {
            title: "Team standup".to_string(),
            details: "Daily sync".to_string(),
            start: Some(now + Duration::days(1)),
            location: "Zoom".to_string(),
            tags: tags(&["meeting"]),
            created_at: now,
            updated_at: now,
            ..Default::default()
        },
        NewSchedule {
            title: "Project deadline".to_string(),
            details: "Submit report".to_string(),
            start: Some(now + Duration::days(3) + Duration::hours(17)),
            tags: tags(&["deadline"]),
            created_at: now,
            updated_at: now,
            ..Default::default()
        },
        NewSchedule {
            title: "Coffee with Ali".to_string(),
            details: "Catch up".to_string(),
            start: Some(coffee),
            end: Some(coffee + Duration::hours(1)),
            location: "Racine, Casablanca".to_string(),
            tags: tags(&["coffee", "friends"]),
            created_at: now,
            updated_at: now,
        },
    ]
}
