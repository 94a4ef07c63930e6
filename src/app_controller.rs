use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::change_detection::ChangeDetector;
use crate::errors::TranslationError;
use crate::file_utils::{FileManager, Job};
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::translation::Translator;

// @module: Application controller for documentation translation

/// What happened to one source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Translation written
    Translated,
    /// Source unchanged since the last translation
    Unchanged,
    /// Source has no content
    Empty,
    /// Translation failed; the run continued
    Failed(String),
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub translated: usize,
    pub unchanged: usize,
    pub empty: usize,
    pub failed: usize,
    /// Jobs never attempted because every model was exhausted
    pub aborted: usize,
    /// Every model in the priority list reported itself unavailable
    pub models_exhausted: bool,
    /// Model in use when the run ended
    pub final_model: Option<String>,
}

impl RunSummary {
    fn add(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Translated => self.translated += 1,
            JobOutcome::Unchanged => self.unchanged += 1,
            JobOutcome::Empty => self.empty += 1,
            JobOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// No failures and nothing aborted
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.models_exhausted
    }
}

/// Staleness of one job, as reported by [`Controller::status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub job: Job,
    pub stale: bool,
}

/// Main application controller for documentation translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Project root that mapping paths are relative to
    root: PathBuf,
    // @field: Text-generation backend
    provider: Arc<dyn Provider>,
    // @field: Translate even when nothing changed
    force: bool,
}

impl Controller {
    // @method: Create a new controller talking to the Gemini API
    pub fn with_config(config: Config, root: impl Into<PathBuf>) -> Result<Self> {
        let provider = Gemini::new(
            config.provider.api_key.clone(),
            config.provider.endpoint.clone(),
            config.provider.timeout_secs,
        )
        .with_temperature(config.provider.temperature);

        Ok(Self::with_provider(config, root, Arc::new(provider)))
    }

    // @method: Create a controller with an explicit provider
    pub fn with_provider(config: Config, root: impl Into<PathBuf>, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            root: root.into(),
            provider,
            force: false,
        }
    }

    /// Translate every job regardless of change detection
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand every configured mapping into jobs, in configuration order
    pub fn jobs(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        for mapping in &self.config.mappings {
            let expanded = FileManager::expand_mapping(&self.root, mapping)?;
            if FileManager::dir_exists(self.root.join(&mapping.source)) {
                info!("Found {} markdown files in {}", expanded.len(), mapping.source);
            }
            jobs.extend(expanded);
        }
        Ok(jobs)
    }

    /// Report which jobs are stale without calling the API
    pub fn status(&self) -> Result<Vec<JobStatus>> {
        let detector = ChangeDetector::new(self.config.change_detection);
        Ok(self.jobs()?
            .into_iter()
            .map(|job| {
                let stale = self.force || detector.needs_translation(&job.source, &job.target);
                JobStatus { job, stale }
            })
            .collect())
    }

    /// Run the translation pipeline over every configured mapping
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        let detector = ChangeDetector::new(self.config.change_detection);
        let jobs = self.jobs()?;

        let mut summary = RunSummary::default();
        let mut translator = Translator::new(&self.config, Arc::clone(&self.provider))?;

        let stale: Vec<&Job> = jobs.iter()
            .filter(|job| {
                let stale = self.force || detector.needs_translation(&job.source, &job.target);
                if !stale {
                    info!("Skipping {} (no changes detected)", self.display(&job.source));
                    summary.add(&JobOutcome::Unchanged);
                }
                stale
            })
            .collect();

        if stale.is_empty() {
            info!("All {} translations are up to date", jobs.len());
            return Ok(summary);
        }

        translator.select_model().await?;

        let progress = ProgressBar::new(stale.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut api_called = false;
        for (position, job) in stale.iter().enumerate() {
            progress.set_message(self.display(&job.source));

            let outcome = match self.translate_job(&mut translator, job, &detector, &mut api_called).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(TranslationError::ModelsExhausted { file }) = e.downcast_ref::<TranslationError>() {
                        error!("Error: All models exhausted for {}", file);
                        summary.failed += 1;
                        summary.models_exhausted = true;
                        summary.aborted = stale.len() - position - 1;
                        progress.abandon_with_message("all models exhausted");
                        break;
                    }
                    JobOutcome::Failed(format!("{:#}", e))
                }
            };

            if let JobOutcome::Failed(reason) = &outcome {
                error!("Failed to translate {}: {}", self.display(&job.source), reason);
            }
            summary.add(&outcome);
            progress.inc(1);
        }
        if !summary.models_exhausted {
            progress.finish_and_clear();
        }

        summary.final_model = Some(translator.current_model().to_string());
        info!(
            "Translated {}, unchanged {}, empty {}, failed {}, not attempted {} in {:.1}s (model: {})",
            summary.translated,
            summary.unchanged,
            summary.empty,
            summary.failed,
            summary.aborted,
            start_time.elapsed().as_secs_f64(),
            translator.current_model()
        );

        Ok(summary)
    }

    /// Translate one stale job and persist the result with its marker
    async fn translate_job(
        &self,
        translator: &mut Translator,
        job: &Job,
        detector: &ChangeDetector,
        api_called: &mut bool,
    ) -> Result<JobOutcome> {
        let content = FileManager::read_to_string(&job.source)?;
        if content.trim().is_empty() {
            warn!("Skipping {} (empty file)", self.display(&job.source));
            return Ok(JobOutcome::Empty);
        }

        // Pace consecutive API calls
        if *api_called && self.config.retry.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.retry.request_delay_ms)).await;
        }
        *api_called = true;

        let label = self.display(&job.source);
        let translation = match translator.translate(&content, &label).await {
            Ok(translation) => translation,
            Err(e @ TranslationError::ModelsExhausted { .. }) => return Err(e.into()),
            Err(e) => {
                warn!("Failed to translate {} after retries. Skipping.", label);
                return Ok(JobOutcome::Failed(e.to_string()));
            }
        };

        let output = format!("{}{}", self.config.header, translation.text);
        FileManager::write_to_file(&job.target, &output)?;
        detector.record(&job.source, &job.target)
            .with_context(|| format!("Failed to record change marker for {:?}", job.target))?;

        info!("Saved to {} ({})", self.display(&job.target), translation.model);
        Ok(JobOutcome::Translated)
    }

    fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
