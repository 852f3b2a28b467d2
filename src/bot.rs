/*!
 * Polling loop for substitution plans.
 *
 * Each cycle fetches the published plan links, resolves every plan's title,
 * stores plans that are new or moved to a new URL, converts new teacher
 * plans into student plans, and announces and pushes the result.
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Timelike;
use log::{debug, error, info, warn};

use crate::converter::PlanConverter;
use crate::dsb_client::{DsbClient, PlanLink};
use crate::errors::{AppError, DsbError};
use crate::file_utils::FileManager;
use crate::git_manager::{GitManager, DEFAULT_COMMIT_MESSAGE};
use crate::notifier::Notifier;
use crate::plan_title::{extract_date, extract_title, plan_file_name, UNKNOWN_TITLE};

/// A plan as announced to users, keyed by its title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub title: String,
    pub url: String,
}

/// Where plan links and pages come from
#[async_trait]
pub trait PlanSource: Send + Sync + std::fmt::Debug {
    /// Currently published plan links; empty on failure
    async fn fetch_menu_links(&self) -> Vec<PlanLink>;

    /// HTML of one plan page
    async fn fetch_page(&self, url: &str) -> Result<String, DsbError>;
}

#[async_trait]
impl PlanSource for DsbClient {
    async fn fetch_menu_links(&self) -> Vec<PlanLink> {
        DsbClient::fetch_menu_links(self).await
    }

    async fn fetch_page(&self, url: &str) -> Result<String, DsbError> {
        DsbClient::fetch_page(self, url).await
    }
}

/// Insert or replace the entry with the same title, keeping first-seen order
pub fn upsert_plan(plans: &mut Vec<PlanEntry>, entry: PlanEntry) {
    match plans.iter_mut().find(|p| p.title == entry.title) {
        Some(existing) => *existing = entry,
        None => plans.push(entry),
    }
}

/// Titles that are unseen or whose URL changed since the last cycle
pub fn detect_new_plans(last: &[PlanEntry], current: &[PlanEntry]) -> HashSet<String> {
    current
        .iter()
        .filter(|plan| !last.iter().any(|old| old.title == plan.title && old.url == plan.url))
        .map(|plan| plan.title.clone())
        .collect()
}

/// Write converted student plans as `<YYYY-MM-DD>.html` into `dir`.
///
/// Documents without a date in their `mon_title` are skipped; for a date
/// seen twice the first document wins.
pub fn store_student_plans(documents: &[String], dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen_dates = HashSet::new();
    let mut written = Vec::new();

    for document in documents {
        let Some(date) = extract_title(document).as_deref().and_then(extract_date) else {
            warn!("Converted plan has no date in its title, skipping");
            continue;
        };
        if !seen_dates.insert(date) {
            debug!("Duplicate converted plan for {}, keeping the first", date);
            continue;
        }

        let file_name = format!("{}.html", date.format("%Y-%m-%d"));
        written.push(FileManager::save_plan(dir, &file_name, document)?);
    }

    Ok(written)
}

/// Polls DSB and publishes changes
#[derive(Debug)]
pub struct SubstitutionBot {
    source: Arc<dyn PlanSource>,
    teacher_source: Option<Arc<dyn PlanSource>>,
    notifier: Arc<dyn Notifier>,
    git: Option<GitManager>,
    converter: PlanConverter,
    plans_dir: PathBuf,
    student_plans_dir: PathBuf,
    last_plans: Vec<PlanEntry>,
    converted_urls: HashSet<String>,
}

impl SubstitutionBot {
    pub fn new(
        source: Arc<dyn PlanSource>,
        notifier: Arc<dyn Notifier>,
        converter: PlanConverter,
        plans_dir: PathBuf,
    ) -> Self {
        let student_plans_dir = plans_dir.join("students");
        Self {
            source,
            teacher_source: None,
            notifier,
            git: None,
            converter,
            plans_dir,
            student_plans_dir,
            last_plans: Vec::new(),
            converted_urls: HashSet::new(),
        }
    }

    /// Also convert plans published to a teacher account
    pub fn with_teacher_source(mut self, source: Arc<dyn PlanSource>, student_plans_dir: PathBuf) -> Self {
        self.teacher_source = Some(source);
        self.student_plans_dir = student_plans_dir;
        self
    }

    /// Push changes to this repository after each update
    pub fn with_git(mut self, git: GitManager) -> Self {
        self.git = Some(git);
        self
    }

    /// Plans known after the last update
    pub fn last_plans(&self) -> &[PlanEntry] {
        &self.last_plans
    }

    /// Prepare the repository and plan directory
    pub async fn initialize(&self) -> Result<(), AppError> {
        if let Some(git) = &self.git {
            if let Err(e) = git.initialize_repo().await {
                error!("Critical git error on startup: {}", e);
                self.notifier
                    .send_warning(&format!("⚠️ Kritischer Git-Fehler beim Start: {}", e))
                    .await;
            }
        }
        FileManager::ensure_dir(&self.plans_dir)?;
        Ok(())
    }

    /// One polling cycle; returns whether anything changed
    pub async fn run_cycle(&mut self) -> Result<bool, AppError> {
        let student_updated = self.poll_student_plans().await?;
        let converted = self.poll_teacher_plans().await?;

        if !student_updated && !converted {
            debug!("No new updates found");
            return Ok(false);
        }

        if let Some(git) = &self.git {
            git.push_changes(DEFAULT_COMMIT_MESSAGE).await;
        }
        Ok(true)
    }

    async fn poll_student_plans(&mut self) -> Result<bool, AppError> {
        let links = self.source.fetch_menu_links().await;
        if links.is_empty() {
            return Ok(false);
        }

        let mut current = Vec::new();
        let mut pages = Vec::new();
        for link in links {
            let (title, page) = match self.source.fetch_page(&link.detail).await {
                Ok(html) => {
                    let title = extract_title(&html).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
                    (title, Some(html))
                }
                Err(e) => {
                    warn!("Could not fetch title for {}: {}", link.detail, e);
                    (UNKNOWN_TITLE.to_string(), None)
                }
            };
            pages.push((title.clone(), page));
            upsert_plan(&mut current, PlanEntry { title, url: link.detail });
        }

        let new_keys = detect_new_plans(&self.last_plans, &current);
        if new_keys.is_empty() {
            return Ok(false);
        }

        for plan in current.iter().filter(|p| new_keys.contains(&p.title)) {
            let page = pages
                .iter()
                .rev()
                .find(|(title, page)| *title == plan.title && page.is_some())
                .and_then(|(_, page)| page.as_deref());
            let Some(html) = page else {
                error!("Could not save HTML for {}: page unavailable", plan.url);
                continue;
            };
            match FileManager::save_plan(&self.plans_dir, &plan_file_name(&plan.title), html) {
                Ok(path) => info!("Plan saved: {:?}", path),
                Err(e) => error!("Could not save HTML for {}: {}", plan.url, e),
            }
        }

        let mut sorted: Vec<&String> = new_keys.iter().collect();
        sorted.sort();
        info!("Updates found: {:?}", sorted);

        self.notifier.send_plan_update(&current, &new_keys).await;
        self.last_plans = current;
        Ok(true)
    }

    async fn poll_teacher_plans(&mut self) -> Result<bool, AppError> {
        let Some(source) = self.teacher_source.clone() else {
            return Ok(false);
        };

        let mut converted_any = false;
        for link in source.fetch_menu_links().await {
            if self.converted_urls.contains(&link.detail) {
                continue;
            }

            let html = match source.fetch_page(&link.detail).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Could not fetch teacher plan {}: {}", link.detail, e);
                    continue;
                }
            };

            let documents = self.converter.convert(&html);
            if documents.is_empty() {
                warn!("Teacher plan {} produced no student plans", link.detail);
                continue;
            }

            let written = store_student_plans(&documents, &self.student_plans_dir)?;
            info!("Converted teacher plan {} into {} student plan(s)", link.detail, written.len());
            converted_any |= !written.is_empty();
            self.converted_urls.insert(link.detail);
        }

        Ok(converted_any)
    }

    /// Run cycles forever, once per minute
    pub async fn start(&mut self) {
        info!("Bot started");
        self.notifier.send_warning("🤖 Bot wurde neu gestartet.").await;

        loop {
            if let Err(e) = self.run_cycle().await {
                let message = format!("Fehler im Hauptloop: {}", e);
                error!("{}", message);
                self.notifier.send_warning(&format!(" [CRASH] {}", message)).await;
            }

            tokio::time::sleep(until_next_minute()).await;
        }
    }
}

/// Time left until the next full minute
pub fn until_next_minute() -> Duration {
    let second = chrono::Local::now().second().min(59);
    Duration::from_secs(u64::from(60 - second))
}
