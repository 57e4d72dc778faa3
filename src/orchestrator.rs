//! Target orchestration
//!
//! Runs targets one at a time against the single live session. Each target
//! goes through the page loop (extract, dedup, check termination, detect,
//! advance) and, when it produced records, is handed to the exporter. A
//! failing target is logged and tallied; the run moves on to the next one,
//! relaunching the browser first when the failure was a lost connection.

use crate::browser::{RenderedPage, SessionController, SessionFactory};
use crate::dedup::{self, Partition, SeenKeySet};
use crate::error::{Error, ExtractionError, Result};
use crate::export::RecordExporter;
use crate::extraction::{PlayerRecord, RowExtractor};
use crate::pagination::{
    check_termination, AdvanceOutcome, PaginationDetector, PaginationState, StopReason,
};
use crate::target::ScrapeTarget;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Records gathered for one target
#[derive(Debug)]
pub struct TargetResult {
    /// Deduplicated records in first-seen order
    pub records: Vec<PlayerRecord>,
    /// Pages extracted
    pub pages_visited: usize,
    /// Why the page loop ended
    pub stop_reason: StopReason,
}

/// Run the page loop for `target` on `page`
#[instrument(skip(page, target), fields(label = %target.label))]
pub async fn scrape_target<P: RenderedPage>(page: &mut P, target: &ScrapeTarget) -> Result<TargetResult> {
    let layout = &target.layout;
    let timing = &target.timing;
    let rows = RowExtractor::new(layout.clone())?;
    let detector = PaginationDetector::new(&layout.pagination)?;

    page.navigate(&target.url, timing.navigation_timeout).await?;
    debug!("Waiting {:?} for content to load", timing.settle_wait);
    page.wait(timing.settle_wait).await;

    let mut state = PaginationState::new(timing.page_cap);
    let mut seen = SeenKeySet::new();
    let mut records = Vec::new();

    let stop_reason = loop {
        let page_records = rows.extract_page(page).await?;
        let found = page_records.len();
        let Partition { fresh, duplicates } = dedup::partition(page_records, &mut seen);
        let new_count = fresh.len();
        records.extend(fresh);

        info!(
            "Found {} records on page {} ({} new, {} duplicates)",
            found, state.page, new_count, duplicates
        );

        if let Some(reason) = check_termination(new_count, duplicates, &state) {
            if reason == StopReason::PageCap {
                warn!("Reached maximum page limit ({}), stopping pagination", state.cap);
            } else {
                info!("Stopping pagination: {}", reason);
            }
            break reason;
        }

        if layout.expected_page_size.is_some_and(|expected| found < expected) {
            debug!("Page {} has only {} records, likely the last page", state.page, found);
        }

        let decision = detector.detect_page(page).await?;
        state.more_pages = decision.more_pages;
        let action = match decision.action {
            Some(action) if decision.more_pages => action,
            _ => {
                info!("No next page found, stopping pagination");
                break StopReason::NoMorePages;
            }
        };

        match detector.advance(page, &action, &rows, timing.advance_wait).await? {
            AdvanceOutcome::Clicked | AdvanceOutcome::Scrolled => state.advance(),
            AdvanceOutcome::Exhausted => {
                info!("Could not advance past page {}, stopping pagination", state.page);
                break StopReason::AdvanceFailed;
            }
        }
    };

    info!(
        "Found {} total records across {} pages",
        records.len(),
        state.page
    );

    Ok(TargetResult {
        records,
        pages_visited: state.page,
        stop_reason,
    })
}

/// Outcome of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    /// Records were exported
    Succeeded {
        /// Records written
        records: usize,
        /// Pages visited
        pages: usize,
        /// Why pagination stopped
        stop_reason: StopReason,
        /// Where the CSV went
        output: PathBuf,
    },
    /// The target failed
    Failed {
        /// Error message
        error: String,
        /// Whether the session was relaunched afterwards
        reconnected: bool,
    },
}

/// Per-target line of the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    /// Target label
    pub label: String,
    /// Outcome
    pub status: TargetStatus,
}

/// Success/failure tally of a run
#[derive(Debug, Default, Clone)]
pub struct RunTally {
    /// Targets exported
    pub succeeded: usize,
    /// Targets failed
    pub failed: usize,
    /// One report per target, in run order
    pub reports: Vec<TargetReport>,
}

impl RunTally {
    /// Targets attempted
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether no target failed
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Count a target that never ran, such as a config entry that failed to resolve
    pub fn record_rejected(&mut self, label: impl Into<String>, error: &Error) {
        self.failed += 1;
        self.reports.push(TargetReport {
            label: label.into(),
            status: TargetStatus::Failed {
                error: error.to_string(),
                reconnected: false,
            },
        });
    }

    /// Process exit status for this run
    pub fn exit_code(&self) -> ExitCode {
        if self.all_succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Drives a list of targets through one session
pub struct TargetOrchestrator<F: SessionFactory, E: RecordExporter> {
    session: SessionController<F>,
    exporter: E,
    inter_target_delay: Duration,
}

impl<F: SessionFactory, E: RecordExporter> TargetOrchestrator<F, E> {
    /// Orchestrator over an existing session controller
    pub fn new(session: SessionController<F>, exporter: E) -> Self {
        Self {
            session,
            exporter,
            inter_target_delay: Duration::from_secs(1),
        }
    }

    /// Set the pause between targets
    pub fn with_inter_target_delay(mut self, delay: Duration) -> Self {
        self.inter_target_delay = delay;
        self
    }

    /// The session controller
    pub fn session(&self) -> &SessionController<F> {
        &self.session
    }

    /// Run every target in order and tally the outcomes
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run(&mut self, targets: &[ScrapeTarget]) -> RunTally {
        let mut tally = RunTally::default();
        if targets.is_empty() {
            warn!("No targets to scrape");
            return tally;
        }

        info!("Starting run over {} targets", targets.len());

        for (index, target) in targets.iter().enumerate() {
            info!("Scraping {} ({}/{})", target.label, index + 1, targets.len());

            let status = match self.run_target(target).await {
                Ok(status) => {
                    tally.succeeded += 1;
                    status
                }
                Err(e) => {
                    error!("{} failed: {}", target.label, e);
                    tally.failed += 1;
                    let reconnected = e.is_session_lost() && self.session.reconnect().await;
                    TargetStatus::Failed {
                        error: e.to_string(),
                        reconnected,
                    }
                }
            };
            tally.reports.push(TargetReport {
                label: target.label.clone(),
                status,
            });

            if index + 1 < targets.len() && !self.inter_target_delay.is_zero() {
                tokio::time::sleep(self.inter_target_delay).await;
            }
        }

        info!(
            "Run complete: {}/{} succeeded, {}/{} failed",
            tally.succeeded,
            tally.total(),
            tally.failed,
            tally.total()
        );
        tally
    }

    /// Scrape and export a single target
    pub async fn run_target(&mut self, target: &ScrapeTarget) -> Result<TargetStatus> {
        let page = self.session.ensure().await?;
        let result = scrape_target(page, target).await?;

        if result.records.is_empty() {
            return Err(ExtractionError::NoRecords(target.label.clone()).into());
        }

        self.exporter
            .export(&target.output, &target.layout.export_header(), &result.records)?;

        Ok(TargetStatus::Succeeded {
            records: result.records.len(),
            pages: result.pages_visited,
            stop_reason: result.stop_reason,
            output: target.output.clone(),
        })
    }

    /// Close the session
    pub async fn shutdown(mut self) {
        self.session.close().await;
    }
}
