//! Pagination detection and advancing
//!
//! After each page is extracted the detector inspects the rendered DOM and
//! decides whether another page exists and which control to activate. Two
//! heuristics are tried in order:
//!
//! 1. an explicit, enabled and visible "next" control (`»`, `>`, `Next`, ...)
//! 2. numbered pagination: the highest page number seen against the page
//!    marked as current (page 1 when nothing is marked)
//!
//! Advancing clicks the chosen control and waits for the re-render. When the
//! control has disappeared by click time, a scroll-to-bottom probe checks
//! whether more rows load in place.

use crate::browser::{ElementPath, RenderedPage};
use crate::extraction::dom::{element_path, is_current, is_disabled, is_hidden, selector, text_of};
use crate::extraction::layout::PaginationVocabulary;
use crate::extraction::RowExtractor;
use crate::error::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid page number pattern"));

fn is_ellipsis(text: &str) -> bool {
    matches!(text, "..." | "…")
}

/// Per-target pagination progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page, 1-based
    pub page: usize,
    /// Whether the last detection reported more pages
    pub more_pages: bool,
    /// Maximum number of pages to visit
    pub cap: usize,
}

impl PaginationState {
    /// Fresh state at page 1. A cap of 0 is treated as 1.
    pub fn new(cap: usize) -> Self {
        Self {
            page: 1,
            more_pages: true,
            cap: cap.max(1),
        }
    }

    /// Whether the page cap has been reached
    pub fn at_cap(&self) -> bool {
        self.page >= self.cap
    }

    /// Move to the next page
    pub fn advance(&mut self) {
        self.page += 1;
    }
}

/// Which heuristic produced a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heuristic {
    /// An explicit next control
    NextControl,
    /// Numbered page links
    Numbered {
        /// Current page (1 when unmarked)
        current: u32,
        /// Highest page number present
        last: u32,
    },
    /// No pagination controls
    None,
}

/// How to get to the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceAction {
    /// Activate the element at this path
    Activate(ElementPath),
    /// More pages exist but no control to activate was found
    Probe,
}

/// Result of inspecting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationDecision {
    /// Whether another page should be fetched
    pub more_pages: bool,
    /// How to fetch it (present iff `more_pages`)
    pub action: Option<AdvanceAction>,
    /// Heuristic that decided
    pub heuristic: Heuristic,
}

impl PaginationDecision {
    fn done(heuristic: Heuristic) -> Self {
        Self {
            more_pages: false,
            action: None,
            heuristic,
        }
    }
}

/// Outcome of trying to advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A control was clicked and the page re-rendered
    Clicked,
    /// No click, but scrolling loaded more rows
    Scrolled,
    /// Neither worked
    Exhausted,
}

/// Why a target's page loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page produced no new records
    NoNewRecords,
    /// Every record on the page had been seen before
    AllDuplicates,
    /// The page cap was reached
    PageCap,
    /// No further pages detected
    NoMorePages,
    /// Advancing neither clicked nor loaded more rows
    AdvanceFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::NoNewRecords => "no new records",
            StopReason::AllDuplicates => "all records duplicated",
            StopReason::PageCap => "page cap reached",
            StopReason::NoMorePages => "no more pages",
            StopReason::AdvanceFailed => "could not advance",
        };
        f.write_str(text)
    }
}

/// Stop checks applied after each page, in order. Running out of pages is
/// decided separately by the detector.
pub fn check_termination(
    new_records: usize,
    duplicates: usize,
    state: &PaginationState,
) -> Option<StopReason> {
    if new_records == 0 {
        return Some(if duplicates > 0 {
            StopReason::AllDuplicates
        } else {
            StopReason::NoNewRecords
        });
    }
    if state.at_cap() {
        return Some(StopReason::PageCap);
    }
    None
}

/// Inspects pagination controls in a DOM snapshot
pub struct PaginationDetector {
    controls: Selector,
    next_labels: Vec<String>,
    current_classes: Vec<String>,
}

impl PaginationDetector {
    /// Build a detector from a vocabulary
    pub fn new(vocabulary: &PaginationVocabulary) -> Result<Self> {
        Ok(Self {
            controls: selector(&vocabulary.controls)?,
            next_labels: vocabulary.next_labels.clone(),
            current_classes: vocabulary.current_classes.clone(),
        })
    }

    /// Decide whether and how to advance. The next-control heuristic wins over
    /// numbered pagination.
    pub fn detect(&self, doc: &Html) -> PaginationDecision {
        if let Some(path) = self.next_control(doc) {
            return PaginationDecision {
                more_pages: true,
                action: Some(AdvanceAction::Activate(path)),
                heuristic: Heuristic::NextControl,
            };
        }
        self.numbered(doc)
            .unwrap_or_else(|| PaginationDecision::done(Heuristic::None))
    }

    fn next_control(&self, doc: &Html) -> Option<ElementPath> {
        doc.select(&self.controls)
            .find(|el| {
                let text = text_of(*el);
                self.next_labels.iter().any(|label| *label == text)
                    && !is_disabled(*el)
                    && !is_hidden(*el)
            })
            .map(element_path)
    }

    fn numbered(&self, doc: &Html) -> Option<PaginationDecision> {
        let candidates: Vec<(ElementRef<'_>, String)> = doc
            .select(&self.controls)
            .map(|el| (el, text_of(el)))
            .filter(|(_, text)| PAGE_NUMBER.is_match(text) || is_ellipsis(text))
            .collect();

        let number = |text: &str| text.parse::<u32>().ok();
        let last = candidates.iter().filter_map(|(_, t)| number(t)).max()?;

        let current = candidates
            .iter()
            .find(|(el, _)| is_current(*el, &self.current_classes))
            .and_then(|(_, t)| number(t))
            .unwrap_or(1);

        let heuristic = Heuristic::Numbered { current, last };
        if current >= last {
            return Some(PaginationDecision::done(heuristic));
        }

        let wanted = (current + 1).to_string();
        let action = candidates
            .iter()
            .find(|(_, t)| *t == wanted)
            .map(|(el, _)| AdvanceAction::Activate(element_path(*el)))
            .unwrap_or(AdvanceAction::Probe);

        Some(PaginationDecision {
            more_pages: true,
            action: Some(action),
            heuristic,
        })
    }

    /// Inspect the live page
    pub async fn detect_page<P: RenderedPage>(&self, page: &mut P) -> Result<PaginationDecision> {
        let decision = page.evaluate(|doc| self.detect(doc)).await?;
        debug!(?decision, "Pagination detected");
        Ok(decision)
    }

    /// Carry out `action`, waiting `settle` after any page change
    #[instrument(skip(self, page, rows))]
    pub async fn advance<P: RenderedPage>(
        &self,
        page: &mut P,
        action: &AdvanceAction,
        rows: &RowExtractor,
        settle: Duration,
    ) -> Result<AdvanceOutcome> {
        if let AdvanceAction::Activate(path) = action {
            if page.click(path).await? {
                page.wait(settle).await;
                return Ok(AdvanceOutcome::Clicked);
            }
            warn!("Pagination control vanished before click: {}", path);
        }

        let before = page.evaluate(|doc| rows.row_count(doc)).await?;
        page.scroll_to_bottom().await?;
        page.wait(settle).await;
        let after = page.evaluate(|doc| rows.row_count(doc)).await?;

        if after > before {
            info!("Scrolling loaded more rows ({} -> {})", before, after);
            Ok(AdvanceOutcome::Scrolled)
        } else {
            debug!("Scroll probe found no new rows");
            Ok(AdvanceOutcome::Exhausted)
        }
    }
}
