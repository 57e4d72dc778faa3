//! statscrape - paginated player statistics scraper
//!
//! Drives a headless Chromium session through JavaScript-rendered stats
//! tables, follows their pagination, deduplicates players, and writes one CSV
//! per target.
//!
//! # Architecture
//!
//! ```text
//! Targets ──▶ TargetOrchestrator ──▶ SessionController ──▶ RenderedPage (CDP)
//!                   │                                          │
//!                   ▼                                          ▼
//!             CsvExporter  ◀── dedup ◀── RowExtractor ◀── DOM snapshot
//!                                             ▲
//!                                             │
//!                                   PaginationDetector (advance)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use statscrape::browser::{BrowserConfig, ChromiumSessionFactory, SessionController};
//! use statscrape::config::variants;
//! use statscrape::export::CsvExporter;
//! use statscrape::orchestrator::TargetOrchestrator;
//! use statscrape::target::TargetTiming;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let targets = variants::dunkest_weeks("2024-2025", &[1, 2], Path::new("results"), TargetTiming::default())?;
//!
//!     let factory = ChromiumSessionFactory::new(BrowserConfig::default());
//!     let session = SessionController::start(factory).await?;
//!     let mut orchestrator = TargetOrchestrator::new(session, CsvExporter);
//!
//!     let tally = orchestrator.run(&targets).await;
//!     println!("{}/{} targets succeeded", tally.succeeded, tally.total());
//!     orchestrator.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod extraction;
pub mod orchestrator;
pub mod pagination;
pub mod target;

// Re-exports for convenience
pub use browser::{RenderedPage, SessionController, SessionFactory};
pub use config::ScraperConfig;
pub use error::{Error, Result};
pub use export::{CsvExporter, RecordExporter};
pub use extraction::{PlayerRecord, RowExtractor, TableLayout};
pub use orchestrator::{RunTally, TargetOrchestrator};
pub use target::ScrapeTarget;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
