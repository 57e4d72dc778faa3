//! Run configuration
//!
//! A run is described either by a TOML file or by picking a built-in variant
//! on the command line. Either way it resolves to a list of [`ScrapeTarget`]s
//! before any browser work starts.
//!
//! ```toml
//! [run]
//! output_dir = "results"
//! page_cap = 20
//!
//! [[targets]]
//! label = "Week {WEEK}"
//! variant = "dunkest"
//! url = "https://www.dunkest.com/...&weeks[]={WEEK}&..."
//! params = "1-43"
//! output = "2024-2025/week_{WEEK:02}.csv"
//! ```

pub mod variants;

use crate::browser::BrowserConfig;
use crate::error::{ConfigError, Error, Result};
use crate::extraction::TableLayout;
use crate::target::{parse_param_list, validate_url, ScrapeTarget, TargetTemplate, TargetTiming};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Run-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Relative target outputs are placed under this directory
    pub output_dir: PathBuf,
    /// Pause between consecutive targets
    pub inter_target_delay_ms: u64,
    /// Wait after navigation before the first extraction
    pub settle_wait_ms: u64,
    /// Wait after activating a pagination control
    pub advance_wait_ms: u64,
    /// Navigation timeout
    pub navigation_timeout_ms: u64,
    /// Maximum pages per target
    pub page_cap: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            inter_target_delay_ms: 1000,
            settle_wait_ms: 5000,
            advance_wait_ms: 2000,
            navigation_timeout_ms: 30000,
            page_cap: 20,
        }
    }
}

impl RunConfig {
    /// Timing shared by every target of the run
    pub fn timing(&self) -> TargetTiming {
        TargetTiming {
            settle_wait: Duration::from_millis(self.settle_wait_ms),
            advance_wait: Duration::from_millis(self.advance_wait_ms),
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms),
            page_cap: self.page_cap,
        }
    }

    /// Pause between targets
    pub fn inter_target_delay(&self) -> Duration {
        Duration::from_millis(self.inter_target_delay_ms)
    }
}

fn default_param() -> String {
    "WEEK".to_string()
}

/// One `[[targets]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Label, may contain the parameter placeholder
    pub label: Option<String>,
    /// Layout name: a `[[layouts]]` entry or a built-in variant
    pub variant: String,
    /// URL, may contain the parameter placeholder
    pub url: String,
    /// CSV path (relative to `run.output_dir` unless absolute)
    pub output: PathBuf,
    /// Parameter list such as `1-43`; expands into one target per value
    pub params: Option<String>,
    /// Placeholder name the parameter fills
    #[serde(default = "default_param")]
    pub param: String,
    /// Per-target page cap
    pub page_cap: Option<usize>,
    /// Per-target settle wait
    pub settle_wait_ms: Option<u64>,
}

/// A `[[targets]]` entry that could not be turned into runnable targets
#[derive(Debug)]
pub struct RejectedTarget {
    /// Entry label, or its variant when unlabelled
    pub label: String,
    /// Why the entry was rejected
    pub error: Error,
}

/// Targets resolved from a config file
#[derive(Debug, Default)]
pub struct TargetPlan {
    /// Runnable targets in file order
    pub targets: Vec<ScrapeTarget>,
    /// Entries that failed to resolve; each counts as a failed target
    pub rejected: Vec<RejectedTarget>,
}

/// Complete run configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Run-wide settings
    pub run: RunConfig,
    /// Custom layouts, looked up before the built-ins
    pub layouts: Vec<TableLayout>,
    /// Targets in run order
    pub targets: Vec<TargetConfig>,
}

impl ScraperConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        for layout in &config.layouts {
            layout.schema()?;
        }
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Resolve a layout name
    pub fn layout(&self, name: &str) -> Result<Arc<TableLayout>> {
        self.layouts
            .iter()
            .find(|l| l.name == name)
            .cloned()
            .or_else(|| variants::layout(name))
            .map(Arc::new)
            .ok_or_else(|| ConfigError::UnknownVariant(name.to_string()).into())
    }

    /// Expand every target entry, in file order.
    ///
    /// A bad entry is set aside in [`TargetPlan::rejected`] and the rest still
    /// run. It is an error only when nothing is left to run.
    pub fn targets(&self) -> Result<TargetPlan> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets.into());
        }

        let mut plan = TargetPlan::default();
        for entry in &self.targets {
            match self.expand(entry) {
                Ok(targets) => plan.targets.extend(targets),
                Err(e) => {
                    let label = entry.label.clone().unwrap_or_else(|| entry.variant.clone());
                    error!("Skipping target entry {}: {}", label, e);
                    plan.rejected.push(RejectedTarget { label, error: e });
                }
            }
        }

        if plan.targets.is_empty() {
            return Err(match plan.rejected.into_iter().next() {
                Some(rejected) => rejected.error,
                None => ConfigError::NoTargets.into(),
            });
        }
        Ok(plan)
    }

    fn expand(&self, entry: &TargetConfig) -> Result<Vec<ScrapeTarget>> {
        let layout = self.layout(&entry.variant)?;
        let mut timing = self.run.timing();
        if let Some(cap) = entry.page_cap {
            timing.page_cap = cap;
        }
        if let Some(ms) = entry.settle_wait_ms {
            timing.settle_wait = Duration::from_millis(ms);
        }
        let output = self.run.output_dir.join(&entry.output);

        match &entry.params {
            Some(params) => TargetTemplate {
                param: entry.param.clone(),
                label: entry
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("{} {{{}}}", entry.variant, entry.param)),
                url: entry.url.clone(),
                output: output.to_string_lossy().into_owned(),
                layout,
                timing,
            }
            .expand(&parse_param_list(params)?),
            None => {
                validate_url(&entry.url)?;
                let label = entry.label.clone().unwrap_or_else(|| entry.variant.clone());
                Ok(vec![ScrapeTarget::new(label, entry.url.clone(), layout, output).with_timing(timing)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r##"
        [browser]
        headless = false

        [run]
        output_dir = "out"
        page_cap = 5
        inter_target_delay_ms = 0

        [[layouts]]
        name = "simple"
        table_locator = "#stats"
        name_field = "player"
        columns = [
            { field = "player", title = "Player", source = { position = 0 } },
        ]

        [[targets]]
        label = "Week {WEEK}"
        variant = "dunkest"
        url = "https://stats.test/table?weeks[]={WEEK}"
        params = "1-2"
        output = "2024-2025/week_{WEEK:02}.csv"

        [[targets]]
        variant = "simple"
        url = "https://other.test/stats"
        output = "simple.csv"
        page_cap = 1
    "##;

    #[test]
    fn test_parse_and_expand() {
        let config = ScraperConfig::from_toml_str(SAMPLE).unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.run.settle_wait_ms, 5000);

        let plan = config.targets().unwrap();
        assert!(plan.rejected.is_empty());
        let targets = plan.targets;
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].label, "Week 1");
        assert_eq!(targets[1].url, "https://stats.test/table?weeks[]=2");
        assert_eq!(
            targets[1].output,
            Path::new("out").join("2024-2025").join("week_02.csv")
        );
        assert_eq!(targets[0].timing.page_cap, 5);

        assert_eq!(targets[2].label, "simple");
        assert_eq!(targets[2].layout.name, "simple");
        assert_eq!(targets[2].timing.page_cap, 1);
    }

    #[test]
    fn test_unknown_variant() {
        let config = ScraperConfig::from_toml_str(
            r#"
            [[targets]]
            variant = "espn"
            url = "https://x.test"
            output = "x.csv"
            "#,
        )
        .unwrap();
        let err = config.targets().unwrap_err();
        assert!(err.to_string().contains("espn"));
    }

    #[test]
    fn test_bad_entry_does_not_block_the_others() {
        let config = ScraperConfig::from_toml_str(
            r#"
            [[targets]]
            variant = "givemestats"
            url = "https://stats.test/first"
            output = "first.csv"

            [[targets]]
            label = "ESPN"
            variant = "espn"
            url = "https://x.test"
            output = "x.csv"

            [[targets]]
            variant = "dunkest"
            url = "https://stats.test/w?week={WEEK}"
            params = "3-1"
            output = "w.csv"

            [[targets]]
            variant = "dunkest"
            url = "https://stats.test/last"
            output = "last.csv"
            "#,
        )
        .unwrap();

        let plan = config.targets().unwrap();
        let urls: Vec<&str> = plan.targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["https://stats.test/first", "https://stats.test/last"]);

        assert_eq!(plan.rejected.len(), 2);
        assert_eq!(plan.rejected[0].label, "ESPN");
        assert!(plan.rejected[0].error.to_string().contains("espn"));
        assert_eq!(plan.rejected[1].label, "dunkest");
    }

    #[test]
    fn test_empty_target_list() {
        let config = ScraperConfig::from_toml_str("").unwrap();
        assert!(config.targets().is_err());
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ScraperConfig::from_toml_str("[run\npage_cap = 1").is_err());
    }

    #[test]
    fn test_invalid_custom_layout_rejected() {
        let result = ScraperConfig::from_toml_str(
            r#"
            [[layouts]]
            name = "broken"
            table_locator = "table"
            name_field = "player"
            columns = []
            "#,
        );
        assert!(result.is_err());
    }
}
