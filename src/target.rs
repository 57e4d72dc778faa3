//! Scrape targets
//!
//! A target is one independent scrape job: a URL, the layout of the table on
//! it, where the result goes, and the timing knobs for the run. Targets are
//! built from configuration before anything runs and are never mutated.

use crate::error::{ConfigError, NavigationError, Result};
use crate::extraction::TableLayout;
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// `{NAME}` or `{NAME:0W}` placeholders in URL and output templates
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_]+)(?::0(\d))?\}").expect("valid placeholder pattern")
});

/// Timing and limit parameters of a target run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTiming {
    /// Wait after navigation before the first extraction
    pub settle_wait: Duration,
    /// Wait after activating a pagination control
    pub advance_wait: Duration,
    /// Navigation timeout
    pub navigation_timeout: Duration,
    /// Maximum pages visited
    pub page_cap: usize,
}

impl Default for TargetTiming {
    fn default() -> Self {
        Self {
            settle_wait: Duration::from_secs(5),
            advance_wait: Duration::from_secs(2),
            navigation_timeout: Duration::from_millis(30000),
            page_cap: 20,
        }
    }
}

/// One scrape job
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    /// Human-readable label used in logs and the run summary
    pub label: String,
    /// Page URL
    pub url: String,
    /// Layout of the stats table
    pub layout: Arc<TableLayout>,
    /// CSV destination
    pub output: PathBuf,
    /// Timing and limits
    pub timing: TargetTiming,
}

impl ScrapeTarget {
    /// Create a target with default timing
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        layout: Arc<TableLayout>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            layout,
            output: output.into(),
            timing: TargetTiming::default(),
        }
    }

    /// Replace the timing parameters
    pub fn with_timing(mut self, timing: TargetTiming) -> Self {
        self.timing = timing;
        self
    }
}

/// Substitute `value` for every `{name}` / `{name:0W}` placeholder.
/// Other placeholders are left untouched.
pub fn render_template(template: &str, name: &str, value: u32) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            if !caps[1].eq_ignore_ascii_case(name) {
                return caps[0].to_string();
            }
            match caps.get(2).and_then(|w| w.as_str().parse::<usize>().ok()) {
                Some(width) => format!("{value:0width$}"),
                None => value.to_string(),
            }
        })
        .into_owned()
}

/// Names of the placeholders used in `template`
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check that `url` is an absolute http(s) or file URL
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed =
        url::Url::parse(url).map_err(|e| NavigationError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        other => Err(NavigationError::InvalidUrl(format!(
            "unsupported scheme '{other}' in {url}"
        ))
        .into()),
    }
}

/// Parse a parameter list such as `1-5,8,10-12`
pub fn parse_param_list(spec: &str) -> Result<Vec<u32>> {
    let invalid = || ConfigError::InvalidParams(spec.to_string());
    let mut values = Vec::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.trim().parse().map_err(|_| invalid())?;
                let end: u32 = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid().into());
                }
                values.extend(start..=end);
            }
            None => values.push(part.parse().map_err(|_| invalid())?),
        }
    }

    if values.is_empty() {
        return Err(invalid().into());
    }
    Ok(values)
}

/// Blueprint for a family of targets differing only in one numeric parameter
#[derive(Debug, Clone)]
pub struct TargetTemplate {
    /// Placeholder name (`WEEK`)
    pub param: String,
    /// Label template
    pub label: String,
    /// URL template
    pub url: String,
    /// Output path template
    pub output: String,
    /// Layout shared by every expanded target
    pub layout: Arc<TableLayout>,
    /// Timing shared by every expanded target
    pub timing: TargetTiming,
}

impl TargetTemplate {
    /// One target per value, in the given order
    pub fn expand(&self, values: &[u32]) -> Result<Vec<ScrapeTarget>> {
        values
            .iter()
            .map(|&value| {
                let url = render_template(&self.url, &self.param, value);
                validate_url(&url)?;
                Ok(ScrapeTarget {
                    label: render_template(&self.label, &self.param, value),
                    url,
                    layout: Arc::clone(&self.layout),
                    output: PathBuf::from(render_template(&self.output, &self.param, value)),
                    timing: self.timing,
                })
            })
            .collect()
    }
}
