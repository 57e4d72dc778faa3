//! Layout variants
//!
//! A layout describes one site/page structure: where the table lives, which
//! rows are headers, and how cell positions map to named fields. Layouts are
//! plain configuration values; several can coexist in one process.

use super::record::RecordSchema;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Header vocabulary used when no layout-specific one is given
pub const DEFAULT_HEADER_KEYWORDS: &[&str] =
    &["player", "team", "rank", "position", "games played"];

/// Where a column's value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// Fixed cell position in the row (0-based)
    Position(usize),
    /// First header cell whose lowercased text contains every keyword
    Header(Vec<String>),
    /// 1-based position of the record on the current page
    Rank,
}

/// One output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Field name (record key)
    pub field: String,
    /// Column title in the export header
    pub title: String,
    /// Value source
    pub source: ColumnSource,
}

impl ColumnSpec {
    /// Positional column
    pub fn at(field: &str, title: &str, position: usize) -> Self {
        Self {
            field: field.to_string(),
            title: title.to_string(),
            source: ColumnSource::Position(position),
        }
    }

    /// Header-resolved column
    pub fn header(field: &str, title: &str, keywords: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            title: title.to_string(),
            source: ColumnSource::Header(keywords.iter().map(|k| k.to_lowercase()).collect()),
        }
    }

    /// Page-rank column
    pub fn rank(field: &str, title: &str) -> Self {
        Self {
            field: field.to_string(),
            title: title.to_string(),
            source: ColumnSource::Rank,
        }
    }
}

/// Player identity carried by a dedicated link element inside the row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameLink {
    /// Selector for the link inside a row
    pub link: String,
    /// Selector (inside the link) for the full display name
    pub long_name: Option<String>,
    /// Selector (inside the link) for the abbreviated display name
    pub short_name: Option<String>,
}

/// Vocabulary for pagination controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationVocabulary {
    /// Selector for link/button-like elements
    pub controls: String,
    /// Exact (trimmed) texts that mean "next page"
    pub next_labels: Vec<String>,
    /// Class names that mark the current page
    pub current_classes: Vec<String>,
}

impl Default for PaginationVocabulary {
    fn default() -> Self {
        Self {
            controls: "a, button, [role='button'], [aria-current='page']".to_string(),
            next_labels: ["»", ">", "Next", "Next page"]
                .into_iter()
                .map(String::from)
                .collect(),
            current_classes: vec!["active".to_string(), "current".to_string()],
        }
    }
}

/// Complete description of one layout variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Variant name
    pub name: String,
    /// Primary table locator
    pub table_locator: String,
    /// Container-scoped locator tried after the first `<table>` on the page
    pub secondary_locator: Option<String>,
    /// Preferred row scope
    #[serde(default = "default_body_rows")]
    pub body_rows: String,
    /// Row scope used when the preferred one matches nothing
    #[serde(default = "default_all_rows")]
    pub all_rows: String,
    /// Cell selector within a row
    #[serde(default = "default_cells")]
    pub cells: String,
    /// Rows whose lowercased text contains any of these are skipped
    #[serde(default = "default_header_keywords")]
    pub header_keywords: Vec<String>,
    /// Output columns in export order
    pub columns: Vec<ColumnSpec>,
    /// Field holding the player name
    pub name_field: String,
    /// Field holding the team
    pub team_field: Option<String>,
    /// Optional link-based name extraction
    pub name_link: Option<NameLink>,
    /// Pagination vocabulary
    #[serde(default)]
    pub pagination: PaginationVocabulary,
    /// Typical full-page record count; shorter pages are logged as probable last pages
    pub expected_page_size: Option<usize>,
}

fn default_body_rows() -> String {
    "tbody tr".to_string()
}

fn default_all_rows() -> String {
    "tr".to_string()
}

fn default_cells() -> String {
    "td".to_string()
}

fn default_header_keywords() -> Vec<String> {
    DEFAULT_HEADER_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl TableLayout {
    /// Start a layout with default row/cell selectors and header vocabulary
    pub fn new(name: &str, table_locator: &str, name_field: &str) -> Self {
        Self {
            name: name.to_string(),
            table_locator: table_locator.to_string(),
            secondary_locator: None,
            body_rows: default_body_rows(),
            all_rows: default_all_rows(),
            cells: default_cells(),
            header_keywords: default_header_keywords(),
            columns: Vec::new(),
            name_field: name_field.to_string(),
            team_field: None,
            name_link: None,
            pagination: PaginationVocabulary::default(),
            expected_page_size: None,
        }
    }

    /// Set the container-scoped fallback locator
    pub fn secondary_locator(mut self, locator: &str) -> Self {
        self.secondary_locator = Some(locator.to_string());
        self
    }

    /// Set the team field
    pub fn team_field(mut self, field: &str) -> Self {
        self.team_field = Some(field.to_string());
        self
    }

    /// Set the cell selector
    pub fn cells(mut self, selector: &str) -> Self {
        self.cells = selector.to_string();
        self
    }

    /// Replace the header vocabulary
    pub fn header_keywords(mut self, keywords: &[&str]) -> Self {
        self.header_keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Append a column
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Enable link-based name extraction
    pub fn name_link(mut self, link: NameLink) -> Self {
        self.name_link = Some(link);
        self
    }

    /// Set the expected full-page size
    pub fn expected_page_size(mut self, size: usize) -> Self {
        self.expected_page_size = Some(size);
        self
    }

    /// Locators in fallback order: primary, first table on the page, secondary
    pub fn table_locators(&self) -> Vec<&str> {
        let mut locators = vec![self.table_locator.as_str(), "table"];
        if let Some(secondary) = &self.secondary_locator {
            locators.push(secondary);
        }
        locators
    }

    /// Field name to column title, in export order
    pub fn export_header(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .map(|c| (c.field.clone(), c.title.clone()))
            .collect()
    }

    /// Derive the record schema for this layout
    pub fn schema(&self) -> Result<Arc<RecordSchema>> {
        let fields: Vec<String> = self.columns.iter().map(|c| c.field.clone()).collect();

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = fields.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(ConfigError::InvalidLayout(format!(
                "{}: duplicate field '{}'",
                self.name, dup
            ))
            .into());
        }

        let rank_fields: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.source == ColumnSource::Rank)
            .map(|c| c.field.as_str())
            .collect();
        if rank_fields.len() > 1 {
            return Err(ConfigError::InvalidLayout(format!(
                "{}: more than one rank column",
                self.name
            ))
            .into());
        }

        RecordSchema::new(
            fields,
            &self.name_field,
            self.team_field.as_deref(),
            rank_fields.first().copied(),
        )
        .map(Arc::new)
        .ok_or_else(|| {
            ConfigError::InvalidLayout(format!(
                "{}: name/team field is not one of the columns",
                self.name
            ))
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TableLayout {
        TableLayout::new("test", "#stats", "player")
            .secondary_locator(".wrap table")
            .team_field("team")
            .column(ColumnSpec::rank("rank", "Rank"))
            .column(ColumnSpec::at("player", "Player", 0))
            .column(ColumnSpec::at("team", "Team", 1))
    }

    #[test]
    fn test_locator_fallback_order() {
        assert_eq!(layout().table_locators(), vec!["#stats", "table", ".wrap table"]);
        let bare = TableLayout::new("bare", "#t", "p");
        assert_eq!(bare.table_locators(), vec!["#t", "table"]);
    }

    #[test]
    fn test_schema_derivation() {
        let schema = layout().schema().unwrap();
        assert_eq!(schema.fields(), &["rank", "player", "team"]);
    }

    #[test]
    fn test_schema_rejects_missing_name_field() {
        let bad = TableLayout::new("bad", "table", "player").column(ColumnSpec::at("team", "Team", 0));
        assert!(bad.schema().is_err());
    }

    #[test]
    fn test_schema_rejects_duplicate_fields() {
        let bad = layout().column(ColumnSpec::at("team", "Team again", 2));
        assert!(bad.schema().is_err());
    }

    #[test]
    fn test_layout_from_toml() {
        let layout: TableLayout = toml::from_str(
            r##"
            name = "custom"
            table_locator = "#filterableTable"
            name_field = "player"
            columns = [
                { field = "player", title = "Player", source = { header = ["player"] } },
                { field = "price", title = "Fantasy price", source = { position = 4 } },
            ]
            "##,
        )
        .unwrap();

        assert_eq!(layout.body_rows, "tbody tr");
        assert_eq!(layout.header_keywords.len(), 5);
        assert_eq!(
            layout.columns[0].source,
            ColumnSource::Header(vec!["player".to_string()])
        );
        assert_eq!(layout.pagination, PaginationVocabulary::default());
    }
}
