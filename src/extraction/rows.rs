//! Row extraction
//!
//! Turns the stats table of a rendered page into [`PlayerRecord`]s. Every
//! lookup is an ordered fallback: a missing table, missing rows or missing
//! cells produce fewer (or emptier) records, never an error. Whether an empty
//! page means "done" is decided by the pagination loop.

use super::dom::{selector, text_of};
use super::layout::{ColumnSource, TableLayout};
use super::record::{PlayerRecord, RecordSchema};
use crate::browser::RenderedPage;
use crate::error::Result;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument};

struct NameLinkSelectors {
    link: Selector,
    long_name: Option<Selector>,
    short_name: Option<Selector>,
}

/// Where one schema field gets its value in a given table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Cell(usize),
    Rank,
    Unresolved,
}

/// Extracts records from a table for one layout variant
pub struct RowExtractor {
    layout: Arc<TableLayout>,
    schema: Arc<RecordSchema>,
    table_locators: Vec<Selector>,
    body_rows: Selector,
    all_rows: Selector,
    cells: Selector,
    header_row: Selector,
    header_cells: Selector,
    name_link: Option<NameLinkSelectors>,
    name_index: usize,
}

impl RowExtractor {
    /// Compile the layout's selectors and schema
    pub fn new(layout: Arc<TableLayout>) -> Result<Self> {
        let schema = layout.schema()?;
        let table_locators = layout
            .table_locators()
            .into_iter()
            .map(selector)
            .collect::<Result<Vec<_>>>()?;

        let name_link = match &layout.name_link {
            Some(link) => Some(NameLinkSelectors {
                link: selector(&link.link)?,
                long_name: link.long_name.as_deref().map(selector).transpose()?,
                short_name: link.short_name.as_deref().map(selector).transpose()?,
            }),
            None => None,
        };

        // schema() already checked the name field is a column
        let name_index = schema.index_of(&layout.name_field).unwrap_or(0);

        Ok(Self {
            schema,
            table_locators,
            body_rows: selector(&layout.body_rows)?,
            all_rows: selector(&layout.all_rows)?,
            cells: selector(&layout.cells)?,
            header_row: selector("thead tr")?,
            header_cells: selector("th, td")?,
            name_link,
            name_index,
            layout,
        })
    }

    /// The record schema records are built with
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// The layout this extractor was built from
    pub fn layout(&self) -> &Arc<TableLayout> {
        &self.layout
    }

    /// Resolve the table root: primary locator, first table, secondary locator
    pub fn find_table<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        self.table_locators
            .iter()
            .find_map(|locator| doc.select(locator).next())
    }

    /// Data-bearing rows of `table`, preferring the body section
    fn rows<'a>(&self, table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let body: Vec<_> = table.select(&self.body_rows).collect();
        if !body.is_empty() {
            return body;
        }
        table.select(&self.all_rows).collect()
    }

    /// Number of rows currently rendered in the table (0 without a table)
    pub fn row_count(&self, doc: &Html) -> usize {
        self.find_table(doc)
            .map(|table| self.rows(table).len())
            .unwrap_or(0)
    }

    fn is_header_or_blank(&self, row: ElementRef<'_>) -> bool {
        let text = row.text().collect::<String>().to_lowercase();
        let text = text.trim();
        text.is_empty()
            || self
                .layout
                .header_keywords
                .iter()
                .any(|keyword| text.contains(keyword.as_str()))
    }

    /// Map each schema field to its cell for this table
    fn resolve_slots(&self, table: ElementRef<'_>) -> Vec<Slot> {
        let needs_header = self
            .layout
            .columns
            .iter()
            .any(|c| matches!(c.source, ColumnSource::Header(_)));

        let header: Vec<String> = if needs_header {
            table
                .select(&self.header_row)
                .next()
                .or_else(|| table.select(&self.all_rows).next())
                .map(|row| {
                    row.select(&self.header_cells)
                        .map(|cell| text_of(cell).to_lowercase())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        self.layout
            .columns
            .iter()
            .map(|column| match &column.source {
                ColumnSource::Position(i) => Slot::Cell(*i),
                ColumnSource::Rank => Slot::Rank,
                ColumnSource::Header(keywords) => header
                    .iter()
                    .position(|title| keywords.iter().all(|k| title.contains(k.as_str())))
                    .map(Slot::Cell)
                    .unwrap_or_else(|| {
                        debug!("Header column '{}' not found in table", column.field);
                        Slot::Unresolved
                    }),
            })
            .collect()
    }

    fn linked_name(&self, row: ElementRef<'_>) -> Option<String> {
        let selectors = self.name_link.as_ref()?;
        let link = row.select(&selectors.link).next()?;

        let variant = |sel: &Option<Selector>| {
            sel.as_ref()
                .and_then(|s| link.select(s).next())
                .map(text_of)
                .filter(|t| !t.is_empty())
        };

        variant(&selectors.long_name)
            .or_else(|| variant(&selectors.short_name))
            .or_else(|| Some(text_of(link)).filter(|t| !t.is_empty()))
    }

    fn build_record(&self, row: ElementRef<'_>, slots: &[Slot]) -> PlayerRecord {
        let cells: Vec<String> = row.select(&self.cells).map(text_of).collect();
        let mut record = PlayerRecord::empty(Arc::clone(&self.schema));

        for (index, slot) in slots.iter().enumerate() {
            if let Slot::Cell(position) = slot {
                if let Some(value) = cells.get(*position) {
                    record.set_at(index, value.clone());
                }
            }
        }

        if let Some(name) = self.linked_name(row) {
            record.set_at(self.name_index, name);
        }

        record
    }

    /// Lazily extract the valid records of `doc`, ranked 1.. in page order
    pub fn records<'a>(&'a self, doc: &'a Html) -> impl Iterator<Item = PlayerRecord> + 'a {
        let (rows, slots) = match self.find_table(doc) {
            Some(table) => (self.rows(table), self.resolve_slots(table)),
            None => {
                debug!("No table matched for layout '{}'", self.layout.name);
                (Vec::new(), Vec::new())
            }
        };

        rows.into_iter()
            .filter(move |row| !self.is_header_or_blank(*row))
            .map(move |row| self.build_record(row, &slots))
            .filter(PlayerRecord::is_valid)
            .enumerate()
            .map(|(i, mut record)| {
                record.set_rank(i + 1);
                record
            })
    }

    /// Collect every valid record of `doc`
    pub fn extract(&self, doc: &Html) -> Vec<PlayerRecord> {
        self.records(doc).collect()
    }

    /// Extract the records currently rendered on `page`
    #[instrument(skip(self, page), fields(layout = %self.layout.name))]
    pub async fn extract_page<P: RenderedPage>(&self, page: &mut P) -> Result<Vec<PlayerRecord>> {
        let records = page.evaluate(|doc| self.extract(doc)).await?;
        debug!("Extracted {} records", records.len());
        Ok(records)
    }
}
