//! Player records
//!
//! A record is an ordered set of named text fields. The field order comes from
//! the layout's [`RecordSchema`] and never changes during a run; every record
//! extracted with the same layout shares one schema.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Field order and identity fields for one layout variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<String>,
    name_index: usize,
    team_index: Option<usize>,
    rank_index: Option<usize>,
}

impl RecordSchema {
    /// Build a schema. Returns `None` when `name_field` (or a given team/rank
    /// field) is not one of `fields`.
    pub fn new(
        fields: Vec<String>,
        name_field: &str,
        team_field: Option<&str>,
        rank_field: Option<&str>,
    ) -> Option<Self> {
        let position = |name: &str| fields.iter().position(|f| f == name);

        let name_index = position(name_field)?;
        let team_index = match team_field {
            Some(team) => Some(position(team)?),
            None => None,
        };
        let rank_index = match rank_field {
            Some(rank) => Some(position(rank)?),
            None => None,
        };

        Some(Self {
            fields,
            name_index,
            team_index,
            rank_index,
        })
    }

    /// Field names in export order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of a field by name
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One extracted table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    schema: Arc<RecordSchema>,
    values: Vec<String>,
}

impl PlayerRecord {
    /// Create a record with every field empty
    pub fn empty(schema: Arc<RecordSchema>) -> Self {
        let values = vec![String::new(); schema.len()];
        Self { schema, values }
    }

    /// The schema this record follows
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Get a field value by name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .index_of(field)
            .map(|i| self.values[i].as_str())
    }

    /// Set a field value by name. Returns `false` for unknown fields.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.schema.index_of(field) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    /// Set a field value by schema position
    pub(crate) fn set_at(&mut self, index: usize, value: String) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Values in schema order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(field, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .fields
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Player name
    pub fn player_name(&self) -> &str {
        &self.values[self.schema.name_index]
    }

    /// Team, or the empty string for layouts without a team column
    pub fn team(&self) -> &str {
        self.schema
            .team_index
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// Rank, if the layout carries one
    pub fn rank(&self) -> Option<&str> {
        self.schema.rank_index.map(|i| self.values[i].as_str())
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        if let Some(i) = self.schema.rank_index {
            self.values[i] = rank.to_string();
        }
    }

    /// A record without a player name is not a record
    pub fn is_valid(&self) -> bool {
        !self.player_name().is_empty()
    }
}

impl Serialize for PlayerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
