//! `[Definition]` block parsing and the per-section schema table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::{DEFINITION_ASSIGN, FIELD_SEPARATOR};

/// Section name to ordered field names, as declared by `[Definition]` lines
///
/// Section names are stored lower-cased so that `[Actions]` and `actions=...`
/// refer to the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable {
    sections: BTreeMap<String, Vec<String>>,
}

impl SchemaTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Field names declared for a section (case-insensitive)
    pub fn fields(&self, section: &str) -> Option<&[String]> {
        self.sections
            .get(&section.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Whether the section has a declared schema
    pub fn contains(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_lowercase())
    }

    /// Declared section names in name order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of declared sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections of `self` that `newer` no longer declares identically
    ///
    /// Sections that only `newer` declares are additions, not drift.
    pub fn drifted_sections(&self, newer: &SchemaTable) -> Vec<String> {
        self.sections
            .iter()
            .filter(|(name, fields)| newer.sections.get(*name) != Some(*fields))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn insert(&mut self, section: String, fields: Vec<String>) -> Option<Vec<String>> {
        self.sections.insert(section, fields)
    }
}

/// A definition line split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLine {
    /// Lower-cased section name
    pub section: String,

    /// Field names in declaration order, empty entries preserved
    pub fields: Vec<String>,
}

/// A `[Definition]` line that cannot declare a section
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedDefinition {
    #[error("definition line has no '=': {line}")]
    MissingAssign { line: String },

    #[error("definition line has an empty section name: {line}")]
    EmptySection { line: String },
}

/// Split `<section>=<field1>;<field2>;...` into section and fields
///
/// Only the first `=` separates; the field list is split on `;` with empty and
/// trailing fields kept, so positions stay aligned with data rows.
pub fn parse_definition_line(line: &str) -> Result<DefinitionLine, MalformedDefinition> {
    let (section, fields) =
        line.split_once(DEFINITION_ASSIGN)
            .ok_or_else(|| MalformedDefinition::MissingAssign {
                line: line.to_string(),
            })?;

    let section = section.trim().to_lowercase();
    if section.is_empty() {
        return Err(MalformedDefinition::EmptySection {
            line: line.to_string(),
        });
    }

    Ok(DefinitionLine {
        section,
        fields: fields.split(FIELD_SEPARATOR).map(str::to_string).collect(),
    })
}

/// Builds a [`SchemaTable`] from definition lines as they are encountered
///
/// Later definitions of a section replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    table: SchemaTable,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one definition line
    pub fn register(&mut self, line: &str) -> Result<(), MalformedDefinition> {
        let definition = parse_definition_line(line)?;

        if let Some(previous) = self
            .table
            .insert(definition.section.clone(), definition.fields)
        {
            debug!(
                "Redefined section '{}' (previously {} fields)",
                definition.section,
                previous.len()
            );
        }

        Ok(())
    }

    /// Field names currently known for a section
    pub fn fields(&self, section: &str) -> Option<&[String]> {
        self.table.fields(section)
    }

    /// The table built so far
    pub fn table(&self) -> &SchemaTable {
        &self.table
    }

    /// Finish building and take the table
    pub fn into_table(self) -> SchemaTable {
        self.table
    }
}
