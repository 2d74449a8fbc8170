//! Parser state machine

use super::line::LineKind;

/// Which block the parser is currently inside
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
    /// Before the first header
    #[default]
    Idle,
    /// Inside `[Definition]`
    InDefinition,
    /// Inside a data section, by lower-cased name
    InSection(String),
}

impl ParserState {
    /// State after a line; content and blank lines never change state
    pub fn next(&self, kind: &LineKind<'_>) -> Self {
        match kind {
            LineKind::DefinitionHeader => Self::InDefinition,
            LineKind::SectionHeader(name) => Self::InSection(name.clone()),
            LineKind::Blank | LineKind::Content(_) => self.clone(),
        }
    }

    /// Current data section name, if any
    pub fn section(&self) -> Option<&str> {
        match self {
            Self::InSection(name) => Some(name),
            _ => None,
        }
    }
}
