//! Test fixtures for ingestion testing

mod ingestor_tests;

use std::sync::Arc;

use crate::app::services::cp_parser::SectionStreamParser;
use crate::app::services::cursor_cache::CursorCache;
use crate::app::services::ingest::Ingestor;

pub const IDENTITY: &str = "07.CP";

/// Export with a team snapshot and `actions` play-by-play rows
pub fn export(goals_a: u32, actions: usize) -> String {
    let mut text = format!(
        "[Definition]\nstatteam=Team;Goals\nactions=Time;Name;Text\n\
         [statteam]\nHCZ;{goals_a}\nSGF;9\n[actions]\n"
    );
    for i in 0..actions {
        text.push_str(&format!("00:{:02};Player{};Goal\n", i, i));
    }
    text
}

pub fn ingestor() -> Ingestor {
    Ingestor::new(SectionStreamParser::default(), Arc::new(CursorCache::default()))
}
