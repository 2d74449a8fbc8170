//! Test fixtures for CP parser testing
//!
//! This module provides sample CP file content shaped like real federation
//! exports, plus helpers for building grown revisions of the same file.

mod parser_tests;
mod schema_tests;

pub const IDENTITY: &str = "01.CP";

/// Definition block and snapshot sections of a typical match export
pub fn cp_preamble(score_a: u32, score_b: u32) -> String {
    format!(
        "[Definition]
gameinfo=Game;Group;Date;TeamA;TeamB;RA;RB;RA1;RB1;RA2;RB2
statteam=Game;Team;AllG;AllShots;AllEff
actions=Game;Time;Team;Nr;Name;Text

[gameinfo]
1001;A;2024-05-01;HCZ;SGF;{score_a};{score_b};7;6;{};{}

[statteam]
1001;HCZ;{score_a};20;70
1001;SGF;{score_b};22;54.5
",
        score_a.saturating_sub(7),
        score_b.saturating_sub(6),
    )
}

/// One play-by-play row
pub fn action_line(i: usize) -> String {
    format!("1001;{:02}:{:02};HCZ;{};Player{};Goal", i / 60, i % 60, i % 20, i)
}

/// A complete export with `actions` play-by-play rows at the end
pub fn cp_file(actions: usize) -> String {
    let mut text = cp_preamble(14, 12);
    text.push_str("\n[actions]\n");
    for i in 0..actions {
        text.push_str(&action_line(i));
        text.push('\n');
    }
    text
}

/// The `Name` values of a slice of records, for compact assertions
pub fn names(records: &[crate::app::models::Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get("Name").unwrap_or_default().to_string())
        .collect()
}
