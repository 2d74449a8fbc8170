//! Test fixtures for cursor cache testing

mod persist_tests;

use crate::app::services::cp_parser::{ParseCursor, SectionStreamParser};

/// Cursor from a full parse of a small export under `identity`
pub fn cursor_for(identity: &str, actions: usize) -> ParseCursor {
    let mut text = String::from("[Definition]\nactions=Time;Text\n[actions]\n");
    for i in 0..actions {
        text.push_str(&format!("00:{:02};Goal\n", i));
    }
    SectionStreamParser::default()
        .parse_full(identity, &text)
        .cursor
}
