//! Tests for the full-parse path of the section stream parser

use super::*;
use crate::app::services::cp_parser::{ParseMode, SectionStreamParser};

fn parse(text: &str) -> crate::app::services::cp_parser::ParseOutput {
    SectionStreamParser::default().parse_full(IDENTITY, text)
}

#[test]
fn test_schema_round_trip() {
    let output = parse("[Definition]\nfoo=A;B;C\n[foo]\n1;2;3\n");
    let records = output.document.section("foo");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("A"), Some("1"));
    assert_eq!(records[0].get("B"), Some("2"));
    assert_eq!(records[0].get("C"), Some("3"));
    assert_eq!(records[0].field_names().collect::<Vec<_>>(), ["A", "B", "C"]);
    assert_eq!(output.mode, ParseMode::Full);
    assert!(output.fallback.is_none());
}

#[test]
fn test_short_and_long_rows_are_lenient() {
    let output = parse("[Definition]\nfoo=A;B;C\n[foo]\n1;2\n1;2;3;4\n");
    let records = output.document.section("foo");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].len(), 2);
    assert!(!records[0].contains("C"));
    assert_eq!(records[1].len(), 3);
    assert_eq!(records[1].get("C"), Some("3"));

    assert_eq!(output.stats.short_rows, 1);
    assert_eq!(output.stats.long_rows, 1);
    assert!(output.stats.is_clean());
}

#[test]
fn test_unknown_section_is_inert() {
    let output = parse("[Definition]\nfoo=A\n[bar]\n1;2\n[foo]\nx\n");

    assert!(!output.document.has_section("bar"));
    assert_eq!(output.document.section("foo").len(), 1);
    assert_eq!(output.stats.inert_lines, 1);
    assert!(!output.stats.is_clean());
}

#[test]
fn test_content_before_any_header_is_inert() {
    let output = parse("exported by CP-Tool 4.2\n[Definition]\nfoo=A\n[foo]\n1\n");

    assert_eq!(output.stats.inert_lines, 1);
    assert_eq!(output.document.total_records(), 1);
}

#[test]
fn test_malformed_definition_skips_only_that_line() {
    let output = parse("[Definition]\nfoo=A;B\nbroken line\nbar=X\n[foo]\n1;2\n[bar]\n9\n");

    assert_eq!(output.stats.malformed_definitions, 1);
    assert_eq!(output.stats.definition_lines, 2);
    assert_eq!(output.stats.warnings.len(), 1);
    assert!(output.stats.warnings[0].contains("line 3"));
    assert_eq!(output.document.section("foo").len(), 1);
    assert_eq!(output.document.section("bar")[0].get("X"), Some("9"));
}

#[test]
fn test_case_insensitive_sections() {
    let output = parse("[DEFINITION]\nActions=Time;Text\n[ACTIONS]\n00:10;Goal\n[actions]\n00:20;Save\n");

    let actions = output.document.section("actions");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1].get("Text"), Some("Save"));
    assert_eq!(output.document.section("Actions").len(), 2);
}

#[test]
fn test_blank_lines_are_skipped() {
    let output = parse("\n[Definition]\n\nfoo=A\n\n[foo]\n\n1\n   \n2\n");

    assert_eq!(output.document.section("foo").len(), 2);
    assert_eq!(output.stats.blank_lines, 5);
    assert_eq!(output.stats.inert_lines, 0);
}

#[test]
fn test_interleaved_definitions_are_dynamic() {
    let text = "[foo]\nearly\n[Definition]\nfoo=A\n[foo]\nlate\n";
    let output = parse(text);

    let records = output.document.section("foo");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("A"), Some("late"));
    assert_eq!(output.stats.inert_lines, 1);
}

#[test]
fn test_redefinition_applies_to_following_rows() {
    let text = "[Definition]\nfoo=A\n[foo]\n1;2\n[Definition]\nfoo=A;B\n[foo]\n3;4\n";
    let records = parse(text).document;
    let records = records.section("foo");

    assert_eq!(records[0].len(), 1);
    assert_eq!(records[1].get("B"), Some("4"));
}

#[test]
fn test_values_keep_inner_whitespace() {
    let output = parse("[Definition]\nfoo=A;B\n[foo]\n  1; two words \n");
    let record = &output.document.section("foo")[0];

    assert_eq!(record.get("A"), Some("1"));
    assert_eq!(record.get("B"), Some(" two words"));
}

#[test]
fn test_crlf_does_not_leak_into_values() {
    let output = parse("[Definition]\r\nfoo=A;B\r\n[foo]\r\n1;2\r\n");
    assert_eq!(output.document.section("foo")[0].get("B"), Some("2"));
}

#[test]
fn test_full_parse_is_idempotent() {
    let text = cp_file(25);
    let first = parse(&text);
    let second = parse(&text);

    assert_eq!(first.document, second.document);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.cursor, second.cursor);
}

#[test]
fn test_realistic_export() {
    let output = parse(&cp_file(3));

    let gameinfo = output.document.section("gameinfo");
    assert_eq!(gameinfo.len(), 1);
    assert_eq!(gameinfo[0].int_or_zero("RA"), 14);
    assert_eq!(gameinfo[0].int_or_zero("RB2"), 6);

    let teams = output.document.section("statteam");
    assert_eq!(teams[1].float_or_zero("AllEff"), 54.5);

    assert_eq!(names(output.document.section("actions")), ["Player0", "Player1", "Player2"]);
    assert!(output.stats.is_clean());
}

#[test]
fn test_cursor_records_volatile_block() {
    let text = cp_file(4);
    let output = parse(&text);

    let mark = output.cursor.volatile.expect("actions block present");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[mark.line_index], "[actions]");
    assert_eq!(&text[mark.byte_offset..mark.byte_offset + 9], "[actions]");
    assert_eq!(mark.consumed, 4);
    assert_eq!(mark.ordinal, 0);
    assert_eq!(output.cursor.total_lines, lines.len());
    assert_eq!(output.cursor.revision, 1);
    assert_eq!(output.cursor.schema.len(), 3);
}

#[test]
fn test_volatile_lines_without_schema_still_count() {
    let output = parse("[actions]\n1\n2\n");

    let mark = output.cursor.volatile.unwrap();
    assert_eq!(mark.consumed, 2);
    assert!(output.document.is_empty());
}

#[test]
fn test_no_volatile_block() {
    let output = parse("[Definition]\nfoo=A\n[foo]\n1\n");
    assert!(output.cursor.volatile.is_none());
}

#[test]
fn test_custom_volatile_section() {
    let parser = SectionStreamParser::new(" Events ");
    let output = parser.parse_full(IDENTITY, "[Definition]\nevents=T\n[Events]\n1\n2\n");

    assert_eq!(parser.volatile_section(), "events");
    assert_eq!(output.cursor.volatile_section, "events");
    assert_eq!(output.cursor.consumed(), 2);
}

#[test]
fn test_empty_text() {
    let output = parse("");

    assert!(output.document.is_empty());
    assert_eq!(output.stats.total_lines, 0);
    assert!(output.cursor.schema.is_empty());
}

#[test]
fn test_repeated_field_names_keep_last_value() {
    let output = parse("[Definition]\nstatteam=A;;\n[statteam]\n1;x;y\n");
    let record = &output.document.section("statteam")[0];

    assert_eq!(record.get(""), Some("y"));
    assert_eq!(record.get("A"), Some("1"));
    assert_eq!(record.len(), 2);
    assert_eq!(record.field_names().collect::<Vec<_>>(), ["A", ""]);
    assert_eq!(
        serde_json::to_string(record).unwrap(),
        r#"{"A":"1","":"y"}"#
    );
}
