//! Placeholders whose delimiters or body span several runs

use super::helpers::{joined, mapping, rewrite, runs};
use super::*;

#[test]
fn test_token_split_inside_name() {
    let result = rewrite(&["Hola {{NOM", "BRE}}!"], &[("NOMBRE", "Ana")]);
    assert_eq!(result, vec!["Hola Ana", "!"]);
}

#[test]
fn test_token_split_across_three_runs() {
    let result = rewrite(&["A {{", "KEY", "}} B"], &[("KEY", "V")]);
    assert_eq!(result, vec!["A V", "", " B"]);
}

#[test]
fn test_split_opening_delimiter() {
    let result = rewrite(&["A {", "{KEY}}", " B"], &[("KEY", "V")]);
    assert_eq!(result, vec!["A V", "", " B"]);
}

#[test]
fn test_split_opening_skips_empty_runs() {
    let result = rewrite(&["{", "", "{KEY}}"], &[("KEY", "V")]);
    assert_eq!(result, vec!["V", "", ""]);
}

#[test]
fn test_split_closing_delimiter() {
    let result = rewrite(&["{{KEY}", "} tail"], &[("KEY", "V")]);
    assert_eq!(result, vec!["V", " tail"]);
}

#[test]
fn test_every_split_matches_single_run() {
    let text = "Exp. {{DEMANDA_ID}} del {{JUZGADO}}.";
    let pairs = [("DEMANDA_ID", "123"), ("JUZGADO", "Civil 3")];
    let expected = "Exp. 123 del Civil 3.";

    for a in 1..text.len() {
        for b in a..text.len() {
            let parts = [&text[..a], &text[a..b], &text[b..]];
            let result = rewrite(&parts, &pairs);
            assert_eq!(result.len(), 3);
            assert_eq!(joined(&result), expected, "split at {} and {}", a, b);
        }
    }
}

#[test]
fn test_split_token_followed_by_token_in_last_run() {
    let result = rewrite(&["{{A", "}} y {{B}}"], &[("A", "x"), ("B", "z")]);
    assert_eq!(result, vec!["x", " y z"]);
}

#[test]
fn test_fast_path_then_trailing_split_token() {
    let result = rewrite(&["{{A}} {{", "B}}"], &[("A", "x"), ("B", "y")]);
    assert_eq!(result, vec!["x y", ""]);
}

#[test]
fn test_unclosed_opening_is_left_alone() {
    let result = rewrite(&["Hola {{NOMBRE", " y nada más"], &[("NOMBRE", "Ana")]);
    assert_eq!(result, vec!["Hola {{NOMBRE", " y nada más"]);
}

#[test]
fn test_unclosed_opening_does_not_hide_later_tokens() {
    let result = rewrite(&["{{ROTO", "ok", "{{A}}"], &[("A", "x")]);
    assert_eq!(result, vec!["{{ROTO", "ok", "x"]);
}

#[test]
fn test_run_count_never_changes() {
    let mut runs = runs(&["{{", "A", "}}", "{{B", "}}"]);
    substitute_runs(&mut runs, &mapping(&[("A", "1"), ("B", "2")]));
    assert_eq!(runs.len(), 5);
    let texts: Vec<&str> = runs.iter().map(|run| run.text()).collect();
    assert_eq!(texts, vec!["1", "", "", "2", ""]);
}
