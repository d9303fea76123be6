//! Placeholder scanning over one paragraph's run list
//!
//! The scanner works on byte offsets. Delimiters are ASCII, so every offset it
//! produces lies on a char boundary.

use crate::docx::Run;
use crate::mapping::PlaceholderMapping;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Result of looking for the next placeholder from a scan position
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanOutcome {
    /// A known token spanning runs `first..=last`
    Resolved {
        first: usize,
        last: usize,
        prefix: String,
        replacement: String,
        suffix: String,
    },
    /// A complete but unknown token; continue in the same run at `resume`
    Unknown { resume: usize },
    /// No opening, or an opening never closed before the runs ran out
    Incomplete,
}

/// Replace every known placeholder in `runs`, in place
///
/// Only run text changes; the number and order of runs never does. Returns
/// the number of placeholders replaced.
pub fn substitute_runs(runs: &mut [Run], mapping: &PlaceholderMapping) -> usize {
    let mut replaced = 0;
    let mut index = 0;
    let mut cursor = 0;
    let mut fresh = true;

    while index < runs.len() {
        if fresh {
            fresh = false;
            let (text, end, count) = replace_complete(runs[index].text(), mapping);
            if count > 0 {
                runs[index].set_text(text);
                cursor = end;
                replaced += count;
            }
        }

        match scan(runs, index, cursor, mapping) {
            ScanOutcome::Incomplete => {
                index += 1;
                cursor = 0;
                fresh = true;
            }
            ScanOutcome::Unknown { resume } => cursor = resume,
            ScanOutcome::Resolved {
                first,
                last,
                prefix,
                replacement,
                suffix,
            } => {
                replaced += 1;
                if first == last {
                    cursor = prefix.len() + replacement.len();
                    runs[first].set_text(format!("{}{}{}", prefix, replacement, suffix));
                } else {
                    commit_split(runs, first, last, prefix + &replacement, suffix);
                    index = index.max(first) + 1;
                    cursor = 0;
                    fresh = true;
                }
            }
        }
    }

    replaced
}

/// Single left-to-right pass replacing the complete known tokens of one run
///
/// Returns the new text, the offset just past the last replacement (0 when
/// nothing matched) and the number of replacements.
fn replace_complete(text: &str, mapping: &PlaceholderMapping) -> (String, usize, usize) {
    let mut out = String::with_capacity(text.len());
    let mut end = 0;
    let mut count = 0;
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        let Some(close) = rest[open + OPEN.len()..].find(CLOSE) else {
            break;
        };
        let token_end = open + OPEN.len() + close + CLOSE.len();

        match mapping.resolve(&rest[open..token_end]) {
            Some(value) => {
                out.push_str(&rest[..open]);
                out.push_str(value);
                end = out.len();
                count += 1;
                rest = &rest[token_end..];
            }
            None => {
                // Retry from the next brace so `{{{KEY}}` still matches
                out.push_str(&rest[..open + 1]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);

    (out, end, count)
}

/// Find the first placeholder that opens in run `index` at or after `cursor`
pub(crate) fn scan(
    runs: &[Run],
    index: usize,
    cursor: usize,
    mapping: &PlaceholderMapping,
) -> ScanOutcome {
    let Some(text) = runs.get(index).map(Run::text) else {
        return ScanOutcome::Incomplete;
    };
    let Some(pos) = find_opening(runs, index, cursor) else {
        return ScanOutcome::Incomplete;
    };

    let mut collected = text[pos..].to_string();
    let mut last = index;
    let mut close = closing_offset(&collected);
    while close.is_none() && last + 1 < runs.len() {
        last += 1;
        collected.push_str(runs[last].text());
        close = closing_offset(&collected);
    }
    let Some(token_end) = close else {
        return ScanOutcome::Incomplete;
    };

    let token = &collected[..token_end];
    match mapping.resolve(token) {
        Some(replacement) => ScanOutcome::Resolved {
            first: index,
            last,
            prefix: text[..pos].to_string(),
            replacement: replacement.to_string(),
            suffix: collected[token_end..].to_string(),
        },
        None => {
            tracing::trace!(token, "leaving unknown placeholder");
            ScanOutcome::Unknown {
                resume: (pos + OPEN.len()).min(text.len()),
            }
        }
    }
}

/// Offset of the first opening delimiter in run `index` at or after `cursor`
///
/// A trailing `{` counts when the next non-empty run starts with `{`.
fn find_opening(runs: &[Run], index: usize, cursor: usize) -> Option<usize> {
    let text = runs[index].text();
    if cursor > text.len() {
        return None;
    }
    if let Some(found) = text[cursor..].find(OPEN) {
        return Some(cursor + found);
    }

    let trailing = text.len().checked_sub(1)?;
    if trailing < cursor || !text.ends_with('{') {
        return None;
    }
    let next = runs[index + 1..]
        .iter()
        .map(Run::text)
        .find(|text| !text.is_empty())?;
    next.starts_with('{').then_some(trailing)
}

/// End offset (exclusive) of the first `}}` after the opening delimiter
fn closing_offset(collected: &str) -> Option<usize> {
    let body = collected.get(OPEN.len()..)?;
    body.find(CLOSE)
        .map(|found| OPEN.len() + found + CLOSE.len())
}

/// Write a token spanning several runs: the replacement goes to the first run,
/// runs in between are emptied and the suffix stays in the last run
fn commit_split(runs: &mut [Run], first: usize, last: usize, head: String, suffix: String) {
    runs[first].set_text(head);
    for run in &mut runs[first + 1..last] {
        run.set_text("");
    }
    runs[last].set_text(suffix);
}
