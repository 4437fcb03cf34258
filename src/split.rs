//! Splitting of unnumbered diff bodies into atomic change groups.
//!
//! Fixers that cannot number their hunks separate them with a bare `@@ @@`
//! line. A single block may still carry several unrelated edits back to back,
//! e.g. a run of additions, then some context, then a run of removals. Such
//! blocks are cut until every block is leading context followed by a single
//! run of change lines.
//!
//! # Examples
//!
//! ```
//! use fixer_lint::split::split_combined_blocks;
//!
//! let block = ["+a", "+b", "context", "-c", "-d"].map(String::from).to_vec();
//! let blocks = split_combined_blocks(vec![block]);
//! assert_eq!(blocks, vec![vec!["+a", "+b"], vec!["context", "-c", "-d"]]);
//! ```

/// Separator between hunks of an unnumbered diff
const BLOCK_SEPARATOR: &str = "@@ @@";

const REMOVAL_MARKER: char = '-';
const ADDITION_MARKER: char = '+';

/// Whether `line` opens with `marker` used as diff notation.
///
/// The marker must be followed by whitespace, an ASCII letter or the end of
/// the line; `-$x` or `+{` are treated as plain content.
pub fn is_change_marker(line: &str, marker: char) -> bool {
    let Some(rest) = line.strip_prefix(marker) else {
        return false;
    };

    match rest.chars().next() {
        None => true,
        Some(next) => next.is_whitespace() || next.is_ascii_alphabetic(),
    }
}

/// Remove a leading change `marker` and trim what is left
pub fn strip_change_marker(line: &str, marker: char) -> &str {
    if is_change_marker(line, marker) {
        line[marker.len_utf8()..].trim()
    } else {
        line.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Informational,
    Removal,
    Addition,
}

impl LineKind {
    fn of(line: &str) -> Self {
        if is_change_marker(line, REMOVAL_MARKER) {
            LineKind::Removal
        } else if is_change_marker(line, ADDITION_MARKER) {
            LineKind::Addition
        } else {
            LineKind::Informational
        }
    }
}

/// An atomic edit recovered from an unnumbered diff.
///
/// Removal and addition contents have their markers stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeGroup {
    /// Leading context lines
    pub informational: Vec<String>,
    pub removals: Vec<String>,
    pub additions: Vec<String>,
}

impl ChangeGroup {
    /// Classify the (trimmed) lines of one split block
    pub fn from_block<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut group = ChangeGroup::default();

        for line in lines {
            let line = line.as_ref();
            match LineKind::of(line) {
                LineKind::Removal => group
                    .removals
                    .push(strip_change_marker(line, REMOVAL_MARKER).to_string()),
                LineKind::Addition => group
                    .additions
                    .push(strip_change_marker(line, ADDITION_MARKER).to_string()),
                LineKind::Informational => group.informational.push(line.to_string()),
            }
        }

        group
    }

    /// A group that proposes nothing (context only)
    pub fn is_noise(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Build a block from string literals
#[cfg(test)]
pub(crate) fn to_lines(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

/// Cut an unnumbered diff on its `@@ @@` separators.
///
/// Text before the first separator (the `---`/`+++` headers) is dropped. Each
/// block is trimmed, split into lines, and every line trimmed.
pub fn split_blocks(diff: &str) -> Vec<Vec<String>> {
    diff.split(BLOCK_SEPARATOR)
        .skip(1)
        .map(|block| block.trim().lines().map(|line| line.trim().to_string()).collect())
        .collect()
}

/// Split blocks that combine several change runs.
///
/// A block is cut right after its last pending change line as soon as an
/// informational line follows it; pending additions win over pending
/// removals. Both halves are non-empty, so this terminates. The result keeps
/// every line in its original order.
pub fn split_combined_blocks(mut blocks: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut index = 0;

    while index < blocks.len() {
        match split_point(&blocks[index]) {
            Some(at) => {
                let tail = blocks[index].split_off(at);
                blocks.insert(index + 1, tail);
            }
            None => index += 1,
        }
    }

    blocks
}

/// Position just past the change run that an informational line closes
fn split_point(lines: &[String]) -> Option<usize> {
    let mut last_removal = None;
    let mut last_addition = None;

    for (no, line) in lines.iter().enumerate() {
        match LineKind::of(line) {
            LineKind::Removal => last_removal = Some(no + 1),
            LineKind::Addition => last_addition = Some(no + 1),
            LineKind::Informational => {
                if let Some(at) = last_addition.or(last_removal) {
                    return Some(at);
                }
            }
        }
    }

    None
}

/// Extract the change groups of an unnumbered diff, in diff order
pub fn extract_change_groups(diff: &str) -> Vec<ChangeGroup> {
    split_combined_blocks(split_blocks(diff))
        .iter()
        .map(|block| ChangeGroup::from_block(block))
        .filter(|group| !group.is_noise())
        .collect()
}
