//! Resolution of proposed changes to lines of the original file.
//!
//! Numbered diffs are located from their own line numbers
//! ([`Locator::Structured`]). Unnumbered diffs are located by searching the
//! original file for each change group's context and removals
//! ([`Locator::Heuristic`]).

mod heuristic;
mod structured;

use crate::diff::{DiffFormatError, UnifiedDiff};
use crate::split::{ChangeGroup, extract_change_groups};
use std::collections::BTreeMap;
use tracing::debug;

/// Whether the producing fixer numbers the lines of its diffs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    /// `@@ -a,b +c,d @@` headers
    Numbered,
    /// Bare `@@ @@` separators
    Unnumbered,
}

/// Line resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Structured,
    Heuristic,
}

impl From<DiffFormat> for Locator {
    fn from(format: DiffFormat) -> Self {
        match format {
            DiffFormat::Numbered => Locator::Structured,
            DiffFormat::Unnumbered => Locator::Heuristic,
        }
    }
}

impl Locator {
    /// Whether locating needs the original file's content
    pub fn needs_source(self) -> bool {
        matches!(self, Locator::Heuristic)
    }

    /// Locate every change of `diff`.
    ///
    /// The heuristic locator without a `source` locates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DiffFormatError`] if a numbered diff does not decode.
    pub fn locate(self, diff: &str, source: Option<&str>) -> Result<LocatedEdits, DiffFormatError> {
        match self {
            Locator::Structured => Ok(structured::locate(&UnifiedDiff::parse(diff)?)),
            Locator::Heuristic => {
                let Some(source) = source else {
                    debug!("No source content, skipping heuristic location");
                    return Ok(LocatedEdits::default());
                };
                let groups = extract_change_groups(diff);
                debug!(groups = groups.len(), "Locating change groups");
                Ok(heuristic::locate(groups, source))
            }
        }
    }
}

/// Removed and added contents proposed at one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedEdit {
    pub removals: Vec<String>,
    pub additions: Vec<String>,
}

impl From<ChangeGroup> for ProposedEdit {
    fn from(group: ChangeGroup) -> Self {
        ProposedEdit {
            removals: group.removals,
            additions: group.additions,
        }
    }
}

/// Edits keyed by 1-based line of the original file.
///
/// `unresolved` records that some change could not be given a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedEdits {
    edits: BTreeMap<u32, ProposedEdit>,
    unresolved: bool,
}

impl LocatedEdits {
    /// Put `edit` at `line`, dropping whatever was there
    pub fn replace(&mut self, line: u32, edit: ProposedEdit) {
        self.edits.insert(line, edit);
    }

    /// The edit at `line`, created empty if missing
    pub fn edit_at(&mut self, line: u32) -> &mut ProposedEdit {
        self.edits.entry(line).or_default()
    }

    pub fn get(&self, line: u32) -> Option<&ProposedEdit> {
        self.edits.get(&line)
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.edits.contains_key(&line)
    }

    pub fn mark_unresolved(&mut self) {
        self.unresolved = true;
    }

    pub fn is_unresolved(&self) -> bool {
        self.unresolved
    }

    /// Located edits ordered by line
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ProposedEdit)> {
        self.edits.iter().map(|(line, edit)| (*line, edit))
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn locator_follows_format() {
        assert_eq!(Locator::from(DiffFormat::Numbered), Locator::Structured);
        assert_eq!(Locator::from(DiffFormat::Unnumbered), Locator::Heuristic);
        assert!(Locator::Heuristic.needs_source());
        assert!(!Locator::Structured.needs_source());
    }

    #[test]
    fn heuristic_without_source_locates_nothing() {
        let located = Locator::Heuristic
            .locate("@@ @@\n-foo();\n+bar();", None)
            .unwrap();
        assert!(located.is_empty());
        assert!(!located.is_unresolved());
    }

    #[test]
    fn structured_rejects_unnumbered_diff() {
        let result = Locator::Structured.locate("@@ @@\n-foo();\n+bar();", None);
        assert!(matches!(result, Err(DiffFormatError::InvalidHunkHeader { .. })));
    }

    #[test]
    fn replace_drops_previous_edit() {
        let mut located = LocatedEdits::default();
        located.replace(
            3,
            ProposedEdit {
                removals: vec!["a".to_string()],
                additions: vec![],
            },
        );
        located.replace(
            3,
            ProposedEdit {
                removals: vec![],
                additions: vec!["b".to_string()],
            },
        );
        assert_eq!(located.len(), 1);
        assert_eq!(located.get(3).unwrap().removals, Vec::<String>::new());
        assert_eq!(located.get(3).unwrap().additions, vec!["b"]);
    }

    #[test]
    fn iterates_in_line_order() {
        let mut located = LocatedEdits::default();
        located.edit_at(9).removals.push("nine".to_string());
        located.edit_at(2).removals.push("two".to_string());
        let lines: Vec<u32> = located.iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![2, 9]);
    }
}
