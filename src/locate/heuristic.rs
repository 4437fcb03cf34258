//! Location of unnumbered change groups by searching the original file.
//!
//! The scan is greedy and single pass: at every source row the pending groups
//! are tried in diff order, the first one whose context and removals match
//! verbatim is consumed, and scanning resumes past what it matched. Nothing
//! is revisited, so duplicated code can bind a group to the wrong copy.

use super::LocatedEdits;
use crate::split::ChangeGroup;
use std::collections::BTreeMap;

/// Where a group matched and the row scanning resumes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    /// 1-based line of the finding
    line: u32,
    resume: usize,
}

/// Per-call scan state
struct Scan<'a> {
    /// Trimmed lines of the original file
    rows: Vec<&'a str>,
    /// Groups not yet matched, keyed by diff order
    pending: BTreeMap<usize, ChangeGroup>,
    located: LocatedEdits,
}

impl<'a> Scan<'a> {
    fn new(groups: Vec<ChangeGroup>, source: &'a str) -> Self {
        Scan {
            rows: source.lines().map(str::trim).collect(),
            pending: groups.into_iter().enumerate().collect(),
            located: LocatedEdits::default(),
        }
    }

    fn run(mut self) -> LocatedEdits {
        let mut row = 0;

        while row < self.rows.len() && !self.pending.is_empty() {
            let hit = self
                .pending
                .iter()
                .find_map(|(&order, group)| self.anchor(row, group).map(|anchor| (order, anchor)));

            match hit {
                Some((order, anchor)) => {
                    if let Some(group) = self.pending.remove(&order) {
                        self.located.replace(anchor.line, group.into());
                    }
                    row = anchor.resume;
                }
                None => row += 1,
            }
        }

        if !self.pending.is_empty() {
            self.located.mark_unresolved();
        }

        self.located
    }

    /// Try to match `group` at `row`
    fn anchor(&self, row: usize, group: &ChangeGroup) -> Option<Anchor> {
        let mut cursor = row;

        if group.informational.is_empty() {
            if group.removals.is_empty() {
                return None;
            }
        } else {
            if !self.matches_at(cursor, &group.informational) {
                return None;
            }
            cursor += group.informational.len();

            // Insertion point: additions take up no source rows
            if group.removals.is_empty() {
                return Some(Anchor {
                    line: line_number(cursor)?,
                    resume: cursor,
                });
            }
        }

        if !self.matches_at(cursor, &group.removals) {
            return None;
        }

        Some(Anchor {
            line: line_number(cursor)?,
            resume: cursor + group.removals.len(),
        })
    }

    fn matches_at(&self, start: usize, expected: &[String]) -> bool {
        expected
            .iter()
            .enumerate()
            .all(|(offset, line)| self.rows.get(start + offset) == Some(&line.as_str()))
    }
}

/// 1-based line of `row`; rows past `u32` range cannot be reported
fn line_number(row: usize) -> Option<u32> {
    u32::try_from(row).ok()?.checked_add(1)
}

/// Locate `groups` in `source`.
///
/// Groups that never match leave the result marked unresolved.
pub(super) fn locate(groups: Vec<ChangeGroup>, source: &str) -> LocatedEdits {
    Scan::new(groups, source).run()
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Source of unique rows plus a contiguous slice to remove
    fn arb_source_and_removal() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
        (1usize..40).prop_flat_map(|len| {
            let rows: Vec<String> = (0..len).map(|i| format!("row_{i};")).collect();
            (0..len).prop_flat_map(move |start| {
                let rows = rows.clone();
                (1..=len - start).prop_map(move |count| (rows.clone(), start, count))
            })
        })
    }

    proptest! {
        /// A resolved removal group points at source text equal to its removals
        #[test]
        fn resolved_line_points_at_removed_text(
            (rows, start, count) in arb_source_and_removal(),
            context in 0usize..3
        ) {
            let context = context.min(start);
            let group = ChangeGroup {
                informational: rows[start - context..start].to_vec(),
                removals: rows[start..start + count].to_vec(),
                additions: vec!["replacement;".to_string()],
            };
            let source = rows.join("\n");

            let located = locate(vec![group.clone()], &source);

            prop_assert!(!located.is_unresolved());
            let (line, edit) = located.iter().next().unwrap();
            let at = (line - 1) as usize;
            prop_assert_eq!(&rows[at..at + count], &group.removals[..]);
            prop_assert_eq!(&edit.removals, &group.removals);
        }

        /// Running the scan twice gives the same result
        #[test]
        fn scan_is_deterministic(
            (rows, start, count) in arb_source_and_removal()
        ) {
            let groups = vec![ChangeGroup {
                informational: vec![],
                removals: rows[start..start + count].to_vec(),
                additions: vec![],
            }];
            let source = rows.join("\n");
            prop_assert_eq!(
                locate(groups.clone(), &source),
                locate(groups, &source)
            );
        }
    }
}
