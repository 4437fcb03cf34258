//! Location from the line numbers carried by a numbered diff.

use super::LocatedEdits;
use crate::diff::{LineOperation, UnifiedDiff};

/// Locate every added and removed line of `diff`.
///
/// Removed lines sit at their original line number. Added lines sit at their
/// new line number minus the number of findings opened by earlier added
/// lines, so a run of additions collapses onto one line. A line landing on an
/// already located line replaces that edit's text of the same kind.
pub(super) fn locate(diff: &UnifiedDiff) -> LocatedEdits {
    let mut located = LocatedEdits::default();
    let mut added_offset = 0u32;

    for line in diff.lines() {
        match (line.operation, line.original_line_no, line.new_line_no) {
            (LineOperation::Removed, Some(original), _) => {
                located.edit_at(original).removals = vec![line.content.clone()];
            }
            (LineOperation::Added, _, Some(new)) => {
                let target = new.saturating_sub(added_offset);
                if !located.contains_line(target) {
                    added_offset += 1;
                }
                located.edit_at(target).additions = vec![line.content.clone()];
            }
            _ => {}
        }
    }

    located
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn locate_text(text: &str) -> LocatedEdits {
        locate(&UnifiedDiff::parse(text).unwrap())
    }

    #[test]
    fn replacement_lands_on_removed_line() {
        let located = locate_text("@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n");
        assert_eq!(located.len(), 1);
        let edit = located.get(2).unwrap();
        assert_eq!(edit.removals, vec!["b"]);
        assert_eq!(edit.additions, vec!["B"]);
    }

    #[test]
    fn multi_line_replacement_pairs_up_lines() {
        let located = locate_text("@@ -1,4 +1,4 @@\n a\n-b\n-c\n+B\n+C\n d\n");
        assert_eq!(located.len(), 2);
        assert_eq!(located.get(2).unwrap().additions, vec!["B"]);
        assert_eq!(located.get(3).unwrap().removals, vec!["c"]);
        assert_eq!(located.get(3).unwrap().additions, vec!["C"]);
    }

    #[test]
    fn consecutive_insertions_collapse_to_last_line() {
        let located = locate_text("@@ -1,2 +1,4 @@\n a\n+x\n+y\n b\n");
        assert_eq!(located.len(), 1);
        let edit = located.get(2).unwrap();
        assert!(edit.removals.is_empty());
        assert_eq!(edit.additions, vec!["y"]);
    }

    #[test]
    fn offset_counts_findings_not_lines() {
        // The second insertion is shifted back by one finding, not by the
        // two lines added before it
        let text = "@@ -1,1 +1,3 @@\n a\n+x\n+y\n@@ -5,1 +7,2 @@\n e\n+w\n";
        let located = locate_text(text);
        let lines: Vec<u32> = located.iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![2, 7]);
        assert_eq!(located.get(2).unwrap().additions, vec!["y"]);
        assert_eq!(located.get(7).unwrap().additions, vec!["w"]);
    }

    #[test]
    fn long_insertion_runs_advance_every_other_line() {
        let located = locate_text("@@ -1,1 +1,4 @@\n a\n+x\n+y\n+z\n");
        assert_eq!(located.get(2).unwrap().additions, vec!["y"]);
        assert_eq!(located.get(3).unwrap().additions, vec!["z"]);
    }

    #[test]
    fn later_line_replaces_text_of_same_kind() {
        // "y" lands on line 2 after "x", then "b" is removed from line 2
        let located = locate_text("@@ -1,2 +1,3 @@\n a\n+x\n+y\n-b\n");
        assert_eq!(located.len(), 1);
        let edit = located.get(2).unwrap();
        assert_eq!(edit.removals, vec!["b"]);
        assert_eq!(edit.additions, vec!["y"]);
    }

    #[test]
    fn pure_deletions_keep_original_numbers() {
        let located = locate_text("@@ -15,2 +14,0 @@\n-one\n-two\n");
        let lines: Vec<u32> = located.iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![15, 16]);
    }

    #[test]
    fn unchanged_only_diff_locates_nothing() {
        assert!(locate_text("@@ -1,2 +1,2 @@\n a\n b\n").is_empty());
    }
}
