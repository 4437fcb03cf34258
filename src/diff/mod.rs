//! Decoding of numbered unified diffs.
//!
//! A [`UnifiedDiff`] is the ordered list of hunks found in the text. Hunk
//! bodies are read by the counts in their `@@ -a,b +c,d @@` header, so lines
//! whose content happens to look like a file header or another hunk header
//! stay inside the hunk they belong to.

pub mod hunk;

pub use hunk::{DiffLine, Hunk, HunkHeader, HunkRange, LineOperation};

use error_set::error_set;

error_set! {
    /// Errors from decoding unified diff text
    DiffFormatError := {
        /// A line starting with `@@` is not a numbered hunk header
        #[display("Invalid hunk header on line {line_no}: '{line}'")]
        InvalidHunkHeader { line_no: usize, line: String },
        /// A body line has an unknown prefix or overruns the header counts
        #[display("Unexpected line {line_no} in hunk body: '{line}'")]
        UnexpectedLine { line_no: usize, line: String },
        /// Input ended before the header counts were satisfied
        #[display("Hunk '{header}' ends before its announced line counts")]
        TruncatedHunk { header: String },
    }
}

/// All hunks of a unified diff, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedDiff {
    pub hunks: Vec<Hunk>,
}

impl UnifiedDiff {
    /// Parse unified diff text.
    ///
    /// Anything outside a hunk (`---`/`+++` file headers, `diff --git`,
    /// `index` lines) is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixer_lint::diff::{LineOperation, UnifiedDiff};
    ///
    /// let diff = UnifiedDiff::parse("--- Original\n+++ New\n@@ -2 +2 @@\n-foo();\n+bar();\n").unwrap();
    /// let lines: Vec<_> = diff.lines().collect();
    /// assert_eq!(lines[0].operation, LineOperation::Removed);
    /// assert_eq!(lines[0].original_line_no, Some(2));
    /// assert_eq!(lines[1].new_line_no, Some(2));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DiffFormatError`] if a hunk header does not parse or a hunk
    /// body does not agree with its header.
    pub fn parse(text: &str) -> Result<Self, DiffFormatError> {
        let mut lines = text.lines().enumerate();
        let mut hunks = Vec::new();

        while let Some((idx, line)) = lines.next() {
            if !line.starts_with("@@") {
                continue;
            }

            let header = HunkHeader::parse(line).ok_or_else(|| DiffFormatError::InvalidHunkHeader {
                line_no: idx + 1,
                line: line.to_string(),
            })?;
            hunks.push(Hunk::parse_body(header, &mut lines)?);
        }

        Ok(UnifiedDiff { hunks })
    }

    /// Every line of every hunk, in diff order
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|hunk| hunk.lines.iter())
    }
}
