use super::DiffFormatError;
use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{self, char},
    combinator::{opt, verify},
    sequence::preceded,
};
use std::fmt;

/// How a diff line relates the original file to the fixed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOperation {
    Unchanged,
    Added,
    Removed,
}

/// A single classified line of a hunk body.
///
/// `original_line_no` is only set for unchanged and removed lines,
/// `new_line_no` only for unchanged and added lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub operation: LineOperation,
    /// Line content without its leading marker
    pub content: String,
    pub original_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
}

impl DiffLine {
    pub fn unchanged(content: &str, original_line_no: u32, new_line_no: u32) -> Self {
        Self {
            operation: LineOperation::Unchanged,
            content: content.to_string(),
            original_line_no: Some(original_line_no),
            new_line_no: Some(new_line_no),
        }
    }

    pub fn added(content: &str, new_line_no: u32) -> Self {
        Self {
            operation: LineOperation::Added,
            content: content.to_string(),
            original_line_no: None,
            new_line_no: Some(new_line_no),
        }
    }

    pub fn removed(content: &str, original_line_no: u32) -> Self {
        Self {
            operation: LineOperation::Removed,
            content: content.to_string(),
            original_line_no: Some(original_line_no),
            new_line_no: None,
        }
    }
}

/// One side of a hunk header: `start[,count]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub start: u32,
    /// Defaults to 1 when the header omits it
    pub count: u32,
}

impl HunkRange {
    /// Ranges whose last line number does not fit a `u32` are rejected
    fn parse(input: &str) -> IResult<&str, Self> {
        verify(
            (complete::u32, opt(preceded(char(','), complete::u32))).map(|(start, count)| HunkRange {
                start,
                count: count.unwrap_or(1),
            }),
            |range: &HunkRange| range.start.checked_add(range.count).is_some(),
        )
        .parse(input)
    }
}

impl fmt::Display for HunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            1 => write!(f, "{}", self.start),
            n => write!(f, "{},{}", self.start, n),
        }
    }
}

/// Parsed `@@ -old +new @@` hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old: HunkRange,
    pub new: HunkRange,
}

impl HunkHeader {
    /// Parse a header line, ignoring any section text after the closing `@@`.
    ///
    /// Returns `None` for anything that is not a numbered header, including
    /// the bare `@@ @@` separators of unnumbered diffs.
    pub fn parse(line: &str) -> Option<Self> {
        let parsed: IResult<&str, Self> = (
            tag("@@ -"),
            HunkRange::parse,
            tag(" +"),
            HunkRange::parse,
            tag(" @@"),
        )
            .map(|(_, old, _, new, _)| HunkHeader { old, new })
            .parse(line);

        parsed.ok().map(|(_, header)| header)
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -{} +{} @@", self.old, self.new)
    }
}

/// A hunk: its header and the lines it announces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub header: HunkHeader,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Consume the body announced by `header` from `lines`.
    ///
    /// Reading stops as soon as both line counts are satisfied, so text
    /// following the body (another header, file headers) is left untouched.
    pub(super) fn parse_body<'a, I>(header: HunkHeader, lines: &mut I) -> Result<Self, DiffFormatError>
    where
        I: Iterator<Item = (usize, &'a str)>,
    {
        let mut old_line = header.old.start;
        let mut new_line = header.new.start;
        let mut old_left = header.old.count;
        let mut new_left = header.new.count;
        let mut body = Vec::new();

        while old_left > 0 || new_left > 0 {
            let Some((idx, line)) = lines.next() else {
                return Err(DiffFormatError::TruncatedHunk {
                    header: header.to_string(),
                });
            };

            // "\ No newline at end of file"
            if line.starts_with('\\') {
                continue;
            }

            let unexpected = || DiffFormatError::UnexpectedLine {
                line_no: idx + 1,
                line: line.to_string(),
            };

            if let Some(content) = line.strip_prefix('+') {
                if new_left == 0 {
                    return Err(unexpected());
                }
                body.push(DiffLine::added(content, new_line));
                new_line += 1;
                new_left -= 1;
            } else if let Some(content) = line.strip_prefix('-') {
                if old_left == 0 {
                    return Err(unexpected());
                }
                body.push(DiffLine::removed(content, old_line));
                old_line += 1;
                old_left -= 1;
            } else if let Some(content) = line.strip_prefix(' ').or(line.is_empty().then_some("")) {
                // Blank context line with its leading space stripped
                if old_left == 0 || new_left == 0 {
                    return Err(unexpected());
                }
                body.push(DiffLine::unchanged(content, old_line, new_line));
                old_line += 1;
                new_line += 1;
                old_left -= 1;
                new_left -= 1;
            } else {
                return Err(unexpected());
            }
        }

        Ok(Hunk {
            header,
            lines: body,
        })
    }
}
