//! Findings handed to the lint sink, and their assembly from located edits.

use crate::locate::{LocatedEdits, ProposedEdit};
use crate::report::FixRecord;
use serde::Serialize;
use std::fmt;

/// Code reported when the engine is not given another one
pub const DEFAULT_CODE: &str = "php-cs-fixer";

/// Rule name lists longer than this many characters are cut
const RULE_NAMES_LIMIT: usize = 255;
/// Characters kept from a cut rule name list
const RULE_NAMES_KEEP: usize = 250;
const ELLIPSIS: &str = "...";

const PROPOSAL_HEADER: &str = "Please consider applying these changes:";
const UNRESOLVED_HEADER: &str = "Lint engine was unable to extract exact line number";

/// Severity of a finding. Formatter output is always advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A located, human readable proposal for one change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub code: String,
    /// Comma separated names of the rules that proposed the change
    pub rule_names: String,
    pub path: String,
    /// 1-based line in the original file; `None` when it could not be found
    pub line: Option<u32>,
    #[serde(rename = "char")]
    pub column: Option<u32>,
    pub severity: Severity,
    pub original_text: Option<String>,
    pub replacement_text: Option<String>,
    pub description: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        writeln!(f, " {} [{}] {}", self.severity, self.code, self.rule_names)?;
        for line in self.description.lines() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

/// Turn located edits for `record` into findings, ordered by line.
///
/// An unresolved result adds one final finding without a line whose
/// description carries the whole diff.
pub fn assemble(record: &FixRecord, code: &str, located: &LocatedEdits) -> Vec<Finding> {
    let rule_names = join_rule_names(&record.applied_rule_names);

    let finding = |line: Option<u32>, edit: Option<&ProposedEdit>| Finding {
        code: code.to_string(),
        rule_names: rule_names.clone(),
        path: record.file_path.clone(),
        line,
        column: line.map(|_| 1),
        severity: Severity::Warning,
        original_text: edit.and_then(|edit| joined(&edit.removals)),
        replacement_text: edit.and_then(|edit| joined(&edit.additions)),
        description: match edit {
            Some(edit) => describe(edit),
            None => describe_unresolved(&record.diff),
        },
    };

    let mut findings: Vec<Finding> = located
        .iter()
        .map(|(line, edit)| finding(Some(line), Some(edit)))
        .collect();

    if located.is_unresolved() {
        findings.push(finding(None, None));
    }

    findings
}

/// Render an edit as a small fenced diff
pub fn describe(edit: &ProposedEdit) -> String {
    let mut description = vec![
        format!("{PROPOSAL_HEADER}\n```"),
        "--- Original".to_string(),
        "+++ New".to_string(),
        "@@ @@".to_string(),
    ];
    description.extend(edit.removals.iter().map(|line| format!("- {}", line.trim())));
    description.extend(edit.additions.iter().map(|line| format!("+ {}", line.trim())));
    description.push("```".to_string());

    description.join("\n")
}

fn describe_unresolved(diff: &str) -> String {
    format!("{UNRESOLVED_HEADER}\n{PROPOSAL_HEADER}\n```{diff}```")
}

/// Join rule names with `", "`, cutting overly long lists
pub fn join_rule_names(names: &[String]) -> String {
    let joined = names.join(", ");
    if joined.chars().count() <= RULE_NAMES_LIMIT {
        return joined;
    }

    let mut cut: String = joined.chars().take(RULE_NAMES_KEEP).collect();
    cut.push_str(ELLIPSIS);
    cut
}

fn joined(lines: &[String]) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join("\n"))
}
