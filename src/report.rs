//! Reading the fixer's JSON result list.
//!
//! A dry run with `--format=json --diff` prints
//!
//! ```json
//! {"files": [{"name": "src/Foo.php", "appliedFixers": ["braces"], "diff": "..."}], "time": {...}}
//! ```
//!
//! Only `files` is read; every entry becomes a [`FixRecord`].

use error_set::error_set;
use serde::Deserialize;

error_set! {
    /// Errors from reading a fixer result list
    ReportError := {
        /// The text is not a JSON result list
        #[display("Invalid fixer report: {message}")]
        InvalidJson { message: String },
    }
}

/// Proposed changes to one file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixRecord {
    #[serde(rename = "name")]
    pub file_path: String,
    /// Unified diff of the proposed edits
    #[serde(default)]
    pub diff: String,
    #[serde(rename = "appliedFixers", default)]
    pub applied_rule_names: Vec<String>,
}

impl FixRecord {
    pub fn new(file_path: impl Into<String>, diff: impl Into<String>, applied_rule_names: Vec<String>) -> Self {
        Self {
            file_path: file_path.into(),
            diff: diff.into(),
            applied_rule_names,
        }
    }
}

/// Result list of one fixer run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FixerReport {
    pub files: Vec<FixRecord>,
}

impl FixerReport {
    /// Parse a fixer's JSON output.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixer_lint::FixerReport;
    ///
    /// let report = FixerReport::from_json(r#"{"files":[{"name":"a.php","appliedFixers":["braces"],"diff":""}]}"#).unwrap();
    /// assert_eq!(report.files[0].file_path, "a.php");
    /// assert_eq!(report.files[0].applied_rule_names, vec!["braces"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidJson`] if the text is not JSON or has no
    /// `files` list.
    pub fn from_json(text: &str) -> Result<Self, ReportError> {
        serde_json::from_str(text).map_err(|e| ReportError::InvalidJson {
            message: e.to_string(),
        })
    }
}
