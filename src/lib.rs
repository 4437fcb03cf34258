//! Turn autoformatter diffs into located lint findings.
//!
//! A [`FixRecord`] carries the diff a formatter proposes for one file. The
//! [`FindingEngine`] resolves every change in it to a line of the original
//! file and renders one [`Finding`] per line.
//!
//! ```
//! use fixer_lint::{DiffFormat, FindingEngine, FixRecord};
//!
//! let engine = FindingEngine::new(DiffFormat::Unnumbered);
//! let record = FixRecord::new("src/Foo.php", "@@ @@\n-foo();\n+bar();", vec!["braces".into()]);
//!
//! let findings = engine.findings(&record, Some("x;\nfoo();\ny;\n")).unwrap();
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].line, Some(2));
//! assert_eq!(findings[0].original_text.as_deref(), Some("foo();"));
//! assert_eq!(findings[0].replacement_text.as_deref(), Some("bar();"));
//! ```

use error_set::error_set;
use std::path::Path;
use tracing::{debug, warn};

pub mod diff;
pub mod finding;
pub mod locate;
pub mod report;
pub mod split;
pub mod version;

pub use diff::DiffFormatError;
pub use finding::{DEFAULT_CODE, Finding, Severity};
pub use locate::{DiffFormat, Locator};
pub use report::{FixRecord, FixerReport, ReportError};
pub use version::{FixerVersion, VersionError};

error_set! {
    /// Errors from turning one record into findings
    FindingError := {
        DiffFormatError(DiffFormatError),
    } || SourceReadError

    /// Errors from reading an original file
    SourceReadError := {
        #[display("Failed to read {path}: {message}")]
        Unreadable { path: String, message: String },
    }
}

/// Read the original content of a file
pub fn read_source(path: &Path) -> Result<String, SourceReadError> {
    std::fs::read_to_string(path).map_err(|e| SourceReadError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Builds findings from fix records with a locator fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingEngine {
    locator: Locator,
    code: String,
}

impl FindingEngine {
    /// Create an engine for diffs in `format`
    pub fn new(format: DiffFormat) -> Self {
        Self {
            locator: format.into(),
            code: DEFAULT_CODE.to_string(),
        }
    }

    /// Create an engine for the diffs a fixer release prints.
    ///
    /// An unknown version is treated as printing unnumbered diffs.
    pub fn for_fixer_version(version: Option<FixerVersion>) -> Self {
        let format = version.map_or(DiffFormat::Unnumbered, FixerVersion::diff_format);
        debug!(?version, ?format, "Selected diff format");
        Self::new(format)
    }

    /// Report findings under `code` instead of [`DEFAULT_CODE`]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn locator(&self) -> Locator {
        self.locator
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Build the findings for `record` against the original `source`.
    ///
    /// Unnumbered diffs need `source`; without it no findings are produced.
    ///
    /// # Errors
    ///
    /// Returns [`FindingError::DiffFormatError`] if a numbered diff does not
    /// decode.
    pub fn findings(&self, record: &FixRecord, source: Option<&str>) -> Result<Vec<Finding>, FindingError> {
        let located = self.locator.locate(&record.diff, source)?;

        if located.is_unresolved() {
            warn!(path = %record.file_path, "Some changes could not be located");
        }

        let findings = finding::assemble(record, &self.code, &located);
        debug!(path = %record.file_path, findings = findings.len(), "Assembled findings");
        Ok(findings)
    }

    /// Build the findings for `record`, reading the original file at `path`
    /// when the locator needs it.
    ///
    /// An unreadable file yields no findings.
    ///
    /// # Errors
    ///
    /// Returns [`FindingError::DiffFormatError`] if a numbered diff does not
    /// decode.
    pub fn findings_for_path(&self, record: &FixRecord, path: &Path) -> Result<Vec<Finding>, FindingError> {
        if !self.locator.needs_source() {
            return self.findings(record, None);
        }

        match read_source(path) {
            Ok(source) => self.findings(record, Some(&source)),
            Err(e) => {
                warn!("{e}");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn record(diff: &str) -> FixRecord {
        FixRecord::new("src/Foo.php", diff, vec!["braces".to_string()])
    }

    #[test]
    fn scenario_single_replacement() {
        let engine = FindingEngine::new(DiffFormat::Unnumbered);
        let findings = engine
            .findings(&record("@@ @@\n-foo();\n+bar();"), Some("x;\nfoo();\ny;"))
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(1));
        assert_eq!(findings[0].original_text.as_deref(), Some("foo();"));
        assert_eq!(findings[0].replacement_text.as_deref(), Some("bar();"));
        assert_eq!(findings[0].code, DEFAULT_CODE);
    }

    #[test]
    fn scenario_combined_block() {
        let diff = "--- Original\n+++ New\n@@ @@\n a;\n+x;\n b;\n-c;\n-d;\n+e;";
        let source = "a;\nb;\nc;\nd;\n";
        let engine = FindingEngine::new(DiffFormat::Unnumbered);

        let findings = engine.findings(&record(diff), Some(source)).unwrap();
        let lines: Vec<Option<u32>> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3)]);
        assert_eq!(findings[0].replacement_text.as_deref(), Some("x;"));
        assert_eq!(findings[1].original_text.as_deref(), Some("c;\nd;"));
        assert_eq!(findings[1].replacement_text.as_deref(), Some("e;"));
    }

    #[test]
    fn scenario_nothing_matches() {
        let diff = "--- Original\n+++ New\n@@ @@\n-missing();\n+found();";
        let engine = FindingEngine::new(DiffFormat::Unnumbered);

        let findings = engine.findings(&record(diff), Some("a;\nb;\n")).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, None);
        assert_eq!(findings[0].column, None);
        assert!(findings[0].description.contains(diff));
    }

    #[test]
    fn scenario_collision_keeps_later_group() {
        let diff = "@@ @@\nctx;\n+added;\n@@ @@\n-old;\n+new;";
        let engine = FindingEngine::new(DiffFormat::Unnumbered);

        let findings = engine.findings(&record(diff), Some("ctx;\nold;\n")).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].original_text.as_deref(), Some("old;"));
        assert_eq!(findings[0].replacement_text.as_deref(), Some("new;"));
    }

    #[test]
    fn numbered_diff_needs_no_source() {
        let diff = "--- Original\n+++ New\n@@ -1,3 +1,3 @@\n <?php\n-foo( );\n+foo();\n bar();\n";
        let engine = FindingEngine::new(DiffFormat::Numbered);

        let findings = engine.findings(&record(diff), None).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].original_text.as_deref(), Some("foo( );"));
    }

    #[test]
    fn numbered_engine_rejects_unnumbered_diff() {
        let engine = FindingEngine::new(DiffFormat::Numbered);
        let result = engine.findings(&record("@@ @@\n-foo();"), None);
        assert!(matches!(
            result,
            Err(FindingError::DiffFormatError(DiffFormatError::InvalidHunkHeader { .. }))
        ));
    }

    #[test]
    fn findings_are_idempotent() {
        let diff = "@@ @@\n a;\n+x;\n b;\n-c;\n+C;\n@@ @@\n-gone;";
        let source = "a;\nb;\nc;\n";
        let engine = FindingEngine::new(DiffFormat::Unnumbered);
        let record = record(diff);

        assert_eq!(
            engine.findings(&record, Some(source)).unwrap(),
            engine.findings(&record, Some(source)).unwrap()
        );
    }

    #[test]
    fn engine_follows_fixer_version() {
        let numbered = FindingEngine::for_fixer_version(Some(FixerVersion::new(2, 19, 0)));
        assert_eq!(numbered.locator(), Locator::Structured);
        let unnumbered = FindingEngine::for_fixer_version(Some(FixerVersion::new(3, 2, 1)));
        assert_eq!(unnumbered.locator(), Locator::Heuristic);
        assert_eq!(FindingEngine::for_fixer_version(None).locator(), Locator::Heuristic);
    }

    #[test]
    fn custom_code() {
        let engine = FindingEngine::new(DiffFormat::Numbered).with_code("phpcs");
        assert_eq!(engine.code(), "phpcs");
        let findings = engine
            .findings(&record("@@ -1 +1 @@\n-a\n+b\n"), None)
            .unwrap();
        assert_eq!(findings[0].code, "phpcs");
    }

    #[test]
    fn unreadable_source_yields_no_findings() {
        let engine = FindingEngine::new(DiffFormat::Unnumbered);
        let findings = engine
            .findings_for_path(&record("@@ @@\n-foo();"), Path::new("/nonexistent/Foo.php"))
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn read_source_error_names_path() {
        let err = read_source(Path::new("/nonexistent/Foo.php")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read /nonexistent/Foo.php: "));
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FindingEngine>();
    }
}
