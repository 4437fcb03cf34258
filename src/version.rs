//! Fixer version detection.
//!
//! Only the 2.x line from 2.8.0 on prints numbered `udiff` hunks; older and
//! newer releases separate hunks with bare `@@ @@` lines.

use crate::locate::DiffFormat;
use error_set::error_set;
use nom::{
    IResult, Parser,
    character::complete::{self, char},
    combinator::opt,
};
use std::fmt;
use std::str::FromStr;

const BANNER_PREFIX: &str = "php cs fixer ";

error_set! {
    /// Errors from reading a fixer version
    VersionError := {
        /// Neither a `X.Y.Z` version nor a `PHP CS Fixer X.Y.Z` banner
        #[display("Unrecognised fixer version '{input}'")]
        Unrecognised { input: String },
    }
}

/// `major.minor.patch` of a fixer release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// First release printing numbered hunks
const NUMBERED_FROM: FixerVersion = FixerVersion::new(2, 8, 0);
/// First release back on unnumbered hunks
const NUMBERED_UNTIL: FixerVersion = FixerVersion::new(3, 0, 0);

impl FixerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Pull the version out of `--version` output such as
    /// `PHP CS Fixer 2.19.3 Testament by Fabien Potencier`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixer_lint::FixerVersion;
    ///
    /// let version = FixerVersion::parse_banner("PHP CS Fixer 2.19.3 Testament").unwrap();
    /// assert_eq!(version, FixerVersion::new(2, 19, 3));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Unrecognised`] if the banner carries no version.
    pub fn parse_banner(banner: &str) -> Result<Self, VersionError> {
        let unrecognised = || VersionError::Unrecognised {
            input: banner.trim().to_string(),
        };

        // ASCII lowercasing keeps byte offsets intact
        let start = banner
            .to_ascii_lowercase()
            .find(BANNER_PREFIX)
            .ok_or_else(unrecognised)?
            + BANNER_PREFIX.len();

        version(&banner[start..])
            .map(|(_, version)| version)
            .map_err(|_| unrecognised())
    }

    /// Diff format this release prints
    pub fn diff_format(self) -> DiffFormat {
        if (NUMBERED_FROM..NUMBERED_UNTIL).contains(&self) {
            DiffFormat::Numbered
        } else {
            DiffFormat::Unnumbered
        }
    }
}

/// `X.Y.Z`, with an optional leading `v`
fn version(input: &str) -> IResult<&str, FixerVersion> {
    (
        opt(char('v')),
        complete::u32,
        char('.'),
        complete::u32,
        char('.'),
        complete::u32,
    )
        .map(|(_, major, _, minor, _, patch)| FixerVersion::new(major, minor, patch))
        .parse(input)
}

impl FromStr for FixerVersion {
    type Err = VersionError;

    /// Accepts a bare version (`2.19.3`, `v3.1.0`) or a full banner
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match version(s.trim()) {
            Ok(("", version)) => Ok(version),
            _ => Self::parse_banner(s),
        }
    }
}

impl fmt::Display for FixerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
