//! Bundle options and argument validation.
//!
//! Validation here is synchronous: a call with invalid arguments fails before
//! any file is touched.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BundleOutput, Error, Result};

/// Default glob selecting test files.
pub const DEFAULT_PATTERN: &str = "**/test/test*.js";

/// Default globs excluded from discovery.
pub const DEFAULT_IGNORE: &[&str] = &["node_modules/**", "build/**", "reports/**"];

/// Glob matching options: `*` stays within one path component.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Options for a bundle call.
///
/// # Example
///
/// ```no_run
/// use testpack::BundleOptions;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = BundleOptions::new()
///     .pattern("**/test/*.js")
///     .out("build/tests.js")
///     .bundle("./lib")
///     .await?;
/// assert!(output.is_written());
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleOptions {
    /// Glob selecting entry files, relative to the bundled directory
    pub pattern: String,

    /// Globs excluding files and directories from discovery
    pub ignore: Vec<String>,

    /// Write the bundle here instead of returning it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,

    /// Bare specifiers left to the host `require`
    pub external: Vec<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            out: None,
            external: Vec::new(),
        }
    }
}

impl BundleOptions {
    /// Create options with the defaults: [`DEFAULT_PATTERN`], [`DEFAULT_IGNORE`],
    /// no `out` and no externals.
    ///
    /// # Examples
    ///
    /// ```
    /// use testpack::{BundleOptions, DEFAULT_PATTERN};
    ///
    /// let options = BundleOptions::new();
    /// assert_eq!(options.pattern, DEFAULT_PATTERN);
    /// assert!(options.out.is_none());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry file glob
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Replace the ignore globs
    pub fn ignore<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = globs.into_iter().map(Into::into).collect();
        self
    }

    /// Write the bundle to `path`
    pub fn out(mut self, path: impl Into<PathBuf>) -> Self {
        self.out = Some(path.into());
        self
    }

    /// Leave these packages to the host `require`
    pub fn external<I, S>(mut self, specifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external = specifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Bundle `dir` with these options.
    pub async fn bundle(self, dir: impl AsRef<Path>) -> Result<BundleOutput> {
        crate::bundle(dir, self).await
    }

    /// Parse options from a dynamic value.
    ///
    /// The value must be an object; recognised fields must have the right
    /// type. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self> {
        let options: Self = match value {
            Value::Null => Self::default(),
            Value::Object(_) => serde_json::from_value(value).map_err(|e| {
                Error::InvalidArgument(format!("invalid option: {}", e))
            })?,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "options argument must be an object. Value: `{}`",
                    other
                )));
            }
        };
        options.validate()?;
        Ok(options)
    }

    /// Check every option without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    pub(crate) fn compile(&self) -> Result<CompiledPatterns> {
        if self.pattern.is_empty() {
            return Err(Error::InvalidArgument(
                "`pattern` option must be a non-empty glob".to_string(),
            ));
        }
        let pattern = Pattern::new(&self.pattern).map_err(|e| {
            Error::InvalidArgument(format!("invalid `pattern` glob `{}`: {}", self.pattern, e))
        })?;

        let mut ignore = Vec::with_capacity(self.ignore.len());
        for glob in &self.ignore {
            let compile = |g: &str| {
                Pattern::new(g).map_err(|e| {
                    Error::InvalidArgument(format!("invalid `ignore` glob `{}`: {}", glob, e))
                })
            };
            ignore.push(compile(glob)?);
            // `dir/**` must also cover `dir` itself so the walk can prune it
            if let Some(dir) = glob.strip_suffix("/**") {
                if !dir.is_empty() {
                    ignore.push(compile(dir)?);
                }
            }
        }

        if let Some(out) = &self.out {
            if out.as_os_str().is_empty() {
                return Err(Error::InvalidArgument(
                    "`out` option must be a non-empty path".to_string(),
                ));
            }
        }

        Ok(CompiledPatterns { pattern, ignore })
    }
}

/// Compiled `pattern` and `ignore` globs.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPatterns {
    pub pattern: Pattern,
    pub ignore: Vec<Pattern>,
}

impl CompiledPatterns {
    /// Whether a file (relative, `/`-separated) is an entry
    pub fn is_entry(&self, relative: &str) -> bool {
        self.pattern.matches_with(relative, MATCH_OPTIONS) && !self.is_ignored(relative)
    }

    /// Whether a file is excluded, directly or through one of its directories
    pub fn is_ignored(&self, relative: &str) -> bool {
        let mut candidate = relative;
        loop {
            if self.matches_ignore(candidate) {
                return true;
            }
            match candidate.rfind('/') {
                Some(idx) => candidate = &candidate[..idx],
                None => return false,
            }
        }
    }

    /// Whether a directory should not be descended into
    pub fn prunes_dir(&self, relative: &str) -> bool {
        self.matches_ignore(relative)
    }

    fn matches_ignore(&self, relative: &str) -> bool {
        self.ignore
            .iter()
            .any(|glob| glob.matches_with(relative, MATCH_OPTIONS))
    }
}

/// Check a dynamically typed directory argument.
///
/// Anything but a non-empty string is rejected.
pub fn validate_directory(value: &Value) -> Result<PathBuf> {
    match value {
        Value::String(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        Value::String(_) => Err(Error::InvalidArgument(
            "directory must be a non-empty string".to_string(),
        )),
        other => Err(Error::InvalidArgument(format!(
            "directory must be a string. Value: `{}`",
            other
        ))),
    }
}
