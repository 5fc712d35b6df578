//! Include/exclude glob filtering of scanned paths.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use porter_config::ImportConfig;

use crate::error::{Result, ScanError};

/// Decides which files under a scan root are candidates for import.
///
/// Paths are matched relative to the scan root. A file is accepted when it
/// matches at least one include glob and no exclude glob. Globs follow
/// `globset` syntax, where `*` also crosses directory separators.
#[derive(Debug, Clone)]
pub struct FileFilter {
    includes: GlobSet,
    excludes: GlobSet,
    include_patterns: Vec<String>,
}

impl FileFilter {
    /// Build a filter from include and exclude patterns.
    pub fn new<I, E, S, T>(includes: I, excludes: E) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let include_patterns: Vec<String> = includes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let includes = build_set(&include_patterns)?;
        let excludes = build_set(
            &excludes
                .into_iter()
                .map(|p| p.as_ref().to_string())
                .collect::<Vec<_>>(),
        )?;

        Ok(Self {
            includes,
            excludes,
            include_patterns,
        })
    }

    /// Build a filter from configuration.
    ///
    /// An explicit `pattern` replaces the configured includes; the configured
    /// excludes always apply.
    pub fn from_config(config: &ImportConfig, pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(pattern) => Self::new([pattern], &config.excludes),
            None => Self::new(&config.includes, &config.excludes),
        }
    }

    /// Whether a file path relative to the scan root should be scanned.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }

    /// Whether a directory relative to the scan root is excluded as a whole.
    pub fn is_excluded_dir(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty() && self.excludes.is_match(relative)
    }

    /// Include patterns as given.
    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn default_filter(pattern: Option<&str>) -> FileFilter {
        FileFilter::from_config(&ImportConfig::default(), pattern).unwrap()
    }

    #[test_case("users/admin.user.xml", true ; "nested xml")]
    #[test_case("admin.user.xml", true ; "top level xml")]
    #[test_case("users/._admin.user.xml", false ; "resource fork")]
    #[test_case("users/admin.user.xml~", false ; "editor backup")]
    #[test_case(".git/config.xml", false ; "vcs directory")]
    #[test_case("README.txt", false ; "not xml")]
    fn default_includes_and_excludes(path: &str, expected: bool) {
        assert_eq!(default_filter(None).is_match(Path::new(path)), expected);
    }

    #[test]
    fn explicit_pattern_replaces_includes_but_keeps_excludes() {
        let filter = default_filter(Some("*.group.xml"));

        assert!(filter.is_match(Path::new("staff.group.xml")));
        assert!(!filter.is_match(Path::new("admin.user.xml")));
        assert!(!filter.is_match(Path::new("._staff.group.xml")));
        assert_eq!(filter.include_patterns(), ["*.group.xml".to_string()]);
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let filter = default_filter(None);

        assert!(filter.is_excluded_dir(Path::new("project/.svn")));
        assert!(!filter.is_excluded_dir(Path::new("project/users")));
        assert!(!filter.is_excluded_dir(Path::new("")));
    }

    #[test]
    fn bad_pattern_is_reported() {
        let err = FileFilter::new(["[oops"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { ref pattern, .. } if pattern == "[oops"));
    }
}
