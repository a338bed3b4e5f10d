use crate::core::{ResourceKind, StitchError};
use crate::project::IncludedFile;
use crate::resources::Resource;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when an incoming resource collides with a target resource that
/// is outside the merge scope.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClobberPolicy {
    /// Replace the target resource, with a warning
    #[default]
    Overwrite,
    /// Keep the target resource, with a warning
    Skip,
    /// Abort before anything is written
    Error,
}

impl fmt::Display for ClobberPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClobberPolicy::Overwrite => write!(f, "overwrite"),
            ClobberPolicy::Skip => write!(f, "skip"),
            ClobberPolicy::Error => write!(f, "error"),
        }
    }
}

impl FromStr for ClobberPolicy {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(ClobberPolicy::Overwrite),
            "skip" => Ok(ClobberPolicy::Skip),
            "error" => Ok(ClobberPolicy::Error),
            _ => Err(StitchError::InvalidOption {
                option: "on_clobber".to_string(),
                reason: format!("'{s}' is not one of overwrite, skip, error"),
            }),
        }
    }
}

/// Validated merge settings. Build with [`MergeOptions::builder`].
///
/// A resource is in scope when its folder matches any folder pattern or its
/// name matches any name pattern. With no patterns at all, everything is in
/// scope. The kind whitelist applies to resources only, never to included
/// files, whose directory below `datafiles` stands in for the folder.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    folder_patterns: Vec<Regex>,
    name_patterns: Vec<Regex>,
    kinds: Vec<ResourceKind>,
    include_included_files: bool,
    check_dependencies: bool,
    move_conflicting: bool,
    on_clobber: ClobberPolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            folder_patterns: Vec::new(),
            name_patterns: Vec::new(),
            kinds: Vec::new(),
            include_included_files: true,
            check_dependencies: true,
            move_conflicting: false,
            on_clobber: ClobberPolicy::default(),
        }
    }
}

impl MergeOptions {
    /// Start building options from the defaults.
    #[must_use]
    pub fn builder() -> MergeOptionsBuilder {
        MergeOptionsBuilder::default()
    }

    /// Whether included files take part in the merge.
    #[must_use]
    pub const fn include_included_files(&self) -> bool {
        self.include_included_files
    }

    /// Whether object parents and sprites must be merged along.
    #[must_use]
    pub const fn check_dependencies(&self) -> bool {
        self.check_dependencies
    }

    /// Whether orphaned target resources are moved aside.
    #[must_use]
    pub const fn move_conflicting(&self) -> bool {
        self.move_conflicting
    }

    /// Clobber policy.
    #[must_use]
    pub const fn on_clobber(&self) -> ClobberPolicy {
        self.on_clobber
    }

    /// Kind whitelist; empty means every kind.
    #[must_use]
    pub fn kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }

    fn matches(&self, folder: &str, name: &str) -> bool {
        if self.folder_patterns.is_empty() && self.name_patterns.is_empty() {
            return true;
        }
        self.folder_patterns.iter().any(|re| re.is_match(folder))
            || self.name_patterns.iter().any(|re| re.is_match(name))
    }

    /// Whether a resource is in scope.
    #[must_use]
    pub fn matches_resource(&self, resource: &Resource) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&resource.kind()) {
            return false;
        }
        self.matches(&resource.folder(), resource.name())
    }

    /// Whether an included file is in scope.
    #[must_use]
    pub fn matches_file(&self, file: &IncludedFile) -> bool {
        self.matches(file.directory(), file.name())
    }
}

/// Builder for [`MergeOptions`]. Patterns are compiled by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct MergeOptionsBuilder {
    folder_patterns: Vec<String>,
    name_patterns: Vec<String>,
    kinds: Vec<ResourceKind>,
    include_included_files: Option<bool>,
    check_dependencies: Option<bool>,
    move_conflicting: Option<bool>,
    on_clobber: Option<ClobberPolicy>,
}

impl MergeOptionsBuilder {
    /// Add a folder pattern (case-insensitive regex search).
    #[must_use]
    pub fn if_folder_matches(mut self, pattern: impl Into<String>) -> Self {
        self.folder_patterns.push(pattern.into());
        self
    }

    /// Add a name pattern (case-insensitive regex search).
    #[must_use]
    pub fn if_name_matches(mut self, pattern: impl Into<String>) -> Self {
        self.name_patterns.push(pattern.into());
        self
    }

    /// Add several folder patterns.
    #[must_use]
    pub fn folder_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folder_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add several name patterns.
    #[must_use]
    pub fn name_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Restrict resources to these kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    #[must_use]
    pub const fn include_included_files(mut self, include: bool) -> Self {
        self.include_included_files = Some(include);
        self
    }

    #[must_use]
    pub const fn check_dependencies(mut self, check: bool) -> Self {
        self.check_dependencies = Some(check);
        self
    }

    #[must_use]
    pub const fn move_conflicting(mut self, relocate: bool) -> Self {
        self.move_conflicting = Some(relocate);
        self
    }

    #[must_use]
    pub const fn on_clobber(mut self, policy: ClobberPolicy) -> Self {
        self.on_clobber = Some(policy);
        self
    }

    /// Validate and compile.
    ///
    /// # Errors
    ///
    /// [`StitchError::InvalidPattern`] for an empty or malformed pattern.
    pub fn build(self) -> Result<MergeOptions, StitchError> {
        let defaults = MergeOptions::default();
        let mut kinds = self.kinds;
        kinds.sort();
        kinds.dedup();
        Ok(MergeOptions {
            folder_patterns: compile_all(&self.folder_patterns)?,
            name_patterns: compile_all(&self.name_patterns)?,
            kinds,
            include_included_files: self.include_included_files.unwrap_or(defaults.include_included_files),
            check_dependencies: self.check_dependencies.unwrap_or(defaults.check_dependencies),
            move_conflicting: self.move_conflicting.unwrap_or(defaults.move_conflicting),
            on_clobber: self.on_clobber.unwrap_or(defaults.on_clobber),
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, StitchError> {
    patterns
        .iter()
        .map(|pattern| {
            if pattern.trim().is_empty() {
                return Err(StitchError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: "pattern is empty".to_string(),
                });
            }
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| StitchError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorCategory;

    #[test]
    fn test_defaults() {
        let options = MergeOptions::default();
        assert!(options.include_included_files());
        assert!(options.check_dependencies());
        assert!(!options.move_conflicting());
        assert_eq!(options.on_clobber(), ClobberPolicy::Overwrite);
        assert!(options.matches("Anything/At/All", "x"));
    }

    #[test]
    fn test_patterns_are_case_insensitive_searches() -> Result<(), StitchError> {
        let options = MergeOptions::builder()
            .if_folder_matches("^modules/pack")
            .if_name_matches("_ui$")
            .build()?;
        assert!(options.matches("Modules/Pack/Scripts", "scr_a"));
        assert!(options.matches("Other", "spr_UI"));
        assert!(!options.matches("Other", "spr_game"));
        assert!(!options.matches("Old/Modules/Pack", "scr_a"));
        Ok(())
    }

    #[test]
    fn test_invalid_patterns_fail_validation() {
        for bad in ["(", "  "] {
            let err = MergeOptions::builder().if_name_matches(bad).build().unwrap_err();
            assert!(matches!(err, StitchError::InvalidPattern { .. }));
            assert_eq!(err.category(), ErrorCategory::Validation);
        }
    }

    #[test]
    fn test_clobber_policy_parsing() {
        assert_eq!("SKIP".parse::<ClobberPolicy>().ok(), Some(ClobberPolicy::Skip));
        assert_eq!(ClobberPolicy::Error.to_string(), "error");
        assert!("replace".parse::<ClobberPolicy>().is_err());
        let json = serde_json::to_string(&ClobberPolicy::Overwrite).unwrap_or_default();
        assert_eq!(json, "\"overwrite\"");
    }
}
