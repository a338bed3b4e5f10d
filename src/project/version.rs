//! Project version stored in the per-platform options files.
//!
//! GameMaker keeps one version per target platform, in
//! `options/<platform>/options_<platform>.yy` under the key
//! `option_<platform>_version`, always as four dot-separated numbers.

use super::Project;
use crate::constants::VERSIONED_PLATFORMS;
use crate::core::StitchError;
use anyhow::Result;
use regex::Regex;
use serde_json::{Value, json};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::info;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:\.(\d+)|-rc\.(\d+))?$").expect("version regex is valid")
});

/// A four-part GameMaker version.
///
/// Parses `1.2.3`, `1.2.3.4` and `1.2.3-rc.4`; the release candidate number
/// becomes the fourth part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
}

impl FromStr for ProjectVersion {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StitchError::InvalidOption {
            option: "version".to_string(),
            reason: format!("{s} is not a valid version; use 1.2.3, 1.2.3.4 or 1.2.3-rc.4"),
        };
        let caps = VERSION_RE.captures(s.trim()).ok_or_else(invalid)?;
        let part = |i: usize| -> Result<u64, StitchError> {
            caps.get(i).map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
        };
        let revision = if caps.get(4).is_some() { part(4)? } else { part(5)? };
        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
            revision,
        })
    }
}

impl fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.revision)
    }
}

fn version_key(platform: &str) -> String {
    format!("option_{platform}_version")
}

impl Project {
    fn options_file(&self, platform: &str) -> PathBuf {
        self.dir()
            .join("options")
            .join(platform)
            .join(format!("options_{platform}.yy"))
    }

    /// Write the version into every platform options file present.
    ///
    /// Returns the platforms that were updated.
    pub fn set_version(&self, version: &ProjectVersion) -> Result<Vec<String>> {
        let mut updated = Vec::new();
        for platform in VERSIONED_PLATFORMS {
            let path = self.options_file(platform);
            if !self.storage().exists(&path) {
                continue;
            }
            let mut options = self.storage().read_yy(&path)?;
            if let Some(map) = options.as_object_mut() {
                map.insert(version_key(platform), json!(version.to_string()));
            }
            self.storage().write_yy(&path, &options)?;
            updated.push((*platform).to_string());
        }
        info!("Set version {} on {} platform(s)", version, updated.len());
        Ok(updated)
    }

    /// The version stored for one platform, if its options file has one.
    pub fn version_on_platform(&self, platform: &str) -> Result<Option<String>> {
        if !VERSIONED_PLATFORMS.contains(&platform) {
            return Err(StitchError::InvalidOption {
                option: "platform".to_string(),
                reason: format!("{platform} is not one of {}", VERSIONED_PLATFORMS.join(", ")),
            }
            .into());
        }
        let path = self.options_file(platform);
        if !self.storage().exists(&path) {
            return Ok(None);
        }
        Ok(self
            .storage()
            .read_yy(&path)?
            .get(version_key(platform))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}
