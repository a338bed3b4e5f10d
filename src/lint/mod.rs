//! Project lint: unused global functions and outdated versioned calls.
//!
//! Global functions are the functions declared at the outermost scope of
//! scripts. A function with no reference in any script or object event is
//! reported as unreferenced; its own declaration does not count.
//!
//! When a version suffix pattern such as `(_v\d+)?` is given, `foo`,
//! `foo_v1` and `foo_v2` are treated as versions of one function. A call to
//! any version other than the declared one is a stale reference.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stitch_cli::lint::{LintOptions, Linter};
//! use stitch_cli::project::{Project, ProjectOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let project = Project::load("./MyGame", ProjectOptions { read_only: true, allow_dirty: true })?;
//! let options = LintOptions {
//!     version_suffix: Some(r"(_v\d+)?".to_string()),
//!     ..LintOptions::default()
//! };
//! let report = Linter::new(&project, options).run()?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

use crate::core::{ResourceKind, StitchError};
use crate::parser::{GmlToken, ReferenceMatcher, strip_comments_and_strings};
use crate::project::Project;
use crate::utils::normalize_path_for_storage;
use anyhow::Result;
use colored::Colorize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// What to lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintOptions {
    /// Regex matching version suffixes; enables stale reference checks
    pub version_suffix: Option<String>,
    /// Only lint these function names
    pub functions: Option<Vec<String>>,
    /// Only lint functions whose name matches this regex
    pub allow_name_pattern: Option<String>,
    /// Skip functions whose name matches this regex
    pub exclude_name_pattern: Option<String>,
}

/// A token and the project-relative file it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    /// Forward-slash path relative to the project directory
    pub file: String,
    #[serde(flatten)]
    pub token: GmlToken,
}

impl LintFinding {
    fn line(&self) -> String {
        format!(
            "{}:{}:{} {}",
            self.file,
            self.token.location.line + 1,
            self.token.location.column + 1,
            self.token.name
        )
    }
}

/// Result of a lint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    /// Declarations of global functions nothing calls
    pub unreferenced_global_functions: Vec<LintFinding>,
    /// Calls naming another version than the declared one; always empty
    /// without a version suffix
    pub stale_versioned_references: Vec<LintFinding>,
}

impl LintReport {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unreferenced_global_functions.is_empty() && self.stale_versioned_references.is_empty()
    }

    /// Human-readable report with colored section headers.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if !self.unreferenced_global_functions.is_empty() {
            lines.push(String::new());
            lines.push("Nonreferenced Functions".yellow().to_string());
            lines.extend(self.unreferenced_global_functions.iter().map(LintFinding::line));
        }
        if !self.stale_versioned_references.is_empty() {
            lines.push(String::new());
            lines.push("Outdated Function Version References".red().to_string());
            lines.extend(self.stale_versioned_references.iter().map(LintFinding::line));
        }
        lines.join("\n")
    }
}

/// GML text from one file of the project.
struct SourceFile {
    file: String,
    code: String,
    /// `code` with comments and strings blanked
    stripped: String,
}

impl SourceFile {
    fn new(file: String, code: String) -> Self {
        let stripped = strip_comments_and_strings(&code).stripped;
        Self { file, code, stripped }
    }
}

/// Runs lint checks over a loaded project.
pub struct Linter<'a> {
    project: &'a Project,
    options: LintOptions,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        StitchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl<'a> Linter<'a> {
    /// Create a linter for `project`.
    #[must_use]
    pub fn new(project: &'a Project, options: LintOptions) -> Self {
        Self { project, options }
    }

    fn relative(&self, path: &Path) -> String {
        normalize_path_for_storage(path.strip_prefix(self.project.dir()).unwrap_or(path))
    }

    /// Every script and object event, with its code.
    fn sources(&self) -> Result<Vec<SourceFile>> {
        let mut sources = Vec::new();
        for resource in self.project.resources() {
            match resource.kind() {
                ResourceKind::Script => sources.push(SourceFile::new(
                    self.relative(&resource.code_file_path()?),
                    resource.code()?.to_string(),
                )),
                ResourceKind::Object => {
                    for event in resource.events()? {
                        sources.push(SourceFile::new(
                            format!("{}/{}.gml", resource.yy_dir_relative(), event.name),
                            event.code.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(sources)
    }

    /// Global functions selected by the options, with their declaring file.
    fn functions(&self) -> Result<Vec<LintFinding>> {
        let allow = self.options.allow_name_pattern.as_deref().map(compile).transpose()?;
        let exclude = self.options.exclude_name_pattern.as_deref().map(compile).transpose()?;
        let mut functions = Vec::new();
        for script in self.project.resources().filter_by_kind(ResourceKind::Script) {
            let file = self.relative(&script.code_file_path()?);
            for token in script.global_functions()? {
                let selected = if let Some(only) = &self.options.functions {
                    only.iter().any(|name| name == &token.name)
                } else if let Some(allow) = &allow {
                    allow.is_match(&token.name)
                } else if let Some(exclude) = &exclude {
                    !exclude.is_match(&token.name)
                } else {
                    true
                };
                if selected {
                    functions.push(LintFinding {
                        file: file.clone(),
                        token: token.clone(),
                    });
                }
            }
        }
        Ok(functions)
    }

    /// Lint the project.
    ///
    /// A project without global functions yields an empty report. The only
    /// errors are invalid patterns and unreadable source files.
    pub fn run(&self) -> Result<LintReport> {
        let suffix = self.options.version_suffix.as_deref().filter(|s| !s.is_empty());
        let functions = self.functions()?;
        let sources = self.sources()?;
        debug!("Linting {} function(s) across {} file(s)", functions.len(), sources.len());

        let mut report = LintReport::default();
        for function in functions {
            let matcher = ReferenceMatcher::new(&function.token.name, suffix)?;
            let mut referenced = false;
            for source in &sources {
                for reference in matcher.find_stripped(&source.code, &source.stripped) {
                    let is_declaration = source.file == function.file
                        && reference.token.location.position == function.token.location.position;
                    if is_declaration {
                        continue;
                    }
                    referenced = true;
                    if !reference.is_correct_version() {
                        report.stale_versioned_references.push(LintFinding {
                            file: source.file.clone(),
                            token: reference.token,
                        });
                    }
                }
            }
            if !referenced {
                report.unreferenced_global_functions.push(function);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ProjectFixture;

    #[test]
    fn test_unreferenced_and_outdated() -> Result<()> {
        let fixture = ProjectFixture::new()?;
        fixture.add_script("scr_lib", "Scripts", "function foo_v2(){}\nfunction bar(){ foo_v2(); }")?;
        fixture.add_script("scr_main", "Scripts", "foo_v1();\n// bar();")?;
        let project = fixture.load()?;

        let options = LintOptions {
            version_suffix: Some(r"(_v\d+)?".to_string()),
            ..LintOptions::default()
        };
        let report = Linter::new(&project, options).run()?;

        let unused: Vec<&str> = report.unreferenced_global_functions.iter().map(|f| f.token.name.as_str()).collect();
        assert_eq!(unused, vec!["bar"]);
        let outdated = &report.stale_versioned_references;
        assert_eq!(outdated.len(), 1);
        assert_eq!(outdated[0].token.name, "foo_v1");
        assert_eq!(outdated[0].file, "scripts/scr_main/scr_main.gml");
        assert!(!report.is_clean());
        assert!(report.render().contains("Outdated Function Version References"));
        Ok(())
    }

    #[test]
    fn test_object_events_count_as_references() -> Result<()> {
        let fixture = ProjectFixture::new()?;
        fixture.add_script("scr_lib", "Scripts", "function spawn(){}")?;
        fixture.add_object("obj_spawner", "Objects")?;
        fixture.add_object_event("obj_spawner", "Create_0", "spawn();")?;
        let project = fixture.load()?;

        let report = Linter::new(&project, LintOptions::default()).run()?;
        assert!(report.is_clean());
        assert!(report.stale_versioned_references.is_empty());
        Ok(())
    }

    #[test]
    fn test_function_filters() -> Result<()> {
        let fixture = ProjectFixture::new()?;
        fixture.add_script("scr_lib", "Scripts", "function a_one(){}\nfunction b_two(){}")?;
        let project = fixture.load()?;

        let only = LintOptions {
            functions: Some(vec!["b_two".to_string()]),
            ..LintOptions::default()
        };
        assert_eq!(Linter::new(&project, only).run()?.unreferenced_global_functions.len(), 1);

        let excluded = LintOptions {
            exclude_name_pattern: Some("^a_".to_string()),
            ..LintOptions::default()
        };
        let report = Linter::new(&project, excluded).run()?;
        assert_eq!(report.unreferenced_global_functions[0].token.name, "b_two");

        let bad = LintOptions {
            allow_name_pattern: Some("(".to_string()),
            ..LintOptions::default()
        };
        assert!(Linter::new(&project, bad).run().is_err());
        Ok(())
    }

    #[test]
    fn test_empty_project_is_clean() -> Result<()> {
        let fixture = ProjectFixture::new()?;
        let report = Linter::new(&fixture.load()?, LintOptions::default()).run()?;
        assert!(report.is_clean());
        assert_eq!(report.render(), "");
        let json = serde_json::to_value(&report)?;
        assert_eq!(
            json,
            serde_json::json!({"unreferencedGlobalFunctions": [], "staleVersionedReferences": []})
        );
        Ok(())
    }
}
