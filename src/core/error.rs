//! Error handling for Stitch
//!
//! This module provides the error taxonomy and user-friendly error reporting for
//! Stitch. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`StitchError`] - Enumerated error types for all failure cases in Stitch
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! Every [`StitchError`] belongs to exactly one [`ErrorCategory`]:
//! - **Validation**: a bad or missing option. Surfaced immediately, before any
//!   mutation is attempted ([`StitchError::InvalidPattern`], [`StitchError::InvalidOption`], ...)
//! - **Consistency**: name/kind collisions, missing dependencies, module
//!   conflicts and clobber violations ([`StitchError::KindConflict`],
//!   [`StitchError::MissingDependency`], ...)
//! - **Storage**: missing paths, dirty working trees and I/O failures
//!   ([`StitchError::ProjectNotFound`], [`StitchError::DirtyWorkingTree`], ...)
//!
//! None of them are retryable; a consistency error is never swallowed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stitch_cli::core::{StitchError, ErrorCategory, user_friendly_error};
//!
//! let error = StitchError::KindConflict {
//!     name: "Player".to_string(),
//!     expected: "object".to_string(),
//!     found: "sprite".to_string(),
//! };
//! assert_eq!(error.category(), ErrorCategory::Consistency);
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Broad classification of a [`StitchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing option; raised before any work starts
    Validation,
    /// The requested operation would leave a project inconsistent
    Consistency,
    /// File system, project discovery or version-control guard failures
    Storage,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Consistency => write!(f, "consistency"),
            ErrorCategory::Storage => write!(f, "storage"),
        }
    }
}

/// The main error type for Stitch operations
///
/// Each variant describes one specific failure mode and carries the names and
/// paths a user needs to fix it. Use [`StitchError::category`] to branch on the
/// broad class of failure.
#[derive(Error, Debug)]
pub enum StitchError {
    /// An option value is missing or malformed
    #[error("Invalid option '{option}': {reason}")]
    InvalidOption {
        /// The option that was rejected
        option: String,
        /// Why it was rejected
        reason: String,
    },

    /// A folder or name pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as provided
        pattern: String,
        /// Compiler error from the regex engine
        reason: String,
    },

    /// A resource name does not follow GameMaker naming rules
    #[error("Invalid resource name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A folder path cannot be used
    #[error("Invalid folder '{folder}'")]
    InvalidFolder {
        /// The rejected folder path
        folder: String,
    },

    /// An in-scope object references a parent or sprite that is not being imported
    #[error("{relation} \"{dependency}\" for object \"{object}\" is not in the imported modules")]
    MissingDependency {
        /// Either `Parent` or `Sprite`
        relation: String,
        /// Name of the missing resource
        dependency: String,
        /// Object that declares the dependency
        object: String,
    },

    /// The same name is used by resources of different kinds
    #[error("Resource '{name}' is a {found} in the target but a {expected} in the source")]
    KindConflict {
        /// Shared resource name
        name: String,
        /// Kind of the incoming resource
        expected: String,
        /// Kind of the existing resource
        found: String,
    },

    /// An out-of-scope target resource would be overwritten under `on_clobber=error`
    #[error("Merge would overwrite {kind} '{name}', which is not in the merge scope")]
    ClobberConflict {
        /// Name of the resource that would be clobbered
        name: String,
        /// Its kind
        kind: String,
    },

    /// A resource collides with a module import
    #[error("Conflict: local asset {name} exists but is not in the expected module {module}")]
    ModuleConflict {
        /// Name of the conflicting resource
        name: String,
        /// Module being imported
        module: String,
    },

    /// Included files in the target cannot be reconciled with the source
    #[error("Included file conflict: {reason} ({})", names.join(", "))]
    IncludedFileConflict {
        /// Names of the offending files
        names: Vec<String>,
        /// What went wrong
        reason: String,
    },

    /// A lookup matched a resource whose name differs only by case
    #[error("Resource names must always match case: found {found} when looking for {expected}")]
    NameCaseMismatch {
        /// The name stored in the project
        found: String,
        /// The name that was asked for
        expected: String,
    },

    /// A raw resource entry names a kind with no registered codec
    #[error("No constructor for resource {name} exists.")]
    UnknownResourceKind {
        /// Resource name (or raw path when the name is missing)
        name: String,
    },

    /// A room has no layer able to hold object instances
    #[error("No instance layer found in room {room}")]
    NoInstanceLayer {
        /// The room name
        room: String,
    },

    /// A Spine export is missing files or has an invalid JSON skeleton
    #[error("Invalid Spine source files at {path}: {reason}")]
    InvalidSpineSource {
        /// Path to the Spine JSON file
        path: String,
        /// What is missing or malformed
        reason: String,
    },

    /// A kind-specific operation was attempted on the wrong kind of resource
    #[error("Resource '{name}' is a {found}, expected a {expected}")]
    WrongKind {
        /// Resource name
        name: String,
        /// Kind the operation requires
        expected: String,
        /// Actual kind
        found: String,
    },

    /// No `.yyp` file could be found
    #[error("No GameMaker project (.yyp) found at {path}")]
    ProjectNotFound {
        /// Directory or file that was searched
        path: String,
    },

    /// A directory contains more than one `.yyp` file
    #[error("Multiple project files found in {path}")]
    MultipleProjectFiles {
        /// Directory that was searched
        path: String,
        /// Names of the competing files
        files: Vec<String>,
    },

    /// The `.yyp` file does not describe a GameMaker project
    #[error("Invalid project file {path}: {reason}")]
    InvalidProjectFile {
        /// Path to the file
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// A file that must exist does not
    #[error("File not found: {path}")]
    FileNotFound {
        /// Missing path
        path: String,
    },

    /// The project directory has uncommitted changes
    #[error("Working tree at {path} has uncommitted changes")]
    DirtyWorkingTree {
        /// Project directory
        path: String,
    },

    /// Git is required for the working tree check but is not installed
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A write was attempted through a read-only storage
    #[error("Cannot modify {path}: storage is read-only")]
    ReadOnly {
        /// Path that would have been written
        path: String,
    },

    /// A descriptor file could not be parsed
    #[error("Failed to parse descriptor {path}: {reason}")]
    YyParseError {
        /// Path to the descriptor
        path: String,
        /// Parser message
        reason: String,
    },

    /// A merge source could not be resolved to a local directory
    #[error("Source '{name}' not found")]
    SourceNotFound {
        /// The coordinate that was requested
        name: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl StitchError {
    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stitch_cli::core::{ErrorCategory, StitchError};
    ///
    /// let error = StitchError::DirtyWorkingTree { path: ".".into() };
    /// assert_eq!(error.category(), ErrorCategory::Storage);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            StitchError::InvalidOption { .. }
            | StitchError::InvalidPattern { .. }
            | StitchError::InvalidName { .. }
            | StitchError::InvalidFolder { .. } => ErrorCategory::Validation,

            StitchError::MissingDependency { .. }
            | StitchError::KindConflict { .. }
            | StitchError::ClobberConflict { .. }
            | StitchError::ModuleConflict { .. }
            | StitchError::IncludedFileConflict { .. }
            | StitchError::NameCaseMismatch { .. }
            | StitchError::UnknownResourceKind { .. }
            | StitchError::NoInstanceLayer { .. }
            | StitchError::InvalidSpineSource { .. }
            | StitchError::WrongKind { .. } => ErrorCategory::Consistency,

            StitchError::ProjectNotFound { .. }
            | StitchError::MultipleProjectFiles { .. }
            | StitchError::InvalidProjectFile { .. }
            | StitchError::FileNotFound { .. }
            | StitchError::DirtyWorkingTree { .. }
            | StitchError::GitNotFound
            | StitchError::ReadOnly { .. }
            | StitchError::YyParseError { .. }
            | StitchError::SourceNotFound { .. }
            | StitchError::IoError(_)
            | StitchError::Other { .. } => ErrorCategory::Storage,
        }
    }
}

impl Clone for StitchError {
    fn clone(&self) -> Self {
        match self {
            StitchError::IoError(e) => StitchError::IoError(std::io::Error::new(e.kind(), e.to_string())),
            StitchError::InvalidOption { option, reason } => StitchError::InvalidOption {
                option: option.clone(),
                reason: reason.clone(),
            },
            StitchError::InvalidPattern { pattern, reason } => StitchError::InvalidPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            StitchError::InvalidName { name, reason } => StitchError::InvalidName {
                name: name.clone(),
                reason: reason.clone(),
            },
            StitchError::InvalidFolder { folder } => StitchError::InvalidFolder {
                folder: folder.clone(),
            },
            StitchError::MissingDependency { relation, dependency, object } => {
                StitchError::MissingDependency {
                    relation: relation.clone(),
                    dependency: dependency.clone(),
                    object: object.clone(),
                }
            }
            StitchError::KindConflict { name, expected, found } => StitchError::KindConflict {
                name: name.clone(),
                expected: expected.clone(),
                found: found.clone(),
            },
            StitchError::ClobberConflict { name, kind } => StitchError::ClobberConflict {
                name: name.clone(),
                kind: kind.clone(),
            },
            StitchError::ModuleConflict { name, module } => StitchError::ModuleConflict {
                name: name.clone(),
                module: module.clone(),
            },
            StitchError::IncludedFileConflict { names, reason } => {
                StitchError::IncludedFileConflict {
                    names: names.clone(),
                    reason: reason.clone(),
                }
            }
            StitchError::NameCaseMismatch { found, expected } => StitchError::NameCaseMismatch {
                found: found.clone(),
                expected: expected.clone(),
            },
            StitchError::UnknownResourceKind { name } => StitchError::UnknownResourceKind {
                name: name.clone(),
            },
            StitchError::NoInstanceLayer { room } => StitchError::NoInstanceLayer {
                room: room.clone(),
            },
            StitchError::InvalidSpineSource { path, reason } => StitchError::InvalidSpineSource {
                path: path.clone(),
                reason: reason.clone(),
            },
            StitchError::WrongKind { name, expected, found } => StitchError::WrongKind {
                name: name.clone(),
                expected: expected.clone(),
                found: found.clone(),
            },
            StitchError::ProjectNotFound { path } => StitchError::ProjectNotFound {
                path: path.clone(),
            },
            StitchError::MultipleProjectFiles { path, files } => {
                StitchError::MultipleProjectFiles {
                    path: path.clone(),
                    files: files.clone(),
                }
            }
            StitchError::InvalidProjectFile { path, reason } => StitchError::InvalidProjectFile {
                path: path.clone(),
                reason: reason.clone(),
            },
            StitchError::FileNotFound { path } => StitchError::FileNotFound {
                path: path.clone(),
            },
            StitchError::DirtyWorkingTree { path } => StitchError::DirtyWorkingTree {
                path: path.clone(),
            },
            StitchError::GitNotFound => StitchError::GitNotFound,
            StitchError::ReadOnly { path } => StitchError::ReadOnly {
                path: path.clone(),
            },
            StitchError::YyParseError { path, reason } => StitchError::YyParseError {
                path: path.clone(),
                reason: reason.clone(),
            },
            StitchError::SourceNotFound { name } => StitchError::SourceNotFound {
                name: name.clone(),
            },
            StitchError::Other { message } => StitchError::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`StitchError`] and adds optional suggestions and details
/// to help users understand and resolve the error.
///
/// # Display Format
///
/// - **Error**: Red, bold text with the main error message
/// - **Details**: Yellow text with additional context
/// - **Suggestion**: Green text with actionable steps
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Stitch error
    pub error: StitchError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`StitchError`]
    #[must_use]
    pub const fn new(error: StitchError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps. They are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow, less prominent than the error itself.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// This is the primary way Stitch presents errors to users in the CLI.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Find the first [`StitchError`] anywhere in an error chain.
///
/// Library functions wrap typed errors with `anyhow` context, so the typed
/// error is usually not the outermost one.
#[must_use]
pub fn find_stitch_error(error: &anyhow::Error) -> Option<&StitchError> {
    error.chain().find_map(|cause| cause.downcast_ref::<StitchError>())
}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`StitchError`] anywhere in the chain and [`std::io::Error`];
/// anything else is reported with its full cause chain.
///
/// # Examples
///
/// ```rust,no_run
/// use stitch_cli::core::{StitchError, user_friendly_error};
///
/// let error = StitchError::GitNotFound;
/// let context = user_friendly_error(anyhow::Error::from(error));
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(stitch_error) = find_stitch_error(&error) {
        let context = create_error_context(stitch_error.clone());
        // Keep whatever context the library attached on top of the typed error
        let outer = error.to_string();
        if outer != context.error.to_string() && context.details.is_none() {
            return context.with_details(outer);
        }
        return context;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(StitchError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the project directory")
                .with_details("Stitch could not read or write a project file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(StitchError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(StitchError::Other {
        message,
    })
}

fn create_error_context(error: StitchError) -> ErrorContext {
    match &error {
        StitchError::InvalidPattern { .. } => ErrorContext::new(error)
            .with_suggestion("Patterns are case-insensitive regular expressions, e.g. '^Sprites/UI' or 'player'")
            .with_details("Patterns are validated before any file is touched"),

        StitchError::MissingDependency { dependency, .. } => {
            let suggestion = format!(
                "Widen the merge patterns so '{dependency}' is included, or pass --skip-dependency-check"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("No files were changed: dependency checks run before the merge starts")
        }

        StitchError::KindConflict { name, .. } => {
            let suggestion = format!("Rename '{name}' in one of the projects; names are shared across all resource kinds");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        StitchError::ClobberConflict { .. } => ErrorContext::new(error)
            .with_suggestion("Use --on-clobber overwrite or --on-clobber skip, or include the resource's folder in the merge patterns")
            .with_details("No files were changed: conflicts are detected before the merge starts"),

        StitchError::ModuleConflict { name, module } => {
            let suggestion = format!("Move '{name}' into a '{module}' folder in the target, or rename it");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        StitchError::IncludedFileConflict { .. } => ErrorContext::new(error)
            .with_suggestion("Remove or rename the listed included files in the target project")
            .with_details("Included files cannot be relocated into a conflicts folder"),

        StitchError::NameCaseMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Rename one of the resources so the names match exactly, including case"),

        StitchError::UnknownResourceKind { .. } => ErrorContext::new(error)
            .with_details("The project file lists a resource kind Stitch does not know how to load"),

        StitchError::ProjectNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Pass the directory containing your .yyp file with --target, or the .yyp file itself"),

        StitchError::MultipleProjectFiles { files, .. } => {
            let details = format!("Found: {}", files.join(", "));
            ErrorContext::new(error)
                .with_suggestion("Pass the .yyp file you want to use explicitly")
                .with_details(details)
        }

        StitchError::DirtyWorkingTree { .. } => ErrorContext::new(error)
            .with_suggestion("Commit or stash your changes first, or pass --allow-dirty")
            .with_details("Stitch rewrites many files; a clean working tree makes its changes easy to review and undo"),

        StitchError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or pass --allow-dirty to skip the working tree check"),

        StitchError::ReadOnly { .. } => ErrorContext::new(error)
            .with_details("The project was opened in read-only mode"),

        StitchError::YyParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Open the file in GameMaker and re-save it, or fix the syntax by hand"),

        StitchError::SourceNotFound { name } => {
            let suggestion = format!(
                "Pass an existing project directory, or define '{name}' in the [sources] table of your config"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categories() {
        assert_eq!(
            StitchError::InvalidPattern {
                pattern: "(".into(),
                reason: "unclosed group".into()
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StitchError::ClobberConflict {
                name: "spr_player".into(),
                kind: "sprite".into()
            }
            .category(),
            ErrorCategory::Consistency
        );
        assert_eq!(StitchError::GitNotFound.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_error_messages() {
        let error = StitchError::MissingDependency {
            relation: "Parent".into(),
            dependency: "o_parent".into(),
            object: "o_child".into(),
        };
        assert_eq!(
            error.to_string(),
            "Parent \"o_parent\" for object \"o_child\" is not in the imported modules"
        );

        let error = StitchError::UnknownResourceKind {
            name: "mystery".into(),
        };
        assert_eq!(error.to_string(), "No constructor for resource mystery exists.");

        let error = StitchError::IncludedFileConflict {
            names: vec!["a.txt".into(), "b.txt".into()],
            reason: "files exist only in the target".into(),
        };
        assert_eq!(
            error.to_string(),
            "Included file conflict: files exist only in the target (a.txt, b.txt)"
        );
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_error() {
        let result: anyhow::Result<()> = Err(StitchError::DirtyWorkingTree {
            path: "/tmp/project".into(),
        })
        .context("Failed to load project");

        let ctx = user_friendly_error(result.unwrap_err());
        assert!(matches!(ctx.error, StitchError::DirtyWorkingTree { .. }));
        assert!(ctx.suggestion.as_deref().unwrap_or_default().contains("--allow-dirty"));
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(error);
        let message = ctx.to_string();
        assert!(message.contains("outer"));
        assert!(message.contains("Caused by:"));
        assert!(message.contains("root cause"));
    }

    #[test]
    fn test_error_context_display_format() {
        let ctx = ErrorContext::new(StitchError::GitNotFound)
            .with_details("details here")
            .with_suggestion("do this");
        let text = ctx.to_string();
        assert!(text.starts_with("Git is not installed"));
        assert!(text.contains("\nDetails: details here"));
        assert!(text.contains("\nSuggestion: do this"));
    }

    #[test]
    fn test_clone_io_error() {
        let error = StitchError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let cloned = error.clone();
        assert!(matches!(cloned, StitchError::IoError(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
