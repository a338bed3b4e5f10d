use super::common::OutputFormat;
use crate::core::StitchError;
use crate::storage::Storage;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Rewrite descriptor files (`.yy`, `.yyp`, JSON) in GameMaker's canonical form.
///
/// Trailing commas are dropped, 64-bit integers are kept exact and
/// indentation is normalized. Files already in canonical form are not touched.
#[derive(Debug, Args)]
pub struct JsonifyCommand {
    /// Files or glob patterns to rewrite, e.g. `objects/**/*.yy`
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct JsonifyResult {
    file: String,
    changed: bool,
}

/// Expand glob patterns. A plain path is kept as-is; a pattern that matches
/// nothing is an error.
fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }
        let matches = glob::glob(pattern).map_err(|e| StitchError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        let before = files.len();
        for entry in matches {
            let path = entry.with_context(|| format!("Failed to expand {pattern}"))?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            return Err(StitchError::InvalidPattern {
                pattern: pattern.clone(),
                reason: "no files match".to_string(),
            }
            .into());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

impl JsonifyCommand {
    pub async fn execute(self) -> Result<()> {
        let storage = Storage::new(false, true);
        let files = expand_files(&self.files)?;
        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            let value = storage
                .read_yy(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let changed = storage.write_yy(file, &value)?;
            results.push(JsonifyResult {
                file: file.display().to_string(),
                changed,
            });
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => {
                for result in &results {
                    if result.changed {
                        println!("{} {}", "rewrote".green(), result.file);
                    } else {
                        println!("{} {}", "unchanged".dimmed(), result.file);
                    }
                }
            }
        }
        Ok(())
    }
}
