use colored::Colorize;
use serde::Serialize;

/// What a merge or module import did to the target project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Resources that were new to the target
    pub added: Vec<String>,
    /// Target resources overwritten from the source
    pub replaced: Vec<String>,
    /// Source resources left out under `on_clobber=skip`
    pub skipped: Vec<String>,
    /// Orphaned target resources moved into the conflicts folder
    pub relocated: Vec<String>,
    pub files_added: Vec<String>,
    pub files_replaced: Vec<String>,
    pub files_skipped: Vec<String>,
    /// Audio and texture groups created by the post-pass
    pub groups_created: Vec<String>,
    pub configs_created: Vec<String>,
    pub warnings: Vec<String>,
    /// Files written or deleted on disk
    pub writes: usize,
}

impl MergeReport {
    /// Whether the run left the target byte-identical.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.writes == 0
    }

    /// Human-readable summary.
    #[must_use]
    pub fn render(&self) -> String {
        let sections = [
            ("Added", &self.added),
            ("Replaced", &self.replaced),
            ("Skipped", &self.skipped),
            ("Relocated", &self.relocated),
            ("Added files", &self.files_added),
            ("Replaced files", &self.files_replaced),
            ("Skipped files", &self.files_skipped),
            ("Created groups", &self.groups_created),
            ("Created configs", &self.configs_created),
        ];
        let mut lines = Vec::new();
        for (label, names) in sections {
            if names.is_empty() {
                continue;
            }
            lines.push(format!("{} ({}): {}", label.bold(), names.len(), names.join(", ")));
        }
        for warning in &self.warnings {
            lines.push(format!("{} {}", "warning:".yellow(), warning));
        }
        if self.is_unchanged() {
            lines.push("Target is already up to date".green().to_string());
        } else {
            lines.push(format!("{} {} file(s) written", "✓".green(), self.writes));
        }
        lines.join("\n")
    }
}
