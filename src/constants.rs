//! Global constants used throughout the Stitch codebase.
//!
//! Folder names, default group names and file names that several modules
//! agree on are defined here so the literal strings live in one place.

/// Folder that receives orphaned target resources during a merge.
pub const MERGE_CONFLICTS_FOLDER: &str = "MERGE_CONFLICTS";

/// Folder that receives orphaned target resources during a module import.
pub const MODULE_CONFLICTS_FOLDER: &str = "MODULE_CONFLICTS";

/// Folder new resources land in until they are moved.
pub const NEW_RESOURCE_FOLDER: &str = "NEW";

/// Audio group every new project has.
pub const DEFAULT_AUDIO_GROUP: &str = "audiogroup_default";

/// Texture group every new project has.
pub const DEFAULT_TEXTURE_GROUP: &str = "Default";

/// Root configuration every project has.
pub const DEFAULT_CONFIG: &str = "Default";

/// Target mask GameMaker writes into new audio and texture groups.
///
/// Larger than 2^53, so it only survives a round trip as an integer.
pub const DEFAULT_GROUP_TARGETS: u64 = 461_609_314_234_257_646;

/// Per-project settings file stored next to the `.yyp`.
pub const PROJECT_CONFIG_FILE: &str = "stitch.config.json";

/// Directory holding included files.
pub const DATAFILES_DIR: &str = "datafiles";

/// Audio file extensions accepted when adding or replacing sounds.
pub const SOUND_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "wma"];

/// Audio sample rates GameMaker accepts.
pub const SOUND_SAMPLE_RATES: &[u32] = &[5512, 11025, 22050, 32000, 44100, 48000];

/// Platforms whose options file carries a project version.
pub const VERSIONED_PLATFORMS: &[&str] = &[
    "amazonfire",
    "android",
    "html5",
    "ios",
    "linux",
    "mac",
    "ps4",
    "switch",
    "tvos",
    "windows",
    "windowsuap",
    "xboxone",
];
