//! Resource kinds known to Stitch.
//!
//! GameMaker stores each asset under a kind-specific root directory
//! (`scripts/`, `sprites/`, ...). The set of kinds is closed: a project entry
//! whose root is not listed here cannot be loaded.

use serde::{Deserialize, Serialize};

/// The closed set of resource kinds a project may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// GML script (`<name>.gml` companion)
    Script,
    /// Sprite with frame images and optional Spine data
    Sprite,
    /// Sound with a single audio file companion
    Sound,
    /// Object with event `.gml` companions
    Object,
    /// Room with layers and instances
    Room,
    /// Tile set
    Tileset,
    /// Font
    Font,
    /// Path
    Path,
    /// Shader (`.vsh`/`.fsh` companions)
    Shader,
    /// Timeline
    Timeline,
    /// Animation curve
    #[serde(rename = "animcurve")]
    AnimCurve,
    /// Sequence
    Sequence,
    /// Extension
    Extension,
    /// Note (`.txt` companion)
    Note,
    /// Particle system
    #[serde(rename = "particle")]
    ParticleSystem,
}

impl ResourceKind {
    /// Every kind, in a stable order.
    pub const ALL: [ResourceKind; 15] = [
        ResourceKind::Script,
        ResourceKind::Sprite,
        ResourceKind::Sound,
        ResourceKind::Object,
        ResourceKind::Room,
        ResourceKind::Tileset,
        ResourceKind::Font,
        ResourceKind::Path,
        ResourceKind::Shader,
        ResourceKind::Timeline,
        ResourceKind::AnimCurve,
        ResourceKind::Sequence,
        ResourceKind::Extension,
        ResourceKind::Note,
        ResourceKind::ParticleSystem,
    ];

    /// Directory under the project root that holds resources of this kind.
    #[must_use]
    pub const fn root(&self) -> &'static str {
        match self {
            ResourceKind::Script => "scripts",
            ResourceKind::Sprite => "sprites",
            ResourceKind::Sound => "sounds",
            ResourceKind::Object => "objects",
            ResourceKind::Room => "rooms",
            ResourceKind::Tileset => "tilesets",
            ResourceKind::Font => "fonts",
            ResourceKind::Path => "paths",
            ResourceKind::Shader => "shaders",
            ResourceKind::Timeline => "timelines",
            ResourceKind::AnimCurve => "animcurves",
            ResourceKind::Sequence => "sequences",
            ResourceKind::Extension => "extensions",
            ResourceKind::Note => "notes",
            ResourceKind::ParticleSystem => "particles",
        }
    }

    /// The `resourceType` tag GameMaker writes into descriptors of this kind.
    #[must_use]
    pub const fn resource_type(&self) -> &'static str {
        match self {
            ResourceKind::Script => "GMScript",
            ResourceKind::Sprite => "GMSprite",
            ResourceKind::Sound => "GMSound",
            ResourceKind::Object => "GMObject",
            ResourceKind::Room => "GMRoom",
            ResourceKind::Tileset => "GMTileSet",
            ResourceKind::Font => "GMFont",
            ResourceKind::Path => "GMPath",
            ResourceKind::Shader => "GMShader",
            ResourceKind::Timeline => "GMTimeline",
            ResourceKind::AnimCurve => "GMAnimCurve",
            ResourceKind::Sequence => "GMSequence",
            ResourceKind::Extension => "GMExtension",
            ResourceKind::Note => "GMNotes",
            ResourceKind::ParticleSystem => "GMParticleSystem",
        }
    }

    /// Look up a kind by its root directory name (`"sprites"` -> `Sprite`).
    #[must_use]
    pub fn from_root(root: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.root() == root)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Script => write!(f, "script"),
            ResourceKind::Sprite => write!(f, "sprite"),
            ResourceKind::Sound => write!(f, "sound"),
            ResourceKind::Object => write!(f, "object"),
            ResourceKind::Room => write!(f, "room"),
            ResourceKind::Tileset => write!(f, "tileset"),
            ResourceKind::Font => write!(f, "font"),
            ResourceKind::Path => write!(f, "path"),
            ResourceKind::Shader => write!(f, "shader"),
            ResourceKind::Timeline => write!(f, "timeline"),
            ResourceKind::AnimCurve => write!(f, "animcurve"),
            ResourceKind::Sequence => write!(f, "sequence"),
            ResourceKind::Extension => write!(f, "extension"),
            ResourceKind::Note => write!(f, "note"),
            ResourceKind::ParticleSystem => write!(f, "particle"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = crate::core::StitchError;

    /// Accepts the singular name, the root directory name or the
    /// GameMaker type tag, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| {
                kind.to_string() == wanted
                    || kind.root() == wanted
                    || kind.resource_type().to_lowercase() == wanted
            })
            .ok_or_else(|| {
                let closest = ResourceKind::ALL
                    .into_iter()
                    .map(|kind| (kind, strsim::jaro_winkler(&wanted, &kind.to_string())))
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .filter(|(_, score)| *score > 0.8)
                    .map(|(kind, _)| format!(" (did you mean '{kind}'?)"))
                    .unwrap_or_default();
                crate::core::StitchError::InvalidOption {
                    option: "kind".to_string(),
                    reason: format!("unknown resource kind '{s}'{closest}"),
                }
            })
    }
}
