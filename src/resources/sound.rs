use super::{Resource, ResourceRef};
use crate::constants::{DEFAULT_AUDIO_GROUP, SOUND_EXTENSIONS, SOUND_SAMPLE_RATES};
use crate::core::{ResourceKind, StitchError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Channel layout stored in a sound's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundChannels {
    /// One channel
    Mono,
    /// Two channels
    Stereo,
    /// Positional audio
    #[serde(rename = "3d")]
    ThreeD,
}

impl SoundChannels {
    const fn index(self) -> u64 {
        match self {
            SoundChannels::Mono => 0,
            SoundChannels::Stereo => 1,
            SoundChannels::ThreeD => 2,
        }
    }

    const fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(SoundChannels::Mono),
            1 => Some(SoundChannels::Stereo),
            2 => Some(SoundChannels::ThreeD),
            _ => None,
        }
    }
}

/// Compression stored in a sound's `compression` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCompression {
    /// Uncompressed
    Uncompressed,
    /// Compressed
    Compressed,
    /// Decompressed when loaded
    UncompressedOnLoad,
    /// Compressed and streamed from disk
    CompressedStreamed,
}

impl SoundCompression {
    const fn index(self) -> u64 {
        match self {
            SoundCompression::Uncompressed => 0,
            SoundCompression::Compressed => 1,
            SoundCompression::UncompressedOnLoad => 2,
            SoundCompression::CompressedStreamed => 3,
        }
    }

    const fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(SoundCompression::Uncompressed),
            1 => Some(SoundCompression::Compressed),
            2 => Some(SoundCompression::UncompressedOnLoad),
            3 => Some(SoundCompression::CompressedStreamed),
            _ => None,
        }
    }
}

fn invalid(option: &str, reason: impl Into<String>) -> anyhow::Error {
    StitchError::InvalidOption {
        option: option.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl Resource {
    /// Path of the sound's audio file.
    pub fn audio_file_path(&self) -> Result<PathBuf> {
        self.expect_kind(ResourceKind::Sound)?;
        let file = self.yy.get("soundFile").and_then(Value::as_str).unwrap_or(&self.name);
        Ok(self.yy_dir().join(file))
    }

    /// Replace the audio file with an external one.
    ///
    /// The file is stored as `<name>.<ext>`. The old file is deleted only when
    /// that name changes.
    pub fn replace_audio_file(&mut self, source: &Path) -> Result<()> {
        let old_path = self.audio_file_path()?;
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SOUND_EXTENSIONS.contains(&extension.as_str()) {
            return Err(invalid(
                "audio file",
                format!("{} is not one of {}", source.display(), SOUND_EXTENSIONS.join(", ")),
            ));
        }
        let file_name = format!("{}.{extension}", self.name);
        let new_path = self.yy_dir().join(&file_name);
        if old_path != new_path {
            self.storage().delete_file(&old_path)?;
        }
        self.storage().copy_file(source, &new_path)?;
        self.set_field("soundFile", json!(file_name));
        self.save()?;
        debug!("Replaced audio for {} with {}", self.name, source.display());
        Ok(())
    }

    /// Name of the sound's audio group.
    pub fn audio_group(&self) -> Result<String> {
        self.expect_kind(ResourceKind::Sound)?;
        Ok(self
            .yy
            .pointer("/audioGroupId/name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_AUDIO_GROUP)
            .to_string())
    }

    /// Assign the sound to an audio group and save.
    pub fn set_audio_group(&mut self, group: &str) -> Result<()> {
        self.expect_kind(ResourceKind::Sound)?;
        let group_ref = ResourceRef {
            name: group.to_string(),
            path: format!("audiogroups/{group}"),
        };
        self.set_field("audioGroupId", group_ref.to_value());
        self.save()?;
        Ok(())
    }

    /// Set the bit rate. Must be a multiple of 8 from 8 to 512.
    pub fn set_bit_rate(&mut self, rate: u32) -> Result<()> {
        self.expect_kind(ResourceKind::Sound)?;
        if !(8..=512).contains(&rate) || rate % 8 != 0 {
            return Err(invalid("bit rate", format!("{rate} must be a multiple of 8 from 8 to 512")));
        }
        self.set_field("bitRate", json!(rate));
        self.save()?;
        Ok(())
    }

    /// Set the sample rate to one GameMaker supports.
    pub fn set_sample_rate(&mut self, rate: u32) -> Result<()> {
        self.expect_kind(ResourceKind::Sound)?;
        if !SOUND_SAMPLE_RATES.contains(&rate) {
            return Err(invalid("sample rate", format!("{rate} is not a supported sample rate")));
        }
        self.set_field("sampleRate", json!(rate));
        self.save()?;
        Ok(())
    }

    /// Channel layout, if the stored value is recognized.
    pub fn channels(&self) -> Result<Option<SoundChannels>> {
        self.expect_kind(ResourceKind::Sound)?;
        Ok(self.yy.get("type").and_then(Value::as_u64).and_then(SoundChannels::from_index))
    }

    /// Set the channel layout and save.
    pub fn set_channels(&mut self, channels: SoundChannels) -> Result<()> {
        self.expect_kind(ResourceKind::Sound)?;
        self.set_field("type", json!(channels.index()));
        self.save()?;
        Ok(())
    }

    /// Compression, if the stored value is recognized.
    pub fn compression(&self) -> Result<Option<SoundCompression>> {
        self.expect_kind(ResourceKind::Sound)?;
        Ok(self
            .yy
            .get("compression")
            .and_then(Value::as_u64)
            .and_then(SoundCompression::from_index))
    }

    /// Set the compression and save.
    pub fn set_compression(&mut self, compression: SoundCompression) -> Result<()> {
        self.expect_kind(ResourceKind::Sound)?;
        self.set_field("compression", json!(compression.index()));
        self.save()?;
        Ok(())
    }
}
