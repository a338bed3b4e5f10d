use super::{Resource, ResourceRef};
use crate::constants::DEFAULT_TEXTURE_GROUP;
use crate::core::{ResourceKind, StitchError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a sprite's frames are made of (the descriptor's `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteType {
    /// PNG frames
    Bitmap,
    /// Vector (SWF) animation
    Swf,
    /// Spine skeletal animation
    Spine,
}

impl SpriteType {
    const fn index(self) -> u64 {
        match self {
            SpriteType::Bitmap => 0,
            SpriteType::Swf => 1,
            SpriteType::Spine => 2,
        }
    }
}

/// `bboxMode` value meaning the bounding box always covers the whole image.
const BBOX_MODE_FULL_IMAGE: i64 = 1;

fn scale_coord(old: i64, old_max: i64, new_max: i64) -> i64 {
    if old == 0 || old_max == 0 || new_max == 0 {
        return 0;
    }
    (old as f64 / old_max as f64 * new_max as f64).floor() as i64
}

fn png_dimensions(path: &Path) -> Result<(u32, u32)> {
    let reader = image::ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    if reader.format() != Some(image::ImageFormat::Png) {
        return Err(StitchError::InvalidOption {
            option: "image".to_string(),
            reason: format!("{} is not a PNG", path.display()),
        }
        .into());
    }
    reader
        .into_dimensions()
        .with_context(|| format!("Failed to read image dimensions: {}", path.display()))
}

fn spine_error(path: &Path, reason: impl Into<String>) -> anyhow::Error {
    StitchError::InvalidSpineSource {
        path: path.display().to_string(),
        reason: reason.into(),
    }
    .into()
}

impl Resource {
    fn int_field(&self, pointer: &str) -> i64 {
        self.yy.pointer(pointer).and_then(Value::as_i64).unwrap_or(0)
    }

    fn set_pointer(&mut self, pointer: &str, value: Value) {
        if let Some(slot) = self.yy.pointer_mut(pointer) {
            *slot = value;
        }
    }

    /// Frame ids in frame order.
    pub fn frame_ids(&self) -> Result<Vec<String>> {
        self.expect_kind(ResourceKind::Sprite)?;
        Ok(self
            .yy
            .get("frames")
            .and_then(Value::as_array)
            .map(|frames| {
                frames
                    .iter()
                    .filter_map(|f| f.get("name").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Sprite type, if the stored value is recognized.
    pub fn sprite_type(&self) -> Result<Option<SpriteType>> {
        self.expect_kind(ResourceKind::Sprite)?;
        Ok(match self.yy.get("type").and_then(Value::as_u64) {
            Some(0) => Some(SpriteType::Bitmap),
            Some(1) => Some(SpriteType::Swf),
            Some(2) => Some(SpriteType::Spine),
            _ => None,
        })
    }

    /// Set the sprite type and save.
    pub fn set_sprite_type(&mut self, sprite_type: SpriteType) -> Result<()> {
        self.expect_kind(ResourceKind::Sprite)?;
        self.set_field("type", json!(sprite_type.index()));
        self.save()?;
        Ok(())
    }

    /// Name of the sprite's texture group.
    pub fn texture_group(&self) -> Result<String> {
        self.expect_kind(ResourceKind::Sprite)?;
        Ok(self
            .yy
            .pointer("/textureGroupId/name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TEXTURE_GROUP)
            .to_string())
    }

    /// Assign the sprite to a texture group and save.
    pub fn set_texture_group(&mut self, group: &str) -> Result<()> {
        self.expect_kind(ResourceKind::Sprite)?;
        let group_ref = ResourceRef {
            name: group.to_string(),
            path: format!("texturegroups/{group}"),
        };
        self.set_field("textureGroupId", group_ref.to_value());
        self.save()?;
        Ok(())
    }

    fn first_layer_id(&self) -> Option<String> {
        self.yy
            .pointer("/layers/0/name")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Copy a PNG into a frame: `<id>.png` plus the first layer's image.
    ///
    /// Returns whether either file changed.
    pub fn update_frame_image(&self, png: &Path, frame_id: &str) -> Result<bool> {
        self.expect_kind(ResourceKind::Sprite)?;
        let frame_path = self.yy_dir().join(format!("{frame_id}.png"));
        let mut changed = self.storage().copy_file(png, &frame_path)?;
        if let Some(layer_id) = self.first_layer_id() {
            let layer_path = self
                .yy_dir()
                .join("layers")
                .join(frame_id)
                .join(format!("{layer_id}.png"));
            changed |= self.storage().copy_file(png, &layer_path)?;
        }
        if changed {
            debug!("Updated frame {} of {} from {}", frame_id, self.name, png.display());
        }
        Ok(changed)
    }

    /// Set width and height, moving the origin and bounding box along.
    ///
    /// New sprites get a centered origin. Existing ones scale origin and
    /// bounding box linearly, except that a full-image bounding box is reset
    /// to the new size.
    fn set_sprite_dims(&mut self, width: i64, height: i64, is_new: bool) {
        let old_width = self.int_field("/width");
        let old_height = self.int_field("/height");
        let old_x = self.int_field("/sequence/xorigin");
        let old_y = self.int_field("/sequence/yorigin");
        let old_bbox = [
            ("bbox_left", self.int_field("/bbox_left"), old_width, width),
            ("bbox_right", self.int_field("/bbox_right"), old_width, width),
            ("bbox_top", self.int_field("/bbox_top"), old_height, height),
            ("bbox_bottom", self.int_field("/bbox_bottom"), old_height, height),
        ];

        self.set_field("width", json!(width));
        self.set_field("height", json!(height));
        if self.int_field("/bbox_bottom") == 0 {
            self.set_field("bbox_bottom", json!(height));
        }
        if self.int_field("/bbox_right") == 0 {
            self.set_field("bbox_right", json!(width));
        }

        let changed = !is_new && (width != old_width || height != old_height);
        if is_new {
            self.set_pointer("/sequence/xorigin", json!(width / 2));
            self.set_pointer("/sequence/yorigin", json!(height / 2));
        } else if changed {
            self.set_pointer("/sequence/xorigin", json!(scale_coord(old_x, old_width, width)));
            self.set_pointer("/sequence/yorigin", json!(scale_coord(old_y, old_height, height)));
        }

        if changed && self.int_field("/bboxMode") == BBOX_MODE_FULL_IMAGE {
            self.set_field("bbox_left", json!(0));
            self.set_field("bbox_top", json!(0));
            self.set_field("bbox_right", json!(width));
            self.set_field("bbox_bottom", json!(height));
        } else if changed {
            for (field, old, old_max, new_max) in old_bbox {
                self.set_field(field, json!(scale_coord(old, old_max, new_max)));
            }
        }
    }

    /// Point the sequence's frame track at the current frames.
    fn sync_frame_track(&mut self, frame_ids: &[String]) {
        let sprite_path = ResourceRef::to_resource(ResourceKind::Sprite, &self.name).path;
        self.set_pointer("/sequence/length", json!(frame_ids.len() as f64));
        let Some(keyframes) = self
            .yy
            .pointer_mut("/sequence/tracks/0/keyframes/Keyframes")
            .and_then(Value::as_array_mut)
        else {
            return;
        };
        keyframes.truncate(frame_ids.len());
        for (i, frame_id) in frame_ids.iter().enumerate() {
            let id = keyframes
                .get(i)
                .and_then(|k| k.get("id"))
                .and_then(Value::as_str)
                .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
            let keyframe = json!({
                "id": id,
                "Key": i as f64,
                "Length": 1.0,
                "Stretch": false,
                "Disabled": false,
                "IsCreationKey": false,
                "Channels": {
                    "0": {
                        "Id": {"name": frame_id, "path": sprite_path},
                        "resourceVersion": "1.0",
                        "resourceType": "SpriteFrameKeyframe",
                    },
                },
                "resourceVersion": "1.0",
                "resourceType": "Keyframe<SpriteFrameKeyframe>",
            });
            match keyframes.get_mut(i) {
                Some(slot) => *slot = keyframe,
                None => keyframes.push(keyframe),
            }
        }
    }

    /// Replace the frames with the PNGs in `dir` (sorted, non-recursive).
    ///
    /// Every image must have the same size. Existing frame ids are reused by
    /// position so unchanged frames keep their files. Images no longer used
    /// by any frame are deleted afterwards.
    pub fn sync_from_image_dir(&mut self, dir: &Path, is_new: bool) -> Result<()> {
        self.expect_kind(ResourceKind::Sprite)?;
        if self.sprite_type()? == Some(SpriteType::Spine) {
            return Err(StitchError::InvalidOption {
                option: "sprite source".to_string(),
                reason: format!("{} is a Spine sprite and cannot take frame images", self.name),
            }
            .into());
        }
        let images = self.storage().list_files(dir, false, Some(&["png"]))?;
        let Some(first) = images.first() else {
            return Err(StitchError::InvalidOption {
                option: "sprite source".to_string(),
                reason: format!("no PNG images found in {}", dir.display()),
            }
            .into());
        };

        let (width, height) = png_dimensions(first)?;
        for image in &images[1..] {
            let dims = png_dimensions(image)?;
            if dims != (width, height) {
                return Err(StitchError::InvalidOption {
                    option: "sprite source".to_string(),
                    reason: format!(
                        "{} is {}x{} but earlier frames are {width}x{height}",
                        image.display(),
                        dims.0,
                        dims.1
                    ),
                }
                .into());
            }
        }
        self.set_sprite_dims(i64::from(width), i64::from(height), is_new);

        let mut frame_ids = self.frame_ids()?;
        frame_ids.truncate(images.len());
        while frame_ids.len() < images.len() {
            frame_ids.push(uuid::Uuid::new_v4().to_string());
        }

        let old_frames = self.yy.get("frames").and_then(Value::as_array).cloned().unwrap_or_default();
        let frames: Vec<Value> = frame_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                old_frames.get(i).cloned().unwrap_or_else(|| {
                    json!({"resourceType": "GMSpriteFrame", "resourceVersion": "1.1", "name": id})
                })
            })
            .collect();
        self.set_field("frames", Value::Array(frames));
        self.sync_frame_track(&frame_ids);

        let mut updated = 0;
        for (image, frame_id) in images.iter().zip(&frame_ids) {
            if self.update_frame_image(image, frame_id)? {
                updated += 1;
            }
        }
        if updated > 0 {
            info!("Sprite {} changed: {} frame(s) updated", self.name, updated);
        }
        self.delete_extraneous_images()?;
        self.save()?;
        Ok(())
    }

    /// Delete PNGs under the sprite directory that belong to no frame.
    pub fn delete_extraneous_images(&self) -> Result<usize> {
        let frame_ids = self.frame_ids()?;
        let mut deleted = 0;
        for png in self.storage().list_files(&self.yy_dir(), true, Some(&["png"]))? {
            let path = png.to_string_lossy();
            if frame_ids.iter().any(|id| path.contains(id.as_str())) {
                continue;
            }
            self.storage().delete_file(&png)?;
            debug!("Deleted old frame image {}", png.display());
            deleted += 1;
        }
        Ok(deleted)
    }

    /// Sync a Spine sprite from an exported skeleton JSON.
    ///
    /// The JSON must name a Spine version under `skeleton.spine`, and an
    /// `.atlas` and `.png` with the same stem must sit next to it. Each sync
    /// gives the sprite a fresh frame id. PNGs are copied by file name when
    /// changed; JSON and atlas files are stored as `<frameId>.<ext>` and the
    /// previous frame's companions are deleted.
    pub fn sync_spine_source(&mut self, json_path: &Path) -> Result<()> {
        self.expect_kind(ResourceKind::Sprite)?;
        if self.sprite_type()? != Some(SpriteType::Spine) {
            return Err(spine_error(json_path, format!("{} is not a Spine sprite", self.name)));
        }
        validate_spine_export(self, json_path)?;

        let previous_ids = self.frame_ids()?;
        let frame_id = uuid::Uuid::new_v4().to_string();
        let mut first_frame = self
            .yy
            .pointer("/frames/0")
            .cloned()
            .unwrap_or_else(|| json!({"resourceType": "GMSpriteFrame", "resourceVersion": "1.1"}));
        if let Some(map) = first_frame.as_object_mut() {
            map.insert("name".into(), json!(frame_id));
        }
        self.set_field("frames", json!([first_frame]));

        let src_dir = json_path.parent().unwrap_or_else(|| Path::new("."));
        let mut changed: Vec<PathBuf> = Vec::new();
        for src in self.storage().list_files(src_dir, false, Some(&["png", "json", "atlas"]))? {
            let extension = src
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let dest = if extension == "png" {
                match src.file_name() {
                    Some(name) => self.yy_dir().join(name),
                    None => continue,
                }
            } else {
                self.yy_dir().join(format!("{frame_id}.{extension}"))
            };
            if self.storage().copy_file(&src, &dest)? {
                changed.push(dest);
            }
        }
        for old_id in &previous_ids {
            for extension in ["json", "atlas"] {
                self.storage().delete_file(&self.yy_dir().join(format!("{old_id}.{extension}")))?;
            }
        }
        if !changed.is_empty() {
            info!("Spine sprite {} changed: {} file(s) updated", self.name, changed.len());
        }
        self.save()?;
        Ok(())
    }
}

fn validate_spine_export(sprite: &Resource, json_path: &Path) -> Result<()> {
    let text = sprite
        .storage()
        .read_text(json_path)
        .map_err(|_| spine_error(json_path, "JSON file is missing or unreadable"))?;
    let parsed: Value = serde_json::from_str(&text)
        .map_err(|e| spine_error(json_path, format!("not a valid Spine JSON file: {e}")))?;
    if parsed.pointer("/skeleton/spine").and_then(Value::as_str).is_none() {
        return Err(spine_error(json_path, "missing skeleton.spine version"));
    }
    for extension in ["atlas", "png"] {
        let companion = json_path.with_extension(extension);
        if !sprite.storage().exists(&companion) {
            return Err(spine_error(
                json_path,
                format!("missing {}", companion.display()),
            ));
        }
    }
    Ok(())
}
