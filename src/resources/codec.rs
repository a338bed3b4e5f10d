//! Per-kind codec table.
//!
//! Every [`ResourceKind`] has exactly one [`KindCodec`] describing how a new
//! descriptor of that kind looks and which cache payload a hydrated resource
//! carries. The table is total: [`codec`] never fails.

use super::{Payload, ResourceRef, object, script};
use crate::constants::{DEFAULT_AUDIO_GROUP, DEFAULT_TEXTURE_GROUP, NEW_RESOURCE_FOLDER};
use crate::core::ResourceKind;
use serde_json::{Value, json};

/// How to build and hydrate resources of one kind.
#[derive(Debug, Clone, Copy)]
pub struct KindCodec {
    /// Kind this codec handles
    pub kind: ResourceKind,
    /// Default descriptor for a new resource with the given name
    pub default_yy: fn(&str) -> Value,
    new_payload: fn() -> Payload,
}

impl KindCodec {
    pub(crate) fn payload(&self) -> Payload {
        (self.new_payload)()
    }
}

fn plain() -> Payload {
    Payload::Plain
}

fn script_payload() -> Payload {
    Payload::Script(script::ScriptCache::default())
}

fn object_payload() -> Payload {
    Payload::Object(object::ObjectCache::default())
}

static CODECS: [KindCodec; 15] = [
    KindCodec { kind: ResourceKind::Script, default_yy: script_yy, new_payload: script_payload },
    KindCodec { kind: ResourceKind::Sprite, default_yy: sprite_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Sound, default_yy: sound_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Object, default_yy: object_yy, new_payload: object_payload },
    KindCodec { kind: ResourceKind::Room, default_yy: room_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Tileset, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Font, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Path, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Shader, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Timeline, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::AnimCurve, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Sequence, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Extension, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::Note, default_yy: generic_yy, new_payload: plain },
    KindCodec { kind: ResourceKind::ParticleSystem, default_yy: generic_yy, new_payload: plain },
];

/// The codec for a kind.
#[must_use]
pub fn codec(kind: ResourceKind) -> &'static KindCodec {
    CODECS
        .iter()
        .find(|codec| codec.kind == kind)
        .unwrap_or(&CODECS[0])
}

/// Default descriptor for a new resource. Resource type and name are filled in.
#[must_use]
pub fn default_yy(kind: ResourceKind, name: &str) -> Value {
    let mut yy = (codec(kind).default_yy)(name);
    if let Some(map) = yy.as_object_mut() {
        map.insert("resourceType".into(), json!(kind.resource_type()));
    }
    yy
}

fn new_parent() -> Value {
    ResourceRef::to_folder(NEW_RESOURCE_FOLDER).to_value()
}

fn generic_yy(name: &str) -> Value {
    json!({
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "",
    })
}

fn script_yy(name: &str) -> Value {
    json!({
        "isDnD": false,
        "isCompatibility": false,
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "GMScript",
    })
}

fn sound_yy(name: &str) -> Value {
    json!({
        "compression": 0,
        "volume": 1.0,
        "preload": false,
        "bitRate": 128,
        "sampleRate": 44100,
        "type": 1,
        "bitDepth": 1,
        "audioGroupId": {
            "name": DEFAULT_AUDIO_GROUP,
            "path": format!("audiogroups/{DEFAULT_AUDIO_GROUP}"),
        },
        "soundFile": name,
        "duration": 0.0,
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "GMSound",
    })
}

fn object_yy(name: &str) -> Value {
    json!({
        "spriteId": null,
        "solid": false,
        "visible": true,
        "spriteMaskId": null,
        "persistent": false,
        "parentObjectId": null,
        "physicsObject": false,
        "physicsSensor": false,
        "physicsShape": 1,
        "physicsGroup": 1,
        "physicsDensity": 0.5,
        "physicsRestitution": 0.1,
        "physicsLinearDamping": 0.1,
        "physicsAngularDamping": 0.1,
        "physicsFriction": 0.2,
        "physicsStartAwake": true,
        "physicsKinematic": false,
        "physicsShapePoints": [],
        "eventList": [],
        "properties": [],
        "overriddenProperties": [],
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "GMObject",
    })
}

fn sprite_yy(name: &str) -> Value {
    json!({
        "bboxMode": 0,
        "collisionKind": 1,
        "type": 0,
        "origin": 4,
        "preMultiplyAlpha": false,
        "edgeFiltering": false,
        "collisionTolerance": 0,
        "swfPrecision": 2.525,
        "bbox_left": 0,
        "bbox_right": 0,
        "bbox_top": 0,
        "bbox_bottom": 0,
        "HTile": false,
        "VTile": false,
        "For3D": false,
        "width": 0,
        "height": 0,
        "textureGroupId": {
            "name": DEFAULT_TEXTURE_GROUP,
            "path": format!("texturegroups/{DEFAULT_TEXTURE_GROUP}"),
        },
        "swatchColours": null,
        "gridX": 0,
        "gridY": 0,
        "frames": [],
        "sequence": {
            "spriteId": {"name": name, "path": format!("sprites/{name}/{name}.yy")},
            "timeUnits": 1,
            "playback": 1,
            "playbackSpeed": 30.0,
            "playbackSpeedType": 0,
            "autoRecord": true,
            "volume": 1.0,
            "length": 0.0,
            "events": {"Keyframes": [], "resourceVersion": "1.0", "resourceType": "KeyframeStore<MessageEventKeyframe>"},
            "moments": {"Keyframes": [], "resourceVersion": "1.0", "resourceType": "KeyframeStore<MomentsEventKeyframe>"},
            "tracks": [
                {
                    "name": "frames",
                    "spriteId": null,
                    "keyframes": {"Keyframes": [], "resourceVersion": "1.0", "resourceType": "KeyframeStore<SpriteFrameKeyframe>"},
                    "trackColour": 0,
                    "inheritsTrackColour": true,
                    "builtinName": 0,
                    "traits": 0,
                    "interpolation": 1,
                    "tracks": [],
                    "events": [],
                    "modifiers": [],
                    "isCreationTrack": false,
                    "resourceVersion": "1.0",
                    "tags": [],
                    "resourceType": "GMSpriteFramesTrack",
                },
            ],
            "visibleRange": null,
            "lockOrigin": false,
            "showBackdrop": true,
            "showBackdropImage": false,
            "backdropImagePath": "",
            "backdropImageOpacity": 0.5,
            "backdropWidth": 1366,
            "backdropHeight": 768,
            "backdropXOffset": 0.0,
            "backdropYOffset": 0.0,
            "xorigin": 0,
            "yorigin": 0,
            "eventToFunction": {},
            "eventStubScript": null,
            "parent": {"name": name, "path": format!("sprites/{name}/{name}.yy")},
            "resourceVersion": "1.3",
            "name": name,
            "tags": [],
            "resourceType": "GMSequence",
        },
        "layers": [
            {
                "visible": true,
                "isLocked": false,
                "blendMode": 0,
                "opacity": 100.0,
                "displayName": "default",
                "resourceVersion": "1.0",
                "name": uuid::Uuid::new_v4().to_string(),
                "tags": [],
                "resourceType": "GMImageLayer",
            },
        ],
        "nineSlice": null,
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "GMSprite",
    })
}

fn room_yy(name: &str) -> Value {
    let view = json!({
        "inherit": false, "visible": false,
        "xview": 0, "yview": 0, "wview": 1366, "hview": 768,
        "xport": 0, "yport": 0, "wport": 1366, "hport": 768,
        "hborder": 32, "vborder": 32, "hspeed": -1, "vspeed": -1,
        "objectId": null,
    });
    json!({
        "isDnd": false,
        "volume": 1.0,
        "parentRoom": null,
        "views": vec![view; 8],
        "layers": [
            {
                "instances": [],
                "visible": true,
                "depth": 0,
                "userdefinedDepth": false,
                "inheritLayerDepth": false,
                "inheritLayerSettings": false,
                "gridX": 32,
                "gridY": 32,
                "layers": [],
                "hierarchyFrozen": false,
                "resourceVersion": "1.0",
                "name": "Instances",
                "tags": [],
                "resourceType": "GMRInstanceLayer",
            },
            {
                "spriteId": null,
                "colour": 4_278_190_080u64,
                "x": 0,
                "y": 0,
                "htiled": false,
                "vtiled": false,
                "hspeed": 0.0,
                "vspeed": 0.0,
                "stretch": false,
                "animationFPS": 15.0,
                "animationSpeedType": 0,
                "userdefinedAnimFPS": false,
                "visible": true,
                "depth": 100,
                "userdefinedDepth": false,
                "inheritLayerDepth": false,
                "inheritLayerSettings": false,
                "gridX": 32,
                "gridY": 32,
                "layers": [],
                "hierarchyFrozen": false,
                "resourceVersion": "1.0",
                "name": "Background",
                "tags": [],
                "resourceType": "GMRBackgroundLayer",
            },
        ],
        "inheritLayers": false,
        "creationCodeFile": "",
        "inheritCode": false,
        "instanceCreationOrder": [],
        "inheritCreationOrder": false,
        "sequenceId": null,
        "roomSettings": {"inheritRoomSettings": false, "Width": 1366, "Height": 768, "persistent": false},
        "viewSettings": {"inheritViewSettings": false, "enableViews": false, "clearViewBackground": false, "clearDisplayBuffer": true},
        "physicsSettings": {"inheritPhysicsSettings": false, "PhysicsWorld": false, "PhysicsWorldGravityX": 0.0, "PhysicsWorldGravityY": 10.0, "PhysicsWorldPixToMetres": 0.1},
        "parent": new_parent(),
        "resourceVersion": "1.0",
        "name": name,
        "tags": [],
        "resourceType": "GMRoom",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total() {
        for kind in ResourceKind::ALL {
            assert_eq!(codec(kind).kind, kind);
            let yy = default_yy(kind, "thing");
            assert_eq!(yy["name"], "thing");
            assert_eq!(yy["resourceType"], kind.resource_type());
            assert_eq!(yy["parent"]["path"], "folders/NEW.yy");
        }
    }

    #[test]
    fn test_script_payload_is_cached_kind() {
        assert!(matches!(codec(ResourceKind::Script).payload(), Payload::Script(_)));
        assert!(matches!(codec(ResourceKind::Object).payload(), Payload::Object(_)));
        assert!(matches!(codec(ResourceKind::Font).payload(), Payload::Plain));
    }

    #[test]
    fn test_room_has_instance_layer() {
        let yy = default_yy(ResourceKind::Room, "rm_start");
        assert!(yy["layers"][0]["instances"].is_array());
        assert_eq!(yy["views"].as_array().map(Vec::len), Some(8));
    }
}
