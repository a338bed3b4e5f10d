use super::{Resource, ResourceRef};
use crate::core::{ResourceKind, StitchError};
use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::info;

fn instance_names(yy: &Value) -> HashSet<String> {
    yy.get("layers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|layer| layer.get("instances").and_then(Value::as_array))
        .flatten()
        .filter_map(|instance| instance.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn new_instance_name(taken: &HashSet<String>) -> String {
    loop {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("inst_{}", id[..8].to_uppercase());
        if !taken.contains(&name) {
            return name;
        }
    }
}

impl Resource {
    /// Layers that can hold object instances.
    pub fn instance_layers(&self) -> Result<Vec<&Value>> {
        self.expect_kind(ResourceKind::Room)?;
        Ok(self
            .yy
            .get("layers")
            .and_then(Value::as_array)
            .map(|layers| layers.iter().filter(|l| l.get("instances").is_some_and(Value::is_array)).collect())
            .unwrap_or_default())
    }

    /// Whether any instance layer holds an instance of `object`.
    pub fn has_object_instance(&self, object: &str) -> Result<bool> {
        Ok(self.instance_layers()?.iter().any(|layer| {
            layer["instances"]
                .as_array()
                .into_iter()
                .flatten()
                .any(|instance| instance.pointer("/objectId/name").and_then(Value::as_str) == Some(object))
        }))
    }

    /// Place an instance of `object` in the first instance layer and save.
    ///
    /// The instance is also appended to the room's creation order. Returns the
    /// generated instance name.
    pub fn add_instance(&mut self, object: &str, x: f64, y: f64) -> Result<String> {
        self.expect_kind(ResourceKind::Room)?;
        let name = new_instance_name(&instance_names(&self.yy));
        let room_path = self.path.clone();
        let room_name = self.name.clone();
        let record = json!({
            "properties": [],
            "isDnd": false,
            "objectId": ResourceRef::to_resource(ResourceKind::Object, object).to_value(),
            "inheritCode": false,
            "hasCreationCode": false,
            "colour": 4_294_967_295u64,
            "rotation": 0.0,
            "scaleX": 1.0,
            "scaleY": 1.0,
            "imageIndex": 0,
            "imageSpeed": 1.0,
            "inheritedItemId": null,
            "frozen": false,
            "ignore": false,
            "inheritItemSettings": false,
            "x": x,
            "y": y,
            "resourceVersion": "1.0",
            "name": name,
            "tags": [],
            "resourceType": "GMRInstance",
        });

        let instances = self
            .yy
            .get_mut("layers")
            .and_then(Value::as_array_mut)
            .and_then(|layers| {
                layers
                    .iter_mut()
                    .find_map(|layer| layer.get_mut("instances").and_then(Value::as_array_mut))
            })
            .ok_or_else(|| StitchError::NoInstanceLayer { room: room_name })?;
        instances.push(record);

        let order_entry = json!({"name": name, "path": room_path});
        match self.yy.get_mut("instanceCreationOrder").and_then(Value::as_array_mut) {
            Some(order) => order.push(order_entry),
            None => self.set_field("instanceCreationOrder", json!([order_entry])),
        }
        self.save()?;
        info!("Added {} instance {} to room {}", object, name, self.name);
        Ok(name)
    }
}
