use kaminms_api::{EntityKind, EntityMethods, EntityRef, Fault, ItemStack};
use serde_json::{json, Value};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// How a spawner item records the entity it spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerStyle {
    /// `BlockEntityTag.EntityId` holding the Bukkit name (pre 1.13).
    EntityId,
    /// `BlockEntityTag.SpawnData.id` holding a namespaced id (1.13 to 1.20.4).
    SpawnData,
    /// `minecraft:block_entity_data` component (1.20.5+).
    Component,
}

impl SpawnerStyle {
    fn material(&self) -> &'static str {
        match self {
            SpawnerStyle::EntityId => "MOB_SPAWNER",
            _ => "SPAWNER",
        }
    }

    fn root(&self) -> &'static str {
        match self {
            SpawnerStyle::Component => "minecraft:block_entity_data",
            _ => "BlockEntityTag",
        }
    }
}

#[derive(Debug)]
pub struct EntityRoutines {
    internals: Internals,
    spawner: SpawnerStyle,
}

impl EntityRoutines {
    pub fn new(internals: Internals, spawner: SpawnerStyle) -> Self {
        Self { internals, spawner }
    }

    fn entity_handle(&self, entity: EntityRef) -> Result<Value, Fault> {
        self.internals.handle(Internal::EntityHandle, arg(&entity)?)
    }

    fn flag(&self, internal: Internal, entity: EntityRef, value: bool) -> Result<(), Fault> {
        let handle = self.entity_handle(entity)?;
        self.internals.run(internal, vec![handle, json!(value)])
    }

    fn check_spawner(&self, item: &ItemStack) -> Result<(), Fault> {
        if item.material == self.spawner.material() {
            Ok(())
        } else {
            Err(Fault::shape(
                "org.bukkit.inventory.ItemStack",
                format!("{} is not a spawner", item.material),
            ))
        }
    }
}

fn namespaced(kind: &EntityKind) -> String {
    format!("minecraft:{}", kind.0.to_ascii_lowercase())
}

fn from_namespaced(id: &str) -> EntityKind {
    let key = id.strip_prefix("minecraft:").unwrap_or(id);
    EntityKind(key.to_ascii_uppercase())
}

impl EntityMethods for EntityRoutines {
    fn height(&self, entity: EntityRef) -> Result<f64, Fault> {
        let handle = self.entity_handle(entity)?;
        self.internals.call(Internal::EntityHeight, vec![handle])
    }

    fn width(&self, entity: EntityRef) -> Result<f64, Fault> {
        let handle = self.entity_handle(entity)?;
        self.internals.call(Internal::EntityWidth, vec![handle])
    }

    fn set_persists(&self, entity: EntityRef, value: bool) -> Result<(), Fault> {
        self.flag(Internal::EntityPersistent, entity, value)
    }

    fn set_from_spawner(&self, entity: EntityRef, value: bool) -> Result<(), Fault> {
        self.flag(Internal::EntityFromSpawner, entity, value)
    }

    fn set_mob_ai(&self, entity: EntityRef, value: bool) -> Result<(), Fault> {
        self.flag(Internal::EntityAware, entity, value)
    }

    fn spawner_type(&self, item: &ItemStack) -> Result<Option<EntityKind>, Fault> {
        if item.material != self.spawner.material() {
            return Ok(None);
        }
        let Some(root) = item.nbt.get(self.spawner.root()) else {
            return Ok(None);
        };
        let kind = match self.spawner {
            SpawnerStyle::EntityId => root
                .get("EntityId")
                .and_then(Value::as_str)
                .map(|name| EntityKind(name.to_string())),
            SpawnerStyle::SpawnData | SpawnerStyle::Component => root
                .pointer("/SpawnData/id")
                .or_else(|| root.pointer("/SpawnData/entity/id"))
                .and_then(Value::as_str)
                .map(from_namespaced),
        };
        Ok(kind)
    }

    fn set_spawner_type(&self, mut item: ItemStack, kind: &EntityKind) -> Result<ItemStack, Fault> {
        self.check_spawner(&item)?;
        let tag = match self.spawner {
            SpawnerStyle::EntityId => json!({ "EntityId": kind.0 }),
            SpawnerStyle::SpawnData => json!({ "SpawnData": { "id": namespaced(kind) } }),
            SpawnerStyle::Component => json!({
                "id": "minecraft:mob_spawner",
                "SpawnData": { "entity": { "id": namespaced(kind) } },
            }),
        };
        item.nbt.insert(self.spawner.root().to_string(), tag);
        Ok(item)
    }
}
