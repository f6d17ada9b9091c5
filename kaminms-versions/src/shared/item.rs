use kaminms_api::{Fault, ItemEditor, ItemStack};
use serde_json::{json, Map, Value};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Where the unbreakable flag lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbreakableStyle {
    /// Before 1.11 only `spigot()` knows the flag; it is mirrored into the `Unbreakable` tag.
    Spigot,
    /// 1.11+: a plain item meta property.
    Meta,
}

/// Where damage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageStyle {
    /// Before 1.13 damage is the stack's durability value.
    Durability,
    /// 1.13 to 1.20.4: `Damageable` item meta backed by the `Damage` tag.
    Damageable,
    /// 1.20.5+: the `minecraft:damage` data component.
    Component,
}

/// Where custom tags live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle {
    /// In the item's root compound.
    Root,
    /// Inside the `minecraft:custom_data` component (1.20.5+).
    CustomData,
}

const CUSTOM_DATA: &str = "minecraft:custom_data";

#[derive(Debug)]
pub struct ItemRoutines {
    internals: Internals,
    unbreakable: UnbreakableStyle,
    damage: DamageStyle,
    tags: TagStyle,
}

impl ItemRoutines {
    pub fn new(
        internals: Internals,
        unbreakable: UnbreakableStyle,
        damage: DamageStyle,
        tags: TagStyle,
    ) -> Self {
        Self {
            internals,
            unbreakable,
            damage,
            tags,
        }
    }

    fn damage_key(&self) -> Option<&'static str> {
        match self.damage {
            DamageStyle::Durability => None,
            DamageStyle::Damageable => Some("Damage"),
            DamageStyle::Component => Some("minecraft:damage"),
        }
    }

    fn ensure_damageable(&self, item: &ItemStack, operation: &'static str) -> Result<(), Fault> {
        let damageable: bool = self
            .internals
            .call(Internal::ItemDamageable, vec![arg(item)?])?;
        if damageable {
            Ok(())
        } else {
            Err(Fault::Unsupported {
                operation,
                reason: "item meta is not damageable",
            })
        }
    }
}

impl ItemEditor for ItemRoutines {
    fn set_unbreakable(&self, mut item: ItemStack, unbreakable: bool) -> Result<ItemStack, Fault> {
        item.unbreakable = unbreakable;
        if self.unbreakable == UnbreakableStyle::Spigot {
            if unbreakable {
                item.nbt.insert("Unbreakable".to_string(), json!(1));
            } else {
                item.nbt.shift_remove("Unbreakable");
            }
        }
        Ok(item)
    }

    fn is_unbreakable(&self, item: &ItemStack) -> Result<bool, Fault> {
        Ok(match self.unbreakable {
            UnbreakableStyle::Spigot => {
                item.unbreakable || item.nbt.get("Unbreakable").and_then(Value::as_i64) == Some(1)
            }
            UnbreakableStyle::Meta => item.unbreakable,
        })
    }

    fn set_damage(&self, mut item: ItemStack, damage: i32) -> Result<ItemStack, Fault> {
        if let Some(key) = self.damage_key() {
            self.ensure_damageable(&item, "set_damage")?;
            item.nbt.insert(key.to_string(), json!(damage));
        }
        item.damage = damage;
        Ok(item)
    }

    fn damage(&self, item: &ItemStack) -> Result<i32, Fault> {
        let Some(key) = self.damage_key() else {
            return Ok(item.damage);
        };
        self.ensure_damageable(item, "damage")?;
        Ok(item
            .nbt
            .get(key)
            .and_then(Value::as_i64)
            .and_then(|d| i32::try_from(d).ok())
            .unwrap_or(item.damage))
    }

    fn set_nbt_tag(&self, mut item: ItemStack, key: &str, value: Value) -> Result<ItemStack, Fault> {
        match self.tags {
            TagStyle::Root => {
                item.nbt.insert(key.to_string(), value);
            }
            TagStyle::CustomData => {
                let data = item
                    .nbt
                    .entry(CUSTOM_DATA.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                match data {
                    Value::Object(map) => {
                        map.insert(key.to_string(), value);
                    }
                    other => {
                        return Err(Fault::shape(
                            CUSTOM_DATA,
                            format!("expected a compound, found {}", other),
                        ))
                    }
                }
            }
        }
        Ok(item)
    }

    fn nbt_tag(&self, item: &ItemStack, key: &str) -> Result<Option<Value>, Fault> {
        Ok(match self.tags {
            TagStyle::Root => item.nbt.get(key).cloned(),
            TagStyle::CustomData => item
                .nbt
                .get(CUSTOM_DATA)
                .and_then(|data| data.get(key))
                .cloned(),
        })
    }

    fn translation_key(&self, item: &ItemStack) -> Result<String, Fault> {
        self.internals
            .call(Internal::ItemDescriptionId, vec![arg(item)?])
    }
}
