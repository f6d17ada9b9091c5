//! Conformance run for a version module.
//!
//! Every capability is driven twice: once against a host that answers every
//! symbol, once against a host that knows none. The first pass checks results
//! and round trips; the second checks that a failing host is reported and
//! never turned into a silent no-op.

use kaminms_api::{
    BlockPos, Capability, ChatColor, Enchantment, EntityRef, Fault, HostInternals, NmsPacket,
    PlaceType, ServerVersion, VersionImplementation, VersionModule,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fixtures;
use crate::host::ScriptedHost;

#[derive(Debug, Clone, PartialEq)]
pub struct ContractViolation {
    pub version: ServerVersion,
    pub capability: Option<Capability>,
    pub detail: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capability {
            Some(capability) => write!(f, "{} {}: {}", self.version, capability, self.detail),
            None => write!(f, "{}: {}", self.version, self.detail),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContractReport {
    pub version: ServerVersion,
    /// Host calls made per capability during the answering pass.
    pub host_calls: BTreeMap<&'static str, usize>,
    /// Capabilities that declared themselves unsupported on this release.
    pub unsupported: Vec<Capability>,
    pub violations: Vec<ContractViolation>,
}

impl ContractReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

enum Outcome {
    Passed,
    Mismatch(String),
    Failed(Fault),
    Missing,
}

impl From<Result<Outcome, Fault>> for Outcome {
    fn from(result: Result<Outcome, Fault>) -> Self {
        result.unwrap_or_else(Outcome::Failed)
    }
}

fn check(ok: bool, detail: impl FnOnce() -> String) -> Outcome {
    if ok {
        Outcome::Passed
    } else {
        Outcome::Mismatch(detail())
    }
}

/// Runs the conformance passes over `module`.
pub fn run_contract(module: &dyn VersionModule) -> ContractReport {
    let version = module.version();
    let mut report = ContractReport {
        version: version.clone(),
        host_calls: BTreeMap::new(),
        unsupported: Vec::new(),
        violations: Vec::new(),
    };
    let violate = |capability: Option<Capability>, detail: String| {
        warn!(version = %version, capability = ?capability, detail = %detail, "contract violation");
        ContractViolation {
            version: version.clone(),
            capability,
            detail,
        }
    };

    let answering = Arc::new(ScriptedHost::permissive());
    let imp = module.instantiate(answering.clone() as Arc<dyn HostInternals>);
    if imp.version() != &version {
        let detail = format!("implementation reports {}", imp.version());
        report.violations.push(violate(None, detail));
    }
    for group in imp.missing_groups() {
        report
            .violations
            .push(violate(None, format!("group {} not implemented", group)));
    }

    for capability in Capability::ALL {
        let before = answering.call_count();
        let outcome = exercise(imp.as_ref(), capability);
        report
            .host_calls
            .insert(capability.name(), answering.call_count() - before);
        match outcome {
            Outcome::Passed | Outcome::Missing => {}
            Outcome::Failed(Fault::Unsupported { .. }) => report.unsupported.push(capability),
            Outcome::Failed(fault) => report
                .violations
                .push(violate(Some(capability), format!("failed on an answering host: {}", fault))),
            Outcome::Mismatch(detail) => report.violations.push(violate(Some(capability), detail)),
        }
    }

    let silent = Arc::new(ScriptedHost::denying());
    let imp = module.instantiate(silent as Arc<dyn HostInternals>);
    for capability in Capability::ALL {
        let called = report.host_calls.get(capability.name()).copied().unwrap_or(0);
        if called == 0 {
            continue;
        }
        match exercise(imp.as_ref(), capability) {
            Outcome::Failed(_) | Outcome::Missing => {}
            _ => report.violations.push(violate(
                Some(capability),
                "succeeded although every host symbol is missing".to_string(),
            )),
        }
    }

    debug!(
        version = %report.version,
        unsupported = report.unsupported.len(),
        violations = report.violations.len(),
        "contract run finished"
    );
    report
}

fn exercise(imp: &dyn VersionImplementation, capability: Capability) -> Outcome {
    let player = fixtures::player();
    let entity = fixtures::entity();
    let release = imp.version().release();

    let result: Result<Outcome, Fault> = match capability {
        Capability::ColorOf => match imp.chat_colors() {
            None => Ok(Outcome::Missing),
            Some(colors) => colors
                .color_of(ChatColor::Gold)
                .map(|rgb| check(rgb.is_some(), || "gold has no color".to_string())),
        },
        Capability::Namespaced => match imp.enchant_ids() {
            None => Ok(Outcome::Missing),
            Some(ids) => ids.namespaced(&Enchantment::new("DAMAGE_ALL")).map(|key| {
                let plain = !key.is_empty() && !key.contains(':') && key == key.to_lowercase();
                check(plain, || format!("DAMAGE_ALL keyed as {:?}", key))
            }),
        },
        Capability::ItemInMainHand => match imp.main_hand() {
            None => Ok(Outcome::Missing),
            Some(hand) => hand.item_in_main_hand(&player).map(|_| Outcome::Passed),
        },
        Capability::SetItemInMainHand => match imp.main_hand() {
            None => Ok(Outcome::Missing),
            Some(hand) => hand
                .set_item_in_main_hand(&player, Some(&fixtures::sword()))
                .map(|_| Outcome::Passed),
        },
        Capability::ItemInOffHand => match imp.main_hand() {
            None => Ok(Outcome::Missing),
            Some(hand) => hand.item_in_off_hand(&player).map(|_| Outcome::Passed),
        },
        Capability::SetItemInOffHand => match imp.main_hand() {
            None => Ok(Outcome::Missing),
            Some(hand) => hand
                .set_item_in_off_hand(&player, Some(&fixtures::sword()))
                .map(|_| Outcome::Passed),
        },
        Capability::IsOffHandInteraction => match imp.main_hand() {
            None => Ok(Outcome::Missing),
            Some(hand) => hand
                .is_off_hand_interaction(&fixtures::interact_event())
                .map(|off| check(!off, || "main hand event reported as off hand".to_string())),
        },
        Capability::TeleportWithoutEvent => match imp.teleporter() {
            None => Ok(Outcome::Missing),
            Some(teleporter) => teleporter
                .teleport_without_event(&player, &fixtures::location())
                .map(|_| Outcome::Passed),
        },
        Capability::SetUnbreakable => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor.set_unbreakable(fixtures::sword(), true).map(|item| {
                check(item.unbreakable, || "unbreakable flag not set".to_string())
            }),
        },
        Capability::IsUnbreakable => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor
                .set_unbreakable(fixtures::sword(), true)
                .and_then(|item| editor.is_unbreakable(&item))
                .map(|flag| check(flag, || "unbreakable did not round trip".to_string())),
        },
        Capability::SetDamage => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor.set_damage(fixtures::sword(), 7).map(|_| Outcome::Passed),
        },
        Capability::Damage => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor
                .set_damage(fixtures::sword(), 7)
                .and_then(|item| editor.damage(&item))
                .map(|damage| check(damage == 7, || format!("damage read back as {}", damage))),
        },
        Capability::SetNbtTag => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor
                .set_nbt_tag(fixtures::sword(), "kami", json!("common"))
                .map(|_| Outcome::Passed),
        },
        Capability::NbtTag => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor
                .set_nbt_tag(fixtures::sword(), "kami", json!("common"))
                .and_then(|item| editor.nbt_tag(&item, "kami"))
                .map(|tag| {
                    check(tag == Some(json!("common")), || format!("tag read back as {:?}", tag))
                }),
        },
        Capability::TranslationKey => match imp.item_editor() {
            None => Ok(Outcome::Missing),
            Some(editor) => editor
                .translation_key(&fixtures::sword())
                .map(|key| check(!key.is_empty(), || "empty translation key".to_string())),
        },
        Capability::SetBlockFast => match imp.block_util() {
            None => Ok(Outcome::Missing),
            Some(blocks) => [PlaceType::Bukkit, PlaceType::Nms, PlaceType::Section]
                .into_iter()
                .try_for_each(|place| {
                    blocks.set_block_fast("world", fixtures::block_pos(), "STONE", place)
                })
                .map(|_| Outcome::Passed),
        },
        Capability::EntityHeight => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods
                .height(entity)
                .map(|h| check(h > 0.0, || format!("height {}", h))),
        },
        Capability::EntityWidth => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods
                .width(entity)
                .map(|w| check(w > 0.0, || format!("width {}", w))),
        },
        Capability::SetPersists => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods.set_persists(entity, true).map(|_| Outcome::Passed),
        },
        Capability::SetFromSpawner => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods.set_from_spawner(entity, true).map(|_| Outcome::Passed),
        },
        Capability::SetMobAi => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods.set_mob_ai(entity, false).map(|_| Outcome::Passed),
        },
        Capability::SpawnerType => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods
                .spawner_type(&fixtures::spawner(release))
                .map(|kind| check(kind.is_none(), || format!("blank spawner spawns {:?}", kind))),
        },
        Capability::SetSpawnerType => match imp.entity_methods() {
            None => Ok(Outcome::Missing),
            Some(methods) => methods
                .set_spawner_type(fixtures::spawner(release), &fixtures::zombie())
                .and_then(|item| methods.spawner_type(&item))
                .map(|kind| {
                    check(kind == Some(fixtures::zombie()), || {
                        format!("spawner type read back as {:?}", kind)
                    })
                }),
        },
        Capability::DestroyEntities => match imp.packet_handler() {
            None => Ok(Outcome::Missing),
            Some(packets) => packets
                .destroy_entities(&[entity, EntityRef(43)])
                .map(|packet| built_here(imp, &packet)),
        },
        Capability::EntityStatus => match imp.packet_handler() {
            None => Ok(Outcome::Missing),
            Some(packets) => packets
                .entity_status(entity, 3)
                .map(|packet| built_here(imp, &packet)),
        },
        Capability::SendPacket => match imp.packet_handler() {
            None => Ok(Outcome::Missing),
            Some(packets) => {
                let packet = NmsPacket::built(imp.version().revision().clone(), "fixture", json!({}));
                packets.send_packet(&player, &packet).map(|_| Outcome::Passed)
            }
        },
        Capability::RegisterCommand => match imp.command_map() {
            None => Ok(Outcome::Missing),
            Some(commands) => commands
                .register_command(&fixtures::command())
                .map(|_| Outcome::Passed),
        },
        Capability::UnregisterCommand => match imp.command_map() {
            None => Ok(Outcome::Missing),
            Some(commands) => commands.unregister_command("kami").map(|_| Outcome::Passed),
        },
        Capability::KnownCommands => match imp.command_map() {
            None => Ok(Outcome::Missing),
            Some(commands) => commands.known_commands().map(|_| Outcome::Passed),
        },
        Capability::SendComponent => match imp.messaging() {
            None => Ok(Outcome::Missing),
            Some(messaging) => messaging
                .send_component(&player, &fixtures::component())
                .map(|_| Outcome::Passed),
        },
        Capability::MinHeight => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world.min_height("world").map(|min| {
                check(min <= 0 && min % 16 == 0, || format!("min height {}", min))
            }),
        },
        Capability::MaxHeight => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world.max_height("world").map(|max| {
                check(max > 0 && max % 16 == 0, || format!("exclusive max height {}", max))
            }),
        },
        Capability::RefreshBlock => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world
                .refresh_block_at(&player, "world", fixtures::block_pos())
                .map(|_| Outcome::Passed),
        },
        Capability::SetSectionBlock => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world
                .set_section_block("world", fixtures::block_pos(), "STONE")
                .and_then(|_| world.max_height("world"))
                .map(|max| {
                    let above = BlockPos { y: max, ..fixtures::block_pos() };
                    match world.set_section_block("world", above, "STONE") {
                        Err(Fault::OutOfWorld { .. }) => Outcome::Passed,
                        other => Outcome::Mismatch(format!("write at y={} gave {:?}", max, other)),
                    }
                }),
        },
        Capability::IsSectionEmpty => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world
                .is_section_empty("world", fixtures::block_pos())
                .map(|_| Outcome::Passed),
        },
        Capability::SendChunkUpdate => match imp.world() {
            None => Ok(Outcome::Missing),
            Some(world) => world
                .send_chunk_update(&player, "world", fixtures::chunk())
                .map(|_| Outcome::Passed),
        },
        Capability::ItemComponents => match imp.item_text() {
            None => Ok(Outcome::Missing),
            Some(text) => text
                .components(&fixtures::sword())
                .map(|parts| check(!parts.is_empty(), || "no hover components".to_string())),
        },
        Capability::NbtTooltip => match imp.item_text() {
            None => Ok(Outcome::Missing),
            Some(text) => text
                .nbt_tooltip(&fixtures::sword())
                .map(|snbt| check(snbt.starts_with('{'), || format!("tooltip {:?}", snbt))),
        },
    };
    result.into()
}

fn built_here(imp: &dyn VersionImplementation, packet: &NmsPacket) -> Outcome {
    check(packet.revision() == imp.version().revision(), || {
        format!("packet built for {}", packet.revision())
    })
}
