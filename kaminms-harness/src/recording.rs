use dashmap::DashMap;
use kaminms_api::{
    BlockPos, BlockUtil, Capability, CapabilityGroup, ChatColor, ChatColors, ChatComponent,
    ChunkPos, CommandMap, CommandSpec, EnchantIds, Enchantment, EntityKind, EntityMethods,
    EntityRef, Fault, HostInternals, ItemEditor, ItemStack, ItemText, Location, MainHand,
    Messaging, NmsPacket, PacketHandler, PlaceType, PlayerRef, Release, Rgb, ServerVersion,
    Teleporter, VersionImplementation, VersionModule, WorldAccess,
};
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A version implementation that answers with plain data and counts every call.
///
/// Item edits act on the passed stack, so item round trips behave like a real
/// binding. Faults can be injected per capability while the implementation is
/// shared.
pub struct RecordingImplementation {
    version: ServerVersion,
    counts: DashMap<Capability, usize>,
    failures: DashMap<Capability, Fault>,
    commands: DashMap<String, CommandSpec>,
    missing: Vec<CapabilityGroup>,
}

impl RecordingImplementation {
    pub fn new(version: ServerVersion) -> Self {
        RecordingImplementation {
            version,
            counts: DashMap::new(),
            failures: DashMap::new(),
            commands: DashMap::new(),
            missing: Vec::new(),
        }
    }

    /// Leaves `group` unimplemented.
    pub fn without(mut self, group: CapabilityGroup) -> Self {
        self.missing.push(group);
        self
    }

    /// Makes every later call to `capability` fail with `fault`.
    pub fn fail(&self, capability: Capability, fault: Fault) {
        self.failures.insert(capability, fault);
    }

    pub fn heal(&self, capability: Capability) {
        self.failures.remove(&capability);
    }

    pub fn count(&self, capability: Capability) -> usize {
        self.counts.get(&capability).map(|c| *c).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    fn record(&self, capability: Capability) -> Result<(), Fault> {
        *self.counts.entry(capability).or_insert(0) += 1;
        match self.failures.get(&capability) {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn has(&self, group: CapabilityGroup) -> bool {
        !self.missing.contains(&group)
    }

    fn packet(&self, class: &str, handle: Value) -> NmsPacket {
        NmsPacket::built(self.version.revision().clone(), class, handle)
    }
}

impl fmt::Debug for RecordingImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingImplementation")
            .field("version", &self.version)
            .field("calls", &self.total())
            .field("missing", &self.missing)
            .finish()
    }
}

impl ChatColors for RecordingImplementation {
    fn color_of(&self, color: ChatColor) -> Result<Option<Rgb>, Fault> {
        self.record(Capability::ColorOf)?;
        if color.is_format() || color == ChatColor::Reset {
            return Ok(None);
        }
        Ok(Some(Rgb::from_hex(0xFFAA00)))
    }
}

impl EnchantIds for RecordingImplementation {
    fn namespaced(&self, enchantment: &Enchantment) -> Result<String, Fault> {
        self.record(Capability::Namespaced)?;
        Ok(enchantment.0.to_lowercase())
    }
}

impl MainHand for RecordingImplementation {
    fn item_in_main_hand(&self, _player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        self.record(Capability::ItemInMainHand)?;
        Ok(Some(ItemStack::new("STONE", 1)))
    }

    fn set_item_in_main_hand(&self, _player: &PlayerRef, _item: Option<&ItemStack>) -> Result<(), Fault> {
        self.record(Capability::SetItemInMainHand)
    }

    fn item_in_off_hand(&self, _player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        self.record(Capability::ItemInOffHand)?;
        Ok(None)
    }

    fn set_item_in_off_hand(&self, _player: &PlayerRef, _item: Option<&ItemStack>) -> Result<(), Fault> {
        self.record(Capability::SetItemInOffHand)
    }

    fn is_off_hand_interaction(&self, event: &Value) -> Result<bool, Fault> {
        self.record(Capability::IsOffHandInteraction)?;
        Ok(event.get("hand").and_then(Value::as_str) == Some("OFF_HAND"))
    }
}

impl Teleporter for RecordingImplementation {
    fn teleport_without_event(&self, _player: &PlayerRef, _location: &Location) -> Result<(), Fault> {
        self.record(Capability::TeleportWithoutEvent)
    }
}

impl ItemEditor for RecordingImplementation {
    fn set_unbreakable(&self, mut item: ItemStack, unbreakable: bool) -> Result<ItemStack, Fault> {
        self.record(Capability::SetUnbreakable)?;
        item.unbreakable = unbreakable;
        Ok(item)
    }

    fn is_unbreakable(&self, item: &ItemStack) -> Result<bool, Fault> {
        self.record(Capability::IsUnbreakable)?;
        Ok(item.unbreakable)
    }

    fn set_damage(&self, mut item: ItemStack, damage: i32) -> Result<ItemStack, Fault> {
        self.record(Capability::SetDamage)?;
        item.damage = damage;
        Ok(item)
    }

    fn damage(&self, item: &ItemStack) -> Result<i32, Fault> {
        self.record(Capability::Damage)?;
        Ok(item.damage)
    }

    fn set_nbt_tag(&self, mut item: ItemStack, key: &str, value: Value) -> Result<ItemStack, Fault> {
        self.record(Capability::SetNbtTag)?;
        item.nbt.insert(key.to_string(), value);
        Ok(item)
    }

    fn nbt_tag(&self, item: &ItemStack, key: &str) -> Result<Option<Value>, Fault> {
        self.record(Capability::NbtTag)?;
        Ok(item.nbt.get(key).cloned())
    }

    fn translation_key(&self, item: &ItemStack) -> Result<String, Fault> {
        self.record(Capability::TranslationKey)?;
        Ok(format!("item.minecraft.{}", item.material.to_lowercase()))
    }
}

impl BlockUtil for RecordingImplementation {
    fn set_block_fast(
        &self,
        _world: &str,
        _pos: BlockPos,
        _material: &str,
        _place: PlaceType,
    ) -> Result<(), Fault> {
        self.record(Capability::SetBlockFast)
    }
}

impl EntityMethods for RecordingImplementation {
    fn height(&self, _entity: EntityRef) -> Result<f64, Fault> {
        self.record(Capability::EntityHeight)?;
        Ok(1.8)
    }

    fn width(&self, _entity: EntityRef) -> Result<f64, Fault> {
        self.record(Capability::EntityWidth)?;
        Ok(0.6)
    }

    fn set_persists(&self, _entity: EntityRef, _value: bool) -> Result<(), Fault> {
        self.record(Capability::SetPersists)
    }

    fn set_from_spawner(&self, _entity: EntityRef, _value: bool) -> Result<(), Fault> {
        self.record(Capability::SetFromSpawner)
    }

    fn set_mob_ai(&self, _entity: EntityRef, _value: bool) -> Result<(), Fault> {
        self.record(Capability::SetMobAi)
    }

    fn spawner_type(&self, item: &ItemStack) -> Result<Option<EntityKind>, Fault> {
        self.record(Capability::SpawnerType)?;
        Ok(item
            .nbt
            .get("EntityId")
            .and_then(Value::as_str)
            .map(|id| EntityKind(id.to_string())))
    }

    fn set_spawner_type(&self, mut item: ItemStack, kind: &EntityKind) -> Result<ItemStack, Fault> {
        self.record(Capability::SetSpawnerType)?;
        item.nbt.insert("EntityId".to_string(), json!(kind.0));
        Ok(item)
    }
}

impl PacketHandler for RecordingImplementation {
    fn destroy_entities(&self, ids: &[EntityRef]) -> Result<NmsPacket, Fault> {
        self.record(Capability::DestroyEntities)?;
        let ids: Vec<i32> = ids.iter().map(|id| id.0).collect();
        Ok(self.packet("destroy_entities", json!(ids)))
    }

    fn entity_status(&self, entity: EntityRef, status: i8) -> Result<NmsPacket, Fault> {
        self.record(Capability::EntityStatus)?;
        Ok(self.packet("entity_status", json!([entity.0, status])))
    }

    fn send_packet(&self, _player: &PlayerRef, packet: &NmsPacket) -> Result<(), Fault> {
        self.record(Capability::SendPacket)?;
        if packet.revision() != self.version.revision() {
            return Err(Fault::ForeignPacket {
                built_for: packet.revision().clone(),
                bound: self.version.revision().clone(),
            });
        }
        Ok(())
    }
}

impl CommandMap for RecordingImplementation {
    fn register_command(&self, command: &CommandSpec) -> Result<bool, Fault> {
        self.record(Capability::RegisterCommand)?;
        let key = command.name.to_lowercase();
        if self.commands.contains_key(&key) {
            return Ok(false);
        }
        self.commands.insert(key, command.clone());
        Ok(true)
    }

    fn unregister_command(&self, name: &str) -> Result<bool, Fault> {
        self.record(Capability::UnregisterCommand)?;
        Ok(self.commands.remove(&name.to_lowercase()).is_some())
    }

    fn known_commands(&self) -> Result<Vec<String>, Fault> {
        self.record(Capability::KnownCommands)?;
        let mut names: Vec<String> = self.commands.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

impl Messaging for RecordingImplementation {
    fn send_component(&self, _player: &PlayerRef, _component: &ChatComponent) -> Result<(), Fault> {
        self.record(Capability::SendComponent)
    }
}

const WORLD_HEIGHT: (i32, i32) = (0, 256);

impl RecordingImplementation {
    fn in_world(&self, pos: BlockPos) -> Result<(), Fault> {
        let (min, max) = WORLD_HEIGHT;
        if (min..max).contains(&pos.y) {
            Ok(())
        } else {
            Err(Fault::OutOfWorld { y: pos.y, min, max })
        }
    }
}

impl WorldAccess for RecordingImplementation {
    fn min_height(&self, _world: &str) -> Result<i32, Fault> {
        self.record(Capability::MinHeight)?;
        Ok(WORLD_HEIGHT.0)
    }

    fn max_height(&self, _world: &str) -> Result<i32, Fault> {
        self.record(Capability::MaxHeight)?;
        Ok(WORLD_HEIGHT.1)
    }

    fn refresh_block_at(&self, _player: &PlayerRef, _world: &str, _pos: BlockPos) -> Result<(), Fault> {
        self.record(Capability::RefreshBlock)
    }

    fn set_section_block(&self, _world: &str, pos: BlockPos, _material: &str) -> Result<(), Fault> {
        self.record(Capability::SetSectionBlock)?;
        self.in_world(pos)
    }

    fn is_section_empty(&self, _world: &str, pos: BlockPos) -> Result<bool, Fault> {
        self.record(Capability::IsSectionEmpty)?;
        self.in_world(pos).map(|_| false)
    }

    fn send_chunk_update(&self, _player: &PlayerRef, _world: &str, _chunk: ChunkPos) -> Result<(), Fault> {
        self.record(Capability::SendChunkUpdate)
    }
}

impl ItemText for RecordingImplementation {
    fn components(&self, item: &ItemStack) -> Result<Vec<ChatComponent>, Fault> {
        self.record(Capability::ItemComponents)?;
        Ok(vec![ChatComponent::text(item.material.to_lowercase())])
    }

    fn nbt_tooltip(&self, item: &ItemStack) -> Result<String, Fault> {
        self.record(Capability::NbtTooltip)?;
        Ok(format!("{{id:\"minecraft:{}\",Count:{}b}}", item.material.to_lowercase(), item.amount))
    }
}

impl VersionImplementation for RecordingImplementation {
    fn version(&self) -> &ServerVersion {
        &self.version
    }

    fn chat_colors(&self) -> Option<&dyn ChatColors> {
        self.has(CapabilityGroup::ChatColor).then_some(self as &dyn ChatColors)
    }

    fn enchant_ids(&self) -> Option<&dyn EnchantIds> {
        self.has(CapabilityGroup::EnchantId).then_some(self as &dyn EnchantIds)
    }

    fn main_hand(&self) -> Option<&dyn MainHand> {
        self.has(CapabilityGroup::MainHand).then_some(self as &dyn MainHand)
    }

    fn teleporter(&self) -> Option<&dyn Teleporter> {
        self.has(CapabilityGroup::Teleport).then_some(self as &dyn Teleporter)
    }

    fn item_editor(&self) -> Option<&dyn ItemEditor> {
        self.has(CapabilityGroup::ItemEditor).then_some(self as &dyn ItemEditor)
    }

    fn block_util(&self) -> Option<&dyn BlockUtil> {
        self.has(CapabilityGroup::Block).then_some(self as &dyn BlockUtil)
    }

    fn entity_methods(&self) -> Option<&dyn EntityMethods> {
        self.has(CapabilityGroup::Entity).then_some(self as &dyn EntityMethods)
    }

    fn packet_handler(&self) -> Option<&dyn PacketHandler> {
        self.has(CapabilityGroup::Packet).then_some(self as &dyn PacketHandler)
    }

    fn command_map(&self) -> Option<&dyn CommandMap> {
        self.has(CapabilityGroup::CommandMap).then_some(self as &dyn CommandMap)
    }

    fn messaging(&self) -> Option<&dyn Messaging> {
        self.has(CapabilityGroup::Messaging).then_some(self as &dyn Messaging)
    }

    fn world(&self) -> Option<&dyn WorldAccess> {
        self.has(CapabilityGroup::World).then_some(self as &dyn WorldAccess)
    }

    fn item_text(&self) -> Option<&dyn ItemText> {
        self.has(CapabilityGroup::ItemText).then_some(self as &dyn ItemText)
    }
}

/// Registers a shared [`RecordingImplementation`] and counts instantiations.
pub struct RecordingModule {
    implementation: Arc<RecordingImplementation>,
    covers: Vec<Release>,
    instantiations: AtomicUsize,
}

impl RecordingModule {
    /// A module covering only the release of `implementation`'s version.
    pub fn new(implementation: Arc<RecordingImplementation>) -> Self {
        let covers = vec![implementation.version().release()];
        Self::covering(implementation, covers)
    }

    pub fn covering(implementation: Arc<RecordingImplementation>, covers: Vec<Release>) -> Self {
        RecordingModule {
            implementation,
            covers,
            instantiations: AtomicUsize::new(0),
        }
    }

    pub fn implementation(&self) -> &Arc<RecordingImplementation> {
        &self.implementation
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }
}

impl VersionModule for RecordingModule {
    fn version(&self) -> ServerVersion {
        self.implementation.version().clone()
    }

    fn covers(&self) -> &[Release] {
        &self.covers
    }

    fn instantiate(&self, _host: Arc<dyn HostInternals>) -> Arc<dyn VersionImplementation> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        self.implementation.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::Revision;

    fn version() -> ServerVersion {
        ServerVersion::new(Release::new(1, 20, 4), Revision::from_static("v1_20_R3"))
    }

    #[test]
    fn test_counts_and_failures() {
        let imp = RecordingImplementation::new(version());
        assert_eq!(imp.namespaced(&Enchantment::new("DURABILITY")).unwrap(), "durability");

        imp.fail(
            Capability::Namespaced,
            Fault::MissingSymbol {
                symbol: "x".to_string(),
            },
        );
        assert!(imp.namespaced(&Enchantment::new("DURABILITY")).is_err());
        imp.heal(Capability::Namespaced);
        assert!(imp.namespaced(&Enchantment::new("DURABILITY")).is_ok());

        assert_eq!(imp.count(Capability::Namespaced), 3);
        assert_eq!(imp.total(), 3);
    }

    #[test]
    fn test_world_refuses_out_of_range_sections() {
        let imp = RecordingImplementation::new(version());
        let pos = BlockPos { x: 0, y: 300, z: 0 };
        assert_eq!(
            imp.set_section_block("world", pos, "STONE"),
            Err(Fault::OutOfWorld { y: 300, min: 0, max: 256 })
        );
        assert_eq!(imp.is_section_empty("world", BlockPos { x: 0, y: 64, z: 0 }), Ok(false));
        assert_eq!(imp.count(Capability::SetSectionBlock), 1);
    }

    #[test]
    fn test_without_reports_missing() {
        let imp = RecordingImplementation::new(version()).without(CapabilityGroup::Packet);
        assert_eq!(imp.missing_groups(), vec![CapabilityGroup::Packet]);
        assert!(imp.packet_handler().is_none());
    }

    #[test]
    fn test_module_shares_implementation() {
        let module = RecordingModule::new(Arc::new(RecordingImplementation::new(version())));
        let host: Arc<dyn HostInternals> = Arc::new(crate::ScriptedHost::new());
        let a = module.instantiate(host.clone());
        let b = module.instantiate(host);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(module.instantiations(), 2);
        assert_eq!(module.covers(), &[Release::new(1, 20, 4)]);
    }
}
