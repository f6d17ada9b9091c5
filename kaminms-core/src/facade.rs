use kaminms_api::{
    BlockPos, Capability, ChatColor, ChatComponent, ChunkPos, CommandSpec, Enchantment, EntityKind,
    EntityRef, Fault, HostInternals, HostProbe, ItemStack, Location, NmsError, NmsPacket,
    NmsResult, PlaceType, PlayerRef, Rgb, ServerVersion, UnsupportedVersionError,
    VersionImplementation, VersionImplementationError, VersionModule,
};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Span};

use crate::config::NmsConfig;
use crate::detector::{DetectedSignature, MatchKind, VersionDetector};
use crate::logging::plugin_span;
use crate::registry::{default_registry, RegistryBuilder, VersionRegistry};

/// The implementation bound for the lifetime of the process.
#[derive(Debug)]
pub struct ResolvedBinding {
    version: ServerVersion,
    implementation: Arc<dyn VersionImplementation>,
    signature: DetectedSignature,
    kind: MatchKind,
}

impl ResolvedBinding {
    pub fn version(&self) -> &ServerVersion {
        &self.version
    }

    pub fn implementation(&self) -> &dyn VersionImplementation {
        self.implementation.as_ref()
    }

    pub fn signature(&self) -> &DetectedSignature {
        &self.signature
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }
}

/// Single entry point for plugin code.
///
/// The first call of any capability resolves the binding; every later call
/// forwards to it. A failed resolution is cached just like a successful one.
/// Everything the facade logs is recorded under the `kaminms{plugin=..}` span.
pub struct NmsFacade {
    config: NmsConfig,
    span: Span,
    probe: Arc<dyn HostProbe>,
    host: Arc<dyn HostInternals>,
    pending: RegistryBuilder,
    registry: OnceCell<VersionRegistry>,
    binding: OnceCell<NmsResult<Arc<ResolvedBinding>>>,
    detections: AtomicUsize,
}

impl NmsFacade {
    pub fn new(
        config: NmsConfig,
        probe: Arc<dyn HostProbe>,
        host: Arc<dyn HostInternals>,
        registry: RegistryBuilder,
    ) -> Self {
        NmsFacade {
            span: plugin_span(&config.plugin_name),
            config,
            probe,
            host,
            pending: registry,
            registry: OnceCell::new(),
            binding: OnceCell::new(),
            detections: AtomicUsize::new(0),
        }
    }

    /// A facade over every release this crate was compiled with.
    pub fn with_default_registry(
        config: NmsConfig,
        probe: Arc<dyn HostProbe>,
        host: Arc<dyn HostInternals>,
    ) -> NmsResult<Self> {
        Ok(Self::new(config, probe, host, default_registry()?))
    }

    /// Adds a module before the registry is frozen by the first resolution.
    pub fn register(&mut self, module: Arc<dyn VersionModule>) -> NmsResult<()> {
        if self.registry.get().is_some() {
            return Err(NmsError::RegistryFrozen);
        }
        self.pending.register(module).map(|_| ())
    }

    pub fn config(&self) -> &NmsConfig {
        &self.config
    }

    /// The frozen registry; freezes it if nothing has yet.
    pub fn registry(&self) -> &VersionRegistry {
        self.registry.get_or_init(|| self.pending.clone().build())
    }

    /// Detects and binds on first use; afterwards returns the same binding or failure.
    pub fn resolve(&self) -> NmsResult<Arc<ResolvedBinding>> {
        self.binding.get_or_init(|| self.bind()).clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.binding.get().is_some()
    }

    /// How many times detection ran. Never more than one.
    pub fn detections(&self) -> usize {
        self.detections.load(Ordering::SeqCst)
    }

    pub fn version(&self) -> NmsResult<ServerVersion> {
        Ok(self.resolve()?.version().clone())
    }

    fn bind(&self) -> NmsResult<Arc<ResolvedBinding>> {
        let _entered = self.span.enter();
        self.detections.fetch_add(1, Ordering::SeqCst);
        let registry = self.registry();

        let detection = VersionDetector::new(registry, &self.config)
            .detect(self.probe.as_ref())
            .map_err(|e| {
                error!(code = %e.code(), "version resolution failed: {}", e);
                e
            })?;

        let module = registry.get(&detection.version).ok_or_else(|| {
            NmsError::from(UnsupportedVersionError {
                raw: detection.signature.raw.clone(),
                supported: registry.supported(),
            })
        })?;
        let implementation = module.instantiate(Arc::clone(&self.host));

        let missing = implementation.missing_groups();
        if !missing.is_empty() {
            let err = NmsError::IncompleteImplementation {
                version: detection.version.clone(),
                missing,
            };
            error!(code = %err.code(), "version resolution failed: {}", err);
            return Err(err);
        }

        info!(
            version = %detection.version,
            flavor = %detection.signature.flavor,
            kind = ?detection.kind,
            "bound server version"
        );
        Ok(Arc::new(ResolvedBinding {
            version: detection.version,
            implementation,
            signature: detection.signature,
            kind: detection.kind,
        }))
    }

    fn dispatch<T>(
        &self,
        capability: Capability,
        call: impl FnOnce(&dyn VersionImplementation) -> Option<Result<T, Fault>>,
    ) -> NmsResult<T> {
        let _entered = self.span.enter();
        let binding = self.resolve()?;
        debug!(capability = capability.name(), version = %binding.version, "dispatch");
        match call(binding.implementation()) {
            Some(Ok(value)) => Ok(value),
            Some(Err(cause)) => {
                warn!(capability = capability.name(), version = %binding.version, "capability failed: {}", cause);
                Err(VersionImplementationError {
                    capability: capability.name(),
                    version: binding.version.clone(),
                    cause,
                }
                .into())
            }
            None => Err(NmsError::IncompleteImplementation {
                version: binding.version.clone(),
                missing: vec![capability.group()],
            }),
        }
    }

    // chat_color

    pub fn color_of(&self, color: ChatColor) -> NmsResult<Option<Rgb>> {
        self.dispatch(Capability::ColorOf, |imp| {
            imp.chat_colors().map(|c| c.color_of(color))
        })
    }

    // enchant_id

    pub fn namespaced(&self, enchantment: &Enchantment) -> NmsResult<String> {
        self.dispatch(Capability::Namespaced, |imp| {
            imp.enchant_ids().map(|e| e.namespaced(enchantment))
        })
    }

    // main_hand

    pub fn item_in_main_hand(&self, player: &PlayerRef) -> NmsResult<Option<ItemStack>> {
        self.dispatch(Capability::ItemInMainHand, |imp| {
            imp.main_hand().map(|h| h.item_in_main_hand(player))
        })
    }

    pub fn set_item_in_main_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> NmsResult<()> {
        self.dispatch(Capability::SetItemInMainHand, |imp| {
            imp.main_hand().map(|h| h.set_item_in_main_hand(player, item))
        })
    }

    pub fn item_in_off_hand(&self, player: &PlayerRef) -> NmsResult<Option<ItemStack>> {
        self.dispatch(Capability::ItemInOffHand, |imp| {
            imp.main_hand().map(|h| h.item_in_off_hand(player))
        })
    }

    pub fn set_item_in_off_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> NmsResult<()> {
        self.dispatch(Capability::SetItemInOffHand, |imp| {
            imp.main_hand().map(|h| h.set_item_in_off_hand(player, item))
        })
    }

    pub fn is_off_hand_interaction(&self, event: &Value) -> NmsResult<bool> {
        self.dispatch(Capability::IsOffHandInteraction, |imp| {
            imp.main_hand().map(|h| h.is_off_hand_interaction(event))
        })
    }

    // teleport

    pub fn teleport_without_event(&self, player: &PlayerRef, location: &Location) -> NmsResult<()> {
        self.dispatch(Capability::TeleportWithoutEvent, |imp| {
            imp.teleporter().map(|t| t.teleport_without_event(player, location))
        })
    }

    // item_editor

    pub fn set_unbreakable(&self, item: ItemStack, unbreakable: bool) -> NmsResult<ItemStack> {
        self.dispatch(Capability::SetUnbreakable, |imp| {
            imp.item_editor().map(|e| e.set_unbreakable(item, unbreakable))
        })
    }

    pub fn is_unbreakable(&self, item: &ItemStack) -> NmsResult<bool> {
        self.dispatch(Capability::IsUnbreakable, |imp| {
            imp.item_editor().map(|e| e.is_unbreakable(item))
        })
    }

    pub fn set_damage(&self, item: ItemStack, damage: i32) -> NmsResult<ItemStack> {
        self.dispatch(Capability::SetDamage, |imp| {
            imp.item_editor().map(|e| e.set_damage(item, damage))
        })
    }

    pub fn damage(&self, item: &ItemStack) -> NmsResult<i32> {
        self.dispatch(Capability::Damage, |imp| imp.item_editor().map(|e| e.damage(item)))
    }

    pub fn set_nbt_tag(&self, item: ItemStack, key: &str, value: Value) -> NmsResult<ItemStack> {
        self.dispatch(Capability::SetNbtTag, |imp| {
            imp.item_editor().map(|e| e.set_nbt_tag(item, key, value))
        })
    }

    pub fn nbt_tag(&self, item: &ItemStack, key: &str) -> NmsResult<Option<Value>> {
        self.dispatch(Capability::NbtTag, |imp| {
            imp.item_editor().map(|e| e.nbt_tag(item, key))
        })
    }

    pub fn translation_key(&self, item: &ItemStack) -> NmsResult<String> {
        self.dispatch(Capability::TranslationKey, |imp| {
            imp.item_editor().map(|e| e.translation_key(item))
        })
    }

    // block

    pub fn set_block_fast(
        &self,
        world: &str,
        pos: BlockPos,
        material: &str,
        place: PlaceType,
    ) -> NmsResult<()> {
        self.dispatch(Capability::SetBlockFast, |imp| {
            imp.block_util()
                .map(|b| b.set_block_fast(world, pos, material, place))
        })
    }

    // entity

    pub fn entity_height(&self, entity: EntityRef) -> NmsResult<f64> {
        self.dispatch(Capability::EntityHeight, |imp| {
            imp.entity_methods().map(|e| e.height(entity))
        })
    }

    pub fn entity_width(&self, entity: EntityRef) -> NmsResult<f64> {
        self.dispatch(Capability::EntityWidth, |imp| {
            imp.entity_methods().map(|e| e.width(entity))
        })
    }

    pub fn set_persists(&self, entity: EntityRef, value: bool) -> NmsResult<()> {
        self.dispatch(Capability::SetPersists, |imp| {
            imp.entity_methods().map(|e| e.set_persists(entity, value))
        })
    }

    pub fn set_from_spawner(&self, entity: EntityRef, value: bool) -> NmsResult<()> {
        self.dispatch(Capability::SetFromSpawner, |imp| {
            imp.entity_methods().map(|e| e.set_from_spawner(entity, value))
        })
    }

    pub fn set_mob_ai(&self, entity: EntityRef, value: bool) -> NmsResult<()> {
        self.dispatch(Capability::SetMobAi, |imp| {
            imp.entity_methods().map(|e| e.set_mob_ai(entity, value))
        })
    }

    pub fn spawner_type(&self, item: &ItemStack) -> NmsResult<Option<EntityKind>> {
        self.dispatch(Capability::SpawnerType, |imp| {
            imp.entity_methods().map(|e| e.spawner_type(item))
        })
    }

    pub fn set_spawner_type(&self, item: ItemStack, kind: &EntityKind) -> NmsResult<ItemStack> {
        self.dispatch(Capability::SetSpawnerType, |imp| {
            imp.entity_methods().map(|e| e.set_spawner_type(item, kind))
        })
    }

    // packet

    pub fn destroy_entities(&self, ids: &[EntityRef]) -> NmsResult<NmsPacket> {
        self.dispatch(Capability::DestroyEntities, |imp| {
            imp.packet_handler().map(|p| p.destroy_entities(ids))
        })
    }

    pub fn entity_status(&self, entity: EntityRef, status: i8) -> NmsResult<NmsPacket> {
        self.dispatch(Capability::EntityStatus, |imp| {
            imp.packet_handler().map(|p| p.entity_status(entity, status))
        })
    }

    pub fn send_packet(&self, player: &PlayerRef, packet: &NmsPacket) -> NmsResult<()> {
        self.dispatch(Capability::SendPacket, |imp| {
            imp.packet_handler().map(|p| p.send_packet(player, packet))
        })
    }

    // command_map

    pub fn register_command(&self, command: &CommandSpec) -> NmsResult<bool> {
        self.dispatch(Capability::RegisterCommand, |imp| {
            imp.command_map().map(|m| m.register_command(command))
        })
    }

    pub fn unregister_command(&self, name: &str) -> NmsResult<bool> {
        self.dispatch(Capability::UnregisterCommand, |imp| {
            imp.command_map().map(|m| m.unregister_command(name))
        })
    }

    pub fn known_commands(&self) -> NmsResult<Vec<String>> {
        self.dispatch(Capability::KnownCommands, |imp| {
            imp.command_map().map(|m| m.known_commands())
        })
    }

    // messaging

    pub fn send_component(&self, player: &PlayerRef, component: &ChatComponent) -> NmsResult<()> {
        self.dispatch(Capability::SendComponent, |imp| {
            imp.messaging().map(|m| m.send_component(player, component))
        })
    }

    // world

    pub fn min_height(&self, world: &str) -> NmsResult<i32> {
        self.dispatch(Capability::MinHeight, |imp| imp.world().map(|w| w.min_height(world)))
    }

    /// One above the highest buildable Y.
    pub fn max_height(&self, world: &str) -> NmsResult<i32> {
        self.dispatch(Capability::MaxHeight, |imp| imp.world().map(|w| w.max_height(world)))
    }

    pub fn refresh_block(&self, player: &PlayerRef, world: &str, pos: BlockPos) -> NmsResult<()> {
        self.dispatch(Capability::RefreshBlock, |imp| {
            imp.world().map(|w| w.refresh_block_at(player, world, pos))
        })
    }

    pub fn set_section_block(&self, world: &str, pos: BlockPos, material: &str) -> NmsResult<()> {
        self.dispatch(Capability::SetSectionBlock, |imp| {
            imp.world().map(|w| w.set_section_block(world, pos, material))
        })
    }

    pub fn is_section_empty(&self, world: &str, pos: BlockPos) -> NmsResult<bool> {
        self.dispatch(Capability::IsSectionEmpty, |imp| {
            imp.world().map(|w| w.is_section_empty(world, pos))
        })
    }

    pub fn send_chunk_update(&self, player: &PlayerRef, world: &str, chunk: ChunkPos) -> NmsResult<()> {
        self.dispatch(Capability::SendChunkUpdate, |imp| {
            imp.world().map(|w| w.send_chunk_update(player, world, chunk))
        })
    }

    // item text, before 1.17 only

    pub fn item_components(&self, item: &ItemStack) -> NmsResult<Vec<ChatComponent>> {
        self.dispatch(Capability::ItemComponents, |imp| {
            imp.item_text().map(|t| t.components(item))
        })
    }

    pub fn nbt_tooltip(&self, item: &ItemStack) -> NmsResult<String> {
        self.dispatch(Capability::NbtTooltip, |imp| {
            imp.item_text().map(|t| t.nbt_tooltip(item))
        })
    }

    /// Calls a capability by its dotted name with JSON-encoded arguments.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> NmsResult<Value> {
        let capability =
            Capability::from_name(name).ok_or_else(|| NmsError::UnknownCapability(name.to_string()))?;
        let args = Args::new(capability, args);
        use Capability::*;
        match capability {
            ColorOf => {
                args.arity(1)?;
                args.encode(self.color_of(args.get(0)?)?)
            }
            Namespaced => {
                args.arity(1)?;
                args.encode(self.namespaced(&args.get(0)?)?)
            }
            ItemInMainHand => {
                args.arity(1)?;
                args.encode(self.item_in_main_hand(&args.get(0)?)?)
            }
            SetItemInMainHand => {
                args.arity(2)?;
                let item: Option<ItemStack> = args.get(1)?;
                args.encode(self.set_item_in_main_hand(&args.get(0)?, item.as_ref())?)
            }
            ItemInOffHand => {
                args.arity(1)?;
                args.encode(self.item_in_off_hand(&args.get(0)?)?)
            }
            SetItemInOffHand => {
                args.arity(2)?;
                let item: Option<ItemStack> = args.get(1)?;
                args.encode(self.set_item_in_off_hand(&args.get(0)?, item.as_ref())?)
            }
            IsOffHandInteraction => {
                args.arity(1)?;
                args.encode(self.is_off_hand_interaction(&args.get::<Value>(0)?)?)
            }
            TeleportWithoutEvent => {
                args.arity(2)?;
                args.encode(self.teleport_without_event(&args.get(0)?, &args.get(1)?)?)
            }
            SetUnbreakable => {
                args.arity(2)?;
                args.encode(self.set_unbreakable(args.get(0)?, args.get(1)?)?)
            }
            IsUnbreakable => {
                args.arity(1)?;
                args.encode(self.is_unbreakable(&args.get(0)?)?)
            }
            SetDamage => {
                args.arity(2)?;
                args.encode(self.set_damage(args.get(0)?, args.get(1)?)?)
            }
            Damage => {
                args.arity(1)?;
                args.encode(self.damage(&args.get(0)?)?)
            }
            SetNbtTag => {
                args.arity(3)?;
                let key: String = args.get(1)?;
                args.encode(self.set_nbt_tag(args.get(0)?, &key, args.get(2)?)?)
            }
            NbtTag => {
                args.arity(2)?;
                let key: String = args.get(1)?;
                args.encode(self.nbt_tag(&args.get(0)?, &key)?)
            }
            TranslationKey => {
                args.arity(1)?;
                args.encode(self.translation_key(&args.get(0)?)?)
            }
            SetBlockFast => {
                args.arity(4)?;
                let world: String = args.get(0)?;
                let material: String = args.get(2)?;
                args.encode(self.set_block_fast(&world, args.get(1)?, &material, args.get(3)?)?)
            }
            EntityHeight => {
                args.arity(1)?;
                args.encode(self.entity_height(args.get(0)?)?)
            }
            EntityWidth => {
                args.arity(1)?;
                args.encode(self.entity_width(args.get(0)?)?)
            }
            SetPersists => {
                args.arity(2)?;
                args.encode(self.set_persists(args.get(0)?, args.get(1)?)?)
            }
            SetFromSpawner => {
                args.arity(2)?;
                args.encode(self.set_from_spawner(args.get(0)?, args.get(1)?)?)
            }
            SetMobAi => {
                args.arity(2)?;
                args.encode(self.set_mob_ai(args.get(0)?, args.get(1)?)?)
            }
            SpawnerType => {
                args.arity(1)?;
                args.encode(self.spawner_type(&args.get(0)?)?)
            }
            SetSpawnerType => {
                args.arity(2)?;
                args.encode(self.set_spawner_type(args.get(0)?, &args.get(1)?)?)
            }
            DestroyEntities => {
                args.arity(1)?;
                let ids: Vec<EntityRef> = args.get(0)?;
                args.encode(self.destroy_entities(&ids)?)
            }
            EntityStatus => {
                args.arity(2)?;
                args.encode(self.entity_status(args.get(0)?, args.get(1)?)?)
            }
            SendPacket => {
                args.arity(2)?;
                args.encode(self.send_packet(&args.get(0)?, &args.get(1)?)?)
            }
            RegisterCommand => {
                args.arity(1)?;
                args.encode(self.register_command(&args.get(0)?)?)
            }
            UnregisterCommand => {
                args.arity(1)?;
                let name: String = args.get(0)?;
                args.encode(self.unregister_command(&name)?)
            }
            KnownCommands => {
                args.arity(0)?;
                args.encode(self.known_commands()?)
            }
            SendComponent => {
                args.arity(2)?;
                args.encode(self.send_component(&args.get(0)?, &args.get(1)?)?)
            }
            MinHeight => {
                args.arity(1)?;
                let world: String = args.get(0)?;
                args.encode(self.min_height(&world)?)
            }
            MaxHeight => {
                args.arity(1)?;
                let world: String = args.get(0)?;
                args.encode(self.max_height(&world)?)
            }
            RefreshBlock => {
                args.arity(3)?;
                let world: String = args.get(1)?;
                args.encode(self.refresh_block(&args.get(0)?, &world, args.get(2)?)?)
            }
            SetSectionBlock => {
                args.arity(3)?;
                let world: String = args.get(0)?;
                let material: String = args.get(2)?;
                args.encode(self.set_section_block(&world, args.get(1)?, &material)?)
            }
            IsSectionEmpty => {
                args.arity(2)?;
                let world: String = args.get(0)?;
                args.encode(self.is_section_empty(&world, args.get(1)?)?)
            }
            SendChunkUpdate => {
                args.arity(3)?;
                let world: String = args.get(1)?;
                args.encode(self.send_chunk_update(&args.get(0)?, &world, args.get(2)?)?)
            }
            ItemComponents => {
                args.arity(1)?;
                args.encode(self.item_components(&args.get(0)?)?)
            }
            NbtTooltip => {
                args.arity(1)?;
                args.encode(self.nbt_tooltip(&args.get(0)?)?)
            }
        }
    }
}

/// Positional arguments of one dynamic call.
struct Args {
    capability: Capability,
    values: Vec<Value>,
}

impl Args {
    fn new(capability: Capability, values: Vec<Value>) -> Self {
        Args { capability, values }
    }

    fn bad(&self, detail: String) -> NmsError {
        NmsError::BadArguments {
            capability: self.capability.name(),
            detail,
        }
    }

    fn arity(&self, expected: usize) -> NmsResult<()> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(self.bad(format!(
                "expected {} argument(s) for {}, got {}",
                expected,
                self.capability.signature(),
                self.values.len()
            )))
        }
    }

    fn get<T: DeserializeOwned>(&self, index: usize) -> NmsResult<T> {
        let value = self
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| self.bad(format!("missing argument {}", index)))?;
        serde_json::from_value(value).map_err(|e| self.bad(format!("argument {}: {}", index, e)))
    }

    fn encode<T: Serialize>(&self, value: T) -> NmsResult<Value> {
        serde_json::to_value(value).map_err(|e| self.bad(format!("result not encodable: {}", e)))
    }
}

impl fmt::Debug for NmsFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NmsFacade")
            .field("config", &self.config)
            .field("registry", &self.registry.get())
            .field("binding", &self.binding.get())
            .finish()
    }
}
