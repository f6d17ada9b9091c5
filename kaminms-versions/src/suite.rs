use kaminms_api::{
    BlockUtil, ChatColors, CommandMap, EnchantIds, EntityMethods, ItemEditor, MainHand, Messaging,
    ItemText, PacketHandler, ServerVersion, Teleporter, VersionImplementation, WorldAccess,
};
use std::fmt;

/// A version implementation assembled from per-group parts.
///
/// Groups left unset report as missing, which the facade refuses to bind.
pub struct VersionSuite {
    version: ServerVersion,
    chat_colors: Option<Box<dyn ChatColors>>,
    enchant_ids: Option<Box<dyn EnchantIds>>,
    main_hand: Option<Box<dyn MainHand>>,
    teleporter: Option<Box<dyn Teleporter>>,
    item_editor: Option<Box<dyn ItemEditor>>,
    block_util: Option<Box<dyn BlockUtil>>,
    entity_methods: Option<Box<dyn EntityMethods>>,
    packet_handler: Option<Box<dyn PacketHandler>>,
    command_map: Option<Box<dyn CommandMap>>,
    messaging: Option<Box<dyn Messaging>>,
    world: Option<Box<dyn WorldAccess>>,
    item_text: Option<Box<dyn ItemText>>,
}

pub struct SuiteBuilder {
    suite: VersionSuite,
}

impl VersionSuite {
    pub fn builder(version: ServerVersion) -> SuiteBuilder {
        SuiteBuilder {
            suite: VersionSuite {
                version,
                chat_colors: None,
                enchant_ids: None,
                main_hand: None,
                teleporter: None,
                item_editor: None,
                block_util: None,
                entity_methods: None,
                packet_handler: None,
                command_map: None,
                messaging: None,
                world: None,
                item_text: None,
            },
        }
    }
}

impl SuiteBuilder {
    pub fn chat_colors(mut self, part: impl ChatColors + 'static) -> Self {
        self.suite.chat_colors = Some(Box::new(part));
        self
    }

    pub fn enchant_ids(mut self, part: impl EnchantIds + 'static) -> Self {
        self.suite.enchant_ids = Some(Box::new(part));
        self
    }

    pub fn main_hand(mut self, part: impl MainHand + 'static) -> Self {
        self.suite.main_hand = Some(Box::new(part));
        self
    }

    pub fn teleporter(mut self, part: impl Teleporter + 'static) -> Self {
        self.suite.teleporter = Some(Box::new(part));
        self
    }

    pub fn item_editor(mut self, part: impl ItemEditor + 'static) -> Self {
        self.suite.item_editor = Some(Box::new(part));
        self
    }

    pub fn block_util(mut self, part: impl BlockUtil + 'static) -> Self {
        self.suite.block_util = Some(Box::new(part));
        self
    }

    pub fn entity_methods(mut self, part: impl EntityMethods + 'static) -> Self {
        self.suite.entity_methods = Some(Box::new(part));
        self
    }

    pub fn packet_handler(mut self, part: impl PacketHandler + 'static) -> Self {
        self.suite.packet_handler = Some(Box::new(part));
        self
    }

    pub fn command_map(mut self, part: impl CommandMap + 'static) -> Self {
        self.suite.command_map = Some(Box::new(part));
        self
    }

    pub fn messaging(mut self, part: impl Messaging + 'static) -> Self {
        self.suite.messaging = Some(Box::new(part));
        self
    }

    pub fn world(mut self, part: impl WorldAccess + 'static) -> Self {
        self.suite.world = Some(Box::new(part));
        self
    }

    pub fn item_text(mut self, part: impl ItemText + 'static) -> Self {
        self.suite.item_text = Some(Box::new(part));
        self
    }

    pub fn build(self) -> VersionSuite {
        self.suite
    }
}

impl VersionImplementation for VersionSuite {
    fn version(&self) -> &ServerVersion {
        &self.version
    }

    fn chat_colors(&self) -> Option<&dyn ChatColors> {
        self.chat_colors.as_deref()
    }

    fn enchant_ids(&self) -> Option<&dyn EnchantIds> {
        self.enchant_ids.as_deref()
    }

    fn main_hand(&self) -> Option<&dyn MainHand> {
        self.main_hand.as_deref()
    }

    fn teleporter(&self) -> Option<&dyn Teleporter> {
        self.teleporter.as_deref()
    }

    fn item_editor(&self) -> Option<&dyn ItemEditor> {
        self.item_editor.as_deref()
    }

    fn block_util(&self) -> Option<&dyn BlockUtil> {
        self.block_util.as_deref()
    }

    fn entity_methods(&self) -> Option<&dyn EntityMethods> {
        self.entity_methods.as_deref()
    }

    fn packet_handler(&self) -> Option<&dyn PacketHandler> {
        self.packet_handler.as_deref()
    }

    fn command_map(&self) -> Option<&dyn CommandMap> {
        self.command_map.as_deref()
    }

    fn messaging(&self) -> Option<&dyn Messaging> {
        self.messaging.as_deref()
    }

    fn world(&self) -> Option<&dyn WorldAccess> {
        self.world.as_deref()
    }

    fn item_text(&self) -> Option<&dyn ItemText> {
        self.item_text.as_deref()
    }
}

impl fmt::Debug for VersionSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionSuite")
            .field("version", &self.version)
            .field("missing", &self.missing_groups())
            .finish()
    }
}
