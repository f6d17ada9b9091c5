//! Version-independent values carried across the capability seam.
//!
//! Everything here is plain data with serde support so the same values travel
//! through typed calls, the dynamic `invoke` path and the host seam.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::version::Revision;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub uuid: Uuid,
    pub name: String,
}

impl PlayerRef {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        PlayerRef {
            uuid,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(pub i32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// The chunk column holding this block.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }

    /// Coordinates inside the 16x16x16 section holding this block.
    pub fn in_section(&self) -> (i32, i32, i32) {
        (self.x & 15, self.y & 15, self.z & 15)
    }

    /// Index of the holding section in a chunk whose lowest block is `min_height`.
    pub fn section_index(&self, min_height: i32) -> i32 {
        (self.y - min_height) >> 4
    }
}

/// A chunk column, in chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

/// How a block write reaches the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    /// Through the Bukkit API, with physics.
    Bukkit,
    /// Straight into the internal world, skipping physics and lighting.
    Nms,
    /// Straight into the chunk section; the caller must refresh chunks.
    Section,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    pub amount: u8,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub unbreakable: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nbt: IndexMap<String, Value>,
}

impl ItemStack {
    pub fn new(material: impl Into<String>, amount: u8) -> Self {
        ItemStack {
            material: material.into(),
            amount,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Magic,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ChatColor {
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            ChatColor::Magic
                | ChatColor::Bold
                | ChatColor::Strikethrough
                | ChatColor::Underline
                | ChatColor::Italic
                | ChatColor::Reset
        )
    }

    /// The legacy section-sign code character.
    pub fn code(&self) -> char {
        match self {
            ChatColor::Black => '0',
            ChatColor::DarkBlue => '1',
            ChatColor::DarkGreen => '2',
            ChatColor::DarkAqua => '3',
            ChatColor::DarkRed => '4',
            ChatColor::DarkPurple => '5',
            ChatColor::Gold => '6',
            ChatColor::Gray => '7',
            ChatColor::DarkGray => '8',
            ChatColor::Blue => '9',
            ChatColor::Green => 'a',
            ChatColor::Aqua => 'b',
            ChatColor::Red => 'c',
            ChatColor::LightPurple => 'd',
            ChatColor::Yellow => 'e',
            ChatColor::White => 'f',
            ChatColor::Magic => 'k',
            ChatColor::Bold => 'l',
            ChatColor::Strikethrough => 'm',
            ChatColor::Underline => 'n',
            ChatColor::Italic => 'o',
            ChatColor::Reset => 'r',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// An enchantment as Bukkit names it (`DAMAGE_ALL`, `DURABILITY`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Enchantment(pub String);

impl Enchantment {
    pub fn new(name: impl Into<String>) -> Self {
        Enchantment(name.into())
    }
}

/// An entity type as Bukkit names it (`ZOMBIE`, `IRON_GOLEM`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKind(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Main,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ClickAction {
    RunCommand(String),
    SuggestCommand(String),
    OpenUrl(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatComponent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ChatColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<Rgb>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<ClickAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ChatComponent>,
}

impl ChatComponent {
    pub fn text(text: impl Into<String>) -> Self {
        ChatComponent {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: ChatColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn on_click(mut self, action: ClickAction) -> Self {
        self.click = Some(action);
        self
    }

    pub fn on_hover(mut self, text: impl Into<String>) -> Self {
        self.hover = Some(text.into());
        self
    }

    pub fn push(mut self, child: ChatComponent) -> Self {
        self.extra.push(child);
        self
    }

    /// Flattens to legacy `§`-coded text, dropping click and hover actions.
    pub fn to_legacy(&self) -> String {
        let mut out = String::new();
        self.write_legacy(&mut out);
        out
    }

    fn write_legacy(&self, out: &mut String) {
        if let Some(color) = self.color {
            out.push('\u{a7}');
            out.push(color.code());
        }
        if self.bold {
            out.push_str("\u{a7}l");
        }
        if self.italic {
            out.push_str("\u{a7}o");
        }
        out.push_str(&self.text);
        for child in &self.extra {
            child.write_legacy(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Fallback prefix, usually the owning plugin's name.
    pub prefix: String,
}

/// A packet built by a bound implementation, ready to be sent.
///
/// Only capability implementations construct packets; the revision they were
/// built for travels with them so a packet from another binding is refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NmsPacket {
    revision: Revision,
    class: String,
    handle: Value,
}

impl NmsPacket {
    pub fn built(revision: Revision, class: impl Into<String>, handle: Value) -> Self {
        NmsPacket {
            revision,
            class: class.into(),
            handle,
        }
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn handle(&self) -> &Value {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_to_legacy() {
        let component = ChatComponent::text("Hello ")
            .color(ChatColor::Gold)
            .push(ChatComponent::text("world").color(ChatColor::Aqua));
        assert_eq!(component.to_legacy(), "\u{a7}6Hello \u{a7}bworld");
    }

    #[test]
    fn test_component_serialization_skips_empty() {
        let json = serde_json::to_value(ChatComponent::text("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "hi", "bold": false, "italic": false})
        );
    }

    #[test]
    fn test_click_action_shape() {
        let json = serde_json::to_value(ClickAction::RunCommand("/help".into())).unwrap();
        assert_eq!(json, serde_json::json!({"action": "run_command", "value": "/help"}));
    }

    #[test]
    fn test_block_pos_sections() {
        let pos = BlockPos { x: -1, y: -60, z: 33 };
        assert_eq!(pos.chunk(), ChunkPos { x: -1, z: 2 });
        assert_eq!(pos.in_section(), (15, 4, 1));
        assert_eq!(pos.section_index(-64), 0);
        assert_eq!(BlockPos { x: 0, y: 255, z: 0 }.section_index(0), 15);
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex(0xFFAA00), Rgb::new(255, 170, 0));
    }

    #[test]
    fn test_format_codes() {
        assert!(ChatColor::Bold.is_format());
        assert!(!ChatColor::Red.is_format());
        assert_eq!(ChatColor::Reset.code(), 'r');
    }
}
