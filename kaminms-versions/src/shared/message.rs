use kaminms_api::{ChatColor, ChatComponent, Fault, Messaging, PlayerRef};
use serde_json::{json, Map, Value};

use super::chat_color::nearest_legacy;
use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Shape of hover events and color support in the client's chat JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverStyle {
    /// `{"action":"show_text","value":...}`, named colors only (pre 1.16).
    Value,
    /// `{"action":"show_text","contents":...}`, hex colors allowed (1.16+).
    Contents,
}

/// Sends chat components as raw JSON through the player's connection.
#[derive(Debug)]
pub struct ComponentMessaging {
    internals: Internals,
    hover: HoverStyle,
}

impl ComponentMessaging {
    pub fn new(internals: Internals, hover: HoverStyle) -> Self {
        Self { internals, hover }
    }

    /// Client chat JSON for `component`.
    pub fn to_json(&self, component: &ChatComponent) -> Result<Value, Fault> {
        let mut out = Map::new();
        out.insert("text".into(), json!(component.text));
        match (component.hex, self.hover) {
            (Some(rgb), HoverStyle::Contents) => {
                out.insert(
                    "color".into(),
                    json!(format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)),
                );
            }
            (Some(rgb), HoverStyle::Value) => {
                out.insert("color".into(), color_name(nearest_legacy(rgb))?);
            }
            (None, _) => {
                if let Some(color) = component.color.filter(|c| !c.is_format()) {
                    out.insert("color".into(), color_name(color)?);
                }
            }
        }
        if component.bold {
            out.insert("bold".into(), json!(true));
        }
        if component.italic {
            out.insert("italic".into(), json!(true));
        }
        if let Some(click) = &component.click {
            out.insert("clickEvent".into(), arg(click)?);
        }
        if let Some(hover) = &component.hover {
            let field = match self.hover {
                HoverStyle::Value => "value",
                HoverStyle::Contents => "contents",
            };
            let mut event = Map::new();
            event.insert("action".into(), json!("show_text"));
            event.insert(field.into(), json!(hover));
            out.insert("hoverEvent".into(), Value::Object(event));
        }
        if !component.extra.is_empty() {
            let extra = component
                .extra
                .iter()
                .map(|c| self.to_json(c))
                .collect::<Result<Vec<_>, _>>()?;
            out.insert("extra".into(), Value::Array(extra));
        }
        Ok(Value::Object(out))
    }
}

fn color_name(color: ChatColor) -> Result<Value, Fault> {
    Ok(match arg(&color)? {
        Value::String(name) => Value::String(name.to_lowercase()),
        other => other,
    })
}

impl Messaging for ComponentMessaging {
    fn send_component(&self, player: &PlayerRef, component: &ChatComponent) -> Result<(), Fault> {
        let handle = self.internals.handle(Internal::PlayerHandle, arg(player)?)?;
        let json = self.to_json(component)?.to_string();
        self.internals
            .run(Internal::SendChatJson, vec![handle, json!(json)])
    }
}
