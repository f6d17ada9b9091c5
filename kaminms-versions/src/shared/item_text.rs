use kaminms_api::{ChatComponent, Fault, ItemStack, ItemText};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Tooltip text read from the item's saved compound (1.8 to 1.16).
#[derive(Debug)]
pub struct TooltipText {
    internals: Internals,
}

impl TooltipText {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl ItemText for TooltipText {
    fn components(&self, item: &ItemStack) -> Result<Vec<ChatComponent>, Fault> {
        // show_item hovers of this era carry the SNBT as a single text node
        Ok(vec![ChatComponent::text(self.nbt_tooltip(item)?)])
    }

    fn nbt_tooltip(&self, item: &ItemStack) -> Result<String, Fault> {
        self.internals.call(Internal::ItemNbtString, vec![arg(item)?])
    }
}

/// Releases whose hover events carry item data rather than tooltip text.
#[derive(Debug, Default)]
pub struct NoTooltipText;

const NO_TOOLTIP: &str = "hover events carry item data from 1.17 on";

impl ItemText for NoTooltipText {
    fn components(&self, _item: &ItemStack) -> Result<Vec<ChatComponent>, Fault> {
        Err(Fault::Unsupported {
            operation: "item_text.components",
            reason: NO_TOOLTIP,
        })
    }

    fn nbt_tooltip(&self, _item: &ItemStack) -> Result<String, Fault> {
        Err(Fault::Unsupported {
            operation: "item_text.nbt_tooltip",
            reason: NO_TOOLTIP,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::{HostFault, HostInternals, Revision};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::symbols::{Namespace, Symbols};

    struct Snbt;

    impl HostInternals for Snbt {
        fn call(&self, symbol: &str, args: Vec<Value>) -> Result<Value, HostFault> {
            assert!(symbol.ends_with("CraftItemStack#asNMSCopy#save#toString"), "{}", symbol);
            Ok(json!(format!("{{id:\"minecraft:{}\",Count:1b}}", args[0]["material"].as_str().unwrap_or("air").to_lowercase())))
        }
    }

    fn text() -> TooltipText {
        let revision = Revision::from_static("v1_12_R1");
        let symbols = Symbols::obfuscated(&revision, |internal| match internal {
            Internal::ItemNbtString => Some((Namespace::CraftBukkit, "inventory.CraftItemStack#asNMSCopy#save#toString")),
            _ => None,
        });
        TooltipText::new(Internals::new(Arc::new(Snbt), symbols, revision))
    }

    #[test]
    fn test_tooltip_is_the_saved_compound() {
        let item = ItemStack::new("DIAMOND_SWORD", 1);
        let text = text();
        assert_eq!(text.nbt_tooltip(&item).unwrap(), "{id:\"minecraft:diamond_sword\",Count:1b}");
        assert_eq!(
            text.components(&item).unwrap(),
            vec![ChatComponent::text("{id:\"minecraft:diamond_sword\",Count:1b}")]
        );
    }

    #[test]
    fn test_modern_releases_refuse_tooltips() {
        let item = ItemStack::new("STONE", 1);
        assert!(matches!(
            NoTooltipText.nbt_tooltip(&item),
            Err(Fault::Unsupported { operation: "item_text.nbt_tooltip", .. })
        ));
        assert!(matches!(
            NoTooltipText.components(&item),
            Err(Fault::Unsupported { operation: "item_text.components", .. })
        ));
    }
}
