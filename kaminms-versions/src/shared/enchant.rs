use kaminms_api::{EnchantIds, Enchantment, Fault};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Bukkit's pre-flattening enchantment names and their keys.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("PROTECTION_ENVIRONMENTAL", "protection"),
    ("PROTECTION_FIRE", "fire_protection"),
    ("PROTECTION_FALL", "feather_falling"),
    ("PROTECTION_EXPLOSIONS", "blast_protection"),
    ("PROTECTION_PROJECTILE", "projectile_protection"),
    ("OXYGEN", "respiration"),
    ("WATER_WORKER", "aqua_affinity"),
    ("THORNS", "thorns"),
    ("DEPTH_STRIDER", "depth_strider"),
    ("FROST_WALKER", "frost_walker"),
    ("BINDING_CURSE", "binding_curse"),
    ("DAMAGE_ALL", "sharpness"),
    ("DAMAGE_UNDEAD", "smite"),
    ("DAMAGE_ARTHROPODS", "bane_of_arthropods"),
    ("KNOCKBACK", "knockback"),
    ("FIRE_ASPECT", "fire_aspect"),
    ("LOOT_BONUS_MOBS", "looting"),
    ("SWEEPING_EDGE", "sweeping"),
    ("DIG_SPEED", "efficiency"),
    ("SILK_TOUCH", "silk_touch"),
    ("DURABILITY", "unbreaking"),
    ("LOOT_BONUS_BLOCKS", "fortune"),
    ("ARROW_DAMAGE", "power"),
    ("ARROW_KNOCKBACK", "punch"),
    ("ARROW_FIRE", "flame"),
    ("ARROW_INFINITE", "infinity"),
    ("LUCK", "luck_of_the_sea"),
    ("LURE", "lure"),
    ("MENDING", "mending"),
    ("VANISHING_CURSE", "vanishing_curse"),
];

/// Pre 1.13: enchantments have no key in the host, use the static table.
#[derive(Debug, Default)]
pub struct LegacyEnchantIds;

impl EnchantIds for LegacyEnchantIds {
    fn namespaced(&self, enchantment: &Enchantment) -> Result<String, Fault> {
        LEGACY_KEYS
            .iter()
            .find(|(name, _)| *name == enchantment.0)
            .map(|(_, key)| key.to_string())
            .ok_or_else(|| {
                Fault::shape(
                    "org.bukkit.enchantments.Enchantment#getName",
                    format!("no legacy key for {}", enchantment.0),
                )
            })
    }
}

/// 1.13+: asks the host for the enchantment's key.
#[derive(Debug)]
pub struct KeyedEnchantIds {
    internals: Internals,
}

impl KeyedEnchantIds {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl EnchantIds for KeyedEnchantIds {
    fn namespaced(&self, enchantment: &Enchantment) -> Result<String, Fault> {
        let key: String = self
            .internals
            .call(Internal::EnchantmentKey, vec![arg(enchantment)?])?;
        // hosts may hand back the full `namespace:key` form
        Ok(match key.split_once(':') {
            Some((_, bare)) => bare.to_string(),
            None => key,
        })
    }
}
