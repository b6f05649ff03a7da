// Item stacks, their metadata and per-type stack limits

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::pickup::DEFAULT_MAX_STACK;

bitflags! {
    /// Enchantment-like effects an item can carry
    /// Using i64 to match GDScript's 64-bit int type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ItemEffects: i64 {
        const MENDING      = 1 << 0;  // 1 - repairs the item from collected experience
        const UNBREAKING   = 1 << 1;  // 2
        const LOOTING      = 1 << 2;  // 4
        const FORTUNE      = 1 << 3;  // 8
        const SILK_TOUCH   = 1 << 4;  // 16
        const SHARPNESS    = 1 << 5;  // 32
        const FIRE_ASPECT  = 1 << 6;  // 64
    }
}

/// Opaque attribute set attached to a stack
/// Two stacks only merge when their metadata is equal
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub effects: ItemEffects,
}

impl ItemMeta {
    pub fn with_effects(effects: ItemEffects) -> Self {
        Self {
            display_name: None,
            effects,
        }
    }

    pub fn has_effect(&self, effect: ItemEffects) -> bool {
        self.effects.contains(effect)
    }
}

/// A stack of identical items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: String,
    pub quantity: u32,
    /// Absent for plain items (no name, no effects)
    #[serde(default)]
    pub meta: Option<ItemMeta>,
}

impl ItemStack {
    pub fn new(item_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Same item type and same metadata (quantity ignored)
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type && self.meta == other.meta
    }

    /// Copy of this stack carrying a different quantity
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            item_type: self.item_type.clone(),
            quantity,
            meta: self.meta.clone(),
        }
    }

    /// True when the stack's metadata carries `effect`
    pub fn has_effect(&self, effect: ItemEffects) -> bool {
        self.meta.as_ref().is_some_and(|meta| meta.has_effect(effect))
    }
}

/// Max stack size per item type
#[derive(Debug, Clone)]
pub struct StackLimits {
    default_limit: u32,
    overrides: HashMap<String, u32>,
}

impl StackLimits {
    pub fn new() -> Self {
        let mut limits = Self {
            default_limit: DEFAULT_MAX_STACK,
            overrides: HashMap::new(),
        };

        limits.register_default_limits();
        limits
    }

    /// Register the usual non-64 stack sizes
    fn register_default_limits(&mut self) {
        for item_type in ["ender_pearl", "egg", "snowball"] {
            self.set_limit(item_type, 16);
        }
        for item_type in ["iron_sword", "bow", "saddle", "trident", "totem_of_undying"] {
            self.set_limit(item_type, 1);
        }
    }

    /// Override the limit for one item type (clamped to at least 1)
    pub fn set_limit(&mut self, item_type: &str, limit: u32) {
        self.overrides.insert(item_type.to_string(), limit.max(1));
    }

    pub fn max_stack(&self, item_type: &str) -> u32 {
        self.overrides
            .get(item_type)
            .copied()
            .unwrap_or(self.default_limit)
    }
}

impl Default for StackLimits {
    fn default() -> Self {
        Self::new()
    }
}
