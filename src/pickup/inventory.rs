// Slot-based item containers

use super::item::{ItemStack, StackLimits};

/// Anything that can accept item stacks
pub trait Container {
    /// Place as much of `stack` as fits and return what is left
    /// The remainder has quantity 0 when everything was placed
    fn try_insert(&mut self, stack: ItemStack) -> ItemStack;
}

/// Ordered slots, each empty or holding one stack
/// Insertion tops up partial compatible stacks first, then fills the first empty slot
#[derive(Debug, Clone)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
    limits: StackLimits,
}

impl SlotInventory {
    pub fn new(slot_count: usize) -> Self {
        Self::with_limits(slot_count, StackLimits::new())
    }

    pub fn with_limits(slot_count: usize, limits: StackLimits) -> Self {
        Self {
            slots: vec![None; slot_count],
            limits,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// First slot holding a stack similar to `stack` with room left
    fn first_partial(&self, stack: &ItemStack, max: u32) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|held| held.is_similar(stack) && held.quantity < max)
        })
    }

    fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }
}

#[cfg(test)]
impl SlotInventory {
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Overwrite a slot, returning its previous content
    /// Out-of-range indices are ignored
    pub fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        match self.slots.get_mut(index) {
            Some(slot) => std::mem::replace(slot, stack.filter(|s| !s.is_empty())),
            None => None,
        }
    }

    pub fn empty_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Total quantity of a given item type across all slots
    pub fn count_of(&self, item_type: &str) -> u32 {
        self.iter()
            .filter(|stack| stack.item_type == item_type)
            .map(|stack| stack.quantity)
            .sum()
    }
}

impl Container for SlotInventory {
    fn try_insert(&mut self, stack: ItemStack) -> ItemStack {
        let max = self.limits.max_stack(&stack.item_type);
        let mut remaining = stack.quantity;

        while remaining > 0 {
            if let Some(index) = self.first_partial(&stack, max) {
                if let Some(held) = self.slots[index].as_mut() {
                    let moved = (max - held.quantity).min(remaining);
                    held.quantity += moved;
                    remaining -= moved;
                }
            } else if let Some(index) = self.first_empty() {
                let moved = max.min(remaining);
                self.slots[index] = Some(stack.with_quantity(moved));
                remaining -= moved;
            } else {
                break;
            }
        }

        stack.with_quantity(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickup::item::{ItemEffects, ItemMeta};

    #[test]
    fn test_insert_into_empty_inventory() {
        let mut inventory = SlotInventory::new(4);
        let remainder = inventory.try_insert(ItemStack::new("bone", 10));

        assert!(remainder.is_empty());
        assert_eq!(inventory.slot(0), Some(&ItemStack::new("bone", 10)));
        assert_eq!(inventory.empty_slots(), 3);
    }

    #[test]
    fn test_tops_up_partial_stack_before_empty_slot() {
        let mut inventory = SlotInventory::new(3);
        inventory.set_slot(1, Some(ItemStack::new("bone", 60)));

        let remainder = inventory.try_insert(ItemStack::new("bone", 10));

        assert!(remainder.is_empty());
        assert_eq!(inventory.slot(1).map(|s| s.quantity), Some(64));
        assert_eq!(inventory.slot(0).map(|s| s.quantity), Some(6));
        assert_eq!(inventory.count_of("bone"), 70);
    }

    #[test]
    fn test_splits_across_empty_slots_by_max_stack() {
        let mut inventory = SlotInventory::new(2);
        let remainder = inventory.try_insert(ItemStack::new("ender_pearl", 40));

        assert_eq!(inventory.slot(0).map(|s| s.quantity), Some(16));
        assert_eq!(inventory.slot(1).map(|s| s.quantity), Some(16));
        assert_eq!(remainder, ItemStack::new("ender_pearl", 8));
    }

    #[test]
    fn test_full_inventory_returns_whole_stack() {
        let mut inventory = SlotInventory::new(1);
        inventory.set_slot(0, Some(ItemStack::new("string", 64)));

        let remainder = inventory.try_insert(ItemStack::new("string", 5));
        assert_eq!(remainder, ItemStack::new("string", 5));
    }

    #[test]
    fn test_different_meta_does_not_merge() {
        let mut inventory = SlotInventory::new(1);
        inventory.set_slot(0, Some(ItemStack::new("bow", 1)));

        let enchanted = ItemStack::new("bow", 1)
            .with_meta(ItemMeta::with_effects(ItemEffects::MENDING));
        let remainder = inventory.try_insert(enchanted.clone());

        assert_eq!(remainder, enchanted);
    }

    #[test]
    fn test_set_slot_out_of_range_is_ignored() {
        let mut inventory = SlotInventory::new(1);
        assert_eq!(inventory.set_slot(5, Some(ItemStack::new("bone", 1))), None);
        assert_eq!(inventory.empty_slots(), 1);
    }
}
