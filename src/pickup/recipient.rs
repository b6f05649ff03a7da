// Recipients of redirected drops and the roster that resolves them

use std::collections::HashSet;
use std::hash::BuildHasher;
use std::sync::Arc;

use dashmap::DashMap;
use ulid::Ulid;

use super::inventory::{Container, SlotInventory};
use super::item::ItemStack;

/// An actor that can receive drops and experience
pub trait Recipient {
    fn id(&self) -> Ulid;

    /// Live handle to the recipient's container
    fn inventory_mut(&mut self) -> &mut dyn Container;

    /// Item held in the primary equipped slot, if any
    fn active_tool(&self) -> Option<&ItemStack>;

    fn has_permission(&self, name: &str) -> bool;

    fn give_experience(&mut self, amount: u32);
}

/// Resolves recipient ids to live recipients
/// Returns None when the id is unknown (e.g. the player went offline)
pub trait RecipientProvider {
    fn with_recipient<T, F>(&self, id: Ulid, f: F) -> Option<T>
    where
        F: FnOnce(&mut dyn Recipient) -> T;
}

impl<R, S> RecipientProvider for DashMap<Ulid, R, S>
where
    R: Recipient,
    S: BuildHasher + Clone,
{
    fn with_recipient<T, F>(&self, id: Ulid, f: F) -> Option<T>
    where
        F: FnOnce(&mut dyn Recipient) -> T,
    {
        self.get_mut(&id).map(|mut entry| f(&mut *entry))
    }
}

impl<P: RecipientProvider + ?Sized> RecipientProvider for Arc<P> {
    fn with_recipient<T, F>(&self, id: Ulid, f: F) -> Option<T>
    where
        F: FnOnce(&mut dyn Recipient) -> T,
    {
        (**self).with_recipient(id, f)
    }
}

/// Player record kept by the host roster
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: Ulid,
    pub inventory: SlotInventory,
    pub active_tool: Option<ItemStack>,
    pub permissions: HashSet<String>,
    pub experience: u64,
}

impl PlayerState {
    pub fn new(id: Ulid, slot_count: usize) -> Self {
        Self {
            id,
            inventory: SlotInventory::new(slot_count),
            active_tool: None,
            permissions: HashSet::new(),
            experience: 0,
        }
    }

    pub fn grant(&mut self, permission: &str) {
        self.permissions.insert(permission.to_string());
    }

    pub fn revoke(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }
}

impl Recipient for PlayerState {
    fn id(&self) -> Ulid {
        self.id
    }

    fn inventory_mut(&mut self) -> &mut dyn Container {
        &mut self.inventory
    }

    fn active_tool(&self) -> Option<&ItemStack> {
        self.active_tool.as_ref()
    }

    fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    fn give_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_resolves_registered_player() {
        let roster: DashMap<Ulid, PlayerState> = DashMap::new();
        let id = Ulid::new();
        roster.insert(id, PlayerState::new(id, 9));

        let resolved = roster.with_recipient(id, |recipient| {
            recipient.give_experience(7);
            recipient.id()
        });

        assert_eq!(resolved, Some(id));
        assert_eq!(roster.get(&id).map(|p| p.experience), Some(7));
    }

    #[test]
    fn test_provider_returns_none_for_unknown_id() {
        let roster: DashMap<Ulid, PlayerState> = DashMap::new();
        assert_eq!(roster.with_recipient(Ulid::new(), |r| r.id()), None);
    }

    #[test]
    fn test_permissions() {
        let mut player = PlayerState::new(Ulid::new(), 1);
        assert!(!player.has_permission("autopickup.use"));

        player.grant("autopickup.use");
        assert!(player.has_permission("autopickup.use"));

        player.revoke("autopickup.use");
        assert!(!player.has_permission("autopickup.use"));
    }
}
