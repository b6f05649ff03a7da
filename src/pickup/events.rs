// Death events and the listener registry that dispatches them

use ulid::Ulid;

use super::item::ItemStack;

/// What kind of entity was removed from the world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Mob(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlainEntity {
    pub id: Ulid,
    pub kind: EntityKind,
}

impl SlainEntity {
    pub fn mob(entity_type: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            kind: EntityKind::Mob(entity_type.into()),
        }
    }

    pub fn player(id: Ulid) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
        }
    }

    /// Keep the host's id for this entity instead of a generated one
    pub fn with_id(mut self, id: Ulid) -> Self {
        self.id = id;
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }
}

/// Fired when an entity dies
/// `drops` and `dropped_experience` are output fields: whatever they hold when
/// dispatch returns is what the host spawns in the world
#[derive(Debug, Clone)]
pub struct DeathEvent {
    pub entity: SlainEntity,
    pub killer: Option<Ulid>,
    pub drops: Vec<ItemStack>,
    pub dropped_experience: u32,
}

impl DeathEvent {
    pub fn new(entity: SlainEntity, killer: Option<Ulid>, drops: Vec<ItemStack>, dropped_experience: u32) -> Self {
        Self {
            entity,
            killer,
            drops,
            dropped_experience,
        }
    }
}

/// Something that reacts to events of type `E`
pub trait Listener<E> {
    fn handle(&mut self, event: &mut E);
}

/// Listeners registered at startup, dispatched in registration order
pub struct EventBus<E> {
    listeners: Vec<Box<dyn Listener<E> + Send>>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: Box<dyn Listener<E> + Send>) {
        self.listeners.push(listener);
    }

    pub fn dispatch(&mut self, event: &mut E) {
        for listener in self.listeners.iter_mut() {
            listener.handle(event);
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
