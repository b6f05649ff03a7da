// GDScript bridge for auto-pickup
// Godot owns the world; this node keeps the player roster, settings and feedback clock on the Rust side

use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam_queue::SegQueue;
use dashmap::DashMap;
use godot::classes::{INode, Node};
use godot::prelude::*;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ulid::Ulid;

use crate::config::feedback::{PICKUP_SOUND, PICKUP_VOLUME};
use crate::config::pickup::PLAYER_INVENTORY_SLOTS;

use super::events::{DeathEvent, EventBus, SlainEntity};
use super::feedback::{FeedbackPulse, FeedbackSink};
use super::handler::DeathEventHandler;
use super::item::{ItemEffects, ItemMeta, ItemStack};
use super::recipient::PlayerState;
use super::scheduler::TickScheduler;
use super::settings::Settings;

type Roster = Arc<DashMap<Ulid, PlayerState>>;

/// Online players (ULID -> PlayerState)
static PLAYERS: Lazy<Roster> = Lazy::new(|| Arc::new(DashMap::new()));

/// Live settings, swapped whole on reload
static SETTINGS: Lazy<Arc<ArcSwap<Settings>>> =
    Lazy::new(|| Arc::new(ArcSwap::from_pointee(Settings::defaults())));

/// Feedback clock, advanced once per physics tick
static SCHEDULER: Lazy<Arc<TickScheduler>> = Lazy::new(|| Arc::new(TickScheduler::new()));

/// Pulses that came due, waiting to be emitted as signals
static FEEDBACK_QUEUE: Lazy<Arc<SegQueue<FeedbackPulse>>> = Lazy::new(|| Arc::new(SegQueue::new()));

/// Death listeners, registered once at startup
static DEATH_EVENTS: Lazy<Mutex<EventBus<DeathEvent>>> = Lazy::new(|| {
    let mut bus = EventBus::new();
    register_listeners(&mut bus);
    Mutex::new(bus)
});

/// Queues due pulses for the bridge, dropping those whose recipient left
struct QueuedFeedback {
    players: Roster,
    queue: Arc<SegQueue<FeedbackPulse>>,
}

impl FeedbackSink for QueuedFeedback {
    fn play_feedback(&self, pulse: &FeedbackPulse) {
        if self.players.contains_key(&pulse.recipient) {
            self.queue.push(*pulse);
        }
    }
}

fn register_listeners(bus: &mut EventBus<DeathEvent>) {
    let sink = Arc::new(QueuedFeedback {
        players: PLAYERS.clone(),
        queue: FEEDBACK_QUEUE.clone(),
    });

    bus.register(Box::new(DeathEventHandler::new(
        PLAYERS.clone(),
        SCHEDULER.clone(),
        SETTINGS.clone(),
        sink,
        StdRng::from_os_rng(),
    )));
}

/// Drop queued feedback and forget online players (extension unload)
pub fn shutdown() {
    SCHEDULER.clear();
    while FEEDBACK_QUEUE.pop().is_some() {}
    PLAYERS.clear();
}

fn ulid_from_bytes(bytes: &PackedByteArray) -> Option<Ulid> {
    let raw: [u8; 16] = bytes.to_vec().try_into().ok()?;
    Some(Ulid::from_bytes(raw))
}

fn ulid_to_bytes(ulid: Ulid) -> PackedByteArray {
    PackedByteArray::from(&ulid.to_bytes()[..])
}

/// Integer from an INT or FLOAT variant (JSON.parse_string yields floats for every number)
fn variant_to_int(value: &Variant) -> Option<i64> {
    value
        .try_to::<i64>()
        .ok()
        .or_else(|| value.try_to::<f64>().ok().and_then(rounded))
}

/// Nearest integer, None for NaN or infinity
fn rounded(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

/// Positive quantity, clamped into u32
fn stack_quantity(value: i64) -> Option<u32> {
    (value > 0).then(|| value.min(u32::MAX as i64) as u32)
}

/// Dictionary {item_type, quantity, effects?, display_name?} -> ItemStack
fn dict_to_stack(dict: &Dictionary) -> Option<ItemStack> {
    let item_type = dict.get("item_type")?.try_to::<GString>().ok()?.to_string();
    let quantity = stack_quantity(variant_to_int(&dict.get("quantity")?)?)?;
    if item_type.is_empty() {
        return None;
    }

    let mut stack = ItemStack::new(item_type, quantity);

    let effects = dict
        .get("effects")
        .and_then(|v| variant_to_int(&v))
        .map(ItemEffects::from_bits_truncate)
        .unwrap_or_default();
    let display_name = dict
        .get("display_name")
        .and_then(|v| v.try_to::<GString>().ok())
        .map(|name| name.to_string());

    if !effects.is_empty() || display_name.is_some() {
        stack = stack.with_meta(ItemMeta {
            display_name,
            effects,
        });
    }

    Some(stack)
}

/// Decode entries into stacks; entries that fail to decode are returned untouched
/// Both lists keep input order
fn split_drops<T, F>(entries: impl IntoIterator<Item = T>, decode: F) -> (Vec<ItemStack>, Vec<T>)
where
    F: Fn(&T) -> Option<ItemStack>,
{
    let mut stacks = Vec::new();
    let mut undecoded = Vec::new();

    for entry in entries {
        match decode(&entry) {
            Some(stack) => stacks.push(stack),
            None => undecoded.push(entry),
        }
    }

    (stacks, undecoded)
}

/// Players are whoever the roster knows; any other id is a mob keeping its own ULID
fn slain_entity(entity_type: String, entity_id: Option<Ulid>, roster: &DashMap<Ulid, PlayerState>) -> SlainEntity {
    match entity_id {
        Some(id) if roster.contains_key(&id) => SlainEntity::player(id),
        Some(id) => SlainEntity::mob(entity_type).with_id(id),
        None => SlainEntity::mob(entity_type),
    }
}

fn stack_to_dict(stack: &ItemStack) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("item_type", stack.item_type.clone());
    dict.set("quantity", stack.quantity as i64);
    if let Some(meta) = &stack.meta {
        dict.set("effects", meta.effects.bits());
        if let Some(name) = &meta.display_name {
            dict.set("display_name", name.clone());
        }
    }
    dict
}

#[derive(GodotClass)]
#[class(base=Node)]
pub struct AutoPickupBridge {
    #[base]
    base: Base<Node>,
}

#[godot_api]
impl INode for AutoPickupBridge {
    fn init(base: Base<Node>) -> Self {
        // Force listener registration before the first death event arrives
        let _ = &*DEATH_EVENTS;

        Self { base }
    }

    fn ready(&mut self) {
        self.base_mut().set_physics_process(true);
        self.base_mut().set_process(true);
    }

    fn physics_process(&mut self, _delta: f64) {
        SCHEDULER.advance(1);
    }

    fn process(&mut self, _delta: f64) {
        while let Some(pulse) = FEEDBACK_QUEUE.pop() {
            self.base_mut().emit_signal(
                "pickup_feedback",
                &[
                    ulid_to_bytes(pulse.recipient).to_variant(),
                    GString::from(PICKUP_SOUND).to_variant(),
                    pulse.pitch.to_variant(),
                    PICKUP_VOLUME.to_variant(),
                ],
            );
        }
    }
}

#[godot_api]
impl AutoPickupBridge {
    /// Emitted when a pickup sound should play for a player
    #[signal]
    fn pickup_feedback(player_ulid: PackedByteArray, sound: GString, pitch: f32, volume: f32);

    /// Add a player to the roster (slot_count <= 0 uses the standard inventory size)
    #[func]
    pub fn register_player(&self, player_ulid: PackedByteArray, slot_count: i32) -> bool {
        let Some(id) = ulid_from_bytes(&player_ulid) else {
            godot_warn!("[AutoPickup] register_player: expected a 16-byte ULID");
            return false;
        };

        let slots = if slot_count > 0 {
            slot_count as usize
        } else {
            PLAYER_INVENTORY_SLOTS
        };
        PLAYERS.insert(id, PlayerState::new(id, slots));
        true
    }

    /// Remove a player; pending pickup sounds for them are dropped
    #[func]
    pub fn unregister_player(&self, player_ulid: PackedByteArray) -> bool {
        ulid_from_bytes(&player_ulid)
            .and_then(|id| PLAYERS.remove(&id))
            .is_some()
    }

    /// Set the held item (empty item_type clears the slot)
    #[func]
    pub fn set_active_tool(&self, player_ulid: PackedByteArray, item_type: GString, effects: i64) -> bool {
        let Some(mut player) = ulid_from_bytes(&player_ulid).and_then(|id| PLAYERS.get_mut(&id)) else {
            return false;
        };

        let item_type = item_type.to_string();
        player.active_tool = if item_type.is_empty() {
            None
        } else {
            let tool = ItemStack::new(item_type, 1);
            match ItemEffects::from_bits_truncate(effects) {
                e if e.is_empty() => Some(tool),
                e => Some(tool.with_meta(ItemMeta::with_effects(e))),
            }
        };
        true
    }

    #[func]
    pub fn grant_permission(&self, player_ulid: PackedByteArray, permission: GString) -> bool {
        let Some(mut player) = ulid_from_bytes(&player_ulid).and_then(|id| PLAYERS.get_mut(&id)) else {
            return false;
        };
        player.grant(&permission.to_string());
        true
    }

    #[func]
    pub fn revoke_permission(&self, player_ulid: PackedByteArray, permission: GString) -> bool {
        let Some(mut player) = ulid_from_bytes(&player_ulid).and_then(|id| PLAYERS.get_mut(&id)) else {
            return false;
        };
        player.revoke(&permission.to_string());
        true
    }

    /// Replace settings from a JSON document (merged over defaults)
    #[func]
    pub fn load_settings(&self, json: GString) -> bool {
        match Settings::from_json(&json.to_string()) {
            Ok(settings) => {
                SETTINGS.store(Arc::new(settings));
                true
            }
            Err(e) => {
                godot_warn!("[AutoPickup] {}", e);
                false
            }
        }
    }

    /// Replace settings from a JSON file (globalized path)
    #[func]
    pub fn load_settings_file(&self, path: GString) -> bool {
        match Settings::load(&path.to_string()) {
            Ok(settings) => {
                SETTINGS.store(Arc::new(settings));
                godot_print!("[AutoPickup] Settings loaded from {}", path);
                true
            }
            Err(e) => {
                godot_warn!("[AutoPickup] {}", e);
                false
            }
        }
    }

    /// Flip one boolean setting (e.g. "AutoPickup.Mobs") on the live settings
    #[func]
    pub fn set_setting(&self, path: GString, value: bool) {
        let path = path.to_string();
        SETTINGS.rcu(|current| {
            let mut next = Settings::clone(current);
            next.set_boolean(&path, value);
            next
        });
    }

    #[func]
    pub fn get_settings_json(&self) -> GString {
        GString::from(SETTINGS.load().to_json())
    }

    /// Handle an entity death
    /// entity_ulid is the slain entity's id (empty allowed); it counts as a player only when registered
    /// killer_ulid may be empty (no killer)
    /// Returns {"drops": Array[Dictionary], "experience": int} holding what the host should still spawn
    /// Drop entries that cannot be read are handed back unchanged
    #[func]
    pub fn on_entity_died(
        &self,
        entity_type: GString,
        entity_ulid: PackedByteArray,
        killer_ulid: PackedByteArray,
        drops: Array<Dictionary>,
        experience: i32,
    ) -> Dictionary {
        let entity = slain_entity(entity_type.to_string(), ulid_from_bytes(&entity_ulid), &PLAYERS);

        let (stacks, undecoded) = split_drops(drops.iter_shared(), dict_to_stack);
        for dict in &undecoded {
            godot_warn!("[AutoPickup] on_entity_died: unreadable drop {}, passing it through", dict);
        }

        let mut event = DeathEvent::new(
            entity,
            ulid_from_bytes(&killer_ulid),
            stacks,
            experience.max(0) as u32,
        );
        DEATH_EVENTS.lock().dispatch(&mut event);

        let mut remaining = Array::<Dictionary>::new();
        for stack in &event.drops {
            remaining.push(&stack_to_dict(stack));
        }
        for dict in &undecoded {
            remaining.push(dict);
        }

        let mut result = Dictionary::new();
        result.set("drops", remaining);
        result.set("experience", event.dropped_experience as i64);
        result
    }

    /// Inventory contents as an Array of Dictionaries (empty slots skipped)
    #[func]
    pub fn get_inventory(&self, player_ulid: PackedByteArray) -> Array<Dictionary> {
        let mut result = Array::<Dictionary>::new();
        if let Some(player) = ulid_from_bytes(&player_ulid).and_then(|id| PLAYERS.get(&id)) {
            for stack in player.inventory.iter() {
                result.push(&stack_to_dict(stack));
            }
        }
        result
    }

    #[func]
    pub fn get_experience(&self, player_ulid: PackedByteArray) -> i64 {
        ulid_from_bytes(&player_ulid)
            .and_then(|id| PLAYERS.get(&id).map(|p| p.experience.min(i64::MAX as u64) as i64))
            .unwrap_or(0)
    }

    /// Pickup sounds still waiting on the clock (for debugging)
    #[func]
    pub fn get_pending_feedback(&self) -> i32 {
        SCHEDULER.pending_count() as i32
    }
}

/// Helper class exposing item effect flags to GDScript
#[derive(GodotClass, Debug)]
#[class(init, base=RefCounted)]
pub struct ItemEffectType {
    base: Base<RefCounted>,
}

#[godot_api]
impl ItemEffectType {
    #[constant]
    const MENDING: i64 = ItemEffects::MENDING.bits();
    #[constant]
    const UNBREAKING: i64 = ItemEffects::UNBREAKING.bits();
    #[constant]
    const LOOTING: i64 = ItemEffects::LOOTING.bits();
    #[constant]
    const FORTUNE: i64 = ItemEffects::FORTUNE.bits();
    #[constant]
    const SILK_TOUCH: i64 = ItemEffects::SILK_TOUCH.bits();
    #[constant]
    const SHARPNESS: i64 = ItemEffects::SHARPNESS.bits();
    #[constant]
    const FIRE_ASPECT: i64 = ItemEffects::FIRE_ASPECT.bits();

    /// Check if flags contain a specific effect
    #[func]
    pub fn has_effect(flags: i64, effect: i64) -> bool {
        ItemEffects::from_bits_truncate(flags).contains(ItemEffects::from_bits_truncate(effect))
    }

    /// Combine two effect sets (bitwise OR)
    #[func]
    pub fn combine(flags: i64, effect: i64) -> i64 {
        (ItemEffects::from_bits_truncate(flags) | ItemEffects::from_bits_truncate(effect)).bits()
    }
}
