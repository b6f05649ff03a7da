// Auto-pickup module
// Redirects mob drops and experience into the killer's inventory

mod item;
mod inventory;
mod recipient;
mod settings;
mod events;
mod policy;
mod distributor;
mod feedback;
mod scheduler;
mod handler;
mod bridge;

pub use bridge::{shutdown, AutoPickupBridge, ItemEffectType};
