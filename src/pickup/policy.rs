// Eligibility gates for automatic pickup and the experience redirect

use crate::config::pickup::{MOBS_PATH, REQUIRE_PERMISSION_PATH, USE_PERMISSION};

use super::events::DeathEvent;
use super::item::ItemEffects;
use super::recipient::Recipient;
use super::settings::Configuration;

/// Why a death event was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoKiller,
    /// Killer id no longer resolves (disconnected)
    KillerOffline,
    VictimIsPlayer,
    MobPickupDisabled,
    MissingPermission,
}

impl DenyReason {
    pub fn to_string(&self) -> String {
        match self {
            DenyReason::NoKiller => "no_killer".to_string(),
            DenyReason::KillerOffline => "killer_offline".to_string(),
            DenyReason::VictimIsPlayer => "victim_is_player".to_string(),
            DenyReason::MobPickupDisabled => "mob_pickup_disabled".to_string(),
            DenyReason::MissingPermission => "missing_permission".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Denied(DenyReason),
    Granted { redirect_experience: bool },
}

#[cfg(test)]
impl Eligibility {
    pub fn proceed(&self) -> bool {
        matches!(self, Eligibility::Granted { .. })
    }

    pub fn redirect_experience(&self) -> bool {
        matches!(self, Eligibility::Granted { redirect_experience: true })
    }
}

/// Run the gates in order; the first failing one is reported
/// `killer` is the resolved recipient for `event.killer`, None if it could not be resolved
pub fn decide(event: &DeathEvent, killer: Option<&dyn Recipient>, config: &dyn Configuration) -> Eligibility {
    let killer = match (event.killer, killer) {
        (None, _) => return Eligibility::Denied(DenyReason::NoKiller),
        (Some(_), None) => return Eligibility::Denied(DenyReason::KillerOffline),
        (Some(_), Some(killer)) => killer,
    };

    if event.entity.is_player() {
        return Eligibility::Denied(DenyReason::VictimIsPlayer);
    }

    if !config.get_boolean(MOBS_PATH) {
        return Eligibility::Denied(DenyReason::MobPickupDisabled);
    }

    if config.get_boolean(REQUIRE_PERMISSION_PATH) && !killer.has_permission(USE_PERMISSION) {
        return Eligibility::Denied(DenyReason::MissingPermission);
    }

    // Mending tools repair from orbs, so the experience is left to drop
    let mending = killer
        .active_tool()
        .is_some_and(|tool| tool.has_effect(ItemEffects::MENDING));

    Eligibility::Granted {
        redirect_experience: !mending,
    }
}

/// Credit the event's experience to the killer and zero it on the event
/// Returns the amount moved
pub fn redirect_experience(event: &mut DeathEvent, killer: &mut dyn Recipient) -> u32 {
    let amount = event.dropped_experience;
    killer.give_experience(amount);
    event.dropped_experience = 0;
    amount
}
