/// Centralized configuration constants for the auto-pickup extension
///
/// IMPORTANT: The config paths and permission node are the only "wire format"
/// shared with the host. Keep them in sync with the server's settings file
/// and permission setup.
///
/// This module provides a single source of truth for these strings and for
/// the feedback tuning values used across the Rust codebase.

/// Settings paths, permission nodes and inventory defaults
pub mod pickup {
    /// Toggles automatic pickup of mob drops
    pub const MOBS_PATH: &str = "AutoPickup.Mobs";

    /// Toggles automatic pickup of block drops (read by the host, not by the death handler)
    pub const BLOCKS_PATH: &str = "AutoPickup.Blocks";

    /// When true, killers must hold `USE_PERMISSION` for pickup to apply
    pub const REQUIRE_PERMISSION_PATH: &str = "RequirePermission";

    /// Permission node checked when `RequirePermission` is enabled
    pub const USE_PERMISSION: &str = "autopickup.use";

    /// Max stack size for item types without an explicit limit
    pub const DEFAULT_MAX_STACK: u32 = 64;

    /// Slot count of a standard player inventory (hotbar + main grid)
    pub const PLAYER_INVENTORY_SLOTS: usize = 36;

    /// Default settings document, merged under any loaded settings
    pub const DEFAULT_SETTINGS_JSON: &str = r#"{
        "AutoPickup": {
            "Blocks": true,
            "Mobs": true
        },
        "RequirePermission": false
    }"#;
}

/// Pickup sound tuning
pub mod feedback {
    /// Upper bound on pulses scheduled for a single stack
    pub const MAX_PULSES_PER_STACK: u32 = 6;

    /// Center pitch of the pickup sound
    pub const BASE_PITCH: f32 = 1.8;

    /// Pitch jitter, applied as +/- this value around `BASE_PITCH`
    pub const PITCH_JITTER: f32 = 0.2;

    /// Minimum delay (ticks) before a pulse plays
    pub const MIN_DELAY_TICKS: u32 = 4;

    /// Number of distinct delays: pulses land on MIN_DELAY_TICKS..MIN_DELAY_TICKS + DELAY_SPREAD
    pub const DELAY_SPREAD: u32 = 3;

    /// Sound played for each pulse
    pub const PICKUP_SOUND: &str = "entity.item.pickup";

    /// Volume of the pickup sound
    pub const PICKUP_VOLUME: f32 = 0.3;
}
