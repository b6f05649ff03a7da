use godot::prelude::*;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        if cfg!(feature = "debug_logs") {
            ::godot::prelude::godot_print!($($arg)*);
        }
    };
}

pub mod config;  // Centralized configuration constants
mod pickup;  // Mob drop auto-pickup (core + GDScript bridge)

struct AutoPickup;

#[gdextension]
unsafe impl ExtensionLibrary for AutoPickup {
    fn on_level_init(level: InitLevel) {
        if level == InitLevel::Scene {
            debug_log!("AutoPickup v0.1.0 - GDExtension loaded successfully!");
        }
    }

    fn on_level_deinit(level: InitLevel) {
        if level == InitLevel::Scene {
            // Pending pickup sounds reference the roster; drop them before unload
            pickup::shutdown();
            godot_print!("[AutoPickup] Feedback scheduler cleared");
        }
    }
}
