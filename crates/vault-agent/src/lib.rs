pub mod agent;
pub mod menu;
pub mod settings;

pub use agent::{VaultAgent, VaultAgentBuilder};
pub use menu::{context_menu, MenuEntry, MenuItem};
pub use settings::{Settings, SettingsStore, StaticSettings};
