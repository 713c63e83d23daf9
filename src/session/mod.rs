pub mod settings;
pub mod state;
pub mod store;

pub use settings::{Settings, ThemePreset};
pub use state::Session;
pub use store::{LoadedSettings, ReadingPosition, SessionStore};
