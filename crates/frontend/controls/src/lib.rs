//! Control panel orchestration for the emulator frontend.
//!
//! This crate sits between the presentation layer and the emulator core:
//! - `quit`: ordered quit sequence with a freeze-frame fade
//! - `mute`: auto-mute while rewinding or fast-forwarding, with restore
//! - `layout`: draggable/resizable panel geometry and persistence
//! - `panel`: the control surface that routes user actions
//! - `settings`: persisted key/value settings

pub mod layout;
pub mod mute;
pub mod panel;
pub mod quit;
pub mod settings;
pub mod signal;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use layout::{LayoutCoordinator, LayoutStore, PanelDisplay, PanelId, Viewport};
pub use mute::{MuteCause, MuteState, VolumePreservation};
pub use panel::{ControlPanel, PanelAction, PanelView};
pub use settings::{EmulatorSettings, JsonFileStore, MemoryStore, SettingsStore, StoreError};
pub use signal::Signal;
