//! Auto-mute around rewind and fast-forward.
//!
//! At most one [`VolumePreservation`] record exists, kept in the persisted
//! store so a reload mid-rewind still restores the user's volume. A restore
//! only applies when the record was created for the same [`MuteCause`]; an
//! explicit volume change from the user discards the record.

use crate::settings::{self, SettingsStore};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::Emulator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MuteCause {
    Rewind,
    FastForward,
}

/// Volume saved when an auto-mute kicked in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePreservation {
    pub volume_before_mute: f64,
    #[serde(rename = "type")]
    pub cause: MuteCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteState {
    Normal,
    MutedFor(MuteCause),
}

pub fn state(store: &dyn SettingsStore) -> MuteState {
    match settings::volume_preservation(store) {
        Some(record) => MuteState::MutedFor(record.cause),
        None => MuteState::Normal,
    }
}

/// Save the current volume under `cause` and silence the emulator.
///
/// Does nothing at volume 0. An existing record is overwritten; callers that
/// must not clobber a pending restore check [`state`] first.
pub fn mute_and_preserve<E: Emulator + ?Sized>(
    emulator: Option<&mut E>,
    store: &mut dyn SettingsStore,
    cause: MuteCause,
) {
    let current = settings::volume(store);
    if current <= 0.0 {
        return;
    }

    settings::set_volume_preservation(
        store,
        Some(VolumePreservation {
            volume_before_mute: current,
            cause,
        }),
    );
    if let Some(emulator) = emulator {
        emulator.set_volume(0.0);
    }
    settings::set_volume(store, 0.0);

    log(LogCategory::Audio, LogLevel::Debug, || {
        format!("auto-muted for {:?}, preserved volume {}", cause, current)
    });
}

/// Put back the volume preserved for `cause`, if that is what is pending.
pub fn restore<E: Emulator + ?Sized>(
    emulator: Option<&mut E>,
    store: &mut dyn SettingsStore,
    cause: MuteCause,
) {
    let record = match settings::volume_preservation(store) {
        Some(record) if record.cause == cause => record,
        _ => return,
    };

    if let Some(emulator) = emulator {
        emulator.set_volume(record.volume_before_mute);
    }
    settings::set_volume(store, record.volume_before_mute);
    settings::set_volume_preservation(store, None);

    log(LogCategory::Audio, LogLevel::Debug, || {
        format!(
            "restored volume {} after {:?}",
            record.volume_before_mute, cause
        )
    });
}

/// Forget any pending auto-mute; the user picked a volume themselves.
pub fn clear(store: &mut dyn SettingsStore) {
    settings::set_volume_preservation(store, None);
}
