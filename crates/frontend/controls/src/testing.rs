//! Recording doubles for the emulator and fade collaborators.
//!
//! Every call is appended to a log so tests can assert on exact call counts
//! and arguments. The emulator keeps a small in-memory filesystem so the quit
//! sequence can write, read and delete its screenshot.

use emu_core::types::{CanvasHandle, FilePaths, ImageBlob};
use emu_core::{Emulator, EmulatorError, FadeService};
use std::cell::RefCell;
use std::collections::HashMap;

/// Bytes written for every screenshot (a PNG signature followed by a marker).
pub const SCREENSHOT_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nscreenshot";

#[derive(Debug, Clone, PartialEq)]
pub enum EmulatorCall {
    Pause,
    Resume,
    SetVolume(f64),
    SetFastForwardMultiplier(u8),
    ToggleRewind(bool),
    Screenshot(String),
    GetFile(String),
    DeleteFile(String),
    QuitGame,
    DisableKeyboardInput,
    EnableKeyboardInput,
    ForceAutoSaveState,
}

#[derive(Debug)]
pub struct RecordingEmulator {
    pub volume: f64,
    pub fast_forward_multiplier: u8,
    pub paused: bool,
    pub rewinding: bool,
    pub keyboard_enabled: bool,
    pub paths: FilePaths,
    pub files: HashMap<String, Vec<u8>>,
    /// When false, `screenshot` reports failure and writes nothing
    pub screenshot_succeeds: bool,
    /// When true, `delete_file` fails even if the file exists
    pub fail_delete: bool,
    calls: RefCell<Vec<EmulatorCall>>,
}

impl Default for RecordingEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEmulator {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            fast_forward_multiplier: 1,
            paused: false,
            rewinding: false,
            keyboard_enabled: true,
            paths: FilePaths::under("/screenshots-root"),
            files: HashMap::new(),
            screenshot_succeeds: true,
            fail_delete: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<EmulatorCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&EmulatorCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: EmulatorCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Emulator for RecordingEmulator {
    fn pause(&mut self) {
        self.record(EmulatorCall::Pause);
        self.paused = true;
    }

    fn resume(&mut self) {
        self.record(EmulatorCall::Resume);
        self.paused = false;
    }

    fn set_volume(&mut self, volume: f64) {
        self.record(EmulatorCall::SetVolume(volume));
        self.volume = volume;
    }

    fn set_fast_forward_multiplier(&mut self, multiplier: u8) {
        self.record(EmulatorCall::SetFastForwardMultiplier(multiplier));
        self.fast_forward_multiplier = multiplier;
    }

    fn toggle_rewind(&mut self, enabled: bool) {
        self.record(EmulatorCall::ToggleRewind(enabled));
        self.rewinding = enabled;
    }

    fn screenshot(&mut self, file_name: &str) -> bool {
        self.record(EmulatorCall::Screenshot(file_name.to_string()));
        if !self.screenshot_succeeds {
            return false;
        }
        let path = format!("{}/{}", self.paths.screenshots_path, file_name);
        self.files.insert(path, SCREENSHOT_BYTES.to_vec());
        true
    }

    fn file_paths(&self) -> FilePaths {
        self.paths.clone()
    }

    fn get_file(&self, path: &str) -> Result<Vec<u8>, EmulatorError> {
        self.record(EmulatorCall::GetFile(path.to_string()));
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| EmulatorError::FileNotFound(path.to_string()))
    }

    fn delete_file(&mut self, path: &str) -> Result<(), EmulatorError> {
        self.record(EmulatorCall::DeleteFile(path.to_string()));
        if self.fail_delete {
            return Err(EmulatorError::Io(format!("cannot unlink {}", path)));
        }
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| EmulatorError::FileNotFound(path.to_string()))
    }

    fn quit_game(&mut self) {
        self.record(EmulatorCall::QuitGame);
    }

    fn disable_keyboard_input(&mut self) {
        self.record(EmulatorCall::DisableKeyboardInput);
        self.keyboard_enabled = false;
    }

    fn enable_keyboard_input(&mut self) {
        self.record(EmulatorCall::EnableKeyboardInput);
        self.keyboard_enabled = true;
    }

    fn force_auto_save_state(&mut self) -> bool {
        self.record(EmulatorCall::ForceAutoSaveState);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FadeCall {
    Start {
        canvas: Option<CanvasHandle>,
        image: ImageBlob,
    },
    Cancel,
}

#[derive(Debug, Default)]
pub struct RecordingFade {
    pub calls: Vec<FadeCall>,
}

impl RecordingFade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, FadeCall::Start { .. }))
            .count()
    }

    pub fn cancels(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, FadeCall::Cancel))
            .count()
    }
}

impl FadeService for RecordingFade {
    fn start_fade(&mut self, canvas: Option<&CanvasHandle>, image: ImageBlob) {
        self.calls.push(FadeCall::Start {
            canvas: canvas.cloned(),
            image,
        });
    }

    fn cancel_fade(&mut self) {
        self.calls.push(FadeCall::Cancel);
    }
}
