//! In-memory emulator and fade used by the headless driver.

use emu_core::types::{CanvasHandle, FilePaths, ImageBlob};
use emu_core::{Emulator, EmulatorError, FadeService};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;

const FRAME_WIDTH: u32 = 240;
const FRAME_HEIGHT: u32 = 160;

/// One recorded emulator call, in the order it happened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum Call {
    Pause,
    Resume,
    SetVolume { volume: f64 },
    SetFastForwardMultiplier { multiplier: u8 },
    ToggleRewind { enabled: bool },
    Screenshot { file_name: String, ok: bool },
    GetFile { path: String, bytes: Option<usize> },
    DeleteFile { path: String, ok: bool },
    QuitGame,
    DisableKeyboardInput,
    EnableKeyboardInput,
    ForceAutoSaveState,
}

/// Emulator stand-in with a virtual filesystem. Screenshots are real PNG
/// files of a test pattern.
#[derive(Debug)]
pub struct HeadlessEmulator {
    paths: FilePaths,
    files: BTreeMap<String, Vec<u8>>,
    game_loaded: bool,
    frame: u8,
    calls: RefCell<Vec<Call>>,
}

impl Default for HeadlessEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEmulator {
    pub fn new() -> Self {
        Self {
            paths: FilePaths::default(),
            files: BTreeMap::new(),
            game_loaded: true,
            frame: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    fn render_frame(&mut self) -> Result<Vec<u8>, png::EncodingError> {
        self.frame = self.frame.wrapping_add(1);
        let mut data = Vec::with_capacity((FRAME_WIDTH * FRAME_HEIGHT * 3) as usize);
        for y in 0..FRAME_HEIGHT {
            for x in 0..FRAME_WIDTH {
                data.push((x as u8).wrapping_add(self.frame));
                data.push(y as u8);
                data.push(self.frame);
            }
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, FRAME_WIDTH, FRAME_HEIGHT);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&data)?;
            writer.finish()?;
        }
        Ok(out)
    }
}

impl Emulator for HeadlessEmulator {
    fn pause(&mut self) {
        self.record(Call::Pause);
    }

    fn resume(&mut self) {
        self.record(Call::Resume);
    }

    fn set_volume(&mut self, volume: f64) {
        self.record(Call::SetVolume { volume });
    }

    fn set_fast_forward_multiplier(&mut self, multiplier: u8) {
        self.record(Call::SetFastForwardMultiplier { multiplier });
    }

    fn toggle_rewind(&mut self, enabled: bool) {
        self.record(Call::ToggleRewind { enabled });
    }

    fn screenshot(&mut self, file_name: &str) -> bool {
        let ok = match self.render_frame() {
            Ok(bytes) => {
                let path = format!("{}/{}", self.paths.screenshots_path, file_name);
                self.files.insert(path, bytes);
                true
            }
            Err(e) => {
                log::warn!("failed to encode screenshot: {}", e);
                false
            }
        };
        self.record(Call::Screenshot {
            file_name: file_name.to_string(),
            ok,
        });
        ok
    }

    fn file_paths(&self) -> FilePaths {
        self.paths.clone()
    }

    fn get_file(&self, path: &str) -> Result<Vec<u8>, EmulatorError> {
        let file = self.files.get(path);
        self.record(Call::GetFile {
            path: path.to_string(),
            bytes: file.map(Vec::len),
        });
        file.cloned()
            .ok_or_else(|| EmulatorError::FileNotFound(path.to_string()))
    }

    fn delete_file(&mut self, path: &str) -> Result<(), EmulatorError> {
        let ok = self.files.remove(path).is_some();
        self.record(Call::DeleteFile {
            path: path.to_string(),
            ok,
        });
        if ok {
            Ok(())
        } else {
            Err(EmulatorError::FileNotFound(path.to_string()))
        }
    }

    fn quit_game(&mut self) {
        self.game_loaded = false;
        self.record(Call::QuitGame);
    }

    fn disable_keyboard_input(&mut self) {
        self.record(Call::DisableKeyboardInput);
    }

    fn enable_keyboard_input(&mut self) {
        self.record(Call::EnableKeyboardInput);
    }

    fn force_auto_save_state(&mut self) -> bool {
        self.record(Call::ForceAutoSaveState);
        if !self.game_loaded {
            return false;
        }
        let path = format!("{}/auto.ss", self.paths.auto_save_path);
        self.files.insert(path, vec![self.frame]);
        true
    }
}

/// Fade that only logs what it would draw.
#[derive(Debug, Default)]
pub struct LoggingFade {
    pub started: usize,
    pub cancelled: usize,
}

impl FadeService for LoggingFade {
    fn start_fade(&mut self, canvas: Option<&CanvasHandle>, image: ImageBlob) {
        self.started += 1;
        log::info!(
            "fade started on {:?} with {} byte {}",
            canvas.map(|c| c.0.as_str()),
            image.len(),
            image.mime_type
        );
    }

    fn cancel_fade(&mut self) {
        self.cancelled += 1;
        log::debug!("fade cancelled");
    }
}
