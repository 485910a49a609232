//! Core emulator capability traits and shared value types.
//!
//! The control panel never talks to an emulator implementation directly; it
//! drives whatever sits behind the [`Emulator`] trait and paints the quit
//! transition through a [`FadeService`].

pub mod logging;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A bounding rectangle in CSS pixels, as reported by the host layout.
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Rect {
        pub left: f64,
        pub top: f64,
        pub width: f64,
        pub height: f64,
    }

    impl Rect {
        pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
            Self {
                left,
                top,
                width,
                height,
            }
        }

        pub fn right(&self) -> f64 {
            self.left + self.width
        }

        pub fn bottom(&self) -> f64 {
            self.top + self.height
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Position {
        pub x: f64,
        pub y: f64,
    }

    impl Position {
        pub fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }
    }

    /// An explicit pixel size, as persisted after a resize.
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Size {
        pub width: f64,
        pub height: f64,
    }

    impl Size {
        pub fn new(width: f64, height: f64) -> Self {
            Self { width, height }
        }
    }

    /// Opaque handle to the canvas element the emulator renders into.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CanvasHandle(pub String);

    /// Binary image data handed to the fade service as a freeze-frame.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ImageBlob {
        pub bytes: Vec<u8>,
        pub mime_type: String,
    }

    impl ImageBlob {
        pub fn png(bytes: Vec<u8>) -> Self {
            Self {
                bytes,
                mime_type: "image/png".to_string(),
            }
        }

        pub fn len(&self) -> usize {
            self.bytes.len()
        }

        pub fn is_empty(&self) -> bool {
            self.bytes.is_empty()
        }
    }

    /// Well-known directories of the emulator's virtual filesystem.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FilePaths {
        pub root: String,
        pub cheats_path: String,
        pub game_path: String,
        pub save_path: String,
        pub save_state_path: String,
        pub screenshots_path: String,
        pub patch_path: String,
        pub auto_save_path: String,
    }

    impl FilePaths {
        /// Layout used by the mGBA web build: everything under one data root,
        /// auto saves kept apart so they survive a data wipe.
        pub fn under(root: &str) -> Self {
            let root = root.trim_end_matches('/');
            Self {
                root: root.to_string(),
                cheats_path: format!("{}/cheats", root),
                game_path: format!("{}/games", root),
                save_path: format!("{}/saves", root),
                save_state_path: format!("{}/states", root),
                screenshots_path: format!("{}/screenshots", root),
                patch_path: format!("{}/patches", root),
                auto_save_path: "/autosave".to_string(),
            }
        }
    }

    impl Default for FilePaths {
        fn default() -> Self {
            Self::under("/data")
        }
    }
}

use types::{CanvasHandle, FilePaths, ImageBlob};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Filesystem error: {0}")]
    Io(String),
}

/// Control surface of a running emulator instance.
///
/// Volume is expected in `[0, 1]` and the fast-forward multiplier in `1..=5`;
/// implementations receive values as given, range checks belong to the caller.
pub trait Emulator {
    fn pause(&mut self);
    fn resume(&mut self);

    fn set_volume(&mut self, volume: f64);
    fn set_fast_forward_multiplier(&mut self, multiplier: u8);
    fn toggle_rewind(&mut self, enabled: bool);

    /// Write a screenshot named `file_name` under the screenshots directory.
    /// Returns whether the emulator produced the file.
    fn screenshot(&mut self, file_name: &str) -> bool;

    fn file_paths(&self) -> FilePaths;

    /// Read raw bytes from the virtual filesystem.
    fn get_file(&self, path: &str) -> Result<Vec<u8>, EmulatorError>;

    fn delete_file(&mut self, path: &str) -> Result<(), EmulatorError>;

    /// Tear down the running game.
    fn quit_game(&mut self);

    fn disable_keyboard_input(&mut self);
    fn enable_keyboard_input(&mut self);

    /// Write an auto save state if the core supports it.
    fn force_auto_save_state(&mut self) -> bool {
        false // Default: no auto save support
    }
}

/// Visual transition overlaying a freeze-frame on the canvas while a game
/// is torn down.
pub trait FadeService {
    fn start_fade(&mut self, canvas: Option<&CanvasHandle>, image: ImageBlob);

    /// Cancel any in-flight fade; a no-op when none is running.
    fn cancel_fade(&mut self);
}

impl<E: Emulator + ?Sized> Emulator for Box<E> {
    fn pause(&mut self) {
        (**self).pause()
    }
    fn resume(&mut self) {
        (**self).resume()
    }
    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume)
    }
    fn set_fast_forward_multiplier(&mut self, multiplier: u8) {
        (**self).set_fast_forward_multiplier(multiplier)
    }
    fn toggle_rewind(&mut self, enabled: bool) {
        (**self).toggle_rewind(enabled)
    }
    fn screenshot(&mut self, file_name: &str) -> bool {
        (**self).screenshot(file_name)
    }
    fn file_paths(&self) -> FilePaths {
        (**self).file_paths()
    }
    fn get_file(&self, path: &str) -> Result<Vec<u8>, EmulatorError> {
        (**self).get_file(path)
    }
    fn delete_file(&mut self, path: &str) -> Result<(), EmulatorError> {
        (**self).delete_file(path)
    }
    fn quit_game(&mut self) {
        (**self).quit_game()
    }
    fn disable_keyboard_input(&mut self) {
        (**self).disable_keyboard_input()
    }
    fn enable_keyboard_input(&mut self) {
        (**self).enable_keyboard_input()
    }
    fn force_auto_save_state(&mut self) -> bool {
        (**self).force_auto_save_state()
    }
}

impl<F: FadeService + ?Sized> FadeService for Box<F> {
    fn start_fade(&mut self, canvas: Option<&CanvasHandle>, image: ImageBlob) {
        (**self).start_fade(canvas, image)
    }
    fn cancel_fade(&mut self) {
        (**self).cancel_fade()
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 50.0, 300.0, 150.0);
        assert_eq!(r.right(), 310.0);
        assert_eq!(r.bottom(), 200.0);
    }

    #[test]
    fn file_paths_under_root() {
        let paths = FilePaths::under("/data/");
        assert_eq!(paths.root, "/data");
        assert_eq!(paths.screenshots_path, "/data/screenshots");
        assert_eq!(paths.save_state_path, "/data/states");
        assert_eq!(FilePaths::default(), paths);
    }

    #[test]
    fn file_paths_serialize_camel_case() {
        let json = serde_json::to_value(FilePaths::default()).expect("serialize");
        assert_eq!(json["screenshotsPath"], "/data/screenshots");
    }

    #[test]
    fn png_blob() {
        let blob = ImageBlob::png(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.len(), 4);
        assert!(!blob.is_empty());
    }

    struct MockEmulator {
        volume: f64,
    }

    impl Emulator for MockEmulator {
        fn pause(&mut self) {}
        fn resume(&mut self) {}
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn set_fast_forward_multiplier(&mut self, _multiplier: u8) {}
        fn toggle_rewind(&mut self, _enabled: bool) {}
        fn screenshot(&mut self, _file_name: &str) -> bool {
            false
        }
        fn file_paths(&self) -> FilePaths {
            FilePaths::default()
        }
        fn get_file(&self, path: &str) -> Result<Vec<u8>, EmulatorError> {
            Err(EmulatorError::FileNotFound(path.to_string()))
        }
        fn delete_file(&mut self, _path: &str) -> Result<(), EmulatorError> {
            Ok(())
        }
        fn quit_game(&mut self) {}
        fn disable_keyboard_input(&mut self) {}
        fn enable_keyboard_input(&mut self) {}
    }

    #[test]
    fn boxed_emulator_forwards() {
        let mut emu: Box<dyn Emulator> = Box::new(MockEmulator { volume: 1.0 });
        emu.set_volume(0.5);
        assert!(!emu.force_auto_save_state());
        assert!(!emu.screenshot("x.png"));
    }

    #[test]
    fn mock_emulator_defaults() {
        let mut emu = MockEmulator { volume: 1.0 };
        emu.set_volume(0.25);
        assert_eq!(emu.volume, 0.25);
        // Default implementation reports no auto save support
        assert!(!emu.force_auto_save_state());
        assert_eq!(
            emu.get_file("/data/screenshots/missing.png"),
            Err(EmulatorError::FileNotFound(
                "/data/screenshots/missing.png".to_string()
            ))
        );
    }
}
