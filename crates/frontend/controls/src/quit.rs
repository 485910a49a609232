//! Quit sequence: freeze-frame capture, fade, cleanup and teardown.

use crate::signal::Signal;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::{CanvasHandle, ImageBlob};
use emu_core::{Emulator, FadeService};

/// Transient screenshot written under the emulator's screenshots directory.
pub const FADE_COPY_FILE_NAME: &str = "fade-copy.png";

/// Quit the running game.
///
/// While running, the steps run strictly in order: screenshot, read, cancel
/// the previous fade, start the new fade, delete the screenshot, tear down
/// the emulator, clear the running flag. Filesystem failures are logged and
/// the remaining steps still run. When nothing is running only the running
/// flag is cleared.
///
/// A quit that runs the whole sequence starts exactly one fade. If the
/// screenshot cannot be read back there is no image to fade from: the
/// previous fade is still cancelled but no new one is started. Deleting the
/// file, teardown and clearing the running flag happen as usual.
pub fn quit_game<E, F>(
    emulator: Option<&mut E>,
    fade: &mut F,
    canvas: Option<&CanvasHandle>,
    running: &mut Signal<bool>,
) where
    E: Emulator + ?Sized,
    F: FadeService + ?Sized,
{
    if !running.get() {
        running.set(false);
        return;
    }

    match emulator {
        Some(emulator) => {
            let freeze_frame = capture_freeze_frame(emulator);

            fade.cancel_fade();
            if let Some(image) = freeze_frame {
                fade.start_fade(canvas, image);
            }

            let path = fade_copy_path(emulator);
            if let Err(e) = emulator.delete_file(&path) {
                log(LogCategory::Session, LogLevel::Warn, || {
                    format!("could not remove {}: {}", path, e)
                });
            }

            emulator.quit_game();
        }
        None => {
            fade.cancel_fade();
            log(LogCategory::Session, LogLevel::Debug, || {
                "quit requested without an emulator".to_string()
            });
        }
    }

    running.set(false);
    log(LogCategory::Session, LogLevel::Info, || "game quit".to_string());
}

fn fade_copy_path<E: Emulator + ?Sized>(emulator: &E) -> String {
    format!(
        "{}/{}",
        emulator.file_paths().screenshots_path,
        FADE_COPY_FILE_NAME
    )
}

/// Screenshot the current frame and read it back as a PNG blob.
fn capture_freeze_frame<E: Emulator + ?Sized>(emulator: &mut E) -> Option<ImageBlob> {
    if !emulator.screenshot(FADE_COPY_FILE_NAME) {
        log(LogCategory::Session, LogLevel::Warn, || {
            "emulator did not report a screenshot for the fade".to_string()
        });
    }

    let path = fade_copy_path(emulator);
    match emulator.get_file(&path) {
        Ok(bytes) => Some(ImageBlob::png(bytes)),
        Err(e) => {
            log(LogCategory::Session, LogLevel::Warn, || {
                format!("could not read {}: {}", path, e)
            });
            None
        }
    }
}
