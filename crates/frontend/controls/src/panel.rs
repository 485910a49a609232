//! The control panel: transport buttons, sliders and the drag/resize
//! toggles, wired to the emulator, the settings store, auto-mute, the quit
//! sequence and panel layout.
//!
//! Every user input arrives as a [`PanelAction`] and goes through
//! [`ControlPanel::dispatch`]. The panel owns its collaborators; hosts read
//! state back through [`ControlPanel::view`] or subscribe via
//! [`ControlPanel::observe`].

use crate::layout::{
    LayoutCoordinator, LayoutStore, PanelDisplay, PanelId, PanelPlacement, Viewport,
};
use crate::mute::{self, MuteCause, MuteState};
use crate::quit;
use crate::settings::{self, SettingsStore};
use crate::signal::{Observable, Signal};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::{CanvasHandle, Position, Rect, Size};
use emu_core::{Emulator, FadeService};
use serde::{Deserialize, Serialize};

pub const MIN_VOLUME: f64 = 0.0;
pub const MAX_VOLUME: f64 = 1.0;
pub const VOLUME_STEP: f64 = 0.1;
pub const MIN_FAST_FORWARD: u8 = 1;
pub const MAX_FAST_FORWARD: u8 = 5;

/// A user or host event the control panel reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PanelAction {
    /// Session-start collaborator reports a game is running
    StartSession,
    TogglePlay,
    Quit,
    ToggleDrag,
    ToggleResize,
    RewindPress,
    RewindRelease,
    SetVolume {
        value: f64,
    },
    MuteVolume,
    MaxVolume,
    SetFastForward {
        value: u8,
    },
    RegularSpeed,
    MaxFastForward,
    SliderFocus,
    SliderBlur,
    SliderClick,
    Mount {
        panel: PanelId,
        bounds: Rect,
    },
    DragStart {
        panel: PanelId,
        bounds: Rect,
    },
    DragStop {
        panel: PanelId,
        position: Position,
    },
    ResizeStart {
        panel: PanelId,
        bounds: Rect,
    },
    ResizeStop {
        panel: PanelId,
        size: Size,
        position: Position,
    },
    /// Forget every saved panel position and size
    ResetLayouts,
    SetViewport {
        viewport: Viewport,
    },
    VisibilityChange {
        hidden: bool,
    },
    PageHide,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub running: bool,
    pub paused: bool,
    pub draggable: bool,
    pub resizable: bool,
    pub volume: f64,
    pub fast_forward: u8,
    pub play_label: &'static str,
    pub drag_label: &'static str,
    pub resize_label: &'static str,
    pub volume_label: String,
    pub fast_forward_label: String,
    pub controlled: bool,
    pub display: PanelDisplay,
    /// Dashed outline while items can be dragged
    pub outlined: bool,
    /// `None` until the screen panel has been measured
    pub placement: Option<PanelPlacement>,
}

/// Observable state exposed to the presentation layer.
pub struct PanelObservables<'a> {
    pub running: Observable<'a, bool>,
    pub paused: Observable<'a, bool>,
    pub draggable: Observable<'a, bool>,
    pub resizable: Observable<'a, bool>,
    pub volume: Observable<'a, f64>,
    pub fast_forward: Observable<'a, u8>,
}

pub struct ControlPanel<E, S, F> {
    emulator: Option<E>,
    store: S,
    fade: F,
    canvas: Option<CanvasHandle>,
    layout: LayoutCoordinator,
    viewport: Viewport,
    running: Signal<bool>,
    paused: Signal<bool>,
    draggable: Signal<bool>,
    resizable: Signal<bool>,
    volume: Signal<f64>,
    fast_forward: Signal<u8>,
    /// Paused because the page went to the background, not by the user
    background_paused: bool,
}

impl<E, S, F> ControlPanel<E, S, F>
where
    E: Emulator,
    S: SettingsStore,
    F: FadeService,
{
    pub fn new(emulator: Option<E>, store: S, fade: F) -> Self {
        let volume = settings::volume(&store);
        let fast_forward = settings::fast_forward_multiplier(&store);
        let layouts = LayoutStore::load(&store);
        Self {
            emulator,
            store,
            fade,
            canvas: None,
            layout: LayoutCoordinator::new(layouts),
            viewport: Viewport::desktop(),
            running: Signal::new(false),
            paused: Signal::new(false),
            draggable: Signal::new(false),
            resizable: Signal::new(false),
            volume: Signal::new(volume),
            fast_forward: Signal::new(fast_forward),
            background_paused: false,
        }
    }

    pub fn with_canvas(mut self, canvas: CanvasHandle) -> Self {
        self.canvas = Some(canvas);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn emulator(&self) -> Option<&E> {
        self.emulator.as_ref()
    }

    pub fn set_emulator(&mut self, emulator: Option<E>) {
        self.emulator = emulator;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fade(&self) -> &F {
        &self.fade
    }

    pub fn layout(&self) -> &LayoutCoordinator {
        &self.layout
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn observe(&mut self) -> PanelObservables<'_> {
        PanelObservables {
            running: Observable::new(&mut self.running),
            paused: Observable::new(&mut self.paused),
            draggable: Observable::new(&mut self.draggable),
            resizable: Observable::new(&mut self.resizable),
            volume: Observable::new(&mut self.volume),
            fast_forward: Observable::new(&mut self.fast_forward),
        }
    }

    pub fn dispatch(&mut self, action: PanelAction) {
        log(LogCategory::Session, LogLevel::Trace, || {
            format!("dispatch {:?}", action)
        });
        match action {
            PanelAction::StartSession => self.start_session(),
            PanelAction::TogglePlay => self.toggle_play(),
            PanelAction::Quit => self.quit(),
            PanelAction::ToggleDrag => {
                self.draggable.update(|v| !v);
            }
            PanelAction::ToggleResize => {
                self.resizable.update(|v| !v);
            }
            PanelAction::RewindPress => self.rewind_press(),
            PanelAction::RewindRelease => self.rewind_release(),
            PanelAction::SetVolume { value } => self.set_volume(value),
            PanelAction::MuteVolume => self.set_volume(MIN_VOLUME),
            PanelAction::MaxVolume => self.set_volume(MAX_VOLUME),
            PanelAction::SetFastForward { value } => self.set_fast_forward(value),
            PanelAction::RegularSpeed => self.set_fast_forward(MIN_FAST_FORWARD),
            PanelAction::MaxFastForward => self.set_fast_forward(MAX_FAST_FORWARD),
            PanelAction::SliderFocus => self.suspend_keyboard(),
            PanelAction::SliderBlur | PanelAction::SliderClick => self.resume_keyboard(),
            PanelAction::Mount { panel, bounds } => self.layout.on_mount(&panel, bounds),
            PanelAction::DragStart { panel, bounds } => {
                self.layout.on_drag_start(&panel, bounds);
                self.persist_layouts();
            }
            PanelAction::DragStop { panel, position } => {
                self.layout.on_drag_stop(&panel, position);
                self.persist_layouts();
            }
            PanelAction::ResizeStart { panel, bounds } => {
                self.layout.on_resize_start(&panel, bounds);
                self.persist_layouts();
            }
            PanelAction::ResizeStop {
                panel,
                size,
                position,
            } => {
                self.layout.on_resize_stop(&panel, size, position);
                self.persist_layouts();
            }
            PanelAction::ResetLayouts => {
                self.layout.store_mut().clear_layouts();
                self.persist_layouts();
            }
            PanelAction::SetViewport { viewport } => self.viewport = viewport,
            PanelAction::VisibilityChange { hidden } => self.visibility_changed(hidden),
            PanelAction::PageHide => self.page_hide(),
        }
    }

    pub fn start_session(&mut self) {
        self.running.set(true);
        self.paused.set(false);
        self.background_paused = false;
        log(LogCategory::Session, LogLevel::Info, || {
            "session started".to_string()
        });
    }

    /// Pause or resume the emulator; nothing happens unless a game runs.
    pub fn toggle_play(&mut self) {
        if !self.running.get() {
            return;
        }
        if let Some(emulator) = self.emulator.as_mut() {
            if self.paused.get() {
                emulator.resume();
            } else {
                emulator.pause();
            }
        }
        self.paused.update(|v| !v);
    }

    pub fn quit(&mut self) {
        quit::quit_game(
            self.emulator.as_mut(),
            &mut self.fade,
            self.canvas.as_ref(),
            &mut self.running,
        );
        self.paused.set(false);
        self.background_paused = false;
    }

    pub fn rewind_press(&mut self) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.toggle_rewind(true);
        }
        if settings::emulator_settings(&self.store).mute_on_rewind {
            mute::mute_and_preserve(self.emulator.as_mut(), &mut self.store, MuteCause::Rewind);
            self.sync_volume();
        }
    }

    pub fn rewind_release(&mut self) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.toggle_rewind(false);
        }
        if settings::emulator_settings(&self.store).mute_on_rewind {
            mute::restore(self.emulator.as_mut(), &mut self.store, MuteCause::Rewind);
            self.sync_volume();
        }
    }

    /// An explicit volume choice; drops any pending auto-mute restore.
    pub fn set_volume(&mut self, volume: f64) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.set_volume(volume);
        }
        settings::set_volume(&mut self.store, volume);
        mute::clear(&mut self.store);
        self.volume.set(volume);
        log(LogCategory::Audio, LogLevel::Debug, || {
            format!("volume set to {}", volume)
        });
    }

    pub fn set_fast_forward(&mut self, multiplier: u8) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.set_fast_forward_multiplier(multiplier);
        }
        settings::set_fast_forward_multiplier(&mut self.store, multiplier);
        self.fast_forward.set(multiplier);

        if settings::emulator_settings(&self.store).mute_on_fast_forward {
            if multiplier > 1 && mute::state(&self.store) == MuteState::Normal {
                mute::mute_and_preserve(
                    self.emulator.as_mut(),
                    &mut self.store,
                    MuteCause::FastForward,
                );
            } else if multiplier == 1 {
                mute::restore(
                    self.emulator.as_mut(),
                    &mut self.store,
                    MuteCause::FastForward,
                );
            }
            self.sync_volume();
        }
    }

    fn suspend_keyboard(&mut self) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.disable_keyboard_input();
            log(LogCategory::Input, LogLevel::Trace, || {
                "keyboard input suspended".to_string()
            });
        }
    }

    fn resume_keyboard(&mut self) {
        if let Some(emulator) = self.emulator.as_mut() {
            emulator.enable_keyboard_input();
        }
    }

    /// Pause while the page is hidden; resume on return unless the user had
    /// paused.
    pub fn visibility_changed(&mut self, hidden: bool) {
        if !self.running.get() {
            return;
        }
        let Some(emulator) = self.emulator.as_mut() else {
            return;
        };
        if hidden {
            emulator.pause();
            self.background_paused = true;
        } else if self.background_paused {
            self.background_paused = false;
            if !self.paused.get() {
                emulator.resume();
            }
        }
    }

    /// Best-effort auto save while the page is being hidden or unloaded.
    pub fn page_hide(&mut self) {
        if !self.running.get() {
            return;
        }
        if let Some(emulator) = self.emulator.as_mut() {
            let saved = emulator.force_auto_save_state();
            log(LogCategory::Session, LogLevel::Debug, || {
                format!("auto save on page hide: {}", saved)
            });
        }
    }

    pub fn view(&self) -> PanelView {
        let panel = PanelId::control_panel();
        let running = self.running.get();
        let paused = self.paused.get();
        let draggable = self.draggable.get();
        let resizable = self.resizable.get();
        let volume = self.volume.get();
        let fast_forward = self.fast_forward.get();

        PanelView {
            running,
            paused,
            draggable,
            resizable,
            volume,
            fast_forward,
            play_label: if paused || !running { "Play" } else { "Pause" },
            drag_label: if draggable {
                "Anchor Items"
            } else {
                "Drag Items"
            },
            resize_label: if resizable {
                "Stop Resizing Items"
            } else {
                "Resize Items"
            },
            volume_label: format!("{}", (volume * 100.0).round()),
            fast_forward_label: format!("x{}", fast_forward),
            controlled: self.layout.is_controlled(&panel),
            display: self.layout.display(&panel, self.viewport),
            outlined: draggable,
            placement: self.layout.control_panel_placement(self.viewport),
        }
    }

    fn sync_volume(&mut self) {
        self.volume.set(settings::volume(&self.store));
    }

    fn persist_layouts(&mut self) {
        self.layout.store().save(&mut self.store);
    }
}
