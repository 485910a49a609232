//! Panel layout: persisted positions and sizes, captured bounds and the
//! default placement of the control panel relative to the screen.
//!
//! Three sources compete for where a panel goes. A position or size the user
//! dragged to wins; otherwise the control panel is placed next to the screen
//! using the screen's first-observed rectangle. Those rectangles are captured
//! once and never overwritten, so the default placement stays stable while
//! panels move around.

use crate::settings::{SettingsStore, SettingsStoreExt, LAYOUTS_KEY};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::{Position, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Gap between the screen and the control panel above the phone breakpoint
pub const CONTROL_PANEL_PADDING: f64 = 5.0;
/// Widest the control panel gets when docked beside the screen
pub const MOBILE_LANDSCAPE_MAX_WIDTH: f64 = 80.0;
/// Viewport width from which the layout is no longer phone-sized
pub const LARGER_THAN_PHONE_MIN_WIDTH: f64 = 600.0;
/// Tallest landscape viewport still treated as a phone on its side
pub const MOBILE_LANDSCAPE_MAX_HEIGHT: f64 = 500.0;

/// Identity of a draggable/resizable panel
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn screen() -> Self {
        Self::new("screen")
    }

    pub fn control_panel() -> Self {
        Self::new("controlPanel")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is known about one panel's layout. Also used as a partial update:
/// fields left `None` keep their current value when merged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl LayoutEntry {
    /// Original bounds are write-once; an update only fills them when empty.
    fn merge(&mut self, update: LayoutEntry) {
        if self.original_bounds.is_none() {
            self.original_bounds = update.original_bounds;
        }
        if update.position.is_some() {
            self.position = update.position;
        }
        if update.size.is_some() {
            self.size = update.size;
        }
    }
}

/// Per-panel layout records plus the first-measured bounds of each panel.
///
/// Only the layout records are persisted; initial bounds are re-measured on
/// every mount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutStore {
    layouts: HashMap<PanelId, LayoutEntry>,
    #[serde(skip)]
    initial_bounds: HashMap<PanelId, Rect>,
}

impl LayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load persisted layouts from `store`, empty if none are saved.
    pub fn load(store: &dyn SettingsStore) -> Self {
        store.get(LAYOUTS_KEY, LayoutStore::default())
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        store.set(LAYOUTS_KEY, self);
    }

    pub fn get_layout(&self, panel: &PanelId) -> Option<&LayoutEntry> {
        self.layouts.get(panel)
    }

    /// Merge `update` into the panel's entry, creating it if needed.
    pub fn set_layout(&mut self, panel: &PanelId, update: LayoutEntry) {
        self.layouts
            .entry(panel.clone())
            .or_default()
            .merge(update);
    }

    /// Record `bounds` as the panel's original bounds unless some are already
    /// recorded. Returns whether they were written.
    pub fn capture_original_bounds(&mut self, panel: &PanelId, bounds: Rect) -> bool {
        let entry = self.layouts.entry(panel.clone()).or_default();
        if entry.original_bounds.is_some() {
            return false;
        }
        entry.original_bounds = Some(bounds);
        true
    }

    pub fn get_initial_bound(&self, panel: &PanelId) -> Option<Rect> {
        self.initial_bounds.get(panel).copied()
    }

    /// Store the first measured bounds of a panel; later calls are ignored.
    pub fn set_initial_bound(&mut self, panel: &PanelId, bounds: Rect) {
        self.initial_bounds.entry(panel.clone()).or_insert(bounds);
    }

    /// Drop every persisted layout, returning panels to their defaults.
    pub fn clear_layouts(&mut self) {
        self.layouts.clear();
    }

    /// Bounds used as the anchor for default placement: the panel's original
    /// bounds if captured, else its initial bounds.
    pub fn reference_bounds(&self, panel: &PanelId) -> Option<Rect> {
        self.get_layout(panel)
            .and_then(|entry| entry.original_bounds)
            .or_else(|| self.get_initial_bound(panel))
    }
}

/// Viewport media-query results relevant to placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub is_larger_than_phone: bool,
    pub is_mobile_landscape: bool,
}

impl Viewport {
    pub fn desktop() -> Self {
        Self {
            is_larger_than_phone: true,
            is_mobile_landscape: false,
        }
    }

    pub fn phone() -> Self {
        Self {
            is_larger_than_phone: false,
            is_mobile_landscape: false,
        }
    }

    pub fn mobile_landscape() -> Self {
        Self {
            is_larger_than_phone: true,
            is_mobile_landscape: true,
        }
    }

    /// Classify a viewport from its CSS pixel dimensions.
    pub fn classify(width: f64, height: f64) -> Self {
        Self {
            is_larger_than_phone: width >= LARGER_THAN_PHONE_MIN_WIDTH,
            is_mobile_landscape: width > height && height <= MOBILE_LANDSCAPE_MAX_HEIGHT,
        }
    }
}

/// One axis of a panel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    /// Sized to content
    Auto,
    /// Spans the full viewport width
    FullViewportWidth,
    Px(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: Dimension,
    pub height: Dimension,
}

impl From<Size> for PanelSize {
    fn from(size: Size) -> Self {
        Self {
            width: Dimension::Px(size.width),
            height: Dimension::Px(size.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub position: Position,
    pub size: PanelSize,
}

/// Default control panel placement relative to the screen panel.
///
/// Beside the screen on a landscape phone, below it otherwise.
pub fn default_control_panel_placement(viewport: Viewport, screen: Rect) -> PanelPlacement {
    if viewport.is_mobile_landscape {
        return PanelPlacement {
            position: Position::new((screen.left + screen.width).floor(), 0.0),
            size: PanelSize {
                width: Dimension::Px(MOBILE_LANDSCAPE_MAX_WIDTH.min(screen.left)),
                height: Dimension::Auto,
            },
        };
    }

    let padding = if viewport.is_larger_than_phone {
        CONTROL_PANEL_PADDING
    } else {
        0.0
    };
    PanelPlacement {
        position: Position::new(screen.left.floor(), (screen.bottom() + padding).floor()),
        size: PanelSize {
            width: if viewport.is_larger_than_phone {
                Dimension::Auto
            } else {
                Dimension::FullViewportWidth
            },
            height: Dimension::Auto,
        },
    }
}

/// How a panel's items are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelDisplay {
    /// Wrapping row that follows an externally fixed size
    Flex,
    /// Two-row grid for narrow, library-sized panels
    Grid,
}

/// Layout store plus the transient drag/resize state of each panel.
#[derive(Debug, Default)]
pub struct LayoutCoordinator {
    store: LayoutStore,
    resizing: HashSet<PanelId>,
}

impl LayoutCoordinator {
    pub fn new(store: LayoutStore) -> Self {
        Self {
            store,
            resizing: HashSet::new(),
        }
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LayoutStore {
        &mut self.store
    }

    /// First measurement of a mounted panel.
    pub fn on_mount(&mut self, panel: &PanelId, measured: Rect) {
        self.store.set_initial_bound(panel, measured);
    }

    pub fn on_drag_start(&mut self, panel: &PanelId, live: Rect) {
        self.capture(panel, live);
    }

    pub fn on_drag_stop(&mut self, panel: &PanelId, position: Position) {
        self.store.set_layout(
            panel,
            LayoutEntry {
                position: Some(position),
                ..Default::default()
            },
        );
        log(LogCategory::Layout, LogLevel::Debug, || {
            format!("{} dragged to ({}, {})", panel, position.x, position.y)
        });
    }

    pub fn on_resize_start(&mut self, panel: &PanelId, live: Rect) {
        self.resizing.insert(panel.clone());
        self.capture(panel, live);
    }

    pub fn on_resize_stop(&mut self, panel: &PanelId, size: Size, position: Position) {
        self.store.set_layout(
            panel,
            LayoutEntry {
                position: Some(position),
                size: Some(size),
                ..Default::default()
            },
        );
        self.resizing.remove(panel);
        log(LogCategory::Layout, LogLevel::Debug, || {
            format!("{} resized to {}x{}", panel, size.width, size.height)
        });
    }

    pub fn is_resizing(&self, panel: &PanelId) -> bool {
        self.resizing.contains(panel)
    }

    /// A panel is controlled when its size comes from the user rather than
    /// the default placement.
    pub fn is_controlled(&self, panel: &PanelId) -> bool {
        let has_size = self
            .store
            .get_layout(panel)
            .is_some_and(|entry| entry.size.is_some());
        has_size || self.is_resizing(panel)
    }

    pub fn display(&self, panel: &PanelId, viewport: Viewport) -> PanelDisplay {
        if self.is_controlled(panel) || viewport.is_larger_than_phone {
            PanelDisplay::Flex
        } else {
            PanelDisplay::Grid
        }
    }

    /// Default control panel placement, or `None` while the screen has not
    /// been measured yet.
    pub fn control_panel_default(&self, viewport: Viewport) -> Option<PanelPlacement> {
        self.store
            .reference_bounds(&PanelId::screen())
            .map(|screen| default_control_panel_placement(viewport, screen))
    }

    /// Effective control panel placement: persisted position and size where
    /// present, defaults for the rest.
    pub fn control_panel_placement(&self, viewport: Viewport) -> Option<PanelPlacement> {
        let default = self.control_panel_default(viewport)?;
        let entry = self.store.get_layout(&PanelId::control_panel());
        Some(PanelPlacement {
            position: entry
                .and_then(|e| e.position)
                .unwrap_or(default.position),
            size: entry
                .and_then(|e| e.size)
                .map(PanelSize::from)
                .unwrap_or(default.size),
        })
    }

    fn capture(&mut self, panel: &PanelId, live: Rect) {
        if self.store.capture_original_bounds(panel, live) {
            log(LogCategory::Layout, LogLevel::Debug, || {
                format!("captured original bounds of {}: {:?}", panel, live)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    fn screen_rect() -> Rect {
        // left 10, bottom 200, width 300
        Rect::new(10.0, 50.0, 300.0, 150.0)
    }

    #[test]
    fn test_default_below_screen_on_desktop() {
        let placement = default_control_panel_placement(Viewport::desktop(), screen_rect());
        assert_eq!(placement.position, Position::new(10.0, 205.0));
        assert_eq!(placement.size.width, Dimension::Auto);
        assert_eq!(placement.size.height, Dimension::Auto);
    }

    #[test]
    fn test_default_below_screen_on_phone() {
        let placement = default_control_panel_placement(Viewport::phone(), screen_rect());
        assert_eq!(placement.position, Position::new(10.0, 200.0));
        assert_eq!(placement.size.width, Dimension::FullViewportWidth);
        assert_eq!(placement.size.height, Dimension::Auto);
    }

    #[test]
    fn test_default_beside_screen_in_mobile_landscape() {
        let placement =
            default_control_panel_placement(Viewport::mobile_landscape(), screen_rect());
        assert_eq!(placement.position, Position::new(310.0, 0.0));
        assert_eq!(placement.size.width, Dimension::Px(10.0));

        let centered = Rect::new(120.5, 0.0, 400.0, 300.0);
        let placement = default_control_panel_placement(Viewport::mobile_landscape(), centered);
        assert_eq!(placement.position, Position::new(520.0, 0.0));
        assert_eq!(placement.size.width, Dimension::Px(80.0));
    }

    #[test]
    fn test_default_floors_fractional_bounds() {
        let rect = Rect::new(10.7, 50.2, 300.0, 150.4);
        let placement = default_control_panel_placement(Viewport::desktop(), rect);
        assert_eq!(placement.position, Position::new(10.0, 205.0));
    }

    #[test]
    fn test_initial_bound_is_set_once() {
        let mut store = LayoutStore::new();
        let first = Rect::new(0.0, 0.0, 100.0, 100.0);
        let second = Rect::new(5.0, 5.0, 50.0, 50.0);

        store.set_initial_bound(&PanelId::screen(), first);
        store.set_initial_bound(&PanelId::screen(), second);

        assert_eq!(store.get_initial_bound(&PanelId::screen()), Some(first));
    }

    #[test]
    fn test_set_layout_merges() {
        let mut store = LayoutStore::new();
        let panel = PanelId::control_panel();
        store.set_layout(
            &panel,
            LayoutEntry {
                position: Some(Position::new(1.0, 2.0)),
                ..Default::default()
            },
        );
        store.set_layout(
            &panel,
            LayoutEntry {
                size: Some(Size::new(30.0, 40.0)),
                ..Default::default()
            },
        );

        let entry = store.get_layout(&panel).copied().unwrap_or_default();
        assert_eq!(entry.position, Some(Position::new(1.0, 2.0)));
        assert_eq!(entry.size, Some(Size::new(30.0, 40.0)));
        assert_eq!(entry.original_bounds, None);
    }

    #[test]
    fn test_set_layout_keeps_captured_original_bounds() {
        let mut store = LayoutStore::new();
        let panel = PanelId::screen();
        let first = Rect::new(1.0, 1.0, 1.0, 1.0);
        assert!(store.capture_original_bounds(&panel, first));

        store.set_layout(
            &panel,
            LayoutEntry {
                original_bounds: Some(Rect::new(9.0, 9.0, 9.0, 9.0)),
                position: Some(Position::new(3.0, 4.0)),
                ..Default::default()
            },
        );

        let entry = store.get_layout(&panel).copied().unwrap_or_default();
        assert_eq!(entry.original_bounds, Some(first));
        assert_eq!(entry.position, Some(Position::new(3.0, 4.0)));
    }

    #[test]
    fn test_set_layout_fills_missing_original_bounds() {
        let mut store = LayoutStore::new();
        let panel = PanelId::screen();
        let bounds = Rect::new(5.0, 6.0, 7.0, 8.0);
        store.set_layout(
            &panel,
            LayoutEntry {
                original_bounds: Some(bounds),
                ..Default::default()
            },
        );
        assert!(!store.capture_original_bounds(&panel, Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(
            store.get_layout(&panel).and_then(|e| e.original_bounds),
            Some(bounds)
        );
    }

    #[test]
    fn test_original_bounds_captured_once() {
        let mut coordinator = LayoutCoordinator::default();
        let panel = PanelId::control_panel();
        let first = Rect::new(10.0, 205.0, 300.0, 90.0);

        coordinator.on_drag_start(&panel, first);
        coordinator.on_drag_stop(&panel, Position::new(40.0, 40.0));
        coordinator.on_resize_start(&panel, Rect::new(40.0, 40.0, 300.0, 90.0));

        let entry = coordinator.store().get_layout(&panel).copied();
        assert_eq!(entry.and_then(|e| e.original_bounds), Some(first));
    }

    #[test]
    fn test_resize_lifecycle_controls_panel() {
        let mut coordinator = LayoutCoordinator::default();
        let panel = PanelId::control_panel();
        assert!(!coordinator.is_controlled(&panel));
        assert_eq!(coordinator.display(&panel, Viewport::phone()), PanelDisplay::Grid);

        coordinator.on_resize_start(&panel, Rect::new(0.0, 0.0, 200.0, 80.0));
        assert!(coordinator.is_resizing(&panel));
        assert!(coordinator.is_controlled(&panel));
        assert_eq!(coordinator.display(&panel, Viewport::phone()), PanelDisplay::Flex);

        coordinator.on_resize_stop(&panel, Size::new(250.0, 100.0), Position::new(3.0, 4.0));
        assert!(!coordinator.is_resizing(&panel));
        assert!(coordinator.is_controlled(&panel));

        let entry = coordinator.store().get_layout(&panel).copied();
        assert_eq!(entry.and_then(|e| e.size), Some(Size::new(250.0, 100.0)));
        assert_eq!(entry.and_then(|e| e.position), Some(Position::new(3.0, 4.0)));
    }

    #[test]
    fn test_display_flex_above_phone() {
        let coordinator = LayoutCoordinator::default();
        assert_eq!(
            coordinator.display(&PanelId::control_panel(), Viewport::desktop()),
            PanelDisplay::Flex
        );
    }

    #[test]
    fn test_placement_requires_screen_bounds() {
        let mut coordinator = LayoutCoordinator::default();
        assert_eq!(coordinator.control_panel_placement(Viewport::desktop()), None);

        coordinator.on_mount(&PanelId::screen(), screen_rect());
        let placement = coordinator.control_panel_placement(Viewport::desktop());
        assert_eq!(placement.map(|p| p.position), Some(Position::new(10.0, 205.0)));
    }

    #[test]
    fn test_original_bounds_take_precedence_over_initial() {
        let mut coordinator = LayoutCoordinator::default();
        let screen = PanelId::screen();
        coordinator.on_mount(&screen, Rect::new(0.0, 0.0, 100.0, 100.0));
        coordinator.on_drag_start(&screen, screen_rect());
        coordinator.on_drag_stop(&screen, Position::new(500.0, 500.0));

        let placement = coordinator.control_panel_default(Viewport::desktop());
        assert_eq!(placement.map(|p| p.position), Some(Position::new(10.0, 205.0)));
    }

    #[test]
    fn test_persisted_layout_overrides_default() {
        let mut coordinator = LayoutCoordinator::default();
        coordinator.on_mount(&PanelId::screen(), screen_rect());
        coordinator.on_drag_stop(&PanelId::control_panel(), Position::new(7.0, 8.0));

        let placement = coordinator.control_panel_placement(Viewport::desktop());
        assert_eq!(placement.map(|p| p.position), Some(Position::new(7.0, 8.0)));
        assert_eq!(
            placement.map(|p| p.size.width),
            Some(Dimension::Auto)
        );
    }

    #[test]
    fn test_layouts_persist_without_initial_bounds() {
        let mut settings = MemoryStore::new();
        let mut layouts = LayoutStore::new();
        layouts.set_initial_bound(&PanelId::screen(), screen_rect());
        layouts.set_layout(
            &PanelId::control_panel(),
            LayoutEntry {
                position: Some(Position::new(1.0, 1.0)),
                ..Default::default()
            },
        );
        layouts.save(&mut settings);

        let loaded = LayoutStore::load(&settings);
        assert_eq!(
            loaded
                .get_layout(&PanelId::control_panel())
                .and_then(|e| e.position),
            Some(Position::new(1.0, 1.0))
        );
        assert_eq!(loaded.get_initial_bound(&PanelId::screen()), None);
    }

    #[test]
    fn test_viewport_classify() {
        assert_eq!(Viewport::classify(1280.0, 800.0), Viewport::desktop());
        assert_eq!(Viewport::classify(390.0, 844.0), Viewport::phone());
        assert_eq!(Viewport::classify(844.0, 390.0), Viewport::mobile_landscape());
    }
}
