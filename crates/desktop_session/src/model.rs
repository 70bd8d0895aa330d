//! Session state model: windows, virtual desktops, shortcuts, widgets, and
//! the transient pointer-interaction sessions.

use std::collections::BTreeMap;

use portal_app_contract::{ApplicationId, WindowSize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version for the combined session snapshot. Version 1 stored the
/// shortcut list as bare app-id strings; see `persistence::decode_session_payload`.
pub const SESSION_SCHEMA_VERSION: u32 = 2;
/// Schema version for the sparse icon position map.
pub const ICON_LAYOUT_SCHEMA_VERSION: u32 = 1;
/// Schema version for the widget list.
pub const WIDGET_LAYOUT_SCHEMA_VERSION: u32 = 1;

/// Default window width in unscaled base pixels.
pub const DEFAULT_WINDOW_WIDTH: i32 = 520;
/// Default window height in unscaled base pixels.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 380;
/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 220;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 140;
/// Pointer travel (px) before a pressed titlebar or icon commits to a drag.
pub const DRAG_COMMIT_THRESHOLD: i32 = 5;
/// Taskbar height in base pixels before the taskbar-size setting scales it.
pub const BASE_TASKBAR_HEIGHT: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Stable id of an open window, generated at open time.
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Stable id of a virtual desktop.
pub struct DesktopId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Stable id of a free-floating desktop widget.
pub struct WidgetId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Stable id of a desktop shortcut, independent of the shortcut's label or
/// ordering of the underlying application.
pub struct ShortcutId(pub String);

impl ShortcutId {
    /// Creates a shortcut id from any string-like value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for ShortcutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Window geometry in unscaled base pixels. The display scale factor is
/// applied multiplicatively at render time and never persisted.
pub struct WindowRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl WindowRect {
    /// Returns the rect translated by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Returns the rect with width/height raised to the given minimums.
    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }
}

impl Default for WindowRect {
    fn default() -> Self {
        Self {
            x: 48,
            y: 48,
            w: DEFAULT_WINDOW_WIDTH,
            h: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Screen region a dragged window can lock to.
///
/// `Top` is full-screen-equivalent; the directional zones take half or a
/// quarter of the available area. There is no bottom edge zone because the
/// taskbar occupies that edge.
pub enum SnapZone {
    /// Left half.
    Left,
    /// Right half.
    Right,
    /// Full available area (maximize-equivalent).
    Top,
    /// Top-left quarter.
    TopLeft,
    /// Top-right quarter.
    TopRight,
    /// Bottom-left quarter.
    BottomLeft,
    /// Bottom-right quarter.
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// One-shot visual transition a window is currently playing.
///
/// Animation state is transient presentation data: it never gates window
/// operations and is cleared (or, for `Closing`/`Minimizing`, resolved into
/// the logical state) when the shell reports the transition complete.
pub enum WindowAnimation {
    /// No transition in flight.
    #[default]
    None,
    /// Window is appearing after open.
    Opening,
    /// Window is disappearing; removal happens at completion.
    Closing,
    /// Window is shrinking toward the taskbar; `minimized` flips at completion.
    Minimizing,
    /// Window is returning from minimized/maximized.
    Restoring,
    /// Window is expanding to the full available area.
    Maximizing,
}

impl WindowAnimation {
    /// Nominal transition length the shell schedules completion after.
    pub fn duration_ms(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Opening => 180,
            Self::Closing => 160,
            Self::Minimizing | Self::Restoring => 200,
            Self::Maximizing => 180,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Mutually exclusive logical window state derived from the stored fields.
pub enum WindowMode {
    /// Free-floating at its own geometry.
    Normal,
    /// Hidden but retained in the store.
    Minimized,
    /// Occupying the full available area.
    Maximized,
    /// Locked to a directional snap zone.
    Snapped(SnapZone),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One open application instance managed by the session.
pub struct WindowRecord {
    /// Stable window id.
    pub id: WindowId,
    /// Application mounted inside the window.
    pub app_id: ApplicationId,
    /// Mutable titlebar string.
    pub title: String,
    /// Icon token resolved by the shell icon catalog.
    pub icon_token: String,
    /// Current geometry in unscaled base pixels.
    pub rect: WindowRect,
    /// Geometry to restore when leaving a snapped/maximized state.
    pub restore_rect: Option<WindowRect>,
    /// Snap zone currently constraining the geometry, if any.
    pub snap_zone: Option<SnapZone>,
    /// Whether the window is minimized (retained but not rendered).
    pub minimized: bool,
    /// Virtual desktop this window belongs to.
    pub desktop_id: DesktopId,
    /// Stacking order; unique among open windows, max is frontmost.
    pub z_index: u32,
    /// Whether this window holds focus. At most one window at a time.
    pub is_focused: bool,
    /// Opaque mergeable key/value bag owned by the mounted application.
    pub props: Value,
    /// Incremented to ask the mounted application to re-fetch its data.
    pub refresh_key: u32,
    /// Transient one-shot transition; never persisted.
    #[serde(skip, default)]
    pub animation: WindowAnimation,
}

impl WindowRecord {
    /// Whether the window occupies the full available area.
    pub fn maximized(&self) -> bool {
        matches!(self.snap_zone, Some(SnapZone::Top))
    }

    /// Derives the mutually exclusive logical state.
    pub fn mode(&self) -> WindowMode {
        if self.minimized {
            WindowMode::Minimized
        } else {
            match self.snap_zone {
                Some(SnapZone::Top) => WindowMode::Maximized,
                Some(zone) => WindowMode::Snapped(zone),
                None => WindowMode::Normal,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A named partition of the window set. Exactly one desktop is active.
pub struct VirtualDesktop {
    /// Stable desktop id.
    pub id: DesktopId,
    /// Display name.
    pub name: String,
    /// Sort key for switcher ordering.
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A desktop icon referencing an application, independent of open windows.
pub struct ShortcutRecord {
    /// Stable shortcut id, preserved across app rename/reorder.
    pub id: ShortcutId,
    /// Application launched by the shortcut.
    pub app_id: ApplicationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A point in unscaled (zoom = 1.0) desktop units.
pub struct IconPoint {
    /// Horizontal offset from the desktop origin.
    pub x: f64,
    /// Vertical offset from the desktop origin.
    pub y: f64,
}

impl IconPoint {
    /// Creates a point from unscaled coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates match `other` within `epsilon`.
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A free-floating widget pinned to the desktop surface.
pub struct WidgetRecord {
    /// Stable widget id.
    pub id: WidgetId,
    /// Widget kind token (clock, announcements, quick-links, ...).
    pub kind: String,
    /// Top-left position in unscaled desktop units.
    pub position: IconPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// User-controlled display scaling settings.
pub struct DisplaySettings {
    /// Desktop zoom factor applied to windows, icons, and widgets at render time.
    pub zoom: f64,
    /// Multiplier on the base taskbar height.
    pub taskbar_scale: f64,
}

impl DisplaySettings {
    /// Effective taskbar height in screen pixels.
    pub fn taskbar_height(&self) -> i32 {
        ((BASE_TASKBAR_HEIGHT as f64) * self.taskbar_scale).round() as i32
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            taskbar_scale: 1.0,
        }
    }
}

/// Sparse map from shortcut id to unscaled position. Absence means the
/// shortcut uses the default index-based column layout.
pub type IconPositionMap = BTreeMap<ShortcutId, IconPoint>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Durable session state: everything the preference store round-trips.
pub struct SessionState {
    /// Next window id to assign.
    pub next_window_id: u64,
    /// Next desktop id to assign.
    pub next_desktop_id: u64,
    /// Next widget id to assign.
    pub next_widget_id: u64,
    /// Next z-index to assign; focusing takes the current value and increments.
    pub next_z_index: u32,
    /// Open windows across all desktops.
    pub windows: Vec<WindowRecord>,
    /// Virtual desktops, ordered by their `order` field.
    pub desktops: Vec<VirtualDesktop>,
    /// The one desktop currently rendered.
    pub active_desktop_id: DesktopId,
    /// The desktop that can never be removed.
    pub default_desktop_id: DesktopId,
    /// Desktop shortcuts in list order (also reconciliation order).
    pub shortcuts: Vec<ShortcutRecord>,
    /// Persisted icon positions; sparse.
    pub icon_positions: IconPositionMap,
    /// Free-floating widgets.
    pub widgets: Vec<WidgetRecord>,
    /// Display scaling settings.
    pub display: DisplaySettings,
}

impl Default for SessionState {
    fn default() -> Self {
        let default_desktop = VirtualDesktop {
            id: DesktopId(1),
            name: "Main".to_string(),
            order: 0,
        };
        Self {
            next_window_id: 1,
            next_desktop_id: 2,
            next_widget_id: 1,
            next_z_index: 1,
            windows: Vec::new(),
            desktops: vec![default_desktop],
            active_desktop_id: DesktopId(1),
            default_desktop_id: DesktopId(1),
            shortcuts: Vec::new(),
            icon_positions: IconPositionMap::new(),
            widgets: Vec::new(),
            display: DisplaySettings::default(),
        }
    }
}

impl SessionState {
    /// Returns the id of the focused window, if any.
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.is_focused).map(|w| w.id)
    }

    /// Returns the window with `id`, if still open.
    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Returns the window with `id` mutably, if still open.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Whether a desktop with `id` exists.
    pub fn desktop_exists(&self, id: DesktopId) -> bool {
        self.desktops.iter().any(|d| d.id == id)
    }

    /// Returns the windows belonging to `desktop_id`, in store order.
    pub fn windows_on(&self, desktop_id: DesktopId) -> impl Iterator<Item = &WindowRecord> {
        self.windows.iter().filter(move |w| w.desktop_id == desktop_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Pointer position in screen pixels.
pub struct PointerPosition {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Edge or corner grabbed during a window resize.
pub enum ResizeEdge {
    /// Top edge.
    North,
    /// Bottom edge.
    South,
    /// Right edge.
    East,
    /// Left edge.
    West,
    /// Top-right corner.
    NorthEast,
    /// Top-left corner.
    NorthWest,
    /// Bottom-right corner.
    SouthEast,
    /// Bottom-left corner.
    SouthWest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tracking data for an in-flight window drag.
///
/// The session stays uncommitted until the pointer travels past
/// [`DRAG_COMMIT_THRESHOLD`]; a release before that is a focus click.
pub struct WindowDragSession {
    /// Window being dragged.
    pub window_id: WindowId,
    /// Pointer position at press time.
    pub pointer_start: PointerPosition,
    /// Window geometry at press time.
    pub rect_start: WindowRect,
    /// Whether pointer travel exceeded the click threshold.
    pub committed: bool,
    /// Snap zone currently under the cursor, refreshed on every move.
    pub snap_candidate: Option<SnapZone>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tracking data for an in-flight window resize.
pub struct ResizeSession {
    /// Window being resized.
    pub window_id: WindowId,
    /// Edge or corner being dragged.
    pub edge: ResizeEdge,
    /// Pointer position at press time.
    pub pointer_start: PointerPosition,
    /// Window geometry at press time.
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq)]
/// Tracking data for an in-flight desktop icon drag.
pub struct IconDragSession {
    /// Shortcut being dragged.
    pub shortcut_id: ShortcutId,
    /// Pointer position at press time.
    pub pointer_start: PointerPosition,
    /// Current pointer position, used by the shell to render the ghost.
    pub pointer_current: PointerPosition,
    /// Icon origin at press time, in screen (scaled) pixels.
    pub origin_px: IconPoint,
    /// Whether pointer travel exceeded the click threshold.
    pub committed: bool,
}

#[derive(Debug, Clone, PartialEq)]
/// Tracking data for an in-flight widget drag.
pub struct WidgetDragSession {
    /// Widget being dragged.
    pub widget_id: WidgetId,
    /// Pointer position at press time.
    pub pointer_start: PointerPosition,
    /// Current pointer position.
    pub pointer_current: PointerPosition,
    /// Widget position at press time, in unscaled units.
    pub origin: IconPoint,
    /// Whether pointer travel exceeded the click threshold.
    pub committed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Transient per-gesture pointer state shared by windows, icons, and widgets.
///
/// At most one gesture is active at a time; the shell binds global
/// pointer-move/up listeners for the gesture's duration only.
pub struct InteractionState {
    /// Active window drag, if any.
    pub window_drag: Option<WindowDragSession>,
    /// Active window resize, if any.
    pub resize: Option<ResizeSession>,
    /// Active icon drag, if any.
    pub icon_drag: Option<IconDragSession>,
    /// Active widget drag, if any.
    pub widget_drag: Option<WidgetDragSession>,
}

impl InteractionState {
    /// Whether any pointer gesture is currently active.
    pub fn gesture_active(&self) -> bool {
        self.window_drag.is_some()
            || self.resize.is_some()
            || self.icon_drag.is_some()
            || self.widget_drag.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Request to open a window; defaults come from the application registry.
pub struct OpenWindowRequest {
    /// Application to mount.
    pub app_id: ApplicationId,
    /// Titlebar override; defaults to the registry display name.
    pub title: Option<String>,
    /// Icon token override; defaults to the registry icon token.
    pub icon_token: Option<String>,
    /// Initial size; defaults come from the application registry entry.
    pub size: Option<WindowSize>,
    /// Initial props bag handed to the mounted application.
    pub props: Value,
    /// When false, an existing window with the same app id on the target
    /// desktop is focused instead of opening a duplicate.
    pub force_new: bool,
    /// Target desktop; defaults to the active desktop.
    pub desktop_id: Option<DesktopId>,
}

impl OpenWindowRequest {
    /// Creates a request with defaults for everything but the app id.
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            title: None,
            icon_token: None,
            size: None,
            props: Value::Null,
            force_new: false,
            desktop_id: None,
        }
    }
}
