//! Headless desktop session engine for the employee portal.
//!
//! Holds the window, virtual-desktop, shortcut, and widget state behind a
//! single reducer entry point; the rendering shell dispatches
//! [`SessionAction`]s and executes the returned [`SessionEffect`]s. Nothing in
//! this crate touches the DOM or the network, which keeps the whole window
//! manager testable on the host target.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod bridge;
pub mod geometry;
pub mod icon_layout;
pub mod model;
pub mod persistence;
pub mod reducer;

pub use bridge::{
    IconSyncGuard, SyncStatus, TrailingDebounce, ICON_CONFIRM_EPSILON, LAYOUT_DEBOUNCE_MS,
    SESSION_DEBOUNCE_MS,
};
pub use geometry::{
    cell_origin_unscaled, clamp_window_to_screen, detect_snap_zone, snap_target_rect, GridCell,
    GridSpec, ScreenBounds,
};
pub use icon_layout::{default_cell_for_index, reconcile_icons, IconMove};
pub use model::{
    DesktopId, DisplaySettings, IconPoint, IconPositionMap, InteractionState, OpenWindowRequest,
    PointerPosition, ResizeEdge, SessionState, ShortcutId, ShortcutRecord, SnapZone,
    VirtualDesktop, WidgetId, WidgetRecord, WindowAnimation, WindowId, WindowMode, WindowRecord,
    WindowRect,
};
pub use persistence::{
    decode_session_payload, IconLayoutPatch, IconLayoutSnapshot, SessionSnapshot, WidgetSnapshot,
};
pub use reducer::{reduce_session, SessionAction, SessionEffect, SessionError};
