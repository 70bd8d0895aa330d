//! Session reducer: every mutation of [`SessionState`] flows through
//! [`reduce_session`], which applies the change and returns the side effects
//! the shell must execute (persistence writes, animation-end timers).
//!
//! Actions referencing windows, shortcuts, or widgets that no longer exist are
//! silent no-ops; concurrent UI events racing a close must not surface as
//! errors. Only virtual-desktop removal has hard preconditions.

use serde_json::Value;
use thiserror::Error;

use crate::{
    geometry::{
        cell_of_unscaled, cell_origin_unscaled, clamp_window_to_screen, detect_snap_zone,
        find_free_cell, snap_target_rect, snap_to_cell, GridSpec, ScreenBounds,
    },
    icon_layout::{default_cell_for_index, reconcile_icons},
    model::{
        DesktopId, IconDragSession, IconPoint, InteractionState, OpenWindowRequest,
        PointerPosition, ResizeEdge, ResizeSession, SessionState, ShortcutId, ShortcutRecord,
        SnapZone, VirtualDesktop, WidgetDragSession, WidgetId, WidgetRecord, WindowAnimation,
        WindowDragSession,
        WindowId, WindowRecord, WindowRect, DRAG_COMMIT_THRESHOLD, MIN_WINDOW_HEIGHT,
        MIN_WINDOW_WIDTH,
    },
    persistence::{IconLayoutPatch, SessionSnapshot},
};

/// Zoom factor bounds for the display settings.
pub const MIN_ZOOM: f64 = 0.5;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 2.0;
/// Taskbar scale bounds.
pub const MIN_TASKBAR_SCALE: f64 = 0.5;
/// Upper taskbar scale bound.
pub const MAX_TASKBAR_SCALE: f64 = 2.0;

/// New windows cascade from this origin.
const CASCADE_BASE_X: i32 = 40;
/// Vertical cascade origin.
const CASCADE_BASE_Y: i32 = 48;
/// Per-window cascade offset; wraps after eight windows.
const CASCADE_STEP: i32 = 24;

#[derive(Debug, Clone, PartialEq)]
/// Every mutation the shell can request from the session.
pub enum SessionAction {
    /// Open a window (or focus an existing one for the same app).
    OpenWindow(OpenWindowRequest),
    /// Begin the close transition; removal happens at animation completion.
    CloseWindow(WindowId),
    /// The shell reports a window transition finished.
    AnimationCompleted {
        /// Window whose transition ended.
        window_id: WindowId,
        /// The transition that ended; stale reports are ignored.
        animation: WindowAnimation,
    },
    /// Begin the minimize transition.
    MinimizeWindow(WindowId),
    /// Restore a minimized window and focus it.
    RestoreWindow(WindowId),
    /// Maximize, or restore if already maximized.
    ToggleMaximize {
        /// Target window.
        window_id: WindowId,
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Bring a window to the front and give it focus.
    FocusWindow(WindowId),
    /// Taskbar button click: focus, restore, or minimize depending on state.
    ToggleTaskbarWindow(WindowId),
    /// Titlebar press: may become a drag or resolve as a focus click.
    BeginWindowDrag {
        /// Target window.
        window_id: WindowId,
        /// Pointer position at press time.
        pointer: PointerPosition,
    },
    /// Pointer moved during a titlebar press.
    UpdateWindowDrag {
        /// Current pointer position.
        pointer: PointerPosition,
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Pointer released after a titlebar press.
    EndWindowDrag {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Edge or corner press starting a resize.
    BeginWindowResize {
        /// Target window.
        window_id: WindowId,
        /// Grabbed edge.
        edge: ResizeEdge,
        /// Pointer position at press time.
        pointer: PointerPosition,
    },
    /// Pointer moved during a resize.
    UpdateWindowResize {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Pointer released ending a resize.
    EndWindowResize,
    /// Lock a window to a snap zone.
    SnapWindow {
        /// Target window.
        window_id: WindowId,
        /// Zone to lock to.
        zone: SnapZone,
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Release a window from its snap zone back to its remembered geometry.
    UnsnapWindow(WindowId),
    /// Move a window without a pointer gesture (keyboard, tests).
    SetWindowPosition {
        /// Target window.
        window_id: WindowId,
        /// New left edge.
        x: i32,
        /// New top edge.
        y: i32,
    },
    /// Resize a window without a pointer gesture.
    SetWindowSize {
        /// Target window.
        window_id: WindowId,
        /// New width.
        w: i32,
        /// New height.
        h: i32,
    },
    /// Ask the mounted application to re-fetch its data.
    RefreshWindow(WindowId),
    /// Replace the titlebar string.
    SetWindowTitle {
        /// Target window.
        window_id: WindowId,
        /// New title.
        title: String,
    },
    /// Merge a patch into the window's props bag (null removes a key).
    MergeWindowProps {
        /// Target window.
        window_id: WindowId,
        /// Patch to merge.
        patch: Value,
    },
    /// Re-fit every window to a changed viewport.
    ConstrainToScreen {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Create a virtual desktop and switch to it.
    AddDesktop {
        /// Display name.
        name: String,
    },
    /// Remove an empty, non-default virtual desktop.
    RemoveDesktop(DesktopId),
    /// Switch the rendered desktop.
    SetActiveDesktop(DesktopId),
    /// Rename a virtual desktop.
    RenameDesktop {
        /// Target desktop.
        desktop_id: DesktopId,
        /// New display name.
        name: String,
    },
    /// Move a window to another desktop.
    MoveWindowToDesktop {
        /// Target window.
        window_id: WindowId,
        /// Destination desktop.
        desktop_id: DesktopId,
    },
    /// Add a desktop shortcut, optionally with an explicit position.
    AddShortcut {
        /// Shortcut to add; duplicates by id are ignored.
        shortcut: ShortcutRecord,
        /// Explicit unscaled position, if the caller has one.
        position: Option<IconPoint>,
    },
    /// Remove a desktop shortcut and its stored position.
    RemoveShortcut(ShortcutId),
    /// Icon press: may become a drag or resolve as a click (shell launches).
    BeginIconDrag {
        /// Shortcut under the pointer.
        shortcut_id: ShortcutId,
        /// Pointer position at press time.
        pointer: PointerPosition,
        /// Icon origin at press time, in screen pixels.
        origin_px: IconPoint,
    },
    /// Pointer moved during an icon press.
    UpdateIconDrag {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Pointer released after an icon press.
    EndIconDrag {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Re-fit every icon to the current grid bounds.
    ReconcileIcons {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Install remotely loaded icon positions.
    HydrateIconLayout(crate::model::IconPositionMap),
    /// Add a widget to the desktop surface.
    AddWidget {
        /// Widget kind token.
        kind: String,
        /// Initial unscaled position.
        position: IconPoint,
    },
    /// Remove a widget.
    RemoveWidget(WidgetId),
    /// Move a widget.
    MoveWidget {
        /// Target widget.
        widget_id: WidgetId,
        /// New unscaled position.
        position: IconPoint,
    },
    /// Widget press: may become a drag or resolve as a click (no-op).
    BeginWidgetDrag {
        /// Widget under the pointer.
        widget_id: WidgetId,
        /// Pointer position at press time.
        pointer: PointerPosition,
    },
    /// Pointer moved during a widget press.
    UpdateWidgetDrag {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Pointer released after a widget press.
    EndWidgetDrag {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Pull off-screen widgets back into view.
    ConstrainWidgets {
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Install remotely loaded widgets.
    HydrateWidgets(Vec<WidgetRecord>),
    /// Change the desktop zoom factor; icons reconcile against the new grid.
    SetDisplayZoom {
        /// Requested zoom; clamped to the supported range.
        zoom: f64,
        /// Current viewport.
        screen: ScreenBounds,
    },
    /// Change the taskbar height multiplier.
    SetTaskbarScale {
        /// Requested multiplier; clamped to the supported range.
        scale: f64,
    },
    /// Install a remotely loaded session snapshot, normalizing invariants.
    HydrateSnapshot(SessionSnapshot),
}

#[derive(Debug, Clone, PartialEq)]
/// Side effect the shell must execute after a reduction.
pub enum SessionEffect {
    /// Submit the combined session snapshot to the debounced writer.
    PersistSession,
    /// Submit a sparse icon-layout update to the debounced writer.
    PersistIconLayout(IconLayoutPatch),
    /// Submit the widget list to the debounced writer.
    PersistWidgets,
    /// Schedule an animation-completed report after the transition length.
    ScheduleAnimationEnd {
        /// Window playing the transition.
        window_id: WindowId,
        /// Transition to report complete.
        animation: WindowAnimation,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Hard preconditions a reduction can fail on.
pub enum SessionError {
    /// The last remaining desktop cannot be removed.
    #[error("the last virtual desktop cannot be removed")]
    LastDesktop,
    /// The default desktop cannot be removed.
    #[error("the default virtual desktop cannot be removed")]
    DefaultDesktop,
    /// A desktop with open windows cannot be removed.
    #[error("desktop still has open windows")]
    DesktopNotEmpty,
}

/// Applies `action` to the session and returns the effects to execute.
pub fn reduce_session(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    action: SessionAction,
) -> Result<Vec<SessionEffect>, SessionError> {
    let mut effects = Vec::new();

    match action {
        SessionAction::OpenWindow(request) => open_window(state, request, &mut effects),
        SessionAction::CloseWindow(window_id) => {
            if let Some(window) = state.window_mut(window_id) {
                if window.animation != WindowAnimation::Closing {
                    window.animation = WindowAnimation::Closing;
                    effects.push(SessionEffect::ScheduleAnimationEnd {
                        window_id,
                        animation: WindowAnimation::Closing,
                    });
                }
            }
        }
        SessionAction::AnimationCompleted {
            window_id,
            animation,
        } => animation_completed(state, window_id, animation, &mut effects),
        SessionAction::MinimizeWindow(window_id) => {
            if let Some(window) = state.window_mut(window_id) {
                if !window.minimized && window.animation != WindowAnimation::Minimizing {
                    window.animation = WindowAnimation::Minimizing;
                    effects.push(SessionEffect::ScheduleAnimationEnd {
                        window_id,
                        animation: WindowAnimation::Minimizing,
                    });
                }
            }
        }
        SessionAction::RestoreWindow(window_id) => restore_window(state, window_id, &mut effects),
        SessionAction::ToggleMaximize { window_id, screen } => {
            let Some(window) = state.window(window_id) else {
                return Ok(effects);
            };
            if window.maximized() {
                unsnap_window(state, window_id, &mut effects);
            } else {
                snap_window(state, window_id, SnapZone::Top, screen, &mut effects);
            }
        }
        SessionAction::FocusWindow(window_id) => {
            focus_window(state, window_id);
        }
        SessionAction::ToggleTaskbarWindow(window_id) => {
            let Some(window) = state.window(window_id) else {
                return Ok(effects);
            };
            if window.minimized {
                restore_window(state, window_id, &mut effects);
            } else if window.is_focused {
                return reduce_session(
                    state,
                    interaction,
                    SessionAction::MinimizeWindow(window_id),
                );
            } else {
                focus_window(state, window_id);
            }
        }
        SessionAction::BeginWindowDrag { window_id, pointer } => {
            let Some(window) = state.window(window_id) else {
                return Ok(effects);
            };
            if window.minimized {
                return Ok(effects);
            }
            let rect_start = window.rect;
            focus_window(state, window_id);
            // Maximized windows do not move; the press is focus-only.
            if state.window(window_id).is_some_and(|w| !w.maximized()) {
                interaction.window_drag = Some(WindowDragSession {
                    window_id,
                    pointer_start: pointer,
                    rect_start,
                    committed: false,
                    snap_candidate: None,
                });
            }
        }
        SessionAction::UpdateWindowDrag { pointer, screen } => {
            update_window_drag(state, interaction, pointer, screen);
        }
        SessionAction::EndWindowDrag { screen } => {
            end_window_drag(state, interaction, screen, &mut effects);
        }
        SessionAction::BeginWindowResize {
            window_id,
            edge,
            pointer,
        } => {
            let Some(window) = state.window(window_id) else {
                return Ok(effects);
            };
            if window.minimized || window.maximized() {
                return Ok(effects);
            }
            let rect_start = window.rect;
            focus_window(state, window_id);
            interaction.resize = Some(ResizeSession {
                window_id,
                edge,
                pointer_start: pointer,
                rect_start,
            });
        }
        SessionAction::UpdateWindowResize { pointer } => {
            update_window_resize(state, interaction, pointer);
        }
        SessionAction::EndWindowResize => {
            if interaction.resize.take().is_some() {
                effects.push(SessionEffect::PersistSession);
            }
        }
        SessionAction::SnapWindow {
            window_id,
            zone,
            screen,
        } => {
            snap_window(state, window_id, zone, screen, &mut effects);
        }
        SessionAction::UnsnapWindow(window_id) => {
            unsnap_window(state, window_id, &mut effects);
        }
        SessionAction::SetWindowPosition { window_id, x, y } => {
            if let Some(window) = state.window_mut(window_id) {
                if !window.minimized {
                    // Caller-supplied geometry releases any snap lock.
                    window.snap_zone = None;
                    window.restore_rect = None;
                    window.rect.x = x;
                    window.rect.y = y;
                    effects.push(SessionEffect::PersistSession);
                }
            }
        }
        SessionAction::SetWindowSize { window_id, w, h } => {
            if let Some(window) = state.window_mut(window_id) {
                if !window.minimized {
                    window.snap_zone = None;
                    window.restore_rect = None;
                    window.rect.w = w.max(MIN_WINDOW_WIDTH);
                    window.rect.h = h.max(MIN_WINDOW_HEIGHT);
                    effects.push(SessionEffect::PersistSession);
                }
            }
        }
        SessionAction::RefreshWindow(window_id) => {
            if let Some(window) = state.window_mut(window_id) {
                window.refresh_key = window.refresh_key.wrapping_add(1);
            }
        }
        SessionAction::SetWindowTitle { window_id, title } => {
            if let Some(window) = state.window_mut(window_id) {
                if window.title != title {
                    window.title = title;
                    effects.push(SessionEffect::PersistSession);
                }
            }
        }
        SessionAction::MergeWindowProps { window_id, patch } => {
            if let Some(window) = state.window_mut(window_id) {
                merge_props(&mut window.props, patch);
                window.refresh_key = window.refresh_key.wrapping_add(1);
                effects.push(SessionEffect::PersistSession);
            }
        }
        SessionAction::ConstrainToScreen { screen } => {
            constrain_windows(state, screen, &mut effects);
        }
        SessionAction::AddDesktop { name } => {
            let id = DesktopId(state.next_desktop_id);
            state.next_desktop_id += 1;
            let order = state.desktops.iter().map(|d| d.order + 1).max().unwrap_or(0);
            state.desktops.push(VirtualDesktop { id, name, order });
            state.active_desktop_id = id;
            effects.push(SessionEffect::PersistSession);
        }
        SessionAction::RemoveDesktop(desktop_id) => {
            remove_desktop(state, desktop_id, &mut effects)?;
        }
        SessionAction::SetActiveDesktop(desktop_id) => {
            if state.desktop_exists(desktop_id) && state.active_desktop_id != desktop_id {
                state.active_desktop_id = desktop_id;
                effects.push(SessionEffect::PersistSession);
            }
        }
        SessionAction::RenameDesktop { desktop_id, name } => {
            if let Some(desktop) = state.desktops.iter_mut().find(|d| d.id == desktop_id) {
                if desktop.name != name {
                    desktop.name = name;
                    effects.push(SessionEffect::PersistSession);
                }
            }
        }
        SessionAction::MoveWindowToDesktop {
            window_id,
            desktop_id,
        } => {
            move_window_to_desktop(state, window_id, desktop_id, &mut effects);
        }
        SessionAction::AddShortcut { shortcut, position } => {
            if state.shortcuts.iter().any(|s| s.id == shortcut.id) {
                return Ok(effects);
            }
            if let Some(point) = position {
                state.icon_positions.insert(shortcut.id.clone(), point);
                effects.push(SessionEffect::PersistIconLayout(IconLayoutPatch::set(
                    shortcut.id.clone(),
                    point,
                )));
            }
            state.shortcuts.push(shortcut);
            effects.push(SessionEffect::PersistSession);
        }
        SessionAction::RemoveShortcut(shortcut_id) => {
            let before = state.shortcuts.len();
            state.shortcuts.retain(|s| s.id != shortcut_id);
            if state.shortcuts.len() != before {
                state.icon_positions.remove(&shortcut_id);
                effects.push(SessionEffect::PersistIconLayout(IconLayoutPatch::remove(
                    shortcut_id,
                )));
                effects.push(SessionEffect::PersistSession);
            }
        }
        SessionAction::BeginIconDrag {
            shortcut_id,
            pointer,
            origin_px,
        } => {
            if state.shortcuts.iter().any(|s| s.id == shortcut_id) {
                interaction.icon_drag = Some(IconDragSession {
                    shortcut_id,
                    pointer_start: pointer,
                    pointer_current: pointer,
                    origin_px,
                    committed: false,
                });
            }
        }
        SessionAction::UpdateIconDrag { pointer } => {
            if let Some(drag) = interaction.icon_drag.as_mut() {
                drag.pointer_current = pointer;
                let dx = (pointer.x - drag.pointer_start.x).abs();
                let dy = (pointer.y - drag.pointer_start.y).abs();
                if dx.max(dy) >= DRAG_COMMIT_THRESHOLD {
                    drag.committed = true;
                }
            }
        }
        SessionAction::EndIconDrag { screen } => {
            end_icon_drag(state, interaction, screen, &mut effects);
        }
        SessionAction::ReconcileIcons { screen } => {
            let grid = GridSpec::new(state.display.zoom);
            apply_icon_reconciliation(state, screen, grid, &mut effects);
        }
        SessionAction::HydrateIconLayout(positions) => {
            state.icon_positions = positions;
        }
        SessionAction::AddWidget { kind, position } => {
            let id = WidgetId(state.next_widget_id);
            state.next_widget_id += 1;
            state.widgets.push(WidgetRecord { id, kind, position });
            effects.push(SessionEffect::PersistWidgets);
        }
        SessionAction::RemoveWidget(widget_id) => {
            let before = state.widgets.len();
            state.widgets.retain(|w| w.id != widget_id);
            if state.widgets.len() != before {
                effects.push(SessionEffect::PersistWidgets);
            }
        }
        SessionAction::MoveWidget {
            widget_id,
            position,
        } => {
            if let Some(widget) = state.widgets.iter_mut().find(|w| w.id == widget_id) {
                if !widget.position.approx_eq(position, f64::EPSILON) {
                    widget.position = position;
                    effects.push(SessionEffect::PersistWidgets);
                }
            }
        }
        SessionAction::BeginWidgetDrag { widget_id, pointer } => {
            if let Some(widget) = state.widgets.iter().find(|w| w.id == widget_id) {
                interaction.widget_drag = Some(WidgetDragSession {
                    widget_id,
                    pointer_start: pointer,
                    pointer_current: pointer,
                    origin: widget.position,
                    committed: false,
                });
            }
        }
        SessionAction::UpdateWidgetDrag { pointer } => {
            if let Some(drag) = interaction.widget_drag.as_mut() {
                drag.pointer_current = pointer;
                let dx = (pointer.x - drag.pointer_start.x).abs();
                let dy = (pointer.y - drag.pointer_start.y).abs();
                if dx.max(dy) >= DRAG_COMMIT_THRESHOLD {
                    drag.committed = true;
                }
            }
        }
        SessionAction::EndWidgetDrag { screen } => {
            end_widget_drag(state, interaction, screen, &mut effects);
        }
        SessionAction::ConstrainWidgets { screen } => {
            constrain_widgets(state, screen, &mut effects);
        }
        SessionAction::HydrateWidgets(widgets) => {
            state.next_widget_id = widgets.iter().map(|w| w.id.0 + 1).max().unwrap_or(1);
            state.widgets = widgets;
        }
        SessionAction::SetDisplayZoom { zoom, screen } => {
            let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            if (state.display.zoom - zoom).abs() > f64::EPSILON {
                state.display.zoom = zoom;
                effects.push(SessionEffect::PersistSession);
                // Grid bounds changed; pull any orphaned icons back in view.
                apply_icon_reconciliation(state, screen, GridSpec::new(zoom), &mut effects);
            }
        }
        SessionAction::SetTaskbarScale { scale } => {
            let scale = scale.clamp(MIN_TASKBAR_SCALE, MAX_TASKBAR_SCALE);
            if (state.display.taskbar_scale - scale).abs() > f64::EPSILON {
                state.display.taskbar_scale = scale;
                effects.push(SessionEffect::PersistSession);
            }
        }
        SessionAction::HydrateSnapshot(snapshot) => {
            hydrate_snapshot(state, snapshot);
        }
    }

    Ok(effects)
}

fn open_window(
    state: &mut SessionState,
    request: OpenWindowRequest,
    effects: &mut Vec<SessionEffect>,
) {
    let desktop_id = request
        .desktop_id
        .filter(|id| state.desktop_exists(*id))
        .unwrap_or(state.active_desktop_id);

    if !request.force_new {
        let existing = state
            .windows_on(desktop_id)
            .find(|w| w.app_id == request.app_id)
            .map(|w| w.id);
        if let Some(window_id) = existing {
            if state.window(window_id).is_some_and(|w| w.minimized) {
                restore_window(state, window_id, effects);
            } else {
                focus_window(state, window_id);
            }
            return;
        }
    }

    let id = WindowId(state.next_window_id);
    state.next_window_id += 1;

    let cascade = ((id.0 - 1) % 8) as i32 * CASCADE_STEP;
    let size = request.size.unwrap_or_default();
    let rect = WindowRect {
        x: CASCADE_BASE_X + cascade,
        y: CASCADE_BASE_Y + cascade,
        w: size.width.max(MIN_WINDOW_WIDTH),
        h: size.height.max(MIN_WINDOW_HEIGHT),
    };
    let title = request
        .title
        .unwrap_or_else(|| request.app_id.as_str().to_string());
    let icon_token = request.icon_token.unwrap_or_else(|| "application".into());

    state.windows.push(WindowRecord {
        id,
        app_id: request.app_id,
        title,
        icon_token,
        rect,
        restore_rect: None,
        snap_zone: None,
        minimized: false,
        desktop_id,
        z_index: 0,
        is_focused: false,
        props: request.props,
        refresh_key: 0,
        animation: WindowAnimation::Opening,
    });
    focus_window(state, id);
    effects.push(SessionEffect::ScheduleAnimationEnd {
        window_id: id,
        animation: WindowAnimation::Opening,
    });
    effects.push(SessionEffect::PersistSession);
}

fn animation_completed(
    state: &mut SessionState,
    window_id: WindowId,
    animation: WindowAnimation,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(window) = state.window_mut(window_id) else {
        return;
    };
    if window.animation != animation {
        // A newer transition superseded the scheduled one.
        return;
    }
    match animation {
        WindowAnimation::Closing => {
            let desktop_id = window.desktop_id;
            let had_focus = window.is_focused;
            state.windows.retain(|w| w.id != window_id);
            if had_focus {
                focus_top_window_on(state, desktop_id);
            }
            effects.push(SessionEffect::PersistSession);
        }
        WindowAnimation::Minimizing => {
            window.animation = WindowAnimation::None;
            window.minimized = true;
            let desktop_id = window.desktop_id;
            let had_focus = std::mem::replace(&mut window.is_focused, false);
            if had_focus {
                focus_top_window_on(state, desktop_id);
            }
            effects.push(SessionEffect::PersistSession);
        }
        _ => {
            window.animation = WindowAnimation::None;
        }
    }
}

fn restore_window(
    state: &mut SessionState,
    window_id: WindowId,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(window) = state.window_mut(window_id) else {
        return;
    };
    if !window.minimized {
        focus_window(state, window_id);
        return;
    }
    window.minimized = false;
    window.animation = WindowAnimation::Restoring;
    focus_window(state, window_id);
    effects.push(SessionEffect::ScheduleAnimationEnd {
        window_id,
        animation: WindowAnimation::Restoring,
    });
    effects.push(SessionEffect::PersistSession);
}

/// Gives `window_id` focus and the top stacking position. Minimized windows
/// and already-focused windows are left untouched. Returns whether anything
/// changed.
fn focus_window(state: &mut SessionState, window_id: WindowId) -> bool {
    let Some(window) = state.window(window_id) else {
        return false;
    };
    if window.minimized || window.is_focused {
        return false;
    }
    let z_index = state.next_z_index;
    state.next_z_index += 1;
    for window in &mut state.windows {
        window.is_focused = window.id == window_id;
        if window.id == window_id {
            window.z_index = z_index;
        }
    }
    true
}

/// Hands focus to the top non-minimized window on `desktop_id`, if any.
fn focus_top_window_on(state: &mut SessionState, desktop_id: DesktopId) {
    let top = state
        .windows_on(desktop_id)
        .filter(|w| !w.minimized)
        .max_by_key(|w| w.z_index)
        .map(|w| w.id);
    if let Some(window_id) = top {
        focus_window(state, window_id);
    }
}

fn update_window_drag(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    pointer: PointerPosition,
    screen: ScreenBounds,
) {
    let Some(drag) = interaction.window_drag.as_mut() else {
        return;
    };
    let dx = pointer.x - drag.pointer_start.x;
    let dy = pointer.y - drag.pointer_start.y;
    if !drag.committed {
        if dx.abs().max(dy.abs()) < DRAG_COMMIT_THRESHOLD {
            return;
        }
        drag.committed = true;
        // A committed drag releases the window from its directional zone; the
        // geometry stays where the zone put it until the pointer moves it.
        if let Some(window) = state.window_mut(drag.window_id) {
            window.snap_zone = None;
            window.restore_rect = None;
        }
    }
    drag.snap_candidate = detect_snap_zone(pointer, screen);
    if let Some(window) = state.window_mut(drag.window_id) {
        window.rect = drag.rect_start.offset(dx, dy);
    }
}

fn end_window_drag(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(drag) = interaction.window_drag.take() else {
        return;
    };
    if !drag.committed {
        // Focus click; focus already happened at press time.
        return;
    }
    if let Some(zone) = drag.snap_candidate {
        snap_window(state, drag.window_id, zone, screen, effects);
        return;
    }
    if let Some(window) = state.window_mut(drag.window_id) {
        window.rect = clamp_window_to_screen(window.rect, screen);
    }
    effects.push(SessionEffect::PersistSession);
}

fn update_window_resize(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    pointer: PointerPosition,
) {
    let Some(resize) = interaction.resize.as_ref() else {
        return;
    };
    let dx = pointer.x - resize.pointer_start.x;
    let dy = pointer.y - resize.pointer_start.y;
    let start = resize.rect_start;

    let mut rect = start;
    match resize.edge {
        ResizeEdge::East => rect.w = start.w + dx,
        ResizeEdge::West => {
            rect.x = start.x + dx;
            rect.w = start.w - dx;
        }
        ResizeEdge::South => rect.h = start.h + dy,
        ResizeEdge::North => {
            rect.y = start.y + dy;
            rect.h = start.h - dy;
        }
        ResizeEdge::SouthEast => {
            rect.w = start.w + dx;
            rect.h = start.h + dy;
        }
        ResizeEdge::SouthWest => {
            rect.x = start.x + dx;
            rect.w = start.w - dx;
            rect.h = start.h + dy;
        }
        ResizeEdge::NorthEast => {
            rect.y = start.y + dy;
            rect.w = start.w + dx;
            rect.h = start.h - dy;
        }
        ResizeEdge::NorthWest => {
            rect.x = start.x + dx;
            rect.y = start.y + dy;
            rect.w = start.w - dx;
            rect.h = start.h - dy;
        }
    }

    // Keep the anchored edge fixed when the minimum size kicks in.
    if rect.w < MIN_WINDOW_WIDTH {
        if matches!(
            resize.edge,
            ResizeEdge::West | ResizeEdge::SouthWest | ResizeEdge::NorthWest
        ) {
            rect.x = start.x + start.w - MIN_WINDOW_WIDTH;
        }
        rect.w = MIN_WINDOW_WIDTH;
    }
    if rect.h < MIN_WINDOW_HEIGHT {
        if matches!(
            resize.edge,
            ResizeEdge::North | ResizeEdge::NorthEast | ResizeEdge::NorthWest
        ) {
            rect.y = start.y + start.h - MIN_WINDOW_HEIGHT;
        }
        rect.h = MIN_WINDOW_HEIGHT;
    }

    let window_id = resize.window_id;
    if let Some(window) = state.window_mut(window_id) {
        window.snap_zone = None;
        window.restore_rect = None;
        window.rect = rect;
    }
}

fn snap_window(
    state: &mut SessionState,
    window_id: WindowId,
    zone: SnapZone,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(window) = state.window_mut(window_id) else {
        return;
    };
    // Remember free-floating geometry once; re-snapping between zones keeps
    // the original restore target.
    if window.snap_zone.is_none() {
        window.restore_rect = Some(window.rect);
    }
    window.snap_zone = Some(zone);
    window.rect = snap_target_rect(zone, screen);
    window.minimized = false;
    if zone == SnapZone::Top {
        window.animation = WindowAnimation::Maximizing;
        effects.push(SessionEffect::ScheduleAnimationEnd {
            window_id,
            animation: WindowAnimation::Maximizing,
        });
    }
    focus_window(state, window_id);
    effects.push(SessionEffect::PersistSession);
}

fn unsnap_window(
    state: &mut SessionState,
    window_id: WindowId,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(window) = state.window_mut(window_id) else {
        return;
    };
    if window.snap_zone.is_none() {
        return;
    }
    window.snap_zone = None;
    if let Some(rect) = window.restore_rect.take() {
        window.rect = rect;
    }
    window.animation = WindowAnimation::Restoring;
    focus_window(state, window_id);
    effects.push(SessionEffect::ScheduleAnimationEnd {
        window_id,
        animation: WindowAnimation::Restoring,
    });
    effects.push(SessionEffect::PersistSession);
}

fn constrain_windows(
    state: &mut SessionState,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let mut changed = false;
    for window in &mut state.windows {
        if window.minimized {
            continue;
        }
        let next = match window.snap_zone {
            Some(zone) => snap_target_rect(zone, screen),
            None => clamp_window_to_screen(window.rect, screen),
        };
        if next != window.rect {
            window.rect = next;
            changed = true;
        }
    }
    if changed {
        effects.push(SessionEffect::PersistSession);
    }
}

fn remove_desktop(
    state: &mut SessionState,
    desktop_id: DesktopId,
    effects: &mut Vec<SessionEffect>,
) -> Result<(), SessionError> {
    if !state.desktop_exists(desktop_id) {
        return Ok(());
    }
    if state.desktops.len() == 1 {
        return Err(SessionError::LastDesktop);
    }
    if desktop_id == state.default_desktop_id {
        return Err(SessionError::DefaultDesktop);
    }
    if state.windows_on(desktop_id).next().is_some() {
        return Err(SessionError::DesktopNotEmpty);
    }
    state.desktops.retain(|d| d.id != desktop_id);
    if state.active_desktop_id == desktop_id {
        state.active_desktop_id = state.default_desktop_id;
    }
    effects.push(SessionEffect::PersistSession);
    Ok(())
}

fn move_window_to_desktop(
    state: &mut SessionState,
    window_id: WindowId,
    desktop_id: DesktopId,
    effects: &mut Vec<SessionEffect>,
) {
    if !state.desktop_exists(desktop_id) {
        return;
    }
    let Some(window) = state.window_mut(window_id) else {
        return;
    };
    if window.desktop_id == desktop_id {
        return;
    }
    let from = window.desktop_id;
    window.desktop_id = desktop_id;
    let had_focus = std::mem::replace(&mut window.is_focused, false);
    if had_focus && from == state.active_desktop_id {
        focus_top_window_on(state, from);
    }
    effects.push(SessionEffect::PersistSession);
}

fn end_icon_drag(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(drag) = interaction.icon_drag.take() else {
        return;
    };
    if !drag.committed {
        // Click; the shell resolves it as a launch.
        return;
    }
    if !state.shortcuts.iter().any(|s| s.id == drag.shortcut_id) {
        return;
    }

    let grid = GridSpec::new(state.display.zoom);
    let (cols, rows) = grid.bounds(screen);
    let drop_x = drag.origin_px.x + (drag.pointer_current.x - drag.pointer_start.x) as f64;
    let drop_y = drag.origin_px.y + (drag.pointer_current.y - drag.pointer_start.y) as f64;

    let mut cell = snap_to_cell(drop_x, drop_y, grid);
    cell.col = cell.col.clamp(0, cols - 1);
    cell.row = cell.row.clamp(0, rows - 1);

    // Every other shortcut's effective cell is a collision target, whether
    // its position is stored or still the default column layout.
    let occupied = state
        .shortcuts
        .iter()
        .enumerate()
        .filter(|(_, shortcut)| shortcut.id != drag.shortcut_id)
        .map(|(index, shortcut)| match state.icon_positions.get(&shortcut.id) {
            Some(point) => cell_of_unscaled(*point),
            None => default_cell_for_index(index, rows),
        })
        .collect();
    let placed = find_free_cell(cell, &occupied, cols, rows)
        .unwrap_or(crate::geometry::GridCell { col: 0, row: 0 });

    let position = cell_origin_unscaled(placed);
    let previous = state.icon_positions.get(&drag.shortcut_id).copied();
    if previous.is_some_and(|p| p.approx_eq(position, 0.001)) {
        return;
    }
    state
        .icon_positions
        .insert(drag.shortcut_id.clone(), position);
    effects.push(SessionEffect::PersistIconLayout(IconLayoutPatch::set(
        drag.shortcut_id,
        position,
    )));
}

fn apply_icon_reconciliation(
    state: &mut SessionState,
    screen: ScreenBounds,
    grid: GridSpec,
    effects: &mut Vec<SessionEffect>,
) {
    let moves = reconcile_icons(&state.shortcuts, &state.icon_positions, screen, grid);
    if moves.is_empty() {
        return;
    }
    let mut patch = IconLayoutPatch::default();
    for item in moves {
        state
            .icon_positions
            .insert(item.shortcut_id.clone(), item.position);
        patch.positions.insert(item.shortcut_id, item.position);
    }
    effects.push(SessionEffect::PersistIconLayout(patch));
}

fn end_widget_drag(
    state: &mut SessionState,
    interaction: &mut InteractionState,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let Some(drag) = interaction.widget_drag.take() else {
        return;
    };
    if !drag.committed {
        return;
    }
    let zoom = state.display.zoom;
    // Pointer travel is in screen pixels; stored positions are unscaled.
    let dx = (drag.pointer_current.x - drag.pointer_start.x) as f64 / zoom;
    let dy = (drag.pointer_current.y - drag.pointer_start.y) as f64 / zoom;
    let max_x = ((screen.width as f64) / zoom - 64.0).max(0.0);
    let max_y = ((screen.available_height() as f64) / zoom - 64.0).max(0.0);
    let position = IconPoint::new(
        (drag.origin.x + dx).clamp(0.0, max_x),
        (drag.origin.y + dy).clamp(0.0, max_y),
    );

    let Some(widget) = state.widgets.iter_mut().find(|w| w.id == drag.widget_id) else {
        return;
    };
    if !widget.position.approx_eq(position, f64::EPSILON) {
        widget.position = position;
        effects.push(SessionEffect::PersistWidgets);
    }
}

fn constrain_widgets(
    state: &mut SessionState,
    screen: ScreenBounds,
    effects: &mut Vec<SessionEffect>,
) {
    let zoom = state.display.zoom;
    let max_x = ((screen.width as f64) / zoom - 64.0).max(0.0);
    let max_y = ((screen.available_height() as f64) / zoom - 64.0).max(0.0);
    let mut changed = false;
    for widget in &mut state.widgets {
        let clamped = IconPoint::new(
            widget.position.x.clamp(0.0, max_x),
            widget.position.y.clamp(0.0, max_y),
        );
        if !widget.position.approx_eq(clamped, f64::EPSILON) {
            widget.position = clamped;
            changed = true;
        }
    }
    if changed {
        effects.push(SessionEffect::PersistWidgets);
    }
}

fn hydrate_snapshot(state: &mut SessionState, snapshot: SessionSnapshot) {
    state.windows = snapshot.windows;
    state.desktops = if snapshot.desktops.is_empty() {
        SessionState::default().desktops
    } else {
        snapshot.desktops
    };
    state.shortcuts = snapshot.shortcuts;
    state.display.zoom = snapshot.display.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    state.display.taskbar_scale = snapshot
        .display
        .taskbar_scale
        .clamp(MIN_TASKBAR_SCALE, MAX_TASKBAR_SCALE);

    let first_desktop = state.desktops[0].id;
    state.default_desktop_id = if state.desktop_exists(snapshot.default_desktop_id) {
        snapshot.default_desktop_id
    } else {
        first_desktop
    };
    state.active_desktop_id = if state.desktop_exists(snapshot.active_desktop_id) {
        snapshot.active_desktop_id
    } else {
        state.default_desktop_id
    };
    for window in &mut state.windows {
        if !state
            .desktops
            .iter()
            .any(|d| d.id == window.desktop_id)
        {
            window.desktop_id = state.default_desktop_id;
        }
        window.animation = WindowAnimation::None;
    }

    // Renumber z compactly, preserving relative order, and keep one focus.
    let mut order: Vec<WindowId> = {
        let mut windows: Vec<&WindowRecord> = state.windows.iter().collect();
        windows.sort_by_key(|w| w.z_index);
        windows.iter().map(|w| w.id).collect()
    };
    let mut z = 1;
    for window_id in order.drain(..) {
        if let Some(window) = state.window_mut(window_id) {
            window.z_index = z;
            z += 1;
        }
    }
    state.next_z_index = z;

    let focused: Vec<WindowId> = state
        .windows
        .iter()
        .filter(|w| w.is_focused && !w.minimized)
        .map(|w| w.id)
        .collect();
    let keep = focused
        .iter()
        .copied()
        .max_by_key(|id| state.window(*id).map(|w| w.z_index).unwrap_or(0));
    for window in &mut state.windows {
        window.is_focused = Some(window.id) == keep;
    }

    state.next_window_id = state.windows.iter().map(|w| w.id.0 + 1).max().unwrap_or(1);
    state.next_desktop_id = state.desktops.iter().map(|d| d.id.0 + 1).max().unwrap_or(2);
}

/// Recursive JSON merge: objects merge key-wise, `null` removes a key, and
/// any other value replaces the target.
fn merge_props(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                if value.is_null() {
                    target_map.remove(&key);
                } else {
                    merge_props(target_map.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use portal_app_contract::ApplicationId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::IconPositionMap;

    const SCREEN: ScreenBounds = ScreenBounds {
        width: 1920,
        height: 1080,
        taskbar_height: 48,
    };

    fn app(name: &str) -> ApplicationId {
        ApplicationId::trusted(format!("portal.{name}"))
    }

    fn dispatch(
        state: &mut SessionState,
        interaction: &mut InteractionState,
        action: SessionAction,
    ) -> Vec<SessionEffect> {
        reduce_session(state, interaction, action).expect("reduction should succeed")
    }

    fn open(state: &mut SessionState, interaction: &mut InteractionState, name: &str) -> WindowId {
        dispatch(
            state,
            interaction,
            SessionAction::OpenWindow(OpenWindowRequest::new(app(name))),
        );
        state.windows.last().expect("window opened").id
    }

    fn finish_animation(
        state: &mut SessionState,
        interaction: &mut InteractionState,
        window_id: WindowId,
    ) {
        let animation = state.window(window_id).map(|w| w.animation);
        if let Some(animation) = animation {
            if animation != WindowAnimation::None {
                dispatch(
                    state,
                    interaction,
                    SessionAction::AnimationCompleted {
                        window_id,
                        animation,
                    },
                );
            }
        }
    }

    #[test]
    fn opening_assigns_cascading_geometry_and_focus() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();

        let first = open(&mut state, &mut interaction, "directory");
        let second = open(&mut state, &mut interaction, "leave");

        let a = state.window(first).unwrap();
        let b = state.window(second).unwrap();
        assert_eq!((a.rect.x, a.rect.y), (40, 48));
        assert_eq!((b.rect.x, b.rect.y), (64, 72));
        assert!(!a.is_focused);
        assert!(b.is_focused);
        assert!(b.z_index > a.z_index);
        assert_eq!(b.animation, WindowAnimation::Opening);
    }

    #[test]
    fn opening_the_same_app_focuses_the_existing_window() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();

        let first = open(&mut state, &mut interaction, "directory");
        open(&mut state, &mut interaction, "leave");

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::OpenWindow(OpenWindowRequest::new(app("directory"))),
        );
        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.focused_window_id(), Some(first));
    }

    #[test]
    fn force_new_opens_a_duplicate() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, "directory");
        let mut request = OpenWindowRequest::new(app("directory"));
        request.force_new = true;
        dispatch(&mut state, &mut interaction, SessionAction::OpenWindow(request));
        assert_eq!(state.windows.len(), 2);
    }

    #[test]
    fn close_removes_only_after_the_animation_completes() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);

        let effects = dispatch(&mut state, &mut interaction, SessionAction::CloseWindow(id));
        assert_eq!(
            effects,
            vec![SessionEffect::ScheduleAnimationEnd {
                window_id: id,
                animation: WindowAnimation::Closing,
            }]
        );
        assert_eq!(state.windows.len(), 1);

        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AnimationCompleted {
                window_id: id,
                animation: WindowAnimation::Closing,
            },
        );
        assert_eq!(state.windows.len(), 0);
        assert!(effects.contains(&SessionEffect::PersistSession));
    }

    #[test]
    fn closing_hands_focus_to_the_next_highest_window() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let first = open(&mut state, &mut interaction, "directory");
        let second = open(&mut state, &mut interaction, "leave");

        dispatch(&mut state, &mut interaction, SessionAction::CloseWindow(second));
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AnimationCompleted {
                window_id: second,
                animation: WindowAnimation::Closing,
            },
        );
        assert_eq!(state.focused_window_id(), Some(first));
    }

    #[test]
    fn stale_window_ids_are_silent_no_ops() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let ghost = WindowId(99);

        for action in [
            SessionAction::CloseWindow(ghost),
            SessionAction::MinimizeWindow(ghost),
            SessionAction::RestoreWindow(ghost),
            SessionAction::FocusWindow(ghost),
            SessionAction::RefreshWindow(ghost),
            SessionAction::UnsnapWindow(ghost),
        ] {
            let effects = dispatch(&mut state, &mut interaction, action);
            assert_eq!(effects, Vec::new());
        }
    }

    #[test]
    fn minimize_flips_the_flag_at_animation_completion() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);

        dispatch(&mut state, &mut interaction, SessionAction::MinimizeWindow(id));
        assert!(!state.window(id).unwrap().minimized);

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AnimationCompleted {
                window_id: id,
                animation: WindowAnimation::Minimizing,
            },
        );
        let window = state.window(id).unwrap();
        assert!(window.minimized);
        assert!(!window.is_focused);
    }

    #[test]
    fn focusing_a_minimized_window_is_a_no_op() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        dispatch(&mut state, &mut interaction, SessionAction::MinimizeWindow(id));
        finish_animation(&mut state, &mut interaction, id);

        dispatch(&mut state, &mut interaction, SessionAction::FocusWindow(id));
        assert_eq!(state.focused_window_id(), None);
    }

    #[test]
    fn restore_clears_minimized_and_focuses() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        dispatch(&mut state, &mut interaction, SessionAction::MinimizeWindow(id));
        finish_animation(&mut state, &mut interaction, id);

        dispatch(&mut state, &mut interaction, SessionAction::RestoreWindow(id));
        let window = state.window(id).unwrap();
        assert!(!window.minimized);
        assert!(window.is_focused);
        assert_eq!(window.animation, WindowAnimation::Restoring);
    }

    #[test]
    fn focus_assigns_a_strictly_increasing_top_z() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let first = open(&mut state, &mut interaction, "directory");
        let second = open(&mut state, &mut interaction, "leave");

        dispatch(&mut state, &mut interaction, SessionAction::FocusWindow(first));
        let a = state.window(first).unwrap().z_index;
        let b = state.window(second).unwrap().z_index;
        assert!(a > b);
        assert_eq!(state.focused_window_id(), Some(first));
        assert_eq!(
            state.windows.iter().filter(|w| w.is_focused).count(),
            1
        );
    }

    #[test]
    fn snap_then_unsnap_restores_the_original_geometry() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        let original = state.window(id).unwrap().rect;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: id,
                zone: SnapZone::Left,
                screen: SCREEN,
            },
        );
        let snapped = state.window(id).unwrap();
        assert_eq!(snapped.snap_zone, Some(SnapZone::Left));
        assert_eq!(snapped.rect, snap_target_rect(SnapZone::Left, SCREEN));

        // Re-snapping keeps the original restore target.
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: id,
                zone: SnapZone::TopRight,
                screen: SCREEN,
            },
        );
        assert_eq!(state.window(id).unwrap().restore_rect, Some(original));

        dispatch(&mut state, &mut interaction, SessionAction::UnsnapWindow(id));
        let restored = state.window(id).unwrap();
        assert_eq!(restored.snap_zone, None);
        assert_eq!(restored.rect, original);
        assert_eq!(restored.restore_rect, None);
    }

    #[test]
    fn direct_geometry_setters_release_the_snap_zone() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: id,
                zone: SnapZone::Left,
                screen: SCREEN,
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SetWindowPosition { window_id: id, x: 300, y: 200 },
        );
        let window = state.window(id).unwrap();
        assert_eq!(window.snap_zone, None);
        assert_eq!(window.restore_rect, None);
        assert_eq!((window.rect.x, window.rect.y), (300, 200));
        assert!(effects.contains(&SessionEffect::PersistSession));

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: id,
                zone: SnapZone::Right,
                screen: SCREEN,
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SetWindowSize { window_id: id, w: 640, h: 480 },
        );
        let window = state.window(id).unwrap();
        assert_eq!(window.snap_zone, None);
        assert_eq!((window.rect.w, window.rect.h), (640, 480));
    }

    #[test]
    fn toggle_maximize_round_trips_through_the_top_zone() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        let original = state.window(id).unwrap().rect;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ToggleMaximize {
                window_id: id,
                screen: SCREEN,
            },
        );
        assert!(state.window(id).unwrap().maximized());
        assert_eq!(
            state.window(id).unwrap().animation,
            WindowAnimation::Maximizing
        );

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ToggleMaximize {
                window_id: id,
                screen: SCREEN,
            },
        );
        let window = state.window(id).unwrap();
        assert!(!window.maximized());
        assert_eq!(window.rect, original);
    }

    #[test]
    fn a_short_titlebar_press_is_a_focus_click_without_persist() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let first = open(&mut state, &mut interaction, "directory");
        open(&mut state, &mut interaction, "leave");

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWindowDrag {
                window_id: first,
                pointer: PointerPosition { x: 300, y: 300 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWindowDrag {
                pointer: PointerPosition { x: 302, y: 301 },
                screen: SCREEN,
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndWindowDrag { screen: SCREEN },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(state.focused_window_id(), Some(first));
        assert_eq!(state.window(first).unwrap().rect.x, 40);
        assert!(interaction.window_drag.is_none());
    }

    #[test]
    fn a_committed_drag_moves_the_window_and_persists() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWindowDrag {
                window_id: id,
                pointer: PointerPosition { x: 300, y: 300 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWindowDrag {
                pointer: PointerPosition { x: 420, y: 360 },
                screen: SCREEN,
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndWindowDrag { screen: SCREEN },
        );

        let rect = state.window(id).unwrap().rect;
        assert_eq!((rect.x, rect.y), (40 + 120, 48 + 60));
        assert_eq!(effects, vec![SessionEffect::PersistSession]);
    }

    #[test]
    fn releasing_over_a_zone_snaps_the_window() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWindowDrag {
                window_id: id,
                pointer: PointerPosition { x: 300, y: 300 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWindowDrag {
                pointer: PointerPosition { x: 10, y: 500 },
                screen: SCREEN,
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndWindowDrag { screen: SCREEN },
        );

        let window = state.window(id).unwrap();
        assert_eq!(window.snap_zone, Some(SnapZone::Left));
        assert_eq!(window.rect, snap_target_rect(SnapZone::Left, SCREEN));
    }

    #[test]
    fn dragging_a_snapped_window_releases_the_zone() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: id,
                zone: SnapZone::Right,
                screen: SCREEN,
            },
        );

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWindowDrag {
                window_id: id,
                pointer: PointerPosition { x: 1400, y: 300 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWindowDrag {
                pointer: PointerPosition { x: 1200, y: 400 },
                screen: SCREEN,
            },
        );
        assert_eq!(state.window(id).unwrap().snap_zone, None);
    }

    #[test]
    fn resize_respects_minimum_dimensions_and_anchors() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, id);
        let start = state.window(id).unwrap().rect;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWindowResize {
                window_id: id,
                edge: ResizeEdge::West,
                pointer: PointerPosition { x: start.x, y: 300 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWindowResize {
                pointer: PointerPosition {
                    x: start.x + start.w,
                    y: 300,
                },
            },
        );
        let effects = dispatch(&mut state, &mut interaction, SessionAction::EndWindowResize);

        let rect = state.window(id).unwrap().rect;
        assert_eq!(rect.w, MIN_WINDOW_WIDTH);
        // The right edge stays anchored while the minimum clamps the width.
        assert_eq!(rect.x + rect.w, start.x + start.w);
        assert_eq!(effects, vec![SessionEffect::PersistSession]);
    }

    #[test]
    fn removing_desktops_enforces_preconditions() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();

        assert_eq!(
            reduce_session(
                &mut state,
                &mut interaction,
                SessionAction::RemoveDesktop(DesktopId(1))
            ),
            Err(SessionError::LastDesktop)
        );

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AddDesktop {
                name: "Focus".to_string(),
            },
        );
        let second = state.desktops[1].id;
        assert_eq!(state.active_desktop_id, second);

        assert_eq!(
            reduce_session(
                &mut state,
                &mut interaction,
                SessionAction::RemoveDesktop(DesktopId(1))
            ),
            Err(SessionError::DefaultDesktop)
        );

        open(&mut state, &mut interaction, "directory");
        assert_eq!(
            reduce_session(&mut state, &mut interaction, SessionAction::RemoveDesktop(second)),
            Err(SessionError::DesktopNotEmpty)
        );

        let id = state.windows[0].id;
        dispatch(&mut state, &mut interaction, SessionAction::CloseWindow(id));
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AnimationCompleted {
                window_id: id,
                animation: WindowAnimation::Closing,
            },
        );
        dispatch(&mut state, &mut interaction, SessionAction::RemoveDesktop(second));
        assert_eq!(state.desktops.len(), 1);
        assert_eq!(state.active_desktop_id, DesktopId(1));
    }

    #[test]
    fn removing_a_missing_desktop_is_a_no_op() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::RemoveDesktop(DesktopId(42)),
        );
        assert_eq!(effects, Vec::new());
    }

    #[test]
    fn dedup_is_per_desktop() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        open(&mut state, &mut interaction, "directory");
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AddDesktop {
                name: "Focus".to_string(),
            },
        );

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::OpenWindow(OpenWindowRequest::new(app("directory"))),
        );
        assert_eq!(state.windows.len(), 2);
    }

    #[test]
    fn instanced_app_ids_escape_dedup() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::OpenWindow(OpenWindowRequest::new(app("notes"))),
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::OpenWindow(OpenWindowRequest::new(
                ApplicationId::trusted("portal.notes#2"),
            )),
        );
        assert_eq!(state.windows.len(), 2);
    }

    #[test]
    fn icon_drag_persists_a_single_unscaled_patch() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        state.shortcuts.push(ShortcutRecord {
            id: ShortcutId::new("directory"),
            app_id: app("directory"),
        });
        state
            .icon_positions
            .insert(ShortcutId::new("directory"), IconPoint::new(10.0, 10.0));

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginIconDrag {
                shortcut_id: ShortcutId::new("directory"),
                pointer: PointerPosition { x: 50, y: 50 },
                origin_px: IconPoint::new(10.0, 10.0),
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateIconDrag {
                pointer: PointerPosition { x: 50 + 180, y: 50 + 90 },
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndIconDrag { screen: SCREEN },
        );

        let expected = IconPoint::new(10.0 + 2.0 * 90.0, 10.0 + 90.0);
        assert_eq!(
            state.icon_positions.get(&ShortcutId::new("directory")),
            Some(&expected)
        );
        assert_eq!(
            effects,
            vec![SessionEffect::PersistIconLayout(IconLayoutPatch::set(
                ShortcutId::new("directory"),
                expected,
            ))]
        );
    }

    #[test]
    fn a_short_icon_press_does_not_move_or_persist() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        state.shortcuts.push(ShortcutRecord {
            id: ShortcutId::new("directory"),
            app_id: app("directory"),
        });

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginIconDrag {
                shortcut_id: ShortcutId::new("directory"),
                pointer: PointerPosition { x: 50, y: 50 },
                origin_px: IconPoint::new(10.0, 10.0),
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateIconDrag {
                pointer: PointerPosition { x: 52, y: 51 },
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndIconDrag { screen: SCREEN },
        );

        assert_eq!(effects, Vec::new());
        assert!(state.icon_positions.is_empty());
        assert!(interaction.icon_drag.is_none());
    }

    #[test]
    fn dropping_onto_an_occupied_cell_finds_a_neighbor() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        for name in ["a", "b"] {
            state.shortcuts.push(ShortcutRecord {
                id: ShortcutId::new(name),
                app_id: app(name),
            });
        }
        state
            .icon_positions
            .insert(ShortcutId::new("a"), IconPoint::new(100.0, 100.0));
        state
            .icon_positions
            .insert(ShortcutId::new("b"), IconPoint::new(10.0, 10.0));

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginIconDrag {
                shortcut_id: ShortcutId::new("b"),
                pointer: PointerPosition { x: 0, y: 0 },
                origin_px: IconPoint::new(10.0, 10.0),
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateIconDrag {
                pointer: PointerPosition { x: 90, y: 90 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndIconDrag { screen: SCREEN },
        );

        let placed = state.icon_positions.get(&ShortcutId::new("b")).unwrap();
        assert!(!placed.approx_eq(IconPoint::new(100.0, 100.0), 0.001));
    }

    #[test]
    fn drop_collisions_count_default_cells_of_unplaced_icons() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        for name in ["a", "b"] {
            state.shortcuts.push(ShortcutRecord {
                id: ShortcutId::new(name),
                app_id: app(name),
            });
        }
        // Neither icon has a stored position; `a` sits on its default cell
        // (0, 0) and `b` below it on (0, 1).

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginIconDrag {
                shortcut_id: ShortcutId::new("b"),
                pointer: PointerPosition { x: 200, y: 200 },
                origin_px: IconPoint::new(10.0, 100.0),
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateIconDrag {
                pointer: PointerPosition { x: 200, y: 110 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndIconDrag { screen: SCREEN },
        );

        // The drop lands on `a`'s default cell, so `b` is pushed to the
        // nearest free neighbor instead of overlapping.
        assert_eq!(
            state.icon_positions.get(&ShortcutId::new("b")),
            Some(&IconPoint::new(100.0, 10.0))
        );
    }

    #[test]
    fn widget_drag_moves_in_unscaled_units() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        state.display.zoom = 2.0;
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AddWidget {
                kind: "clock".to_string(),
                position: IconPoint::new(100.0, 100.0),
            },
        );
        let id = state.widgets[0].id;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWidgetDrag {
                widget_id: id,
                pointer: PointerPosition { x: 400, y: 400 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWidgetDrag {
                pointer: PointerPosition { x: 500, y: 460 },
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndWidgetDrag { screen: SCREEN },
        );

        // 100 and 60 pixels of pointer travel are 50 and 30 stored units
        // at 2x zoom.
        assert_eq!(state.widgets[0].position, IconPoint::new(150.0, 130.0));
        assert_eq!(effects, vec![SessionEffect::PersistWidgets]);
        assert!(interaction.widget_drag.is_none());
    }

    #[test]
    fn a_short_widget_press_does_not_move_or_persist() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AddWidget {
                kind: "clock".to_string(),
                position: IconPoint::new(100.0, 100.0),
            },
        );
        let id = state.widgets[0].id;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::BeginWidgetDrag {
                widget_id: id,
                pointer: PointerPosition { x: 400, y: 400 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::UpdateWidgetDrag {
                pointer: PointerPosition { x: 402, y: 401 },
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::EndWidgetDrag { screen: SCREEN },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(state.widgets[0].position, IconPoint::new(100.0, 100.0));
        assert!(interaction.widget_drag.is_none());
    }

    #[test]
    fn zoom_changes_clamp_and_reconcile() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SetDisplayZoom {
                zoom: 9.0,
                screen: SCREEN,
            },
        );
        assert_eq!(state.display.zoom, MAX_ZOOM);
        assert!(effects.contains(&SessionEffect::PersistSession));

        // Same clamped value again: no change, no effects.
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SetDisplayZoom {
                zoom: 2.0,
                screen: SCREEN,
            },
        );
        assert_eq!(effects, Vec::new());
    }

    #[test]
    fn merge_props_patches_and_removes_keys() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "directory");
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::MergeWindowProps {
                window_id: id,
                patch: json!({"tab": "overview", "draft": {"subject": "hi"}}),
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::MergeWindowProps {
                window_id: id,
                patch: json!({"tab": "people", "draft": null}),
            },
        );
        assert_eq!(state.window(id).unwrap().props, json!({"tab": "people"}));
    }

    #[test]
    fn constrain_rederives_snapped_rects_and_clamps_the_rest() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let snapped = open(&mut state, &mut interaction, "directory");
        finish_animation(&mut state, &mut interaction, snapped);
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::SnapWindow {
                window_id: snapped,
                zone: SnapZone::Left,
                screen: SCREEN,
            },
        );
        let floating = open(&mut state, &mut interaction, "leave");
        finish_animation(&mut state, &mut interaction, floating);
        state.window_mut(floating).unwrap().rect.x = 5000;

        let narrow = ScreenBounds {
            width: 1280,
            height: 800,
            taskbar_height: 48,
        };
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ConstrainToScreen { screen: narrow },
        );

        assert_eq!(
            state.window(snapped).unwrap().rect,
            snap_target_rect(SnapZone::Left, narrow)
        );
        assert!(state.window(floating).unwrap().rect.x <= narrow.width - 48);
        assert_eq!(effects, vec![SessionEffect::PersistSession]);

        // A second pass with the same viewport changes nothing.
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ConstrainToScreen { screen: narrow },
        );
        assert_eq!(effects, Vec::new());
    }

    #[test]
    fn hydrate_normalizes_focus_z_and_desktop_references() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let mut donor = SessionState::default();
        let mut donor_interaction = InteractionState::default();
        let a = open(&mut donor, &mut donor_interaction, "directory");
        let b = open(&mut donor, &mut donor_interaction, "leave");

        let mut snapshot = SessionSnapshot::capture(&donor);
        // Corrupt the snapshot: two focused windows, a bogus desktop ref,
        // gapped z values, and an out-of-range zoom.
        snapshot.windows[0].is_focused = true;
        snapshot.windows[0].desktop_id = DesktopId(77);
        snapshot.windows[0].z_index = 40;
        snapshot.windows[1].z_index = 90;
        snapshot.display.zoom = 12.0;

        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::HydrateSnapshot(snapshot),
        );

        assert_eq!(state.windows.iter().filter(|w| w.is_focused).count(), 1);
        assert_eq!(state.focused_window_id(), Some(b));
        assert_eq!(state.window(a).unwrap().desktop_id, DesktopId(1));
        assert_eq!(state.window(a).unwrap().z_index, 1);
        assert_eq!(state.window(b).unwrap().z_index, 2);
        assert_eq!(state.next_z_index, 3);
        assert_eq!(state.next_window_id, b.0 + 1);
        assert_eq!(state.display.zoom, MAX_ZOOM);
    }

    #[test]
    fn reconcile_applies_moves_and_emits_one_patch() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        for name in ["a", "b", "c"] {
            state.shortcuts.push(ShortcutRecord {
                id: ShortcutId::new(name),
                app_id: app(name),
            });
        }

        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ReconcileIcons { screen: SCREEN },
        );
        assert_eq!(state.icon_positions.len(), 3);
        match &effects[..] {
            [SessionEffect::PersistIconLayout(patch)] => {
                assert_eq!(patch.positions.len(), 3);
                assert!(patch.removed.is_empty());
            }
            other => panic!("unexpected effects: {other:?}"),
        }

        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ReconcileIcons { screen: SCREEN },
        );
        assert_eq!(effects, Vec::new());
    }

    #[test]
    fn widgets_add_move_and_constrain() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::AddWidget {
                kind: "clock".to_string(),
                position: IconPoint::new(100.0, 100.0),
            },
        );
        let id = state.widgets[0].id;
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::MoveWidget {
                widget_id: id,
                position: IconPoint::new(5000.0, 100.0),
            },
        );
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ConstrainWidgets { screen: SCREEN },
        );
        assert!(state.widgets[0].position.x <= SCREEN.width as f64);
        assert_eq!(effects, vec![SessionEffect::PersistWidgets]);

        dispatch(&mut state, &mut interaction, SessionAction::RemoveWidget(id));
        assert!(state.widgets.is_empty());
    }

    #[test]
    fn hydrate_icon_layout_installs_positions_without_effects() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let mut positions = IconPositionMap::new();
        positions.insert(ShortcutId::new("a"), IconPoint::new(10.0, 10.0));
        let effects = dispatch(
            &mut state,
            &mut interaction,
            SessionAction::HydrateIconLayout(positions.clone()),
        );
        assert_eq!(effects, Vec::new());
        assert_eq!(state.icon_positions, positions);
    }

    #[test]
    fn taskbar_toggle_cycles_focus_minimize_restore() {
        let mut state = SessionState::default();
        let mut interaction = InteractionState::default();
        let first = open(&mut state, &mut interaction, "directory");
        let second = open(&mut state, &mut interaction, "leave");
        finish_animation(&mut state, &mut interaction, first);
        finish_animation(&mut state, &mut interaction, second);

        // Unfocused: focus it.
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ToggleTaskbarWindow(first),
        );
        assert_eq!(state.focused_window_id(), Some(first));

        // Focused: start minimizing.
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ToggleTaskbarWindow(first),
        );
        assert_eq!(
            state.window(first).unwrap().animation,
            WindowAnimation::Minimizing
        );
        finish_animation(&mut state, &mut interaction, first);
        assert!(state.window(first).unwrap().minimized);

        // Minimized: restore and focus.
        dispatch(
            &mut state,
            &mut interaction,
            SessionAction::ToggleTaskbarWindow(first),
        );
        assert!(!state.window(first).unwrap().minimized);
        assert_eq!(state.focused_window_id(), Some(first));
    }
}
