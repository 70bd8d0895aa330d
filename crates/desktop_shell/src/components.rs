//! Desktop shell UI composition and interaction surfaces.

mod icons;
mod taskbar;
mod window;

use desktop_session::{
    snap_target_rect, PointerPosition, ScreenBounds, SessionAction, WindowRecord,
};
use leptos::*;

use self::{icons::DesktopIconLayer, taskbar::Taskbar, window::DesktopWindow};
use crate::{apps, host::desktop_screen_bounds, runtime_context::SessionRuntimeContext};

pub use crate::runtime_context::{use_session_runtime, SessionProvider};

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

/// Measures the viewport with the current display settings applied.
fn current_screen_bounds(runtime: SessionRuntimeContext) -> ScreenBounds {
    let display = runtime.state.get_untracked().display;
    desktop_screen_bounds(display.taskbar_height())
}

/// Converts a screen-pixel pointer position into window-space units.
///
/// Window geometry is stored unscaled and multiplied by the zoom factor at
/// render time, so pointer travel feeding window math divides it back out.
fn unscale_pointer(pointer: PointerPosition, zoom: f64) -> PointerPosition {
    PointerPosition {
        x: (pointer.x as f64 / zoom).round() as i32,
        y: (pointer.y as f64 / zoom).round() as i32,
    }
}

/// Viewport bounds in window-space units (screen pixels divided by zoom).
pub(crate) fn window_space_bounds(screen: ScreenBounds, zoom: f64) -> ScreenBounds {
    ScreenBounds {
        width: (screen.width as f64 / zoom).round() as i32,
        height: (screen.height as f64 / zoom).round() as i32,
        taskbar_height: (screen.taskbar_height as f64 / zoom).round() as i32,
    }
}

/// Measures the viewport in window-space units for window geometry actions.
fn current_window_space_bounds(runtime: SessionRuntimeContext) -> ScreenBounds {
    let display = runtime.state.get_untracked().display;
    window_space_bounds(desktop_screen_bounds(display.taskbar_height()), display.zoom)
}

fn end_active_pointer_interaction(runtime: SessionRuntimeContext) {
    let gesture = runtime.interaction.get_untracked();
    let screen = current_screen_bounds(runtime);

    if gesture.window_drag.is_some() {
        runtime.dispatch_action(SessionAction::EndWindowDrag {
            screen: current_window_space_bounds(runtime),
        });
    }
    if gesture.resize.is_some() {
        runtime.dispatch_action(SessionAction::EndWindowResize);
    }
    if gesture.widget_drag.is_some() {
        runtime.dispatch_action(SessionAction::EndWidgetDrag { screen });
    }
    if let Some(icon_drag) = gesture.icon_drag {
        let launch = if icon_drag.committed {
            None
        } else {
            // Sub-threshold release is an activation click.
            runtime
                .state
                .get_untracked()
                .shortcuts
                .iter()
                .find(|shortcut| shortcut.id == icon_drag.shortcut_id)
                .map(|shortcut| shortcut.app_id.clone())
        };
        runtime.dispatch_action(SessionAction::EndIconDrag { screen });
        if let Some(app_id) = launch {
            runtime.dispatch_action(SessionAction::OpenWindow(apps::open_request_for(&app_id)));
        }
    }
}

#[component]
/// Renders the full desktop shell: icon grid, widget layer, window layer,
/// snap preview, and taskbar.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_session_runtime();
    let state = runtime.state;

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        let pointer = pointer_from_pointer_event(&ev);
        let gesture = runtime.interaction.get_untracked();
        if !gesture.gesture_active() {
            return;
        }
        let zoom = runtime.state.get_untracked().display.zoom;

        if gesture.window_drag.is_some() {
            runtime.dispatch_action(SessionAction::UpdateWindowDrag {
                pointer: unscale_pointer(pointer, zoom),
                screen: current_window_space_bounds(runtime),
            });
        }
        if gesture.resize.is_some() {
            runtime.dispatch_action(SessionAction::UpdateWindowResize {
                pointer: unscale_pointer(pointer, zoom),
            });
        }
        if gesture.icon_drag.is_some() {
            runtime.dispatch_action(SessionAction::UpdateIconDrag { pointer });
        }
        if gesture.widget_drag.is_some() {
            runtime.dispatch_action(SessionAction::UpdateWidgetDrag { pointer });
        }
    };
    let on_pointer_end = move |_| end_active_pointer_interaction(runtime);

    let resize_listener = window_event_listener(ev::resize, move |_| {
        let screen = current_screen_bounds(runtime);
        runtime.dispatch_action(SessionAction::ConstrainToScreen {
            screen: current_window_space_bounds(runtime),
        });
        runtime.dispatch_action(SessionAction::ReconcileIcons { screen });
        runtime.dispatch_action(SessionAction::ConstrainWidgets { screen });
    });
    on_cleanup(move || resize_listener.remove());

    let pagehide_listener = window_event_listener(ev::pagehide, move |_| {
        runtime.host.get_value().flush_pending_writes(runtime);
    });
    on_cleanup(move || pagehide_listener.remove());

    let active_windows = Signal::derive(move || {
        let session = state.get();
        session
            .windows
            .iter()
            .filter(|window| window.desktop_id == session.active_desktop_id)
            .map(|window| window.id)
            .collect::<Vec<_>>()
    });

    view! {
        <div
            id="desktop-shell-root"
            class="desktop-shell"
            tabindex="-1"
            data-hydrated=move || runtime.hydrated.get().to_string()
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_end
            on:pointercancel=on_pointer_end
        >
            <div class="desktop-surface">
                <DesktopIconLayer />
                <DesktopWidgetLayer />
                <SnapPreview />
                <div class="desktop-window-layer">
                    <For each=move || active_windows.get() key=|id| id.0 let:window_id>
                        <DesktopWindow window_id=window_id />
                    </For>
                </div>
            </div>
            <Taskbar />
        </div>
    }
}

#[component]
/// Translucent overlay previewing the zone a committed drag would snap to.
fn SnapPreview() -> impl IntoView {
    let runtime = use_session_runtime();
    let candidate = Signal::derive(move || {
        runtime
            .interaction
            .get()
            .window_drag
            .as_ref()
            .filter(|drag| drag.committed)
            .and_then(|drag| drag.snap_candidate)
    });

    view! {
        <Show when=move || candidate.get().is_some() fallback=|| ()>
            {move || {
                let zone = candidate.get().expect("candidate present while shown");
                let zoom = runtime.state.get().display.zoom;
                // Snap targets are computed in window space; scale back up
                // for the screen-pixel overlay.
                let rect = snap_target_rect(zone, current_window_space_bounds(runtime));
                view! {
                    <div
                        class="snap-preview"
                        aria-hidden="true"
                        style=format!(
                            "left:{}px;top:{}px;width:{}px;height:{}px;",
                            rect.x as f64 * zoom,
                            rect.y as f64 * zoom,
                            rect.w as f64 * zoom,
                            rect.h as f64 * zoom,
                        )
                    />
                }
                    .into_view()
            }}
        </Show>
    }
}

#[component]
fn DesktopWidgetLayer() -> impl IntoView {
    let runtime = use_session_runtime();
    let state = runtime.state;
    let zoom = Signal::derive(move || state.get().display.zoom);

    view! {
        <div class="desktop-widget-layer">
            <For each=move || state.get().widgets key=|widget| widget.id.0 let:widget>
                {{
                    let widget_id = widget.id;
                    let position = widget.position;
                    view! {
                        <div
                            class=format!("desktop-widget widget-{}", widget.kind)
                            style=move || {
                                let scale = zoom.get();
                                format!(
                                    "left:{}px;top:{}px;transform:scale({});",
                                    position.x * scale,
                                    position.y * scale,
                                    scale
                                )
                            }
                            on:pointerdown=move |ev: web_sys::PointerEvent| {
                                if ev.button() != 0 {
                                    return;
                                }
                                ev.stop_propagation();
                                runtime.dispatch_action(SessionAction::BeginWidgetDrag {
                                    widget_id,
                                    pointer: pointer_from_pointer_event(&ev),
                                });
                            }
                        >
                            <span class="widget-kind">{widget.kind.clone()}</span>
                            <button
                                aria-label="Remove widget"
                                on:pointerdown=|ev: web_sys::PointerEvent| ev.stop_propagation()
                                on:click=move |ev| {
                                    stop_mouse_event(&ev);
                                    runtime.dispatch_action(SessionAction::RemoveWidget(widget_id));
                                }
                            >
                                "x"
                            </button>
                        </div>
                    }
                }}
            </For>
        </div>
    }
}

fn ordered_taskbar_windows(windows: &[WindowRecord]) -> Vec<WindowRecord> {
    let mut windows = windows.to_vec();
    windows.sort_by_key(|window| window.id.0);
    windows
}
