//! Taskbar: launcher, desktop switcher, window buttons, and the display
//! controls tray.

use desktop_session::{IconPoint, SessionAction, VirtualDesktop};
use leptos::*;

use crate::{
    apps,
    components::{current_screen_bounds, ordered_taskbar_windows, stop_mouse_event},
    runtime_context::use_session_runtime,
};

const ZOOM_STEP: f64 = 0.1;
const TASKBAR_SCALE_STEP: f64 = 0.25;

/// Widget kinds offered by the tray menu.
const WIDGET_KINDS: [&str; 3] = ["clock", "announcements", "quick-links"];

/// New widgets cascade from this unscaled origin.
const WIDGET_BASE_OFFSET: f64 = 120.0;
const WIDGET_STEP: f64 = 24.0;

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_session_runtime();
    let state = runtime.state;
    let launcher_open = create_rw_signal(false);
    let widget_menu_open = create_rw_signal(false);

    let desktops = Signal::derive(move || {
        let mut desktops = state.get().desktops;
        desktops.sort_by_key(|desktop| desktop.order);
        desktops
    });
    let taskbar_windows = Signal::derive(move || {
        let session = state.get();
        ordered_taskbar_windows(
            &session
                .windows
                .iter()
                .filter(|window| window.desktop_id == session.active_desktop_id)
                .cloned()
                .collect::<Vec<_>>(),
        )
    });
    let sync = Signal::derive(move || runtime.sync.get());
    let height = Signal::derive(move || state.get().display.taskbar_height());

    let add_desktop = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        let count = state.get_untracked().desktops.len();
        runtime.dispatch_action(SessionAction::AddDesktop {
            name: format!("Desktop {}", count + 1),
        });
    };
    let adjust_zoom = move |delta: f64| {
        let display = state.get_untracked().display;
        runtime.dispatch_action(SessionAction::SetDisplayZoom {
            zoom: display.zoom + delta,
            screen: current_screen_bounds(runtime),
        });
    };
    let adjust_taskbar_scale = move |delta: f64| {
        let display = state.get_untracked().display;
        runtime.dispatch_action(SessionAction::SetTaskbarScale {
            scale: display.taskbar_scale + delta,
        });
    };
    let add_widget = move |kind: &str| {
        // Stagger new widgets so stacked adds stay individually grabbable.
        let count = state.get_untracked().widgets.len() as f64;
        runtime.dispatch_action(SessionAction::AddWidget {
            kind: kind.to_string(),
            position: IconPoint::new(
                WIDGET_BASE_OFFSET + WIDGET_STEP * count,
                WIDGET_BASE_OFFSET + WIDGET_STEP * count,
            ),
        });
    };

    view! {
        <footer class="desktop-taskbar" style=move || format!("height:{}px;", height.get())>
            <div class="taskbar-launcher">
                <button
                    aria-label="Open launcher"
                    aria-expanded=move || launcher_open.get().to_string()
                    on:click=move |ev| {
                        stop_mouse_event(&ev);
                        launcher_open.update(|open| *open = !*open);
                    }
                >
                    "Portal"
                </button>
                <Show when=move || launcher_open.get() fallback=|| ()>
                    <ul class="launcher-menu">
                        {apps::launcher_entries(runtime.role)
                            .into_iter()
                            .map(|entry| {
                                let app_id = entry.app_id.clone();
                                view! {
                                    <li>
                                        <button on:click=move |ev| {
                                            stop_mouse_event(&ev);
                                            launcher_open.set(false);
                                            runtime
                                                .dispatch_action(
                                                    SessionAction::OpenWindow(
                                                        apps::open_request_for(&app_id),
                                                    ),
                                                );
                                        }>{entry.display_name.clone()}</button>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </Show>
            </div>

            <nav class="taskbar-desktops">
                <For each=move || desktops.get() key=|desktop| desktop.id.0 let:desktop>
                    <DesktopChip desktop=desktop />
                </For>
                <button aria-label="Add desktop" on:click=add_desktop>
                    "+"
                </button>
            </nav>

            <div class="taskbar-windows">
                <For each=move || taskbar_windows.get() key=|window| window.id.0 let:window>
                    {{
                        let window_id = window.id;
                        let mut classes = vec!["taskbar-window-button"];
                        if window.is_focused {
                            classes.push("focused");
                        }
                        if window.minimized {
                            classes.push("minimized");
                        }
                        view! {
                            <button
                                class=classes.join(" ")
                                on:click=move |ev| {
                                    stop_mouse_event(&ev);
                                    runtime
                                        .dispatch_action(
                                            SessionAction::ToggleTaskbarWindow(window_id),
                                        );
                                }
                            >
                                <span class=format!("window-icon icon-{}", window.icon_token)></span>
                                {window.title.clone()}
                            </button>
                        }
                    }}
                </For>
            </div>

            <div class="taskbar-tray">
                <button aria-label="Zoom out" on:click=move |ev| {
                    stop_mouse_event(&ev);
                    adjust_zoom(-ZOOM_STEP);
                }>
                    "-"
                </button>
                <span class="tray-zoom">
                    {move || format!("{:.0}%", state.get().display.zoom * 100.0)}
                </span>
                <button aria-label="Zoom in" on:click=move |ev| {
                    stop_mouse_event(&ev);
                    adjust_zoom(ZOOM_STEP);
                }>
                    "+"
                </button>
                <button aria-label="Shrink taskbar" on:click=move |ev| {
                    stop_mouse_event(&ev);
                    adjust_taskbar_scale(-TASKBAR_SCALE_STEP);
                }>
                    "v"
                </button>
                <button aria-label="Grow taskbar" on:click=move |ev| {
                    stop_mouse_event(&ev);
                    adjust_taskbar_scale(TASKBAR_SCALE_STEP);
                }>
                    "^"
                </button>
                <span class="tray-widgets">
                    <button
                        aria-label="Add widget"
                        aria-expanded=move || widget_menu_open.get().to_string()
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            widget_menu_open.update(|open| *open = !*open);
                        }
                    >
                        "Widgets"
                    </button>
                    <Show when=move || widget_menu_open.get() fallback=|| ()>
                        <ul class="widget-menu">
                            {WIDGET_KINDS
                                .iter()
                                .map(|&kind| {
                                    view! {
                                        <li>
                                            <button on:click=move |ev| {
                                                stop_mouse_event(&ev);
                                                widget_menu_open.set(false);
                                                add_widget(kind);
                                            }>{kind}</button>
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                    </Show>
                </span>
                <span
                    class="tray-sync"
                    data-state=move || {
                        let status = sync.get();
                        if status.is_syncing() {
                            "saving"
                        } else if status.is_stale() {
                            "stale"
                        } else {
                            "idle"
                        }
                    }
                >
                    {move || {
                        let status = sync.get();
                        if status.is_syncing() {
                            "Saving"
                        } else if status.is_stale() {
                            "Not saved"
                        } else {
                            "Saved"
                        }
                    }}
                </span>
            </div>
        </footer>
    }
}

#[component]
fn DesktopChip(desktop: VirtualDesktop) -> impl IntoView {
    let runtime = use_session_runtime();
    let desktop_id = desktop.id;
    let is_active = Signal::derive(move || runtime.state.get().active_desktop_id == desktop_id);
    let is_default = runtime.state.get_untracked().default_desktop_id == desktop_id;

    view! {
        <span class="taskbar-desktop-chip" class:active=move || is_active.get()>
            <button
                aria-label=format!("Switch to {}", desktop.name)
                on:click=move |ev| {
                    stop_mouse_event(&ev);
                    runtime.dispatch_action(SessionAction::SetActiveDesktop(desktop_id));
                }
            >
                {desktop.name.clone()}
            </button>
            <Show when=move || !is_default fallback=|| ()>
                <button
                    class="desktop-remove"
                    aria-label="Remove desktop"
                    on:click=move |ev| {
                        stop_mouse_event(&ev);
                        runtime.dispatch_action(SessionAction::RemoveDesktop(desktop_id));
                    }
                >
                    "x"
                </button>
            </Show>
        </span>
    }
}
