//! Window chrome: titlebar, control buttons, resize handles, and the mounted
//! application body.

use desktop_session::{
    ResizeEdge, SessionAction, WindowAnimation, WindowId, WindowRecord, WindowRect,
};
use leptos::*;
use portal_app_contract::WindowContext;

use crate::{
    apps,
    components::{
        current_window_space_bounds, pointer_from_pointer_event, stop_mouse_event, unscale_pointer,
    },
    runtime_context::use_session_runtime,
};

const RESIZE_EDGES: [ResizeEdge; 8] = [
    ResizeEdge::North,
    ResizeEdge::South,
    ResizeEdge::East,
    ResizeEdge::West,
    ResizeEdge::NorthEast,
    ResizeEdge::NorthWest,
    ResizeEdge::SouthEast,
    ResizeEdge::SouthWest,
];

fn resize_edge_class(edge: ResizeEdge) -> &'static str {
    match edge {
        ResizeEdge::North => "edge-n",
        ResizeEdge::South => "edge-s",
        ResizeEdge::East => "edge-e",
        ResizeEdge::West => "edge-w",
        ResizeEdge::NorthEast => "edge-ne",
        ResizeEdge::NorthWest => "edge-nw",
        ResizeEdge::SouthEast => "edge-se",
        ResizeEdge::SouthWest => "edge-sw",
    }
}

/// Inline geometry style for an unscaled window rect rendered at `zoom`.
///
/// Window geometry is stored in unscaled units; the zoom factor is applied
/// multiplicatively here, at the render boundary.
fn scaled_rect_style(rect: WindowRect, zoom: f64) -> String {
    format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;",
        rect.x as f64 * zoom,
        rect.y as f64 * zoom,
        rect.w as f64 * zoom,
        rect.h as f64 * zoom,
    )
}

fn animation_class(animation: WindowAnimation) -> &'static str {
    match animation {
        WindowAnimation::None => "",
        WindowAnimation::Opening => "anim-opening",
        WindowAnimation::Closing => "anim-closing",
        WindowAnimation::Minimizing => "anim-minimizing",
        WindowAnimation::Restoring => "anim-restoring",
        WindowAnimation::Maximizing => "anim-maximizing",
    }
}

/// Routes subsequent pointer events to the pressed element for the gesture's
/// duration. A failure here degrades to plain bubbling, so it is ignored.
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        if let Some(target) = ev
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        {
            let _ = target.set_pointer_capture(ev.pointer_id());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = ev;
    }
}

#[component]
/// A single managed window on the active desktop.
pub fn DesktopWindow(
    /// Id of the window record to render.
    window_id: WindowId,
) -> impl IntoView {
    let runtime = use_session_runtime();
    let window = Signal::derive(move || {
        runtime
            .state
            .get()
            .window(window_id)
            .cloned()
    });

    let on_titlebar_down = move |ev: web_sys::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        ev.stop_propagation();
        try_set_pointer_capture(&ev);
        let zoom = runtime.state.get_untracked().display.zoom;
        runtime.dispatch_action(SessionAction::BeginWindowDrag {
            window_id,
            pointer: unscale_pointer(pointer_from_pointer_event(&ev), zoom),
        });
    };
    let on_titlebar_dblclick = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.dispatch_action(SessionAction::ToggleMaximize {
            window_id,
            screen: current_window_space_bounds(runtime),
        });
    };
    let on_minimize = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.dispatch_action(SessionAction::MinimizeWindow(window_id));
    };
    let on_toggle_maximize = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.dispatch_action(SessionAction::ToggleMaximize {
            window_id,
            screen: current_window_space_bounds(runtime),
        });
    };
    let on_close = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.dispatch_action(SessionAction::CloseWindow(window_id));
    };
    let on_body_down = move |_| {
        runtime.dispatch_action(SessionAction::FocusWindow(window_id));
    };

    view! {
        <Show when=move || window.get().is_some() fallback=|| ()>
            {move || {
                let record = window.get().expect("window present while shown");
                let zoom = runtime.state.get().display.zoom;
                view! { <WindowFrame
                    record=record
                    zoom=zoom
                    on_titlebar_down=on_titlebar_down
                    on_titlebar_dblclick=on_titlebar_dblclick
                    on_minimize=on_minimize
                    on_toggle_maximize=on_toggle_maximize
                    on_close=on_close
                    on_body_down=on_body_down
                /> }
            }}
        </Show>
    }
}

#[component]
fn WindowFrame(
    record: WindowRecord,
    zoom: f64,
    on_titlebar_down: impl Fn(web_sys::PointerEvent) + Copy + 'static,
    on_titlebar_dblclick: impl Fn(web_sys::MouseEvent) + Copy + 'static,
    on_minimize: impl Fn(web_sys::MouseEvent) + Copy + 'static,
    on_toggle_maximize: impl Fn(web_sys::MouseEvent) + Copy + 'static,
    on_close: impl Fn(web_sys::MouseEvent) + Copy + 'static,
    on_body_down: impl Fn(web_sys::PointerEvent) + Copy + 'static,
) -> impl IntoView {
    let runtime = use_session_runtime();
    let window_id = record.id;

    let mut classes = vec!["desktop-window"];
    if record.is_focused {
        classes.push("focused");
    }
    if record.minimized {
        classes.push("minimized");
    }
    if record.maximized() {
        classes.push("maximized");
    } else if record.snap_zone.is_some() {
        classes.push("snapped");
    }
    let anim = animation_class(record.animation);
    if !anim.is_empty() {
        classes.push(anim);
    }

    let style = format!(
        "{}z-index:{};",
        scaled_rect_style(record.rect, zoom),
        record.z_index,
    );
    let resizable = !record.minimized && record.snap_zone.is_none();
    let maximize_label = if record.maximized() {
        "Restore"
    } else {
        "Maximize"
    };
    let context = WindowContext {
        window_id: window_id.0,
        refresh_key: record.refresh_key,
        props: record.props.clone(),
    };
    let body = apps::app_module(&record.app_id).mount(context);

    view! {
        <section class=classes.join(" ") style=style on:pointerdown=on_body_down>
            <header
                class="window-titlebar"
                on:pointerdown=on_titlebar_down
                on:dblclick=on_titlebar_dblclick
            >
                <span class=format!("window-icon icon-{}", record.icon_token)></span>
                <span class="window-title">{record.title.clone()}</span>
                <span class="window-controls">
                    <button aria-label="Minimize" on:click=on_minimize>
                        "_"
                    </button>
                    <button aria-label=maximize_label on:click=on_toggle_maximize>
                        "[]"
                    </button>
                    <button aria-label="Close" on:click=on_close>
                        "x"
                    </button>
                </span>
            </header>
            <div class="window-body">{body}</div>
            <Show when=move || resizable fallback=|| ()>
                {RESIZE_EDGES
                    .iter()
                    .map(|&edge| {
                        view! {
                            <div
                                class=format!("window-resize-handle {}", resize_edge_class(edge))
                                on:pointerdown=move |ev: web_sys::PointerEvent| {
                                    if ev.button() != 0 {
                                        return;
                                    }
                                    ev.stop_propagation();
                                    try_set_pointer_capture(&ev);
                                    runtime
                                        .dispatch_action(SessionAction::BeginWindowResize {
                                            window_id,
                                            edge,
                                            pointer: pointer_from_pointer_event(&ev),
                                        });
                                }
                            />
                        }
                    })
                    .collect_view()}
            </Show>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn window_geometry_is_scaled_by_the_zoom_factor() {
        let rect = WindowRect {
            x: 40,
            y: 48,
            w: 520,
            h: 380,
        };
        assert_eq!(
            scaled_rect_style(rect, 1.0),
            "left:40px;top:48px;width:520px;height:380px;"
        );
        assert_eq!(
            scaled_rect_style(rect, 2.0),
            "left:80px;top:96px;width:1040px;height:760px;"
        );
        assert_eq!(
            scaled_rect_style(rect, 0.5),
            "left:20px;top:24px;width:260px;height:190px;"
        );
    }
}
