//! Desktop shortcut grid and the drag ghost rendered during an icon drag.

use desktop_session::{
    cell_origin_unscaled, default_cell_for_index, GridSpec, IconPoint, SessionAction, ShortcutId,
    ShortcutRecord,
};
use leptos::*;

use crate::{
    apps,
    components::{
        current_screen_bounds, pointer_from_pointer_event, stop_mouse_event,
    },
    runtime_context::use_session_runtime,
};

/// A shortcut tile resolved to its on-screen (scaled) origin.
#[derive(Clone, PartialEq)]
struct IconTile {
    shortcut: ShortcutRecord,
    origin_px: IconPoint,
}

#[component]
pub(super) fn DesktopIconLayer() -> impl IntoView {
    let runtime = use_session_runtime();
    let state = runtime.state;

    let tiles = Signal::derive(move || {
        let session = state.get();
        let grid = GridSpec::new(session.display.zoom);
        let screen = current_screen_bounds(runtime);
        let (_, rows) = grid.bounds(screen);
        session
            .shortcuts
            .iter()
            .enumerate()
            .map(|(index, shortcut)| {
                let unscaled = session
                    .icon_positions
                    .get(&shortcut.id)
                    .copied()
                    .unwrap_or_else(|| {
                        cell_origin_unscaled(default_cell_for_index(index, rows))
                    });
                IconTile {
                    shortcut: shortcut.clone(),
                    origin_px: IconPoint::new(
                        unscaled.x * session.display.zoom,
                        unscaled.y * session.display.zoom,
                    ),
                }
            })
            .collect::<Vec<_>>()
    });
    let tile_size = Signal::derive(move || {
        GridSpec::new(state.get().display.zoom).scaled_cell()
    });

    view! {
        <div class="desktop-icon-layer">
            <For each=move || tiles.get() key=|tile| tile.shortcut.id.clone() let:tile>
                <DesktopIcon tile=tile size=tile_size />
            </For>
            <IconDragGhost size=tile_size />
        </div>
    }
}

#[component]
fn DesktopIcon(tile: IconTile, size: Signal<f64>) -> impl IntoView {
    let runtime = use_session_runtime();
    let shortcut_id = tile.shortcut.id.clone();
    let app_id = tile.shortcut.app_id.clone();
    let label = apps::display_name(&app_id);
    let icon_token = apps::icon_token(&app_id);
    let origin = tile.origin_px;

    let dragging = {
        let shortcut_id = shortcut_id.clone();
        Signal::derive(move || {
            runtime
                .interaction
                .get()
                .icon_drag
                .as_ref()
                .is_some_and(|drag| drag.committed && drag.shortcut_id == shortcut_id)
        })
    };

    let on_pointer_down = {
        let shortcut_id = shortcut_id.clone();
        move |ev: web_sys::PointerEvent| {
            if ev.button() != 0 {
                return;
            }
            ev.stop_propagation();
            runtime.dispatch_action(SessionAction::BeginIconDrag {
                shortcut_id: shortcut_id.clone(),
                pointer: pointer_from_pointer_event(&ev),
                origin_px: origin,
            });
        }
    };
    let on_remove = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.dispatch_action(SessionAction::RemoveShortcut(shortcut_id.clone()));
    };

    view! {
        <div
            class="desktop-icon"
            class:dragging=move || dragging.get()
            style=move || {
                format!(
                    "left:{}px;top:{}px;width:{}px;height:{}px;",
                    origin.x,
                    origin.y,
                    size.get(),
                    size.get()
                )
            }
            on:pointerdown=on_pointer_down
            on:contextmenu=on_remove
        >
            <span class=format!("icon-glyph icon-{icon_token}")></span>
            <span class="icon-label">{label}</span>
        </div>
    }
}

#[component]
/// Translucent copy of the dragged icon that follows the pointer once the
/// drag commits.
fn IconDragGhost(size: Signal<f64>) -> impl IntoView {
    let runtime = use_session_runtime();
    let ghost = Signal::derive(move || {
        runtime
            .interaction
            .get()
            .icon_drag
            .filter(|drag| drag.committed)
            .map(|drag| {
                let dx = f64::from(drag.pointer_current.x - drag.pointer_start.x);
                let dy = f64::from(drag.pointer_current.y - drag.pointer_start.y);
                (
                    drag.shortcut_id,
                    IconPoint::new(drag.origin_px.x + dx, drag.origin_px.y + dy),
                )
            })
    });

    view! {
        <Show when=move || ghost.get().is_some() fallback=|| ()>
            {move || {
                let (shortcut_id, position) = ghost.get().expect("ghost present while shown");
                let label = label_for_shortcut(&shortcut_id);
                view! {
                    <div
                        class="desktop-icon icon-ghost"
                        aria-hidden="true"
                        style=format!(
                            "left:{}px;top:{}px;width:{}px;height:{}px;",
                            position.x,
                            position.y,
                            size.get_untracked(),
                            size.get_untracked()
                        )
                    >
                        <span class="icon-label">{label}</span>
                    </div>
                }
                    .into_view()
            }}
        </Show>
    }
}

fn label_for_shortcut(shortcut_id: &ShortcutId) -> String {
    let runtime = use_session_runtime();
    runtime
        .state
        .get_untracked()
        .shortcuts
        .iter()
        .find(|shortcut| &shortcut.id == shortcut_id)
        .map(|shortcut| apps::display_name(&shortcut.app_id))
        .unwrap_or_default()
}
