//! Debounced persistence writers for the session, icon, and widget
//! namespaces.
//!
//! Reducer persist effects land in a [`TrailingDebounce`] per namespace; a
//! timer re-checks the debouncer after the quiet period and performs the
//! actual store write. Icon writes go out as sparse merge patches so two
//! moved icons never rewrite the whole layout.

use leptos::{logging, spawn_local, SignalGetUntracked};
use platform_prefs::{
    save_namespace_typed, ICON_LAYOUT_NAMESPACE, SESSION_STATE_NAMESPACE, WIDGET_LAYOUT_NAMESPACE,
};
use serde_json::{json, Value};

use desktop_session::{
    model::{ICON_LAYOUT_SCHEMA_VERSION, SESSION_SCHEMA_VERSION, WIDGET_LAYOUT_SCHEMA_VERSION},
    IconLayoutPatch, SessionSnapshot, TrailingDebounce, WidgetSnapshot, LAYOUT_DEBOUNCE_MS,
    SESSION_DEBOUNCE_MS,
};

use crate::{
    host::{now_ms, set_timeout, ShellHostContext},
    runtime_context::SessionRuntimeContext,
};

pub(super) fn persist_session(host: ShellHostContext, runtime: SessionRuntimeContext) {
    let snapshot = SessionSnapshot::capture(&runtime.state.get_untracked());
    let newly_pending = {
        let debounce = host.session_debounce();
        let mut debounce = debounce.borrow_mut();
        let was_pending = debounce.is_pending();
        debounce.submit(snapshot, now_ms());
        !was_pending && debounce.is_pending()
    };
    if newly_pending {
        runtime.begin_save();
    }
    schedule_flush(SESSION_DEBOUNCE_MS, {
        let host = host.clone();
        move || flush_session(host, runtime)
    });
}

pub(super) fn persist_icon_patch(
    host: ShellHostContext,
    runtime: SessionRuntimeContext,
    patch: IconLayoutPatch,
) {
    {
        let guard = host.icon_guard();
        let mut guard = guard.borrow_mut();
        for (shortcut_id, position) in &patch.positions {
            guard.mark_optimistic(shortcut_id.clone(), *position);
        }
        for shortcut_id in &patch.removed {
            guard.forget(shortcut_id);
        }
    }

    let newly_pending = {
        let debounce = host.icon_debounce();
        let mut debounce = debounce.borrow_mut();
        let was_pending = debounce.is_pending();
        let mut merged = debounce.flush().unwrap_or_default();
        merged.merge(patch);
        debounce.submit(merged, now_ms());
        !was_pending
    };
    if newly_pending {
        runtime.begin_save();
    }
    schedule_flush(LAYOUT_DEBOUNCE_MS, {
        let host = host.clone();
        move || flush_icons(host, runtime)
    });
}

pub(super) fn persist_widgets(host: ShellHostContext, runtime: SessionRuntimeContext) {
    let snapshot = WidgetSnapshot::capture(&runtime.state.get_untracked());
    let newly_pending = {
        let debounce = host.widget_debounce();
        let mut debounce = debounce.borrow_mut();
        let was_pending = debounce.is_pending();
        debounce.submit(snapshot, now_ms());
        !was_pending && debounce.is_pending()
    };
    if newly_pending {
        runtime.begin_save();
    }
    schedule_flush(LAYOUT_DEBOUNCE_MS, {
        let host = host.clone();
        move || flush_widgets(host, runtime)
    });
}

pub(super) fn flush_all(host: ShellHostContext, runtime: SessionRuntimeContext) {
    if let Some(snapshot) = host.session_debounce().borrow_mut().flush() {
        write_session(host.clone(), runtime, snapshot);
    }
    if let Some(patch) = host.icon_debounce().borrow_mut().flush() {
        write_icon_patch(host.clone(), runtime, patch);
    }
    if let Some(snapshot) = host.widget_debounce().borrow_mut().flush() {
        write_widgets(host, runtime, snapshot);
    }
}

/// Re-checks a debouncer shortly after its quiet period would elapse. A
/// resubmission in the meantime leaves the poll empty and arms a later timer.
fn schedule_flush(quiet_ms: u64, flush: impl FnOnce() + 'static) {
    set_timeout(quiet_ms as u32 + 1, flush);
}

fn release<T: Clone + PartialEq>(debounce: &mut TrailingDebounce<T>) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        debounce.poll(now_ms())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        debounce.flush()
    }
}

fn flush_session(host: ShellHostContext, runtime: SessionRuntimeContext) {
    let released = release(&mut host.session_debounce().borrow_mut());
    if let Some(snapshot) = released {
        write_session(host, runtime, snapshot);
    }
}

fn write_session(host: ShellHostContext, runtime: SessionRuntimeContext, snapshot: SessionSnapshot) {
    spawn_local(async move {
        let store = host.preference_store();
        match save_namespace_typed(
            store.as_ref(),
            SESSION_STATE_NAMESPACE,
            SESSION_SCHEMA_VERSION,
            &snapshot,
        )
        .await
        {
            Ok(()) => {
                host.session_debounce().borrow_mut().mark_written(snapshot);
                runtime.finish_save(true);
            }
            Err(err) => {
                logging::warn!("persist session snapshot failed: {err}");
                runtime.finish_save(false);
            }
        }
    });
}

fn flush_icons(host: ShellHostContext, runtime: SessionRuntimeContext) {
    let released = release(&mut host.icon_debounce().borrow_mut());
    if let Some(patch) = released {
        write_icon_patch(host, runtime, patch);
    }
}

fn write_icon_patch(host: ShellHostContext, runtime: SessionRuntimeContext, patch: IconLayoutPatch) {
    let payload = icon_patch_payload(&patch);
    spawn_local(async move {
        let store = host.preference_store();
        match store
            .merge_patch(ICON_LAYOUT_NAMESPACE, ICON_LAYOUT_SCHEMA_VERSION, &payload)
            .await
        {
            Ok(()) => {
                // The write landed; treat it as the remote echo so the
                // optimistic entries stop suppressing refreshes.
                let guard = host.icon_guard();
                let mut guard = guard.borrow_mut();
                for (shortcut_id, position) in &patch.positions {
                    let _ = guard.confirm_from_remote(shortcut_id, *position);
                }
                runtime.finish_save(true);
            }
            Err(err) => {
                logging::warn!("persist icon layout patch failed: {err}");
                runtime.finish_save(false);
            }
        }
    });
}

fn flush_widgets(host: ShellHostContext, runtime: SessionRuntimeContext) {
    let released = release(&mut host.widget_debounce().borrow_mut());
    if let Some(snapshot) = released {
        write_widgets(host, runtime, snapshot);
    }
}

fn write_widgets(host: ShellHostContext, runtime: SessionRuntimeContext, snapshot: WidgetSnapshot) {
    spawn_local(async move {
        let store = host.preference_store();
        match save_namespace_typed(
            store.as_ref(),
            WIDGET_LAYOUT_NAMESPACE,
            WIDGET_LAYOUT_SCHEMA_VERSION,
            &snapshot,
        )
        .await
        {
            Ok(()) => {
                host.widget_debounce().borrow_mut().mark_written(snapshot);
                runtime.finish_save(true);
            }
            Err(err) => {
                logging::warn!("persist widget layout failed: {err}");
                runtime.finish_save(false);
            }
        }
    });
}

/// Converts a sparse patch into the JSON merge-patch body the store expects:
/// moved icons carry their new point, removed icons carry `null`.
fn icon_patch_payload(patch: &IconLayoutPatch) -> Value {
    let mut positions = serde_json::Map::new();
    for (shortcut_id, position) in &patch.positions {
        positions.insert(
            shortcut_id.to_string(),
            json!({"x": position.x, "y": position.y}),
        );
    }
    for shortcut_id in &patch.removed {
        positions.insert(shortcut_id.to_string(), Value::Null);
    }
    json!({
        "schema_version": ICON_LAYOUT_SCHEMA_VERSION,
        "positions": Value::Object(positions),
    })
}
