use desktop_session::{
    decode_session_payload,
    model::{IconPositionMap, SESSION_SCHEMA_VERSION},
    IconLayoutSnapshot, SessionAction, WidgetSnapshot,
};
use leptos::{create_effect, logging, spawn_local, Callable, SignalGetUntracked};
use platform_prefs::{
    decode_envelope_payload, save_namespace_typed, ICON_LAYOUT_NAMESPACE, SESSION_STATE_NAMESPACE,
    WIDGET_LAYOUT_NAMESPACE,
};

use crate::{
    apps,
    components::window_space_bounds,
    host::{desktop_screen_bounds, ShellHostContext},
    runtime_context::SessionRuntimeContext,
};

/// Boot sequence: hydrate the three preference namespaces, seed defaults for
/// a fresh profile, then run the one-shot reconcile and constrain passes
/// against the measured viewport.
pub(super) fn install_boot_hydration(host: ShellHostContext, runtime: SessionRuntimeContext) {
    create_effect(move |_| {
        let host = host.clone();
        spawn_local(async move {
            let store = host.preference_store();

            let mut seeded_profile = true;
            match store.load_envelope(SESSION_STATE_NAMESPACE).await {
                Ok(Some(envelope)) => {
                    match decode_session_payload(envelope.schema_version, &envelope.payload) {
                        Some(snapshot) => {
                            let migrated = envelope.schema_version != SESSION_SCHEMA_VERSION;
                            runtime
                                .dispatch
                                .call(SessionAction::HydrateSnapshot(snapshot.clone()));
                            seeded_profile = false;
                            if migrated {
                                if let Err(err) = save_namespace_typed(
                                    store.as_ref(),
                                    SESSION_STATE_NAMESPACE,
                                    SESSION_SCHEMA_VERSION,
                                    &snapshot,
                                )
                                .await
                                {
                                    logging::warn!(
                                        "migrate legacy session snapshot failed: {err}"
                                    );
                                }
                            }
                        }
                        None => logging::warn!(
                            "session snapshot payload unreadable; booting default configuration"
                        ),
                    }
                }
                Ok(None) => {}
                Err(err) => logging::warn!("load session snapshot failed: {err}"),
            }

            match store.load_envelope(ICON_LAYOUT_NAMESPACE).await {
                Ok(Some(envelope)) => {
                    match decode_envelope_payload::<IconLayoutSnapshot>(&envelope) {
                        Ok(snapshot) => {
                            let positions: IconPositionMap = host
                                .icon_guard()
                                .borrow_mut()
                                .filter_remote(&snapshot.positions);
                            runtime
                                .dispatch
                                .call(SessionAction::HydrateIconLayout(positions));
                        }
                        Err(err) => logging::warn!("icon layout payload unreadable: {err}"),
                    }
                }
                Ok(None) => {}
                Err(err) => logging::warn!("load icon layout failed: {err}"),
            }

            match store.load_envelope(WIDGET_LAYOUT_NAMESPACE).await {
                Ok(Some(envelope)) => match decode_envelope_payload::<WidgetSnapshot>(&envelope) {
                    Ok(snapshot) => {
                        runtime
                            .dispatch
                            .call(SessionAction::HydrateWidgets(snapshot.widgets));
                    }
                    Err(err) => logging::warn!("widget layout payload unreadable: {err}"),
                },
                Ok(None) => {}
                Err(err) => logging::warn!("load widget layout failed: {err}"),
            }

            if seeded_profile {
                for shortcut in apps::default_shortcuts(runtime.role) {
                    runtime.dispatch.call(SessionAction::AddShortcut {
                        shortcut,
                        position: None,
                    });
                }
            }

            let display = runtime.state.get_untracked().display;
            let screen = desktop_screen_bounds(display.taskbar_height());
            // Window geometry lives in unscaled units, so the window
            // constraint pass sees the viewport divided by the zoom factor.
            runtime.dispatch.call(SessionAction::ConstrainToScreen {
                screen: window_space_bounds(screen, display.zoom),
            });
            runtime
                .dispatch
                .call(SessionAction::ReconcileIcons { screen });
            runtime
                .dispatch
                .call(SessionAction::ConstrainWidgets { screen });

            runtime.mark_hydrated();
        });
    });
}
