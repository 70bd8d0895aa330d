//! Runtime provider and context wiring for the desktop shell.
//!
//! Owns the long-lived reducer container and the session effect queue. UI
//! composition stays in [`crate::components`].

use std::rc::Rc;

use desktop_session::{
    reduce_session, InteractionState, SessionAction, SessionEffect, SessionState, SyncStatus,
    WindowId,
};
use leptos::*;
use platform_prefs::PreferenceStore;
use portal_app_contract::Role;

use crate::{effect_executor, host::ShellHostContext};

#[derive(Clone, Copy)]
/// Leptos context for reading session state and dispatching [`SessionAction`]
/// values.
pub struct SessionRuntimeContext {
    /// Host service bundle for executing session side effects.
    pub host: StoredValue<ShellHostContext>,
    /// Role of the signed-in user; filters launchers and default shortcuts.
    pub role: Role,
    /// Reactive session state signal.
    pub state: RwSignal<SessionState>,
    /// Reactive pointer-gesture state signal.
    pub interaction: RwSignal<InteractionState>,
    /// Queue of effects emitted by the reducer and processed by the shell.
    pub effects: RwSignal<Vec<SessionEffect>>,
    /// Aggregate persistence write status; drives the taskbar sync indicator.
    pub sync: RwSignal<SyncStatus>,
    /// Whether boot hydration has finished.
    pub hydrated: RwSignal<bool>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<SessionAction>,
}

impl SessionRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: SessionAction) {
        self.dispatch.call(action);
    }

    /// Records one more pending or in-flight persistence write.
    pub fn begin_save(&self) {
        self.sync.update(|status| status.begin_write());
    }

    /// Records a completed persistence write. A failure leaves the indicator
    /// stale until a later write succeeds.
    pub fn finish_save(&self, succeeded: bool) {
        self.sync.update(|status| status.finish_write(succeeded));
    }

    /// Replaces a window's titlebar string. Part of the narrow surface
    /// mounted applications get for talking back to their chrome.
    pub fn set_window_title(&self, window_id: WindowId, title: impl Into<String>) {
        self.dispatch_action(SessionAction::SetWindowTitle {
            window_id,
            title: title.into(),
        });
    }

    /// Merges a patch into a window's props bag; `null` values remove keys.
    /// The companion to [`Self::set_window_title`] for mounted applications.
    pub fn merge_window_props(&self, window_id: WindowId, patch: serde_json::Value) {
        self.dispatch_action(SessionAction::MergeWindowProps { window_id, patch });
    }

    /// Marks boot hydration complete.
    pub fn mark_hydrated(&self) {
        self.hydrated.set(true);
    }
}

#[component]
/// Provides [`SessionRuntimeContext`] to descendant components and boots
/// persisted state.
pub fn SessionProvider(
    /// Preference store injected by the entry layer.
    prefs: Rc<dyn PreferenceStore>,
    /// Role of the signed-in user.
    role: Role,
    children: Children,
) -> impl IntoView {
    let host = store_value(ShellHostContext::new(prefs));
    let state = create_rw_signal(SessionState::default());
    let interaction = create_rw_signal(InteractionState::default());
    let effects = create_rw_signal(Vec::<SessionEffect>::new());
    let sync = create_rw_signal(SyncStatus::default());
    let hydrated = create_rw_signal(false);

    let dispatch = Callback::new(move |action: SessionAction| {
        let mut session = state.get_untracked();
        let mut gesture = interaction.get_untracked();
        let previous_session = session.clone();
        let previous_gesture = gesture.clone();

        match reduce_session(&mut session, &mut gesture, action) {
            Ok(new_effects) => {
                if session != previous_session {
                    state.set(session);
                }
                if gesture != previous_gesture {
                    interaction.set(gesture);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("session reducer error: {err}"),
        }
    });

    let runtime = SessionRuntimeContext {
        host,
        role,
        state,
        interaction,
        effects,
        sync,
        hydrated,
        dispatch,
    };

    provide_context(runtime);

    host.get_value().install_boot_hydration(runtime);
    effect_executor::install(runtime);

    children().into_view()
}

/// Returns the current [`SessionRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`SessionProvider`].
pub fn use_session_runtime() -> SessionRuntimeContext {
    use_context::<SessionRuntimeContext>().expect("SessionRuntimeContext not provided")
}
