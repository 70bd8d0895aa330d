//! Host-side helpers for executing reducer effects and querying the browser
//! environment.
//!
//! Everything the session manager needs from the outside world goes through
//! [`ShellHostContext`]: the preference store, viewport measurement, and
//! timer scheduling. The context is injected at the entry layer so tests can
//! run the whole shell against [`platform_prefs::MemoryPreferenceStore`].

mod boot;
mod persistence_effects;

use std::{cell::RefCell, rc::Rc};

use desktop_session::{
    IconLayoutPatch, IconSyncGuard, ScreenBounds, SessionAction, SessionEffect, SessionSnapshot,
    TrailingDebounce, WidgetSnapshot, WindowAnimation, WindowId, LAYOUT_DEBOUNCE_MS,
    SESSION_DEBOUNCE_MS,
};
use leptos::Callable;
use platform_prefs::PreferenceStore;

use crate::runtime_context::SessionRuntimeContext;

#[derive(Clone)]
/// Host service bundle for session-manager side effects.
pub struct ShellHostContext {
    prefs: Rc<dyn PreferenceStore>,
    session_debounce: Rc<RefCell<TrailingDebounce<SessionSnapshot>>>,
    icon_debounce: Rc<RefCell<TrailingDebounce<IconLayoutPatch>>>,
    widget_debounce: Rc<RefCell<TrailingDebounce<WidgetSnapshot>>>,
    icon_guard: Rc<RefCell<IconSyncGuard>>,
}

impl ShellHostContext {
    /// Creates a host context around the injected preference store.
    pub fn new(prefs: Rc<dyn PreferenceStore>) -> Self {
        Self {
            prefs,
            session_debounce: Rc::new(RefCell::new(TrailingDebounce::new(SESSION_DEBOUNCE_MS))),
            icon_debounce: Rc::new(RefCell::new(TrailingDebounce::new(LAYOUT_DEBOUNCE_MS))),
            widget_debounce: Rc::new(RefCell::new(TrailingDebounce::new(LAYOUT_DEBOUNCE_MS))),
            icon_guard: Rc::new(RefCell::new(IconSyncGuard::new())),
        }
    }

    /// Returns the configured preference store.
    pub fn preference_store(&self) -> Rc<dyn PreferenceStore> {
        self.prefs.clone()
    }

    /// Returns the shared optimistic icon-write guard.
    pub fn icon_guard(&self) -> Rc<RefCell<IconSyncGuard>> {
        self.icon_guard.clone()
    }

    /// Installs boot hydration side effects for the session provider.
    pub fn install_boot_hydration(&self, runtime: SessionRuntimeContext) {
        boot::install_boot_hydration(self.clone(), runtime);
    }

    /// Executes a single [`SessionEffect`] emitted by the reducer.
    pub fn run_session_effect(&self, runtime: SessionRuntimeContext, effect: SessionEffect) {
        match effect {
            SessionEffect::PersistSession => {
                persistence_effects::persist_session(self.clone(), runtime);
            }
            SessionEffect::PersistIconLayout(patch) => {
                persistence_effects::persist_icon_patch(self.clone(), runtime, patch);
            }
            SessionEffect::PersistWidgets => {
                persistence_effects::persist_widgets(self.clone(), runtime);
            }
            SessionEffect::ScheduleAnimationEnd {
                window_id,
                animation,
            } => self.schedule_animation_end(runtime, window_id, animation),
        }
    }

    /// Flushes every pending debounced write immediately. Called on page hide,
    /// when waiting out a quiet period would lose the write.
    pub fn flush_pending_writes(&self, runtime: SessionRuntimeContext) {
        persistence_effects::flush_all(self.clone(), runtime);
    }

    fn schedule_animation_end(
        &self,
        runtime: SessionRuntimeContext,
        window_id: WindowId,
        animation: WindowAnimation,
    ) {
        set_timeout(animation.duration_ms(), move || {
            runtime.dispatch.call(SessionAction::AnimationCompleted {
                window_id,
                animation,
            });
        });
    }

    pub(crate) fn session_debounce(&self) -> Rc<RefCell<TrailingDebounce<SessionSnapshot>>> {
        self.session_debounce.clone()
    }

    pub(crate) fn icon_debounce(&self) -> Rc<RefCell<TrailingDebounce<IconLayoutPatch>>> {
        self.icon_debounce.clone()
    }

    pub(crate) fn widget_debounce(&self) -> Rc<RefCell<TrailingDebounce<WidgetSnapshot>>> {
        self.widget_debounce.clone()
    }
}

/// Measures the viewport and combines it with the effective taskbar height.
pub fn desktop_screen_bounds(taskbar_height: i32) -> ScreenBounds {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let width = window
                .inner_width()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(1024);
            let height = window
                .inner_height()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(768);

            return ScreenBounds {
                width: width.max(320),
                height: height.max(240),
                taskbar_height,
            };
        }
    }

    ScreenBounds {
        width: 1024,
        height: 768,
        taskbar_height,
    }
}

/// Schedules `callback` after `delay_ms`. Off-wasm the callback runs
/// synchronously, which keeps reducer round trips deterministic in tests.
pub fn set_timeout(delay_ms: u32, callback: impl FnOnce() + 'static) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{closure::Closure, JsCast};

        let Some(window) = web_sys::window() else {
            callback();
            return;
        };
        let closure = Closure::once_into_js(callback);
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            delay_ms as i32,
        );
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = delay_ms;
        callback();
    }
}

/// Current wall-clock time in unix milliseconds, shared with the debouncers.
pub fn now_ms() -> u64 {
    platform_prefs::unix_time_ms_now()
}
