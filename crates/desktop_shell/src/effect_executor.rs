//! Explicit effect-queue executor for reducer-emitted session effects.

use leptos::*;

use crate::runtime_context::SessionRuntimeContext;

/// Installs the executor that drains reducer-emitted effects in order.
pub fn install(runtime: SessionRuntimeContext) {
    // The queue signal is emptied up front; effects executed below may
    // dispatch again, and those reductions must land in a queue this drain
    // will not stomp on when it finishes.
    create_effect(move |_| {
        let queued = runtime.effects.get();
        if queued.is_empty() {
            return;
        }

        runtime.effects.set(Vec::new());

        for effect in queued {
            runtime
                .host
                .get_value()
                .run_session_effect(runtime, effect);
        }
    });
}
