//! Leptos rendering shell for the employee-portal desktop.
//!
//! Pairs the headless [`desktop_session`] engine with browser concerns: the
//! component tree, pointer gesture routing, viewport measurement, timers, and
//! debounced writes to the preference store. The entry layer provides a
//! [`platform_prefs::PreferenceStore`] and the signed-in user's role through
//! [`SessionProvider`], then renders [`DesktopShell`] underneath it.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod apps;
pub mod components;
pub mod effect_executor;
pub mod host;
pub mod runtime_context;

pub use components::DesktopShell;
pub use host::ShellHostContext;
pub use runtime_context::{use_session_runtime, SessionProvider, SessionRuntimeContext};
