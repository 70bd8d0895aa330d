//! Portal application catalog: registry entries, default shortcuts, and the
//! mountable screen modules.
//!
//! Screens are opaque collaborators; the catalog only supplies launcher
//! metadata and a mount function per application id. The placeholder bodies
//! here stand in for the real portal screens, which render against the same
//! [`WindowContext`] contract and talk back to their chrome through the
//! title and props setters on the session runtime context.

use leptos::*;
use portal_app_contract::{
    AppModule, AppRegistry, ApplicationId, RegistryEntry, Role, StaticAppRegistry, WindowContext,
    WindowSize,
};

use desktop_session::{OpenWindowRequest, ShortcutId, ShortcutRecord, WindowId};
use serde_json::json;

use crate::runtime_context::use_session_runtime;

fn entry(
    app_id: &str,
    display_name: &str,
    icon_token: &str,
    size: Option<WindowSize>,
    required_roles: Vec<Role>,
    show_on_desktop: bool,
) -> RegistryEntry {
    RegistryEntry {
        app_id: ApplicationId::trusted(app_id),
        display_name: display_name.to_string(),
        icon_token: icon_token.to_string(),
        default_size: size.unwrap_or_default(),
        required_roles,
        show_on_desktop,
    }
}

/// Builds the portal application registry in launcher order.
pub fn portal_registry() -> StaticAppRegistry {
    StaticAppRegistry::new(vec![
        entry(
            "portal.directory",
            "Employee Directory",
            "directory",
            None,
            Vec::new(),
            true,
        ),
        entry(
            "portal.announcements",
            "Announcements",
            "announcements",
            Some(WindowSize {
                width: 460,
                height: 520,
            }),
            Vec::new(),
            true,
        ),
        entry(
            "portal.documents",
            "Documents",
            "documents",
            Some(WindowSize {
                width: 680,
                height: 460,
            }),
            Vec::new(),
            true,
        ),
        entry(
            "portal.timesheet",
            "Timesheet",
            "timesheet",
            None,
            Vec::new(),
            true,
        ),
        entry(
            "portal.leave",
            "Leave Requests",
            "leave",
            None,
            Vec::new(),
            true,
        ),
        entry(
            "portal.benefits",
            "Benefits",
            "benefits",
            None,
            Vec::new(),
            false,
        ),
        entry("portal.chat", "Chat", "chat", None, Vec::new(), false),
        entry(
            "portal.leave.approvals",
            "Leave Approvals",
            "leave-approvals",
            Some(WindowSize {
                width: 640,
                height: 420,
            }),
            vec![Role::Manager, Role::HumanResources],
            false,
        ),
        entry(
            "portal.people.records",
            "People Records",
            "people-records",
            Some(WindowSize {
                width: 720,
                height: 520,
            }),
            vec![Role::HumanResources, Role::Admin],
            false,
        ),
        entry(
            "portal.admin.console",
            "Admin Console",
            "admin-console",
            Some(WindowSize {
                width: 760,
                height: 540,
            }),
            vec![Role::Admin],
            false,
        ),
    ])
}

/// Builds an open request with defaults resolved from the registry entry.
///
/// Unknown ids still open with generic defaults; the window manager does not
/// gate on catalog membership.
pub fn open_request_for(app_id: &ApplicationId) -> OpenWindowRequest {
    let registry = portal_registry();
    let mut request = OpenWindowRequest::new(app_id.clone());
    if let Some(entry) = registry.entry(app_id) {
        request.title = Some(entry.display_name.clone());
        request.icon_token = Some(entry.icon_token.clone());
        request.size = Some(entry.default_size);
    }
    request
}

/// Default desktop shortcuts for a freshly provisioned user with `role`.
pub fn default_shortcuts(role: Role) -> Vec<ShortcutRecord> {
    portal_registry()
        .entries()
        .iter()
        .filter(|entry| entry.show_on_desktop && entry.visible_to(role))
        .map(|entry| ShortcutRecord {
            id: ShortcutId::new(entry.app_id.as_str()),
            app_id: entry.app_id.clone(),
        })
        .collect()
}

/// Launcher entries visible to `role`, in registry order.
pub fn launcher_entries(role: Role) -> Vec<RegistryEntry> {
    portal_registry()
        .visible_entries(role)
        .into_iter()
        .cloned()
        .collect()
}

/// Resolves the display name for an application id, falling back to the id.
pub fn display_name(app_id: &ApplicationId) -> String {
    portal_registry()
        .entry(app_id)
        .map(|entry| entry.display_name.clone())
        .unwrap_or_else(|| app_id.as_str().to_string())
}

/// Resolves the icon token for an application id.
pub fn icon_token(app_id: &ApplicationId) -> String {
    portal_registry()
        .entry(app_id)
        .map(|entry| entry.icon_token.clone())
        .unwrap_or_else(|| "app-generic".to_string())
}

/// Returns the mountable module for an application id.
pub fn app_module(app_id: &ApplicationId) -> AppModule {
    match app_id.base() {
        "portal.directory" => AppModule::new(mount_directory),
        "portal.announcements" => AppModule::new(mount_announcements),
        _ => AppModule::new(mount_generic),
    }
}

fn mount_directory(context: WindowContext) -> View {
    let runtime = use_session_runtime();
    let window_id = WindowId(context.window_id);
    let filter = context
        .props
        .get("filter")
        .and_then(|value| value.as_str())
        .unwrap_or("")
        .to_string();
    view! {
        <div class="app-screen app-directory" data-refresh-key=context.refresh_key>
            <p>"Employee directory"</p>
            <input
                class="app-screen-filter"
                placeholder="Filter people"
                prop:value=filter
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    let title = if value.is_empty() {
                        "Employee Directory".to_string()
                    } else {
                        format!("Employee Directory: {value}")
                    };
                    runtime.set_window_title(window_id, title);
                    runtime.merge_window_props(window_id, json!({ "filter": value }));
                }
            />
        </div>
    }
    .into_view()
}

fn mount_announcements(context: WindowContext) -> View {
    view! {
        <div class="app-screen app-announcements" data-refresh-key=context.refresh_key>
            <p>"Company announcements"</p>
        </div>
    }
    .into_view()
}

fn mount_generic(context: WindowContext) -> View {
    view! {
        <div class="app-screen" data-refresh-key=context.refresh_key>
            <p>"Loading portal screen"</p>
        </div>
    }
    .into_view()
}
