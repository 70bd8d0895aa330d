//! Shared contract types between the portal desktop session manager and the
//! application screens it mounts.
//!
//! The session manager treats every portal screen (employee directory, leave
//! requests, reservations, calendars, chat) as an opaque component that mounts
//! inside a managed window and receives a read-only [`WindowContext`]. The
//! only channels back into the manager are the narrow title/props setters the
//! runtime exposes alongside the context.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use leptos::View;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for a portal application.
///
/// Ids are namespaced dotted segments (`portal.directory`). Applications that
/// need several simultaneous windows (for example a chat window per
/// conversation) append an instance discriminator with [`ApplicationId::instanced`];
/// the session manager deduplicates open requests by full-id equality, so
/// instanced ids are never collapsed into one window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the dotted-segment policy.
    ///
    /// # Errors
    ///
    /// Returns a descriptive message when `raw` is not a valid identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected namespaced dotted segments"
            ))
        }
    }

    /// Creates an id without validation for compile-time trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives a composite per-instance id (`portal.chat#thread-42`).
    ///
    /// Instanced ids compare unequal to their base id and to other instances,
    /// which is what exempts them from open-time deduplication.
    pub fn instanced(&self, discriminator: &str) -> Self {
        Self(format!("{}#{discriminator}", self.0))
    }

    /// Returns the base id with any instance discriminator stripped.
    pub fn base(&self) -> &str {
        self.0.split('#').next().unwrap_or(&self.0)
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 120 {
        return false;
    }

    let (base, instance) = match raw.split_once('#') {
        Some((base, instance)) => (base, Some(instance)),
        None => (raw, None),
    };

    if let Some(instance) = instance {
        if instance.is_empty()
            || !instance
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return false;
        }
    }

    let mut count = 0usize;
    for part in base.split('.') {
        count += 1;
        if part.is_empty() || part.len() > 32 {
            return false;
        }
        let bytes = part.as_bytes();
        if !bytes[0].is_ascii_lowercase() {
            return false;
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return false;
        }
        if part.ends_with('-') {
            return false;
        }
    }

    count >= 2
}

/// Role assigned to the signed-in portal user.
///
/// Roles are an external read-only fact supplied by the authentication
/// collaborator; the session manager only uses them to filter which launchers
/// are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Regular employee.
    Employee,
    /// Team manager with approval screens.
    Manager,
    /// Human-resources staff.
    HumanResources,
    /// Portal administrator.
    Admin,
}

/// Default window width applied when a registry entry does not override it.
pub const DEFAULT_APP_WIDTH: i32 = 520;
/// Default window height applied when a registry entry does not override it.
pub const DEFAULT_APP_HEIGHT: i32 = 380;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Default window dimensions for an application, in unscaled base pixels.
pub struct WindowSize {
    /// Width in base pixels.
    pub width: i32,
    /// Height in base pixels.
    pub height: i32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_APP_WIDTH,
            height: DEFAULT_APP_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Registry metadata for one portal application.
pub struct RegistryEntry {
    /// Canonical application id.
    pub app_id: ApplicationId,
    /// Human-readable launcher and titlebar name.
    pub display_name: String,
    /// Stable icon token resolved by the shell icon catalog.
    pub icon_token: String,
    /// Default window size applied at open time.
    pub default_size: WindowSize,
    /// Roles allowed to see and launch this application. Empty means everyone.
    pub required_roles: Vec<Role>,
    /// Whether the application ships a desktop shortcut by default.
    pub show_on_desktop: bool,
}

impl RegistryEntry {
    /// Returns whether `role` may see and launch this application.
    pub fn visible_to(&self, role: Role) -> bool {
        self.required_roles.is_empty() || self.required_roles.contains(&role)
    }
}

/// Application registry collaborator consumed by the session manager.
///
/// The manager only reads this to populate defaults at open time and to
/// filter launchers by the current user's role.
pub trait AppRegistry {
    /// Looks up the registry entry for an application id.
    ///
    /// Composite instanced ids resolve through their base id.
    fn entry(&self, app_id: &ApplicationId) -> Option<&RegistryEntry>;

    /// Returns all entries visible to `role`, in registry order.
    fn visible_entries(&self, role: Role) -> Vec<&RegistryEntry>;
}

#[derive(Debug, Clone, Default)]
/// Registry backed by a fixed entry list built at startup.
pub struct StaticAppRegistry {
    entries: Vec<RegistryEntry>,
}

impl StaticAppRegistry {
    /// Creates a registry from a fixed entry list.
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    /// Returns every registered entry in registry order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }
}

impl AppRegistry for StaticAppRegistry {
    fn entry(&self, app_id: &ApplicationId) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.app_id.as_str() == app_id.base())
    }

    fn visible_entries(&self, role: Role) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.visible_to(role))
            .collect()
    }
}

/// Stable runtime window id exposed to mounted applications.
pub type WindowRuntimeId = u64;

#[derive(Debug, Clone, PartialEq)]
/// Read-only context handed to an application when it mounts inside a window.
///
/// This is the only data channel from the session manager into a screen; it
/// is passed down one level per window tree and never stored globally.
pub struct WindowContext {
    /// Stable runtime window id.
    pub window_id: WindowRuntimeId,
    /// Monotonic counter; an increment asks the screen to re-fetch its data.
    pub refresh_key: u32,
    /// Opaque mergeable key/value bag owned by the mounted application.
    pub props: Value,
}

/// Mount function implemented by every portal screen.
pub type AppMountFn = fn(WindowContext) -> View;

#[derive(Debug, Clone, Copy)]
/// Mountable module descriptor used by the shell application catalog.
pub struct AppModule {
    mount_fn: AppMountFn,
}

impl AppModule {
    /// Creates a module from a mount function.
    pub const fn new(mount_fn: AppMountFn) -> Self {
        Self { mount_fn }
    }

    /// Mounts the screen with a runtime-provided window context.
    pub fn mount(self, context: WindowContext) -> View {
        (self.mount_fn)(context)
    }
}
