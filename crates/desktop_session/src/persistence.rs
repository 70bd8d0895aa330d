//! Persisted snapshot shapes, patch payloads, and legacy-shape migration.
//!
//! The combined window + virtual-desktop snapshot lives under one preference
//! namespace; icon positions and widgets each have their own namespace so the
//! bridge can debounce them on the shorter quiet period and patch them
//! sparsely.

use serde::{Deserialize, Serialize};

use crate::model::{
    DesktopId, DisplaySettings, IconPoint, IconPositionMap, SessionState, ShortcutId,
    ShortcutRecord, VirtualDesktop, WidgetRecord, WindowRecord, ICON_LAYOUT_SCHEMA_VERSION,
    SESSION_SCHEMA_VERSION, WIDGET_LAYOUT_SCHEMA_VERSION,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Durable combined snapshot of windows, desktops, shortcuts, and display
/// settings. Serialized together so a reload reconstructs all of them
/// consistently.
pub struct SessionSnapshot {
    /// Snapshot schema version.
    pub schema_version: u32,
    /// Open windows across all desktops.
    pub windows: Vec<WindowRecord>,
    /// Virtual desktops.
    pub desktops: Vec<VirtualDesktop>,
    /// The active desktop at save time.
    pub active_desktop_id: DesktopId,
    /// The undeletable default desktop.
    pub default_desktop_id: DesktopId,
    /// Desktop shortcuts in list order.
    pub shortcuts: Vec<ShortcutRecord>,
    /// Display scaling settings.
    pub display: DisplaySettings,
}

impl SessionSnapshot {
    /// Captures the durable portion of `state`.
    pub fn capture(state: &SessionState) -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            windows: state.windows.clone(),
            desktops: state.desktops.clone(),
            active_desktop_id: state.active_desktop_id,
            default_desktop_id: state.default_desktop_id,
            shortcuts: state.shortcuts.clone(),
            display: state.display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Durable sparse icon position map.
pub struct IconLayoutSnapshot {
    /// Snapshot schema version.
    pub schema_version: u32,
    /// Positions in unscaled units, keyed by shortcut id.
    pub positions: IconPositionMap,
}

impl IconLayoutSnapshot {
    /// Captures the current icon position map.
    pub fn capture(state: &SessionState) -> Self {
        Self {
            schema_version: ICON_LAYOUT_SCHEMA_VERSION,
            positions: state.icon_positions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Durable widget list.
pub struct WidgetSnapshot {
    /// Snapshot schema version.
    pub schema_version: u32,
    /// Free-floating widgets.
    pub widgets: Vec<WidgetRecord>,
}

impl WidgetSnapshot {
    /// Captures the current widget list.
    pub fn capture(state: &SessionState) -> Self {
        Self {
            schema_version: WIDGET_LAYOUT_SCHEMA_VERSION,
            widgets: state.widgets.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Sparse icon-layout update: positions to set and ids to clear.
///
/// Only shortcuts that actually moved appear here, so a reconciliation pass
/// that changes nothing produces no persistence write.
pub struct IconLayoutPatch {
    /// New positions in unscaled units.
    pub positions: IconPositionMap,
    /// Shortcut ids whose stored position should be removed.
    pub removed: Vec<ShortcutId>,
}

impl IconLayoutPatch {
    /// A patch setting a single position.
    pub fn set(shortcut_id: ShortcutId, position: IconPoint) -> Self {
        let mut positions = IconPositionMap::new();
        positions.insert(shortcut_id, position);
        Self {
            positions,
            removed: Vec::new(),
        }
    }

    /// A patch clearing a single position.
    pub fn remove(shortcut_id: ShortcutId) -> Self {
        Self {
            positions: IconPositionMap::new(),
            removed: vec![shortcut_id],
        }
    }

    /// Folds a later patch into this one. A position set after a removal
    /// cancels the removal, and vice versa.
    pub fn merge(&mut self, later: IconLayoutPatch) {
        for id in later.removed {
            self.positions.remove(&id);
            if !self.removed.contains(&id) {
                self.removed.push(id);
            }
        }
        for (id, position) in later.positions {
            self.removed.retain(|removed| *removed != id);
            self.positions.insert(id, position);
        }
    }

    /// Whether the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.removed.is_empty()
    }
}

/// Legacy (schema 1) session payload: shortcuts were stored as bare app-id
/// strings and display settings did not exist yet.
#[derive(Debug, Clone, Deserialize)]
struct LegacySessionSnapshot {
    #[serde(default)]
    windows: Vec<WindowRecord>,
    #[serde(default)]
    desktops: Vec<VirtualDesktop>,
    active_desktop_id: Option<DesktopId>,
    #[serde(default)]
    shortcuts: Vec<String>,
}

/// Decodes a persisted session payload, migrating legacy shapes.
///
/// Schema 1 payloads are upgraded in place: bare app-id shortcut strings
/// become [`ShortcutRecord`]s whose shortcut id is the app id, and display
/// settings fall back to defaults. Unrecognized shapes return `None` so the
/// caller boots the hard-coded default configuration instead.
pub fn decode_session_payload(
    schema_version: u32,
    payload: &serde_json::Value,
) -> Option<SessionSnapshot> {
    match schema_version {
        SESSION_SCHEMA_VERSION => serde_json::from_value(payload.clone()).ok(),
        1 => {
            let legacy: LegacySessionSnapshot = serde_json::from_value(payload.clone()).ok()?;
            let default_state = SessionState::default();
            let desktops = if legacy.desktops.is_empty() {
                default_state.desktops.clone()
            } else {
                legacy.desktops
            };
            let first_desktop = desktops.first()?.id;
            let shortcuts = legacy
                .shortcuts
                .into_iter()
                .filter_map(|raw| {
                    let app_id = portal_app_contract::ApplicationId::new(raw.clone()).ok()?;
                    Some(ShortcutRecord {
                        id: ShortcutId::new(raw),
                        app_id,
                    })
                })
                .collect();
            Some(SessionSnapshot {
                schema_version: SESSION_SCHEMA_VERSION,
                windows: legacy.windows,
                desktops,
                active_desktop_id: legacy.active_desktop_id.unwrap_or(first_desktop),
                default_desktop_id: first_desktop,
                shortcuts,
                display: DisplaySettings::default(),
            })
        }
        _ => None,
    }
}
