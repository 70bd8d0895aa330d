//! Preference-store collaborator for the portal desktop session manager.
//!
//! The session manager persists durable desktop preferences (window layout,
//! virtual desktops, icon positions, widgets, display settings) through the
//! [`PreferenceStore`] trait. Reads return a versioned envelope per namespace;
//! writes accept either a full envelope or a partial patch that the store
//! merges into the existing payload. Retries and transport details live behind
//! the trait; the session manager treats both directions as opaque async
//! calls returning success or failure.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod time;

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};

/// Version for [`PreferenceEnvelope`] metadata serialization.
pub const PREF_ENVELOPE_VERSION: u32 = 1;
/// Namespace holding the combined window + virtual-desktop snapshot.
pub const SESSION_STATE_NAMESPACE: &str = "portal.desktop.session";
/// Namespace holding the sparse desktop icon position map.
pub const ICON_LAYOUT_NAMESPACE: &str = "portal.desktop.icons";
/// Namespace holding the free-floating widget list.
pub const WIDGET_LAYOUT_NAMESPACE: &str = "portal.desktop.widgets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned envelope for persisted preference payloads.
pub struct PreferenceEnvelope {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Namespace identifying the owning concern.
    pub namespace: String,
    /// Concern-defined schema version for the payload.
    pub schema_version: u32,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Serialized payload.
    pub payload: Value,
}

impl PreferenceEnvelope {
    /// Creates a new envelope stamped with a monotonic timestamp.
    pub fn new(namespace: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            envelope_version: PREF_ENVELOPE_VERSION,
            namespace: namespace.into(),
            schema_version,
            updated_at_unix_ms: next_monotonic_timestamp_ms(),
            payload,
        }
    }
}

/// Object-safe boxed future used by [`PreferenceStore`] async methods.
pub type PreferenceStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Storage service for loading and saving preference envelopes by namespace.
pub trait PreferenceStore {
    /// Loads the persisted envelope for a namespace.
    fn load_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<Option<PreferenceEnvelope>, String>>;

    /// Saves a full envelope, replacing any existing payload.
    fn save_envelope<'a>(
        &'a self,
        envelope: &'a PreferenceEnvelope,
    ) -> PreferenceStoreFuture<'a, Result<(), String>>;

    /// Merges a partial patch into the stored payload for a namespace.
    ///
    /// The merge follows JSON merge-patch semantics: object keys are merged
    /// recursively and a `null` value removes the key. A missing namespace is
    /// created with the patch as its payload.
    fn merge_patch<'a>(
        &'a self,
        namespace: &'a str,
        schema_version: u32,
        patch: &'a Value,
    ) -> PreferenceStoreFuture<'a, Result<(), String>>;

    /// Deletes the persisted payload for a namespace.
    fn delete_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op preference store for unsupported targets and baseline tests.
pub struct NoopPreferenceStore;

impl PreferenceStore for NoopPreferenceStore {
    fn load_envelope<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<Option<PreferenceEnvelope>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_envelope<'a>(
        &'a self,
        _envelope: &'a PreferenceEnvelope,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn merge_patch<'a>(
        &'a self,
        _namespace: &'a str,
        _schema_version: u32,
        _patch: &'a Value,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_namespace<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory preference store keyed by namespace.
///
/// Used by shell tests and as the non-wasm fallback; it performs the same
/// server-side merge the remote store advertises.
pub struct MemoryPreferenceStore {
    inner: Rc<RefCell<HashMap<String, PreferenceEnvelope>>>,
}

impl MemoryPreferenceStore {
    /// Whether a payload is stored under `namespace`.
    pub fn contains(&self, namespace: &str) -> bool {
        self.inner.borrow().contains_key(namespace)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<Option<PreferenceEnvelope>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(namespace).cloned()) })
    }

    fn save_envelope<'a>(
        &'a self,
        envelope: &'a PreferenceEnvelope,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(envelope.namespace.clone(), envelope.clone());
            Ok(())
        })
    }

    fn merge_patch<'a>(
        &'a self,
        namespace: &'a str,
        schema_version: u32,
        patch: &'a Value,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            match inner.get_mut(namespace) {
                Some(envelope) => {
                    merge_json_patch(&mut envelope.payload, patch);
                    envelope.schema_version = schema_version;
                    envelope.updated_at_unix_ms = next_monotonic_timestamp_ms();
                }
                None => {
                    inner.insert(
                        namespace.to_string(),
                        PreferenceEnvelope::new(namespace, schema_version, patch.clone()),
                    );
                }
            }
            Ok(())
        })
    }

    fn delete_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> PreferenceStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(namespace);
            Ok(())
        })
    }
}

/// Applies a JSON merge-patch onto `target` in place.
///
/// Objects merge key-by-key, `null` removes a key, and every other patch
/// value replaces the target value wholesale.
pub fn merge_json_patch(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(patch_map) => {
            if !target.is_object() {
                *target = Value::Object(serde_json::Map::new());
            }
            let Some(target_map) = target.as_object_mut() else {
                return;
            };
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    target_map.remove(key);
                } else if let Some(existing) = target_map.get_mut(key) {
                    merge_json_patch(existing, patch_value);
                } else {
                    target_map.insert(key.clone(), patch_value.clone());
                }
            }
        }
        other => *target = other.clone(),
    }
}

/// Builds a versioned [`PreferenceEnvelope`] from a serializable payload.
///
/// # Errors
///
/// Returns an error when `payload` cannot be converted to JSON.
pub fn build_pref_envelope<T: Serialize>(
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<PreferenceEnvelope, String> {
    let payload = serde_json::to_value(payload).map_err(|e| e.to_string())?;
    Ok(PreferenceEnvelope::new(
        namespace.to_string(),
        schema_version,
        payload,
    ))
}

/// Deserializes an envelope payload into a target type.
///
/// # Errors
///
/// Returns an error when deserialization fails.
pub fn decode_envelope_payload<T: DeserializeOwned>(
    envelope: &PreferenceEnvelope,
) -> Result<T, String> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| e.to_string())
}

/// Loads and decodes a typed payload for a namespace.
///
/// # Errors
///
/// Returns an error when the store fails or the payload does not decode.
pub async fn load_namespace_typed<S: PreferenceStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    namespace: &str,
) -> Result<Option<T>, String> {
    let Some(envelope) = store.load_envelope(namespace).await? else {
        return Ok(None);
    };
    decode_envelope_payload(&envelope).map(Some)
}

/// Serializes and saves a typed payload as a full envelope.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_namespace_typed<S: PreferenceStore + ?Sized, T: Serialize>(
    store: &S,
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<(), String> {
    let envelope = build_pref_envelope(namespace, schema_version, payload)?;
    store.save_envelope(&envelope).await
}
