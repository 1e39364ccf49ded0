//! Locating the page's embedded JSON state.
//!
//! Two layouts exist in the wild, checked in [`StateSchema::PRIORITY`] order.
//! Malformed or empty script bodies are routine on this site and count as
//! "absent"; a decode error never escapes this module.

use clipstat_core::{DebugTrace, StateSchema};
use serde_json::{Map, Value};

use crate::page::PageSnapshot;

/// Decodes the script for `schema`, if present and a JSON object.
#[must_use]
pub fn parse_state_script(page: &PageSnapshot, schema: StateSchema) -> Option<Value> {
    let text = page.script_text(schema.script_id())?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(schema = %schema, error = %e, "embedded state did not decode");
            None
        }
    }
}

/// Both blobs decoded side by side, for extractors that fall back from one
/// schema to the other.
#[derive(Debug, Clone, Default)]
pub struct StateProbe {
    pub universal: Option<Value>,
    pub sigi: Option<Value>,
}

impl StateProbe {
    #[must_use]
    pub fn read(page: &PageSnapshot) -> Self {
        Self {
            universal: parse_state_script(page, StateSchema::Universal),
            sigi: parse_state_script(page, StateSchema::Sigi),
        }
    }

    /// The located state: first decodable blob in priority order.
    #[must_use]
    pub fn primary(&self) -> Option<(StateSchema, &Value)> {
        self.universal
            .as_ref()
            .map(|v| (StateSchema::Universal, v))
            .or_else(|| self.sigi.as_ref().map(|v| (StateSchema::Sigi, v)))
    }

    /// Blobs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (StateSchema, &Value)> {
        [
            (StateSchema::Universal, self.universal.as_ref()),
            (StateSchema::Sigi, self.sigi.as_ref()),
        ]
        .into_iter()
        .filter_map(|(schema, value)| value.map(|v| (schema, v)))
    }

    pub fn record(&self, debug: &mut DebugTrace) {
        debug.has_universal = self.universal.is_some();
        debug.has_sigi = self.sigi.is_some();
        debug.schema = self.primary().map(|(schema, _)| schema);
        debug.has_item_module = self
            .iter()
            .any(|(schema, data)| item_module(schema, data).is_some());
    }
}

/// `__DEFAULT_SCOPE__` of the universal layout.
#[must_use]
pub fn default_scope(data: &Value) -> Option<&Value> {
    data.get("__DEFAULT_SCOPE__")
}

fn first_object<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<&'a Map<String, Value>> {
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_object)
}

/// The id-keyed video map (`ItemModule`) for a state blob.
#[must_use]
pub fn item_module(schema: StateSchema, data: &Value) -> Option<&Map<String, Value>> {
    match schema {
        StateSchema::Universal => {
            let scope = default_scope(data);
            first_object([
                scope.and_then(|s| s.get("ItemModule")),
                scope.and_then(|s| s.get("itemModule")),
                data.get("ItemModule"),
                data.get("itemModule"),
            ])
        }
        StateSchema::Sigi => first_object([data.get("ItemModule"), data.get("itemModule")]),
    }
}

/// The user-profile sub-module (`UserModule`) for a state blob.
#[must_use]
pub fn user_module(schema: StateSchema, data: &Value) -> Option<&Map<String, Value>> {
    match schema {
        StateSchema::Universal => {
            let scope = default_scope(data);
            first_object([
                scope.and_then(|s| s.get("UserModule")),
                scope.and_then(|s| s.get("webapp")).and_then(|w| w.get("UserModule")),
                data.get("UserModule"),
            ])
        }
        StateSchema::Sigi => first_object([data.get("UserModule"), data.get("userModule")]),
    }
}
