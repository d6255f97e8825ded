//! Persisted form of a pass.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::PassId;
use super::state::{PassState, ScreenOutput};
use crate::error::PostFxError;

/// Plain record a pass serializes to.
///
/// Base fields keep the same names for every pass kind so a generic loader
/// can dispatch on `kind` and restore the flags before the concrete pass
/// reads its own entries from `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRecord {
    /// Pass identifier.
    pub id: PassId,
    /// Pass kind tag.
    pub kind: String,
    /// `clearBeforeRender` flag.
    pub clear_before_render: bool,
    /// `enabled` flag.
    pub enabled: bool,
    /// `needsBufferSwap` flag.
    pub needs_buffer_swap: bool,
    /// `renderToScreen` flag.
    pub render_to_screen: bool,
    /// `copyResultToScreen` flag.
    pub copy_result_to_screen: bool,
    /// Kind-specific parameters, stored alongside the base fields.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl PassRecord {
    /// Record the base fields of `state` under `kind`, with no parameters.
    #[must_use]
    pub fn from_state(kind: &str, state: &PassState) -> Self {
        Self {
            id: state.id(),
            kind: kind.to_owned(),
            clear_before_render: state.clear_before_render(),
            enabled: state.enabled(),
            needs_buffer_swap: state.needs_buffer_swap(),
            render_to_screen: state.render_to_screen(),
            copy_result_to_screen: state.copy_result_to_screen(),
            params: Map::new(),
        }
    }

    /// Rebuild the base state this record describes, id included.
    #[must_use]
    pub fn to_state(&self) -> PassState {
        let mut state = PassState::with_id(self.id);
        state.set_enabled(self.enabled);
        state.set_clear_before_render(self.clear_before_render);
        state.set_needs_buffer_swap(self.needs_buffer_swap);
        state.set_output(ScreenOutput::from_flags(
            self.render_to_screen,
            self.copy_result_to_screen,
        ));
        state
    }

    /// Store a kind-specific parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::Record`] if `value` cannot be represented as
    /// JSON.
    pub fn set_param<T: Serialize>(&mut self, name: &str, value: &T) -> Result<(), PostFxError> {
        let value = serde_json::to_value(value)?;
        let _ = self.params.insert(name.to_owned(), value);
        Ok(())
    }

    /// Read a kind-specific parameter. `Ok(None)` when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::InvalidParam`] if the stored value does not
    /// deserialize as `T`.
    pub fn param<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PostFxError> {
        self.params
            .get(name)
            .map(|value| {
                T::deserialize(value).map_err(|e| PostFxError::InvalidParam {
                    kind: self.kind.clone(),
                    name: name.to_owned(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::Record`] on malformed JSON or missing base
    /// fields.
    pub fn from_json(json: &str) -> Result<Self, PostFxError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the record as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::Record`] if a parameter cannot be serialized.
    pub fn to_json(&self) -> Result<String, PostFxError> {
        Ok(serde_json::to_string(self)?)
    }
}
