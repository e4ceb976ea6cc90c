//! Action invocation context
//!
//! Carries the raw template input in, the named outputs out, and the
//! cancellation token for the duration of one action invocation.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::cancel::CancelToken;
use crate::error::{ActionError, Result};

/// Named string outputs of an action
pub type Outputs = BTreeMap<String, String>;

/// State of one action invocation
#[derive(Debug)]
pub struct ActionContext {
    input: JsonValue,
    outputs: Outputs,
    cancel: CancelToken,
}

impl ActionContext {
    pub fn new(input: JsonValue) -> Self {
        Self::with_cancel(input, CancelToken::new())
    }

    pub fn with_cancel(input: JsonValue, cancel: CancelToken) -> Self {
        Self {
            input,
            outputs: Outputs::new(),
            cancel,
        }
    }

    /// Deserializes the input into the action's typed input
    pub fn input<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.input.clone())
            .map_err(|e| ActionError::InvalidInput(e.to_string()))
    }

    /// Publishes a named output
    pub fn output(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.outputs.insert(name.into(), value.into());
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn into_outputs(self) -> Outputs {
        self.outputs
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}
