//! Lookup table of the available template actions

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::action::{ActionEnv, TemplateAction};
use crate::actions::{CreatePipelineAction, PermitPipelineAction, RunPipelineAction};
use crate::cancel::CancelToken;
use crate::context::{ActionContext, Outputs};
use crate::error::{ActionError, Result};

/// Actions keyed by their identifier
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, Arc<dyn TemplateAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the three Azure pipeline actions
    pub fn with_defaults(env: ActionEnv) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CreatePipelineAction::new(env.clone())));
        registry.register(Arc::new(PermitPipelineAction::new(env.clone())));
        registry.register(Arc::new(RunPipelineAction::new(env)));
        registry
    }

    /// Adds an action, replacing any previous one with the same id
    pub fn register(&mut self, action: Arc<dyn TemplateAction>) {
        let id = action.id();
        if self.actions.insert(id, action).is_some() {
            warn!("Replacing already registered action {}", id);
        }
        debug!("Registered action {}", id);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn TemplateAction>> {
        self.actions.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.actions.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TemplateAction>> {
        self.actions.values()
    }

    /// Runs one action and returns the outputs it produced
    ///
    /// # Errors
    /// [`ActionError::UnknownAction`] when `id` is not registered, otherwise
    /// whatever the action itself reports.
    pub async fn execute(
        &self,
        id: &str,
        input: JsonValue,
        cancel: CancelToken,
    ) -> Result<Outputs> {
        let action = self
            .get(id)
            .ok_or_else(|| ActionError::UnknownAction(id.to_string()))?;

        info!("Executing action {}", id);
        let mut ctx = ActionContext::with_cancel(input, cancel);
        action.handle(&mut ctx).await?;
        Ok(ctx.into_outputs())
    }
}
