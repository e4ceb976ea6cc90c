//! Azure DevOps pipeline actions for scaffolding templates
//!
//! Three actions are provided: create a YAML pipeline, authorize a pipeline
//! for a protected resource, and run a pipeline while polling its build
//! until it finishes. Actions are looked up by id in an [`ActionRegistry`]
//! and share an [`ActionEnv`].

pub mod action;
pub mod actions;
pub mod cancel;
pub mod config;
pub mod connector;
pub mod context;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use action::{ActionEnv, TemplateAction};
pub use cancel::CancelToken;
pub use config::ActionConfig;
pub use connector::{Connector, HttpConnector};
pub use context::{ActionContext, Outputs};
pub use credentials::{IntegrationRegistry, TokenResolver};
pub use engine::{PollSettings, RunOutcome, RunPoller, RunReport};
pub use error::{ActionError, Result};
pub use registry::ActionRegistry;
