//! Data Transfer Objects for the Azure DevOps REST API
//!
//! Request and response bodies exactly as they travel over the wire
//! (camelCase field names, `_links` blocks). Responses only model the fields
//! the actions read; everything else is ignored during deserialization.

pub mod permission;
pub mod pipeline;
pub mod run;

use serde::{Deserialize, Serialize};

/// `_links` block attached to most Azure DevOps resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub web: Option<Link>,
}

/// A single hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Links {
    /// Human-viewable URL of the resource, if the service returned one
    pub fn web_href(&self) -> Option<&str> {
        self.web.as_ref().map(|link| link.href.as_str())
    }
}
