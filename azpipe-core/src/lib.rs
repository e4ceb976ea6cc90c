//! Azpipe Core
//!
//! Core types for driving Azure DevOps pipelines from template actions.
//!
//! This crate contains:
//! - Domain types: pipelines, runs, run status and resource authorization
//! - DTOs: the JSON bodies exchanged with the Azure DevOps REST API

pub mod domain;
pub mod dto;
