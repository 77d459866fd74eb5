//! Derives the case and experiment configuration of a spatial precipitation
//! verification exercise and launches the regrid step of the verification tool.

pub mod batch;
pub mod config;
pub mod deriver;
pub mod documents;
pub mod domain;
pub mod env;
pub mod error;
pub mod output;
pub mod projection;
pub mod regrid;
pub mod store;
pub mod templates;
pub mod times;
pub mod variables;
