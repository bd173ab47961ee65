//! OpenData - Rust client for OpenGIN (Open General Information Network).
//!
//! Reads entities, relations and attributes from the OpenGIN query service,
//! assembles organisation charts from them, and writes entities through the
//! CRUD service.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub const VERSION: &str = "0.1.0";
pub const AUTHOR: &str = "GI-SERVICE Team";
pub const LICENSE: &str = "MIT";

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;
pub use crate::config::{get_config, Config};
pub use crate::core::{IncomingServiceAttributes, IncomingServiceOrgchart, WriteAttributes};
pub use crate::domain::model::{AttributePayload, EntityPayload, WritePayload};
pub use crate::utils::error::{OpenGinError, Result};

#[allow(non_camel_case_types)]
pub type ENTITY_PAYLOAD = EntityPayload;
#[allow(non_camel_case_types)]
pub type ATTRIBUTE_PAYLOAD = AttributePayload;
#[allow(non_camel_case_types)]
pub type WRITE_PAYLOAD = WritePayload;

/// Names published by the package, in the spelling downstream tooling expects.
/// `__version__`, `__author__` and `__license__` are `VERSION`, `AUTHOR` and
/// `LICENSE` here.
pub const PUBLIC_API: &[&str] = &[
    "__version__",
    "__author__",
    "__license__",
    "ENTITY_PAYLOAD",
    "ATTRIBUTE_PAYLOAD",
    "WRITE_PAYLOAD",
    "IncomingServiceAttributes",
    "IncomingServiceOrgchart",
    "WriteAttributes",
    "get_config",
];
