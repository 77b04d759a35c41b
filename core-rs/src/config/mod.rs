//! Service configuration
//!
//! - service: the `ServiceConfig` document (YAML or JSON) and IRI resolution

pub mod service;

pub use service::{Credentials, ServiceConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
