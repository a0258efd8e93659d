//! Infrastructure layer for flare
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: layered configuration file loading, the HTTP model
//! invoker with its explicit model→endpoint routing table, and the cached
//! model registry with an injectable clock.

pub mod config;
pub mod providers;
pub mod registry;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileDispatchConfig, FileEndpointConfig, FileModelEntry,
    FileProvidersConfig, FileRegistryConfig, FileSynthesisConfig,
};
pub use providers::{
    catalog::HttpCatalogSource,
    http_invoker::{HttpModelInvoker, ProviderEndpoint},
};
pub use registry::{
    cached::{CachedModelRegistry, CatalogError, CatalogSource},
    clock::{Clock, SystemClock},
};
