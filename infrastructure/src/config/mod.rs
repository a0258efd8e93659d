//! Configuration loading and file format

pub mod file_config;
pub mod loader;

pub use file_config::{
    FileConfig, FileDispatchConfig, FileEndpointConfig, FileModelEntry, FileProvidersConfig,
    FileRegistryConfig, FileSynthesisConfig,
};
pub use loader::ConfigLoader;
