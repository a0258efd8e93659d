//! Provider adapters for the model invoker port

pub mod catalog;
pub mod http_invoker;

pub use catalog::HttpCatalogSource;
pub use http_invoker::{HttpModelInvoker, ProviderEndpoint};
