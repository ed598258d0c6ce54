//! Provider-facing RPC handlers for plugframe.
//!
//! A plugin implements [`Provider`] (and [`Resource`] / [`DataSource`] for
//! each managed type); [`Server`] answers the host's RPCs on its behalf:
//! metadata discovery, schema serving and configuration validation.
//!
//! Every RPC takes a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! that is checked before any call into plugin code.

mod config;
mod error;
mod logging;
mod metadata;
mod provider;
mod server;

pub use config::{ServerConfig, config_dir};
pub use error::{ServerError, ServerResult};
pub use logging::{LOG_ENV, init_logging};
pub use metadata::{
    DataSourceMetadata, GetMetadataRequest, GetMetadataResponse, GetProviderSchemaResponse,
    ResourceMetadata, ServerCapabilities, ValidateConfigRequest, ValidateConfigResponse,
};
pub use provider::{
    DataSource, DataSourceMetadataRequest, DataSourceMetadataResponse, MetadataRequest,
    MetadataResponse, Provider, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    SchemaResponse,
};
pub use server::Server;

// Re-exported so plugin crates can implement the traits without a direct
// dependency.
pub use async_trait::async_trait;
