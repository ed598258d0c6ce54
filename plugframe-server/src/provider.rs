//! Traits a plugin implements, and the request/response pairs the server
//! hands to them.

use async_trait::async_trait;
use plugframe_schema::Schema;
use plugframe_types::Diagnostics;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MetadataRequest {}

#[derive(Debug, Clone, Default)]
pub struct MetadataResponse {
    /// Prefix for every resource and data source type name, e.g. `"examplecloud"`.
    pub type_name: String,
    /// Provider release, logged with the type name.
    pub version: String,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaResponse {
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct DataSourceMetadataRequest {
    pub provider_type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DataSourceMetadataResponse {
    pub type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceMetadataRequest {
    pub provider_type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceMetadataResponse {
    pub type_name: String,
}

/// The plugin's top-level entry point.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Reports the provider's type name.
    async fn metadata(&self, req: &MetadataRequest, resp: &mut MetadataResponse);

    /// Schema of the provider's own configuration block.
    async fn schema(&self, resp: &mut SchemaResponse);

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        Vec::new()
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        Vec::new()
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn metadata(
        &self,
        req: &DataSourceMetadataRequest,
        resp: &mut DataSourceMetadataResponse,
    );

    async fn schema(&self, resp: &mut SchemaResponse);
}

#[async_trait]
pub trait Resource: Send + Sync {
    async fn metadata(&self, req: &ResourceMetadataRequest, resp: &mut ResourceMetadataResponse);

    async fn schema(&self, resp: &mut SchemaResponse);
}
