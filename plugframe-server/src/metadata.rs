//! RPC request and response records.

use plugframe_schema::WireSchema;
use plugframe_types::Diagnostics;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Optional protocol features this server supports. Read from
/// configuration at startup and never changed by a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// The host may call PlanResourceChange for destroy plans.
    #[serde(default)]
    pub plan_destroy: bool,
    /// The host may skip GetProviderSchema when it has a cached copy.
    #[serde(default)]
    pub get_provider_schema_optional: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GetMetadataRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceMetadata {
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceMetadata {
    pub type_name: String,
}

/// Both lists are empty whenever `diagnostics` contains an error.
#[derive(Debug, Clone, Serialize)]
pub struct GetMetadataResponse {
    pub data_sources: Vec<DataSourceMetadata>,
    pub resources: Vec<ResourceMetadata>,
    pub server_capabilities: ServerCapabilities,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetProviderSchemaResponse {
    pub provider: Option<WireSchema>,
    pub resource_schemas: BTreeMap<String, WireSchema>,
    pub data_source_schemas: BTreeMap<String, WireSchema>,
    pub server_capabilities: ServerCapabilities,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateConfigRequest {
    pub type_name: String,
    pub config: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidateConfigResponse {
    pub diagnostics: Diagnostics,
}
