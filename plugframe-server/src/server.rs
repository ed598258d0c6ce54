//! RPC handlers.
//!
//! Each handler builds a fresh response, accumulates diagnostics from every
//! step, and checks for cancellation before calling into plugin code.

use crate::config::ServerConfig;
use crate::metadata::{
    DataSourceMetadata, GetMetadataRequest, GetMetadataResponse, GetProviderSchemaResponse,
    ResourceMetadata, ServerCapabilities, ValidateConfigRequest, ValidateConfigResponse,
};
use crate::provider::{
    DataSource, DataSourceMetadataRequest, DataSourceMetadataResponse, MetadataRequest,
    MetadataResponse, Provider, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    SchemaResponse,
};
use plugframe_schema::{Schema, ValidateSchemaRequest, ValidateSchemaResponse, WireSchema};
use plugframe_types::Diagnostics;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Answers the host's RPCs for one provider.
///
/// The provider type name is remembered here and handed to resources and
/// data sources. It is written once; repeating the same name is fine, a
/// different name is reported as an error and the first one is kept.
/// Hosts may skip GetMetadata, so every other RPC asks the provider for its
/// name when none has been recorded yet.
pub struct Server {
    provider: Arc<dyn Provider>,
    capabilities: ServerCapabilities,
    provider_type_name: RwLock<Option<String>>,
}

impl Server {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_capabilities(provider, ServerCapabilities::default())
    }

    pub fn with_capabilities(
        provider: Arc<dyn Provider>,
        capabilities: ServerCapabilities,
    ) -> Self {
        Self {
            provider,
            capabilities,
            provider_type_name: RwLock::new(None),
        }
    }

    pub fn with_config(provider: Arc<dyn Provider>, config: &ServerConfig) -> Self {
        Self::with_capabilities(provider, config.capabilities)
    }

    pub fn server_capabilities(&self) -> ServerCapabilities {
        self.capabilities
    }

    /// The recorded provider type name, if any.
    pub fn provider_type_name(&self) -> Option<String> {
        self.provider_type_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_provider_type_name(&self, name: &str, diags: &mut Diagnostics) {
        if name.is_empty() {
            return;
        }

        let mut stored = self
            .provider_type_name
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match stored.as_deref() {
            None => *stored = Some(name.to_owned()),
            Some(existing) if existing == name => {}
            Some(existing) => {
                warn!(existing, name, "Provider returned a different type name");
                diags.add_error(
                    "Provider Type Name Changed",
                    format!(
                        "The provider returned the type name {name:?}, \
                         but {existing:?} was already recorded for this server. \
                         This is always an issue with the provider \
                         and should be reported to the provider developers."
                    ),
                );
            }
        }
    }

    fn cancelled(ctx: &CancellationToken, diags: &mut Diagnostics) -> bool {
        if ctx.is_cancelled() {
            debug!("Request cancelled before calling provider code");
            diags.add_error(
                "Request Cancelled",
                "The request was cancelled before the provider finished handling it.",
            );
            return true;
        }
        false
    }

    /// Calls the provider's `metadata` and records the returned name.
    async fn call_provider_metadata(&self, ctx: &CancellationToken, diags: &mut Diagnostics) {
        if Self::cancelled(ctx, diags) {
            return;
        }

        let mut resp = MetadataResponse::default();
        trace!("Calling provider defined Provider Metadata");
        self.provider.metadata(&MetadataRequest::default(), &mut resp).await;
        trace!(
            type_name = %resp.type_name,
            version = %resp.version,
            "Called provider defined Provider Metadata"
        );

        diags.append(resp.diagnostics);
        self.record_provider_type_name(&resp.type_name, diags);
    }

    /// The recorded provider type name, asking the provider first when no
    /// name has been recorded yet.
    async fn resolve_provider_type_name(
        &self,
        ctx: &CancellationToken,
        diags: &mut Diagnostics,
    ) -> String {
        if let Some(name) = self.provider_type_name() {
            return name;
        }
        debug!("No provider type name recorded, calling provider metadata");
        self.call_provider_metadata(ctx, diags).await;
        self.provider_type_name().unwrap_or_default()
    }

    // ================================================================
    // Type name discovery
    // ================================================================

    async fn data_source_types(
        &self,
        ctx: &CancellationToken,
        provider_type_name: &str,
        diags: &mut Diagnostics,
    ) -> Vec<(String, Arc<dyn DataSource>)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (index, data_source) in self.provider.data_sources().into_iter().enumerate() {
            if Self::cancelled(ctx, diags) {
                break;
            }

            let req = DataSourceMetadataRequest {
                provider_type_name: provider_type_name.to_owned(),
            };
            let mut resp = DataSourceMetadataResponse::default();
            trace!(index, "Calling provider defined DataSource Metadata");
            data_source.metadata(&req, &mut resp).await;
            trace!(
                index,
                type_name = %resp.type_name,
                "Called provider defined DataSource Metadata"
            );

            if resp.type_name.is_empty() {
                diags.add_error(
                    "Data Source Type Name Missing",
                    format!(
                        "Data source number {index} returned an empty string \
                         from the Metadata method. This is always an issue with the provider \
                         and should be reported to the provider developers."
                    ),
                );
                continue;
            }

            if !seen.insert(resp.type_name.clone()) {
                diags.add_error(
                    "Duplicate Data Source Type Defined",
                    format!(
                        "The {} data source type name was returned for multiple data sources. \
                         Data source type names must be unique. \
                         This is always an issue with the provider \
                         and should be reported to the provider developers.",
                        resp.type_name
                    ),
                );
                continue;
            }

            out.push((resp.type_name, data_source));
        }

        out
    }

    async fn resource_types(
        &self,
        ctx: &CancellationToken,
        provider_type_name: &str,
        diags: &mut Diagnostics,
    ) -> Vec<(String, Arc<dyn Resource>)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (index, resource) in self.provider.resources().into_iter().enumerate() {
            if Self::cancelled(ctx, diags) {
                break;
            }

            let req = ResourceMetadataRequest {
                provider_type_name: provider_type_name.to_owned(),
            };
            let mut resp = ResourceMetadataResponse::default();
            trace!(index, "Calling provider defined Resource Metadata");
            resource.metadata(&req, &mut resp).await;
            trace!(
                index,
                type_name = %resp.type_name,
                "Called provider defined Resource Metadata"
            );

            if resp.type_name.is_empty() {
                diags.add_error(
                    "Resource Type Name Missing",
                    format!(
                        "Resource number {index} returned an empty string \
                         from the Metadata method. This is always an issue with the provider \
                         and should be reported to the provider developers."
                    ),
                );
                continue;
            }

            if !seen.insert(resp.type_name.clone()) {
                diags.add_error(
                    "Duplicate Resource Type Defined",
                    format!(
                        "The {} resource type name was returned for multiple resources. \
                         Resource type names must be unique. \
                         This is always an issue with the provider \
                         and should be reported to the provider developers.",
                        resp.type_name
                    ),
                );
                continue;
            }

            out.push((resp.type_name, resource));
        }

        out
    }

    // ================================================================
    // RPCs
    // ================================================================

    /// GetMetadata: the provider's data source and resource type names.
    ///
    /// The lists stay empty if any step reported an error; partial results
    /// are never returned.
    pub async fn get_metadata(
        &self,
        ctx: &CancellationToken,
        _req: &GetMetadataRequest,
    ) -> GetMetadataResponse {
        let mut resp = GetMetadataResponse {
            data_sources: Vec::new(),
            resources: Vec::new(),
            server_capabilities: self.server_capabilities(),
            diagnostics: Diagnostics::new(),
        };

        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }

        self.call_provider_metadata(ctx, &mut resp.diagnostics).await;
        let provider_type_name = self.provider_type_name().unwrap_or_default();

        let data_sources = self
            .data_source_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;
        let resources = self
            .resource_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;

        if resp.diagnostics.has_error() {
            debug!(errors = resp.diagnostics.error_count(), "GetMetadata returning errors");
            return resp;
        }

        resp.data_sources = data_sources
            .into_iter()
            .map(|(type_name, _)| DataSourceMetadata { type_name })
            .collect();
        resp.resources = resources
            .into_iter()
            .map(|(type_name, _)| ResourceMetadata { type_name })
            .collect();
        resp
    }

    /// GetProviderSchema: wire schemas for the provider, every resource and
    /// every data source.
    ///
    /// Nothing is returned if any schema failed to load or convert.
    pub async fn get_provider_schema(&self, ctx: &CancellationToken) -> GetProviderSchemaResponse {
        let mut resp = GetProviderSchemaResponse {
            provider: None,
            resource_schemas: BTreeMap::new(),
            data_source_schemas: BTreeMap::new(),
            server_capabilities: self.server_capabilities(),
            diagnostics: Diagnostics::new(),
        };

        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }

        let provider_type_name = self
            .resolve_provider_type_name(ctx, &mut resp.diagnostics)
            .await;

        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }
        let mut schema_resp = SchemaResponse::default();
        trace!("Calling provider defined Provider Schema");
        self.provider.schema(&mut schema_resp).await;
        trace!("Called provider defined Provider Schema");
        resp.diagnostics.append(schema_resp.diagnostics);
        let provider = convert_schema(&schema_resp.schema, "provider", &mut resp.diagnostics);

        let resources = self
            .resource_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;
        let mut resource_schemas = BTreeMap::new();
        for (type_name, resource) in resources {
            if Self::cancelled(ctx, &mut resp.diagnostics) {
                break;
            }
            let mut schema_resp = SchemaResponse::default();
            resource.schema(&mut schema_resp).await;
            resp.diagnostics.append(schema_resp.diagnostics);
            let what = format!("resource {type_name:?}");
            if let Some(wire) = convert_schema(&schema_resp.schema, &what, &mut resp.diagnostics) {
                resource_schemas.insert(type_name, wire);
            }
        }

        let data_sources = self
            .data_source_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;
        let mut data_source_schemas = BTreeMap::new();
        for (type_name, data_source) in data_sources {
            if Self::cancelled(ctx, &mut resp.diagnostics) {
                break;
            }
            let mut schema_resp = SchemaResponse::default();
            data_source.schema(&mut schema_resp).await;
            resp.diagnostics.append(schema_resp.diagnostics);
            let what = format!("data source {type_name:?}");
            if let Some(wire) = convert_schema(&schema_resp.schema, &what, &mut resp.diagnostics) {
                data_source_schemas.insert(type_name, wire);
            }
        }

        if resp.diagnostics.has_error() {
            debug!(errors = resp.diagnostics.error_count(), "GetProviderSchema returning errors");
            return resp;
        }

        resp.provider = provider;
        resp.resource_schemas = resource_schemas;
        resp.data_source_schemas = data_source_schemas;
        resp
    }

    /// ValidateResourceConfig: checks `req.config` against the schema of
    /// the resource named `req.type_name`.
    pub async fn validate_resource_config(
        &self,
        ctx: &CancellationToken,
        req: &ValidateConfigRequest,
    ) -> ValidateConfigResponse {
        let mut resp = ValidateConfigResponse::default();
        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }

        let provider_type_name = self
            .resolve_provider_type_name(ctx, &mut resp.diagnostics)
            .await;
        let resources = self
            .resource_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;

        let Some((_, resource)) = resources
            .into_iter()
            .find(|(name, _)| *name == req.type_name)
        else {
            resp.diagnostics.add_error(
                "Resource Type Not Found",
                format!(
                    "The resource type {:?} is not supported by this provider.",
                    req.type_name
                ),
            );
            return resp;
        };

        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }
        let mut schema_resp = SchemaResponse::default();
        resource.schema(&mut schema_resp).await;
        validate_against(ctx, schema_resp, &req.config, &mut resp.diagnostics);
        resp
    }

    /// ValidateDataSourceConfig: checks `req.config` against the schema of
    /// the data source named `req.type_name`.
    pub async fn validate_data_source_config(
        &self,
        ctx: &CancellationToken,
        req: &ValidateConfigRequest,
    ) -> ValidateConfigResponse {
        let mut resp = ValidateConfigResponse::default();
        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }

        let provider_type_name = self
            .resolve_provider_type_name(ctx, &mut resp.diagnostics)
            .await;
        let data_sources = self
            .data_source_types(ctx, &provider_type_name, &mut resp.diagnostics)
            .await;

        let Some((_, data_source)) = data_sources
            .into_iter()
            .find(|(name, _)| *name == req.type_name)
        else {
            resp.diagnostics.add_error(
                "Data Source Type Not Found",
                format!(
                    "The data source type {:?} is not supported by this provider.",
                    req.type_name
                ),
            );
            return resp;
        };

        if Self::cancelled(ctx, &mut resp.diagnostics) {
            return resp;
        }
        let mut schema_resp = SchemaResponse::default();
        data_source.schema(&mut schema_resp).await;
        validate_against(ctx, schema_resp, &req.config, &mut resp.diagnostics);
        resp
    }
}

/// Converts a schema for the wire, turning a conversion failure into an
/// error diagnostic.
fn convert_schema(schema: &Schema, what: &str, diags: &mut Diagnostics) -> Option<WireSchema> {
    match schema.to_wire_schema() {
        Ok(wire) => Some(wire),
        Err(err) => {
            warn!(schema = what, error = %err, "Schema conversion failed");
            diags.add_error(
                "Error converting schema",
                format!(
                    "The schema for the {what} couldn't be converted into a usable type. \
                     This is always a problem with the provider. \
                     Please report the following to the provider developer:\n\n{err}"
                ),
            );
            None
        }
    }
}

/// Runs schema validation once the schema itself loaded cleanly.
fn validate_against(
    ctx: &CancellationToken,
    schema_resp: SchemaResponse,
    config: &serde_json::Value,
    diags: &mut Diagnostics,
) {
    let schema_has_error = schema_resp.diagnostics.has_error();
    diags.append(schema_resp.diagnostics);
    if schema_has_error {
        return;
    }

    let req = ValidateSchemaRequest {
        config: config.clone(),
    };
    let mut resp = ValidateSchemaResponse::default();
    schema_resp.schema.validate(ctx, &req, &mut resp);
    diags.append(resp.diagnostics);
}
