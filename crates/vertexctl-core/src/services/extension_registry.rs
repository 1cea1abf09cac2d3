//! Extension registry (v1beta1)
//!
//! Extensions describe an external API (OpenAPI spec plus auth settings) that
//! models can call. Importing one is a long-running operation.

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::{CoreError, Result};
use crate::lro::{Operation, OperationHandle};
use crate::names::require;
use crate::pagination::{PagedResponse, Pager};
use crate::wire::Empty;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// A registered extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Output only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub manifest: ExtensionManifest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_operations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_use_examples: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    #[serde(default)]
    pub name: String,
    /// Shown to the model when it decides whether to call the extension
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub api_spec: ApiSpec,
    #[serde(default)]
    pub auth_config: AuthConfig,
}

/// OpenAPI spec, inline or by Cloud Storage URI; set exactly one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_api_yaml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_api_gcs_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// e.g. `API_KEY_AUTH`, `GOOGLE_SERVICE_ACCOUNT_AUTH`, `NO_AUTH`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_config: Option<ApiKeyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_basic_auth_config: Option<HttpBasicAuthConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_service_account_config: Option<GoogleServiceAccountConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_config: Option<OauthConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_config: Option<OidcConfig>,
}

impl AuthConfig {
    fn is_set(&self) -> bool {
        self.auth_type.is_some()
            || self.api_key_config.is_some()
            || self.http_basic_auth_config.is_some()
            || self.google_service_account_config.is_some()
            || self.oauth_config.is_some()
            || self.oidc_config.is_some()
    }
}

/// Where an API key is placed in the outgoing HTTP request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpElementLocation {
    #[default]
    HttpElementLocationUnspecified,
    HttpInQuery,
    HttpInHeader,
    HttpInPath,
    HttpInBody,
    HttpInCookie,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyConfig {
    /// Parameter name the key is sent under
    pub name: String,
    /// Secret Manager version holding the key
    pub api_key_secret: String,
    #[serde(default)]
    pub http_element_location: HttpElementLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpBasicAuthConfig {
    pub credential_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleServiceAccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExtensionsResponse {
    #[serde(default)]
    pub extensions: Vec<Extension>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl PagedResponse for ListExtensionsResponse {
    type Item = Extension;

    fn into_page(self) -> (Vec<Extension>, Option<String>) {
        (self.extensions, self.next_page_token)
    }
}

/// Check the fields an import needs
fn validate_extension(extension: &Extension) -> Result<()> {
    require("extension.display_name", &extension.display_name)?;
    require("extension.manifest.name", &extension.manifest.name)?;
    require("extension.manifest.description", &extension.manifest.description)?;

    let spec = &extension.manifest.api_spec;
    match (&spec.open_api_yaml, &spec.open_api_gcs_uri) {
        (Some(_), Some(_)) => {
            return Err(CoreError::Validation(
                "set only one of `open_api_yaml` and `open_api_gcs_uri`".to_string(),
            ));
        }
        (None, None) => return Err(CoreError::missing("extension.manifest.api_spec")),
        _ => {}
    }

    if !extension.manifest.auth_config.is_set() {
        return Err(CoreError::missing("extension.manifest.auth_config"));
    }
    if let Some(key) = &extension.manifest.auth_config.api_key_config {
        require("api_key_config.name", &key.name)?;
        require("api_key_config.api_key_secret", &key.api_key_secret)?;
    }
    Ok(())
}

/// Extension registry operations
#[derive(Debug, Clone)]
pub struct ExtensionRegistryHandler {
    client: AiPlatformClient,
}

impl ExtensionRegistryHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    /// Import an extension under `parent` (`projects/*/locations/*`)
    pub async fn import_extension(
        &self,
        parent: &str,
        extension: &Extension,
    ) -> Result<OperationHandle<Extension>> {
        let parent = require("parent", parent)?;
        validate_extension(extension)?;

        let operation: Operation = self
            .client
            .post(
                ApiVersion::V1Beta1,
                &format!("{parent}/extensions:import"),
                &[],
                extension,
            )
            .await?;
        info!("Importing extension '{}'", extension.display_name);
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1Beta1,
            operation,
        ))
    }

    pub async fn get_extension(&self, name: &str) -> Result<Extension> {
        let name = require("name", name)?;
        self.client.get(ApiVersion::V1Beta1, name, &[]).await
    }

    /// Page through the extensions under `parent`
    pub fn list_extensions(
        &self,
        parent: &str,
        filter: Option<&str>,
        page_size: Option<i32>,
    ) -> Result<Pager<Extension>> {
        let parent = require("parent", parent)?;
        let mut query = Vec::new();
        if let Some(filter) = filter {
            query.push(("filter", filter.to_string()));
        }
        if let Some(size) = page_size {
            query.push(("pageSize", size.to_string()));
        }
        Ok(Pager::get::<ListExtensionsResponse>(
            self.client.clone(),
            ApiVersion::V1Beta1,
            format!("{parent}/extensions"),
            query,
        ))
    }

    pub async fn delete_extension(&self, name: &str) -> Result<OperationHandle<Empty>> {
        let name = require("name", name)?;
        let operation: Operation = self.client.delete(ApiVersion::V1Beta1, name).await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1Beta1,
            operation,
        ))
    }
}
