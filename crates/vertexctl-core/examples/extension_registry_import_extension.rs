//! Import an extension and wait for the operation (blocking)
//!
//! ```text
//! GOOGLE_CLOUD_PROJECT=my-project \
//! GOOGLE_CLOUD_LOCATION=us-central1 \
//! GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token) \
//! cargo run -p vertexctl-core --example extension_registry_import_extension
//! ```

use vertexctl_core::services::{
    ApiKeyConfig, ApiSpec, AuthConfig, Extension, ExtensionManifest, ExtensionRegistryHandler,
    HttpElementLocation,
};
use vertexctl_core::{BlockingClient, PlatformContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context = PlatformContext::from_env()?;

    let extension = Extension {
        display_name: "display_name_value".to_string(),
        manifest: ExtensionManifest {
            name: "name_value".to_string(),
            description: "description_value".to_string(),
            api_spec: ApiSpec {
                open_api_yaml: Some("open_api_yaml_value".to_string()),
                ..Default::default()
            },
            auth_config: AuthConfig {
                api_key_config: Some(ApiKeyConfig {
                    name: "name_value".to_string(),
                    api_key_secret: "api_key_secret_value".to_string(),
                    http_element_location: HttpElementLocation::HttpInCookie,
                }),
                ..Default::default()
            },
        },
        ..Default::default()
    };

    let blocking = BlockingClient::new()?;
    let handler = ExtensionRegistryHandler::new(context.client()?);
    let operation = blocking.block_on(handler.import_extension(&context.parent(), &extension))?;

    println!("Waiting for operation to complete...");
    let response = blocking.wait(operation)?;
    println!("{response:#?}");
    Ok(())
}
