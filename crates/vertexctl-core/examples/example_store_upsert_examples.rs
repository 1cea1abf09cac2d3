//! Upsert one example into an example store (async)
//!
//! ```text
//! GOOGLE_CLOUD_PROJECT=my-project \
//! GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token) \
//! EXAMPLE_STORE_ID=789 \
//! cargo run -p vertexctl-core --example example_store_upsert_examples
//! ```

use std::env;
use vertexctl_core::PlatformContext;
use vertexctl_core::services::{Example, ExampleStoreHandler, UpsertExamplesRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context = PlatformContext::from_env()?;
    let store_id = env::var("EXAMPLE_STORE_ID").unwrap_or_else(|_| "example_store_value".to_string());

    let handler = ExampleStoreHandler::new(context.client()?);

    let request = UpsertExamplesRequest::new(
        format!("{}/exampleStores/{store_id}", context.parent()),
        vec![Example::from_text("text_value", "text_value")],
    );

    let response = handler.upsert_examples(&request).await?;
    println!("{response:#?}");
    Ok(())
}
