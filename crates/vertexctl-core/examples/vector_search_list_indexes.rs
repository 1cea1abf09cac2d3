//! List the vector search indexes in a project and location
//!
//! ```text
//! GOOGLE_CLOUD_PROJECT=my-project \
//! GOOGLE_CLOUD_LOCATION=us-central1 \
//! GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token) \
//! cargo run -p vertexctl-core --example vector_search_list_indexes
//! ```

use vertexctl_core::services::{Index, IndexHandler, ListIndexesParams};
use vertexctl_core::{PlatformContext, Result};

async fn vector_search_list_indexes(context: &PlatformContext) -> Result<Vec<Index>> {
    let handler = IndexHandler::new(context.client()?);
    handler
        .list_indexes(&ListIndexesParams::new(context.parent()))?
        .collect()
        .await
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let context = PlatformContext::from_env()?;
    for index in vector_search_list_indexes(&context).await? {
        println!("{} ({})", index.display_name, index.name);
    }
    Ok(())
}
