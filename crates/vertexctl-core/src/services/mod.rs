//! Typed handlers for the platform's REST services
//!
//! Each handler wraps a cloned [`AiPlatformClient`](crate::AiPlatformClient),
//! validates required fields before sending anything, and returns either the
//! decoded response, a [`Pager`](crate::Pager), or an
//! [`OperationHandle`](crate::OperationHandle).

pub mod example_store;
pub mod extension_registry;
pub mod index;
pub mod job;
pub mod persistent_resource;

pub use example_store::{
    ContentsExample, Example, ExampleStoreHandler, ExpectedContent, FetchExamplesRequest,
    RemoveExamplesRequest, RemoveExamplesResponse, StoredContentsExample, UpsertExamplesRequest,
    UpsertExamplesResponse, UpsertResult,
};
pub use extension_registry::{
    ApiKeyConfig, ApiSpec, AuthConfig, Extension, ExtensionManifest, ExtensionRegistryHandler,
    HttpElementLocation,
};
pub use index::{Index, IndexHandler, IndexStats, ListIndexesParams};
pub use job::{
    JobServiceHandler, ModelMonitoringStatsAnomalies,
    SearchModelDeploymentMonitoringStatsAnomaliesRequest, StatsAnomaliesObjective,
};
pub use persistent_resource::{
    PersistentResource, PersistentResourceHandler, PersistentResourceState, ResourcePool,
};
