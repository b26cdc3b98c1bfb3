//! # staffroom-api
//!
//! The endpoint layer of the Staffroom client: declarative endpoint
//! definitions, the duplicate-checked registry, typed query/mutation handles
//! and the [`Api`] facade that wires the whole catalog to one HTTP client,
//! cache store and session store.
//!
//! ## Example
//!
//! ```ignore
//! use staffroom_api::Api;
//! use staffroom_config::ClientConfig;
//!
//! let api = Api::new(ClientConfig::from_env())?;
//! api.boot_session().await;
//!
//! let mut jobs = api.jobs.list_jobs.subscribe(Default::default())?;
//! let view = jobs.settled().await;
//! ```

mod api;
mod envelope;
mod handle;
mod registry;

pub mod endpoints;
pub mod telemetry;

pub use api::Api;
pub use handle::{MutationHandle, QueryHandle, QueryView, TypedSubscription};
pub use registry::{EndpointKind, MutationDef, QueryDef, Registry};

pub use endpoints::applications::{ApplicationEndpoints, StatusChange};
pub use endpoints::auth::AuthEndpoints;
pub use endpoints::content::ContentEndpoints;
pub use endpoints::jobs::{JobEndpoints, JobFilter, UpdateJob};
pub use endpoints::notifications::NotificationEndpoints;
pub use endpoints::pipeline::{
    ExtendOffer, OfferResponse, PipelineEndpoints, RescheduleInterview, ScheduleInterview,
};
pub use endpoints::profile::{FileUpload, ProfileEndpoints, UpdateProfile};
