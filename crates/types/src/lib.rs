//! Shared types for the Prefect MCP server.
//!
//! These types describe the request bodies the Prefect REST API understands:
//! filter objects for the `/<collection>/filter` endpoints, sort orders, state
//! payloads used for flow run creation and cancellation, and the
//! identifiers tools accept for addressing resources.

pub mod filters;
pub mod requests;
pub mod resources;
pub mod sort;
pub mod state;

pub use filters::{
    DEFAULT_LIMIT, DeploymentFilter, DeploymentQuery, EqFilter, FilterError, FilterRequest, FlowFilter, FlowQuery, FlowRunFilter,
    FlowRunQuery, IdFilter, Limit, MAX_LIMIT, NameFilter, StateFilter, TagsFilter, TimeRangeFilter, ValuesFilter,
};
pub use requests::{FlowRunCreate, OrchestrationResult, OrchestrationStatus, SetStateRequest, StateCreate, StateDetails};
pub use resources::{DeploymentRef, DeploymentRefError, ResourceKind};
pub use sort::{DeploymentSort, FlowRunSort, FlowSort};
pub use state::{DeploymentStatus, StateType};
