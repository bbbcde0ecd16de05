//! Filter objects for the Prefect `/<collection>/filter` endpoints.
//!
//! Every filter endpoint accepts the same envelope: optional `flows`,
//! `flow_runs` and `deployments` criteria, a sort order, a `limit` and an
//! `offset`. Criteria are combined with AND by the server. Operators use the
//! API's trailing-underscore names (`any_`, `like_`, `all_`, `eq_`, ...).
//!
//! Empty criteria are never serialized, so a default filter is equivalent to
//! "match everything".

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::sort::{DeploymentSort, FlowRunSort, FlowSort};
use crate::state::{DeploymentStatus, StateType};

/// Page size used when a tool call does not specify one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size the API serves by default.
pub const MAX_LIMIT: u32 = 200;

/// Errors raised while assembling a filter request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("limit must be between 1 and {max}, got {value}")]
    LimitOutOfRange { value: u64, max: u32 },
}

/// Bounded result count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Limit(u32);

impl Limit {
    pub fn new(value: u64) -> Result<Self, FilterError> {
        if value == 0 || value > u64::from(MAX_LIMIT) {
            return Err(FilterError::LimitOutOfRange { value, max: MAX_LIMIT });
        }
        Ok(Self(value as u32))
    }

    /// Validate an optional caller-supplied limit, falling back to [`DEFAULT_LIMIT`].
    pub fn from_optional(value: Option<u64>) -> Result<Self, FilterError> {
        value.map(Self::new).unwrap_or(Ok(Self::default()))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NameFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_: Option<Vec<String>>,
    /// Case-insensitive substring match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagsFilter {
    /// Records must carry every listed tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValuesFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqFilter<T> {
    pub eq_: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeRangeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateTypeFilter {
    pub any_: Vec<StateType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateNameFilter {
    pub any_: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub state_type: Option<StateTypeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<StateNameFilter>,
}

/// Criteria applied to flows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<IdFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NameFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsFilter>,
}

impl FlowFilter {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.tags.is_none()
    }

    pub fn with_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.id = Some(IdFilter { any_: Some(ids) });
        self
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.name.get_or_insert_with(NameFilter::default).any_ = Some(names);
        self
    }

    pub fn with_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.name.get_or_insert_with(NameFilter::default).like_ = Some(pattern.into());
        self
    }

    pub fn with_all_tags(mut self, tags: Vec<String>) -> Self {
        self.tags.get_or_insert_with(TagsFilter::default).all_ = Some(tags);
        self
    }
}

/// Criteria applied to flow runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowRunFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NameFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<IdFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeRangeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_start_time: Option<TimeRangeFilter>,
}

impl FlowRunFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.tags.is_none()
            && self.deployment_id.is_none()
            && self.state.is_none()
            && self.start_time.is_none()
            && self.expected_start_time.is_none()
    }

    pub fn with_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.name.get_or_insert_with(NameFilter::default).like_ = Some(pattern.into());
        self
    }

    pub fn with_all_tags(mut self, tags: Vec<String>) -> Self {
        self.tags.get_or_insert_with(TagsFilter::default).all_ = Some(tags);
        self
    }

    pub fn with_deployment_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.deployment_id = Some(IdFilter { any_: Some(ids) });
        self
    }

    pub fn with_state_types(mut self, state_types: Vec<StateType>) -> Self {
        self.state.get_or_insert_with(StateFilter::default).state_type = Some(StateTypeFilter { any_: state_types });
        self
    }

    pub fn with_state_names(mut self, state_names: Vec<String>) -> Self {
        self.state.get_or_insert_with(StateFilter::default).name = Some(StateNameFilter { any_: state_names });
        self
    }

    pub fn with_start_time_after(mut self, after: DateTime<Utc>) -> Self {
        self.start_time.get_or_insert_with(TimeRangeFilter::default).after_ = Some(after);
        self
    }

    pub fn with_start_time_before(mut self, before: DateTime<Utc>) -> Self {
        self.start_time.get_or_insert_with(TimeRangeFilter::default).before_ = Some(before);
        self
    }

    /// Scheduled runs that have not started yet only match on expected start time.
    pub fn with_expected_start_time_after(mut self, after: DateTime<Utc>) -> Self {
        self.expected_start_time.get_or_insert_with(TimeRangeFilter::default).after_ = Some(after);
        self
    }

    pub fn with_expected_start_time_before(mut self, before: DateTime<Utc>) -> Self {
        self.expected_start_time.get_or_insert_with(TimeRangeFilter::default).before_ = Some(before);
        self
    }
}

/// Criteria applied to deployments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeploymentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NameFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<EqFilter<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_queue_name: Option<ValuesFilter>,
}

impl DeploymentFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.tags.is_none() && self.paused.is_none() && self.work_queue_name.is_none()
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.name.get_or_insert_with(NameFilter::default).any_ = Some(names);
        self
    }

    pub fn with_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.name.get_or_insert_with(NameFilter::default).like_ = Some(pattern.into());
        self
    }

    pub fn with_all_tags(mut self, tags: Vec<String>) -> Self {
        self.tags.get_or_insert_with(TagsFilter::default).all_ = Some(tags);
        self
    }

    pub fn with_status(mut self, status: DeploymentStatus) -> Self {
        self.paused = Some(EqFilter { eq_: status.is_paused() });
        self
    }

    pub fn with_work_queue_names(mut self, names: Vec<String>) -> Self {
        self.work_queue_name = Some(ValuesFilter { any_: Some(names) });
        self
    }
}

/// Body of a `POST /<collection>/filter` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterRequest<S> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<FlowFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_runs: Option<FlowRunFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployments: Option<DeploymentFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<S>,
    pub limit: Limit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

pub type FlowQuery = FilterRequest<FlowSort>;
pub type FlowRunQuery = FilterRequest<FlowRunSort>;
pub type DeploymentQuery = FilterRequest<DeploymentSort>;

impl<S> FilterRequest<S> {
    pub fn new(limit: Limit) -> Self {
        Self {
            flows: None,
            flow_runs: None,
            deployments: None,
            sort: None,
            limit,
            offset: None,
        }
    }

    pub fn with_flows(mut self, filter: FlowFilter) -> Self {
        self.flows = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn with_flow_runs(mut self, filter: FlowRunFilter) -> Self {
        self.flow_runs = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn with_deployments(mut self, filter: DeploymentFilter) -> Self {
        self.deployments = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn with_sort(mut self, sort: Option<S>) -> Self {
        self.sort = sort;
        self
    }

    /// A zero offset is the API default and is left out of the body.
    pub fn with_offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset.filter(|value| *value > 0);
        self
    }
}
