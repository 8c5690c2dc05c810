//! # Organization Handler
//!
//! Runs one request through validate → translate → store → map. Holds no
//! per-request state; every call is independent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::query::OrganizationQuery;
use crate::store::{OrganizationStore, StoreError};

use super::errors::{RestError, RestResult, ValidationError};
use super::filter::{
    ActivityFilter, BuildingFilter, NameFilter, OrganizationId, RadiusFilter, RectangleFilter,
};
use super::response::{summaries, MappingError, OrganizationDetail, OrganizationSummary};

/// Query entry points shared by the HTTP routes
#[derive(Clone)]
pub struct OrganizationHandler {
    store: Arc<dyn OrganizationStore>,
    metrics: Arc<MetricsRegistry>,
}

impl OrganizationHandler {
    pub fn new(store: Arc<dyn OrganizationStore>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// `GET /organizations/`
    pub async fn by_name(
        &self,
        params: &HashMap<String, String>,
    ) -> RestResult<Vec<OrganizationSummary>> {
        let filter = self.validated(NameFilter::parse(params))?;
        self.list(filter.into()).await
    }

    /// `GET /organizations/building/{building_id}`
    pub async fn by_building(&self, building_id: &str) -> RestResult<Vec<OrganizationSummary>> {
        let filter = self.validated(BuildingFilter::parse(building_id))?;
        self.list(filter.into()).await
    }

    /// `GET /organizations/activity/{activity_id}`
    pub async fn by_activity(&self, activity_id: &str) -> RestResult<Vec<OrganizationSummary>> {
        let filter = self.validated(ActivityFilter::parse(activity_id))?;
        self.list(filter.into()).await
    }

    /// `POST /organizations/search/radius`
    pub async fn within_radius(
        &self,
        params: &HashMap<String, String>,
    ) -> RestResult<Vec<OrganizationSummary>> {
        let filter = self.validated(RadiusFilter::parse(params))?;
        self.list(filter.into()).await
    }

    /// `POST /organizations/search/rectangle`
    pub async fn within_rectangle(
        &self,
        params: &HashMap<String, String>,
    ) -> RestResult<Vec<OrganizationSummary>> {
        let filter = self.validated(RectangleFilter::parse(params))?;
        self.list(filter.into()).await
    }

    /// `GET /organizations/{organization_id}`
    pub async fn detail(&self, organization_id: &str) -> RestResult<OrganizationDetail> {
        let OrganizationId(id) = self.validated(OrganizationId::parse(organization_id))?;

        let record = self
            .store
            .organization_detail(id)
            .await
            .map_err(|e| self.store_failure("detail", e))?;

        let Some(record) = record else {
            self.metrics.increment_not_found();
            return Err(RestError::NotFound);
        };

        let detail = OrganizationDetail::try_from(record).map_err(|e| self.mapping_failure(e))?;
        self.metrics.increment_queries_executed();
        log_event_with_fields(
            Event::QueryExecuted,
            &[("kind", "detail"), ("organization_id", &id.to_string())],
        );

        Ok(detail)
    }

    async fn list(&self, query: OrganizationQuery) -> RestResult<Vec<OrganizationSummary>> {
        let rows = self
            .store
            .list_organizations(&query)
            .await
            .map_err(|e| self.store_failure(query.kind(), e))?;

        self.metrics.increment_queries_executed();
        log_event_with_fields(
            Event::QueryExecuted,
            &[("kind", query.kind()), ("rows", &rows.len().to_string())],
        );

        Ok(summaries(rows))
    }

    /// Count and log an input rejection
    pub fn reject(&self, err: ValidationError) -> RestError {
        self.metrics.increment_queries_rejected();
        log_event_with_fields(
            Event::QueryRejected,
            &[("field", err.field()), ("reason", &err.to_string())],
        );
        RestError::Validation(err)
    }

    fn validated<T>(&self, parsed: Result<T, ValidationError>) -> RestResult<T> {
        parsed.map_err(|e| self.reject(e))
    }

    fn store_failure(&self, kind: &str, err: StoreError) -> RestError {
        self.metrics.increment_store_failures();
        log_event_with_fields(
            Event::StoreFailure,
            &[("error", &err.to_string()), ("kind", kind)],
        );
        RestError::Store(err)
    }

    fn mapping_failure(&self, err: MappingError) -> RestError {
        self.metrics.increment_mapping_failures();
        log_event_with_fields(Event::MappingFailure, &[("error", &err.to_string())]);
        RestError::Mapping(err)
    }
}
