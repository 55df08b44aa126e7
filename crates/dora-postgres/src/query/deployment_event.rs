//! Deployment event repository.
//!
//! Events are append-only: the repository exposes inserts and reads, never
//! updates or deletes. Range reads return rows ordered by
//! `(deployment_timestamp, created_at, id)` ascending, the order the metrics
//! aggregator relies on.

use std::future::Future;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{DeploymentEvent, NewDeploymentEvent};
use crate::schema::deployment_events;
use crate::types::{CursorPage, CursorPagination, DeploymentFilter};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY};

/// Repository for deployment event database operations.
pub trait DeploymentEventRepository {
    /// Appends a single deployment event.
    ///
    /// The insert is a single statement, so a row is either fully visible or
    /// not written at all.
    fn create_deployment_event(
        &mut self,
        event: NewDeploymentEvent,
    ) -> impl Future<Output = PgResult<DeploymentEvent>> + Send;

    /// Finds a deployment event by its unique identifier.
    fn find_deployment_event_by_id(
        &mut self,
        event_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<DeploymentEvent>>> + Send;

    /// Counts the deployment events matching the filter.
    fn count_deployment_events(
        &mut self,
        filter: DeploymentFilter,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Lists deployment events matching the filter with cursor pagination.
    fn cursor_list_deployment_events(
        &mut self,
        filter: DeploymentFilter,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<DeploymentEvent>>> + Send;
}

/// Builds the boxed `WHERE` clause for a filter.
fn filtered_query(filter: &DeploymentFilter) -> deployment_events::BoxedQuery<'_, Pg> {
    use deployment_events::dsl;

    let mut query = deployment_events::table.into_boxed();

    if let Some(from) = filter.from {
        let from = jiff_diesel::Timestamp::from(from);
        query = query.filter(dsl::deployment_timestamp.ge(from));
    }

    if let Some(to) = filter.to {
        let to = jiff_diesel::Timestamp::from(to);
        query = query.filter(dsl::deployment_timestamp.lt(to));
    }

    if let Some(repository) = filter.repository.as_deref() {
        query = query.filter(dsl::repository.eq(repository));
    }

    if let Some(project_key) = filter.project_key.as_deref() {
        query = query.filter(dsl::project_key.eq(project_key));
    }

    if let Some(status) = filter.status {
        query = query.filter(dsl::status.eq(status));
    }

    query
}

impl DeploymentEventRepository for PgConnection {
    async fn create_deployment_event(
        &mut self,
        event: NewDeploymentEvent,
    ) -> PgResult<DeploymentEvent> {
        use deployment_events::table;

        let event = diesel::insert_into(table)
            .values(&event)
            .returning(DeploymentEvent::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            event_id = %event.id,
            repository = %event.repository,
            status = %event.status,
            "Deployment event inserted"
        );

        Ok(event)
    }

    async fn find_deployment_event_by_id(
        &mut self,
        event_id: Uuid,
    ) -> PgResult<Option<DeploymentEvent>> {
        use deployment_events::dsl;

        let event = deployment_events::table
            .filter(dsl::id.eq(event_id))
            .select(DeploymentEvent::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(event)
    }

    async fn count_deployment_events(&mut self, filter: DeploymentFilter) -> PgResult<i64> {
        let count = filtered_query(&filter)
            .count()
            .get_result::<i64>(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }

    async fn cursor_list_deployment_events(
        &mut self,
        filter: DeploymentFilter,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<DeploymentEvent>> {
        use deployment_events::dsl;

        let total = if pagination.include_count {
            Some(self.count_deployment_events(filter.clone()).await?)
        } else {
            None
        };

        let mut query = filtered_query(&filter);

        if let Some(cursor) = &pagination.after {
            let deployed_at = jiff_diesel::Timestamp::from(cursor.deployed_at);
            let created_at = jiff_diesel::Timestamp::from(cursor.created_at);

            query = query.filter(
                dsl::deployment_timestamp
                    .gt(deployed_at)
                    .or(dsl::deployment_timestamp
                        .eq(deployed_at)
                        .and(dsl::created_at.gt(created_at)))
                    .or(dsl::deployment_timestamp
                        .eq(deployed_at)
                        .and(dsl::created_at.eq(created_at))
                        .and(dsl::id.gt(cursor.id))),
            );
        }

        let items: Vec<DeploymentEvent> = query
            .select(DeploymentEvent::as_select())
            .order((
                dsl::deployment_timestamp.asc(),
                dsl::created_at.asc(),
                dsl::id.asc(),
            ))
            .limit(pagination.fetch_limit())
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            rows = items.len(),
            has_cursor = pagination.has_cursor(),
            "Deployment event page loaded"
        );

        Ok(CursorPage::new(
            items,
            total,
            pagination.limit,
            DeploymentEvent::cursor,
        ))
    }
}
