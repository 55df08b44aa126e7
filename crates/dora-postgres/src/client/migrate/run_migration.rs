use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::PoolableConnection;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, get_migration_status};
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies all pending embedded migrations.
///
/// The diesel migration harness is synchronous, so it runs on a blocking
/// thread over an [`AsyncConnectionWrapper`].
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let start_time = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    let initial_status = get_migration_status(&mut conn).await?;

    if initial_status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = initial_status.applied_migrations(),
            "Database schema is up to date"
        );
        return Ok(MigrationResult::success(start_time.elapsed(), vec![]));
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = initial_status.pending_migrations(),
        next = initial_status.next_pending_version(),
        "Applying pending migrations"
    );

    if conn.is_broken() {
        return Err(PgError::Migration(
            "connection is broken before migrations".into(),
        ));
    }

    let mut conn: AsyncConnectionWrapper<_> = conn.into();
    let joined = spawn_blocking(move || {
        conn.run_pending_migrations(MIGRATIONS).map(|versions| {
            versions
                .into_iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
        })
    })
    .await;

    let duration = start_time.elapsed();
    let versions = joined
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                error = %err,
                "Migration task panicked"
            );
            PgError::Migration(err.into())
        })?
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                error = %err,
                "Database migration failed"
            );
            PgError::Migration(err)
        })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        applied = versions.len(),
        "Database migrations applied"
    );

    Ok(MigrationResult::success(duration, versions))
}
