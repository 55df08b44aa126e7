//! Migration methods on [`PgClient`].

use std::future::Future;

use super::{
    MigrationResult, MigrationStatus, get_migration_status, run_pending_migrations,
    verify_schema_integrity,
};
use crate::{PgClient, PgResult};

/// Extension trait providing migration functionality for [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every embedded migration not yet recorded in the database.
    ///
    /// Safe to call on every startup.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>>;

    /// Compares the embedded migrations with the ones recorded as applied.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>>;

    /// Checks that the migration bookkeeping and the event table exist.
    fn verify_schema_integrity(&self) -> impl Future<Output = PgResult<()>>;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        get_migration_status(&mut conn).await
    }

    async fn verify_schema_integrity(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        verify_schema_integrity(&mut conn).await
    }
}
