use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

#[derive(diesel::QueryableByName)]
struct ExistsResult {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    exists: bool,
}

/// Returns the versions of all migrations embedded in the binary.
pub(crate) fn embedded_versions() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;
    let mut versions: Vec<String> = migrations
        .iter()
        .map(|m| m.name().version().to_string())
        .collect();

    versions.sort();
    Ok(versions)
}

async fn table_exists(conn: &mut AsyncPgConnection, table: &str) -> PgResult<bool> {
    let result = sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = $1
         ) AS exists",
    )
    .bind::<diesel::sql_types::Text, _>(table)
    .get_result::<ExistsResult>(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to check table {table}: {e}").into()))?;

    Ok(result.exists)
}

/// Gets the current migration status of the database.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let embedded = embedded_versions()?;
    let applied = get_applied_migrations(conn).await?;
    let status = MigrationStatus::from_versions(&embedded, applied);

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied_count = status.applied_migrations(),
        pending_count = status.pending_migrations(),
        is_up_to_date = status.is_up_to_date(),
        "Migration status retrieved"
    );

    Ok(status)
}

/// Verifies that the migration table and the deployment event table exist.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn verify_schema_integrity(conn: &mut AsyncPgConnection) -> PgResult<()> {
    for table in ["__diesel_schema_migrations", "deployment_events"] {
        if !table_exists(conn, table).await? {
            tracing::warn!(target: TRACING_TARGET_MIGRATION, table, "Required table is missing");
            return Err(PgError::Migration(
                format!("Required table {table} does not exist").into(),
            ));
        }
    }

    let status = get_migration_status(conn).await?;
    if !status.is_up_to_date() {
        return Err(PgError::Migration(
            format!("{} migrations are pending", status.pending_migrations()).into(),
        ));
    }

    tracing::info!(target: TRACING_TARGET_MIGRATION, "Database schema integrity verified");
    Ok(())
}

/// Gets the applied migration versions, empty on a fresh database.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct MigrationVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    if !table_exists(conn, "__diesel_schema_migrations").await? {
        return Ok(Vec::new());
    }

    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<MigrationVersion>(conn)
        .await
        .map_err(|e| PgError::Migration(format!("Failed to get applied migrations: {e}").into()))?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_the_deployment_events_migration() {
        let versions = embedded_versions().expect("embedded migrations should load");
        assert_eq!(versions.len(), 1);
        assert!(versions.iter().all(|v| !v.is_empty()));
    }
}
