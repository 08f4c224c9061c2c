//! Database provisioning against the embedded cluster.
//!
//! Database reset uses `postgres` directly so `DROP DATABASE` does not run
//! inside a Diesel transaction. Schema setup applies the crate's embedded
//! migrations so test schemas never drift from production.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use prodtrack::domain::UserId;
use prodtrack::outbound::persistence::run_pending_migrations;

use super::{format_postgres_error, test_cluster};

/// Drop and recreate `name` on the cluster.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<(), String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(())
}

pub fn migrate_schema(database_url: &str) -> Result<(), String> {
    run_pending_migrations(database_url)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// Start a cluster and return it with the URL of a freshly migrated
/// database called `name`. Keep the cluster alive for as long as the URL is
/// in use.
pub fn provision_database(name: &str) -> Result<(TestCluster, String), String> {
    let cluster = test_cluster()?;
    reset_database(&cluster, name)?;
    let database_url = cluster.connection().database_url(name);
    migrate_schema(&database_url)?;
    Ok((cluster, database_url))
}

/// Insert an account row and return its id.
pub fn seed_user(database_url: &str, email: &str) -> Result<UserId, String> {
    let mut client =
        Client::connect(database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING id",
            &[&email, &"not-a-real-hash", &"Test User"],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(UserId::new(row.get::<_, i32>(0)))
}

/// Count the rows of `table` matching `predicate` (a SQL boolean expression).
pub fn row_count(database_url: &str, table: &str, predicate: &str) -> Result<i64, String> {
    let mut client =
        Client::connect(database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            &format!("SELECT COUNT(*) FROM {table} WHERE {predicate}"),
            &[],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get::<_, i64>(0))
}
