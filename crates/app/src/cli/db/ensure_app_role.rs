use clap::Args;
use sportspro_app::database;
use sqlx::{Postgres, Transaction, query, query_scalar};

/// Privileges the API server needs at runtime, per table.
///
/// The catalog and user tables are read-only for the server; they are managed
/// through this CLI with an administrative connection.
const TABLE_PRIVILEGES: &[(&str, &str)] = &[
    ("users", "SELECT"),
    ("equipment", "SELECT"),
    ("api_tokens", "SELECT, UPDATE"),
    ("carts", "SELECT, INSERT, UPDATE"),
    ("cart_items", "SELECT, INSERT, UPDATE, DELETE"),
];

#[derive(Debug, Args)]
pub(crate) struct EnsureAppRoleArgs {
    /// Administrative PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Application runtime role name
    #[arg(long, default_value = "sportspro_app")]
    role_name: String,

    /// Application role password
    #[arg(long, env = "APP_DB_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: EnsureAppRoleArgs) -> Result<(), String> {
    if args.role_name.trim().is_empty() {
        return Err("role_name cannot be empty".to_string());
    }

    if args.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|error| format!("failed to start transaction: {error}"))?;

    let role_ident = quote(&mut tx, "SELECT quote_ident($1)", &args.role_name).await?;
    let password_lit = quote(&mut tx, "SELECT quote_literal($1)", &args.password).await?;

    let role_exists: bool =
        query_scalar("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(&args.role_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|error| format!("failed to check role existence: {error}"))?;

    let verb = if role_exists { "ALTER" } else { "CREATE" };

    // NOBYPASSRLS keeps cart rows scoped to the user set per transaction.
    let upsert_role_sql = format!(
        "{verb} ROLE {role_ident} LOGIN PASSWORD {password_lit} \
         NOSUPERUSER NOCREATEDB NOCREATEROLE NOREPLICATION NOBYPASSRLS"
    );

    query(&upsert_role_sql)
        .execute(&mut *tx)
        .await
        .map_err(|error| format!("failed to {} role: {error}", verb.to_lowercase()))?;

    let database_ident: String = query_scalar("SELECT quote_ident(current_database())")
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| format!("failed to resolve database name: {error}"))?;

    for sql in grant_statements(&database_ident, &role_ident) {
        query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|error| format!("failed to apply `{sql}`: {error}"))?;
    }

    tx.commit()
        .await
        .map_err(|error| format!("failed to commit changes: {error}"))?;

    println!("ensured app role: {}", args.role_name);
    println!("granted runtime privileges on {} tables", TABLE_PRIVILEGES.len());

    Ok(())
}

/// Quote a value server-side for interpolation where parameters are not allowed.
async fn quote(
    tx: &mut Transaction<'_, Postgres>,
    sql: &'static str,
    value: &str,
) -> Result<String, String> {
    query_scalar(sql)
        .bind(value)
        .fetch_one(&mut **tx)
        .await
        .map_err(|error| format!("failed to quote value: {error}"))
}

fn grant_statements(database_ident: &str, role_ident: &str) -> Vec<String> {
    let mut statements = vec![
        format!("GRANT CONNECT ON DATABASE {database_ident} TO {role_ident}"),
        format!("GRANT USAGE ON SCHEMA public TO {role_ident}"),
    ];

    statements.extend(
        TABLE_PRIVILEGES
            .iter()
            .map(|(table, privileges)| format!("GRANT {privileges} ON {table} TO {role_ident}")),
    );

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_cover_every_table_once() {
        let statements = grant_statements("\"sportspro\"", "sportspro_app");

        assert_eq!(statements.len(), TABLE_PRIVILEGES.len() + 2);
        assert!(
            statements
                .iter()
                .any(|sql| sql == "GRANT SELECT, INSERT, UPDATE, DELETE ON cart_items TO sportspro_app")
        );
    }

    #[test]
    fn catalog_is_read_only_for_the_app_role() {
        let statements = grant_statements("sportspro", "sportspro_app");

        assert!(
            statements
                .iter()
                .any(|sql| sql == "GRANT SELECT ON equipment TO sportspro_app")
        );
        assert!(
            !statements
                .iter()
                .any(|sql| sql.contains("INSERT") && sql.contains(" equipment "))
        );
    }
}
