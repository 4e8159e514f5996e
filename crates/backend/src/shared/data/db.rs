use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables owned by the backend. The UNIQUE index on the definition triple
/// backs up the registry check when two saves race; the foreign key keeps a
/// definition with stored values from being deleted underneath a writer.
/// sqlx opens SQLite connections with `foreign_keys = ON`.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS a025_metafield_definition (
        id TEXT PRIMARY KEY NOT NULL,
        owner_type TEXT NOT NULL,
        namespace TEXT NOT NULL,
        "key" TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        value_type TEXT NOT NULL,
        is_list INTEGER NOT NULL DEFAULT 0,
        validations_json TEXT NOT NULL DEFAULT '{}',
        visibility_json TEXT NOT NULL DEFAULT '{}',
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_a025_owner_namespace_key
        ON a025_metafield_definition (owner_type, namespace, "key");
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a026_metafield_value (
        owner_id TEXT NOT NULL,
        definition_id TEXT NOT NULL,
        value_json TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (owner_id, definition_id),
        FOREIGN KEY (definition_id) REFERENCES a025_metafield_definition (id)
            ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_a026_definition
        ON a026_metafield_value (definition_id);
    "#,
];

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Connecting to database: {}", db_url);
    let conn = Database::connect(&db_url).await?;

    for sql in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

fn sql_err(e: &anyhow::Error) -> Option<SqlErr> {
    e.downcast_ref::<DbErr>().and_then(DbErr::sql_err)
}

/// Нарушение UNIQUE-ограничения
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(sql_err(e), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Нарушение внешнего ключа
pub fn is_foreign_key_violation(e: &anyhow::Error) -> bool {
    matches!(sql_err(e), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
