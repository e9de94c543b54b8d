#![allow(dead_code)]

use axum::{Router, extract::State, routing::get};
use datatables::{ApiError, DataTables, DataTablesResponse, RequestParams};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

pub const USERS_QUERY: &str = "SELECT id, name, email FROM users";

/// Route `tracing` output through the test harness so it shows on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("datatables=debug")
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    db.execute_unprepared(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL
        )",
    )
    .await?;

    Ok(db)
}

/// john, amy and joan, in id order.
pub async fn setup_users_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    db.execute_unprepared(
        "INSERT INTO users (id, name, email) VALUES
            (1, 'john', 'john@example.com'),
            (2, 'amy', 'amy@example.org'),
            (3, 'joan', 'joan@example.com')",
    )
    .await?;
    Ok(db)
}

/// `count` users named `user_000`, `user_001`, ...
pub async fn setup_numbered_users_db(count: usize) -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    let values: Vec<String> = (0..count)
        .map(|i| format!("({}, 'user_{i:03}', 'user_{i:03}@example.com')", i + 1))
        .collect();
    db.execute_unprepared(&format!(
        "INSERT INTO users (id, name, email) VALUES {}",
        values.join(", ")
    ))
    .await?;
    Ok(db)
}

async fn users_handler(
    State(db): State<DatabaseConnection>,
    params: RequestParams,
) -> Result<DataTablesResponse, ApiError> {
    let mut table = DataTables::new(&db, params);
    table.query(USERS_QUERY)?;
    Ok(table.generate().await?)
}

async fn broken_handler(
    State(db): State<DatabaseConnection>,
    params: RequestParams,
) -> Result<DataTablesResponse, ApiError> {
    let mut table = DataTables::new(&db, params);
    table.query("SELECT id, name FROM missing_table")?;
    Ok(table.generate().await?)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .route("/users", get(users_handler))
        .route("/broken", get(broken_handler))
        .with_state(db);

    Router::new().nest("/api/v1", api)
}
