use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;

pub type DbPool = SqlitePool;

pub const MIGRATIONS: &str = include_str!("schema.sql");

/// Default categories created on an empty database so posts can be filed
/// somewhere before an operator manages the list out of band.
const DEFAULT_CATEGORIES: [&str; 4] = ["general", "travel", "food", "tech"];

pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);
    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed the category list and a default admin account if the database is
/// empty. Idempotent: an already-populated database is left untouched.
pub async fn seed(pool: &DbPool, admin_password_hash: &str) -> Result<(), sqlx::Error> {
    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if category_count == 0 {
        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
                .bind(name)
                .execute(pool)
                .await?;
        }
        log::info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
    }

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        log::info!("Database already has {user_count} users, skipping admin seed");
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO users (username, password, email, is_admin) VALUES ('admin', ?, 'admin@localhost', 1)",
    )
    .bind(admin_password_hash)
    .execute(pool)
    .await?;
    log::info!("Seeded default admin user");
    Ok(())
}
