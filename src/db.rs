use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the bootstrap admin principal if no principals exist yet.
pub fn seed_admin(pool: &DbPool, admin_email: &str, admin_password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM principals", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already seeded ({count} principals), skipping admin seed");
        return;
    }

    conn.execute(
        "INSERT INTO principals (email, password, role) VALUES (?1, ?2, 'ADMIN')",
        params![admin_email, admin_password_hash],
    )
    .expect("Failed to seed admin principal");
    log::info!("Seeded bootstrap admin principal {admin_email}");
}
