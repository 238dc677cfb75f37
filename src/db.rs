use crate::config::{DatabaseConfig, SslMode};
use crate::error::ApiError;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tracing::{error, info};

/// Owns the PostgreSQL connection pool shared by every request.
/// Cloning is cheap; all clones hand out connections from the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the pool and verify that a connection can be established.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for {}", config.describe());

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        if let Some(url) = config.connection_string {
            pg_config.url = Some(url);
        } else {
            pg_config.host = Some(config.host);
            pg_config.port = Some(config.port);
            pg_config.dbname = Some(config.database);
            pg_config.user = Some(config.username);
            pg_config.password = Some(config.password);
        }

        pg_config.ssl_mode = Some(match config.ssl_mode {
            SslMode::Disable => deadpool_postgres::SslMode::Disable,
            SslMode::Prefer => deadpool_postgres::SslMode::Prefer,
            SslMode::Require => deadpool_postgres::SslMode::Require,
        });
        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    /// Borrow a connection from the pool.
    pub(crate) async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Create the `posts` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), ApiError> {
        info!("Ensuring posts table exists");

        let client = self.get_connection().await?;

        let posts_table = r#"
            CREATE TABLE IF NOT EXISTS posts (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
        "#;

        client.batch_execute(posts_table).await.map_err(|e| {
            error!("Failed to create posts table: {}", e);
            ApiError::Database(format!("Posts table creation failed: {}", e))
        })?;

        info!("Posts table ready");
        Ok(())
    }

    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            ApiError::Database(format!("Connection test failed: {}", e))
        })?;

        info!("Database connection test successful");
        Ok(())
    }
}
