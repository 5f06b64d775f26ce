use crate::config::Config;
use crate::utils::AppError;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const USERS: &str = "users";
pub const WORKOUTS: &str = "workouts";

/// Owned handle to the document store.
///
/// Building the handle does no I/O; the driver connects lazily and pools
/// connections, so `connect` reuses them. Every `connect` pings the server;
/// only index creation is done once.
#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
    indexes_ready: Arc<OnceCell<()>>,
}

impl MongoDB {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(&config.database_url)
            .await
            .map_err(|e| AppError::Config(format!("Invalid DATABASE_URL: {}", e)))?;

        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(0);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(config.database_timeout);
        client_options.server_selection_timeout = Some(config.database_timeout);

        let client = Client::with_options(client_options)
            .map_err(|e| AppError::Config(format!("Invalid MongoDB options: {}", e)))?;
        let db = client.database(&config.database_name);

        Ok(Self {
            client,
            db,
            indexes_ready: Arc::new(OnceCell::new()),
        })
    }

    /// Pings the server. Indexes are created after the first successful ping.
    pub async fn connect(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await.map_err(|e| {
            log::warn!("⚠️  MongoDB ping failed: {}", e);
            AppError::Connection(e.to_string())
        })?;

        self.indexes_ready
            .get_or_init(|| async {
                log::info!("✅ MongoDB connected to database '{}'", self.db.name());
                self.ensure_indexes().await;
            })
            .await;

        Ok(())
    }

    /// Creates the indexes the routes rely on. Failures are only logged.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS);
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  Could not create users(email) index: {}", e),
        }

        let workouts = self.collection::<Document>(WORKOUTS);
        let date_index = IndexModel::builder().keys(doc! { "date": -1 }).build();

        match workouts.create_index(date_index).await {
            Ok(_) => log::info!("   ✅ Index created: workouts(date)"),
            Err(e) => log::warn!("   ⚠️  Could not create workouts(date) index: {}", e),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Closes the pool. Other clones of this handle become unusable.
    pub async fn shutdown(self) {
        log::info!("🔌 Closing MongoDB connection");
        self.client.shutdown().await;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use crate::utils::AppError;

    #[tokio::test]
    async fn test_connect_fails_when_unreachable() {
        let db = unreachable_db().await;
        let result = db.connect().await;
        assert!(matches!(result, Err(AppError::Connection(_))));
        assert!(!db.indexes_ready.initialized());

        // Nothing cached: a second attempt fails the same way
        assert!(db.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_connect_pings_after_an_earlier_success() {
        let db = previously_connected_db().await;
        assert!(matches!(db.connect().await, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_connect_is_idempotent() {
        let db = live_db().await;
        assert!(db.indexes_ready.initialized());
        assert!(db.connect().await.is_ok());
        assert!(db.connect().await.is_ok());
    }
}
