use crate::config::MongoConfig;
use crate::models::filter::TOY_NAME_FIELD;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection, Database, IndexModel,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

pub const TOY_NAME_INDEX: &str = "ToyName";

/// Owned handle to the MongoDB deployment. Cloning shares the driver's
/// connection pool.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    /// Builds the client. The driver connects lazily, so this only fails on a
    /// malformed connection string or invalid options.
    pub async fn connect(config: &MongoConfig, app_name: &str) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Configuring MongoDB client");

        let mut client_options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::from(e)
            })?;
        client_options.app_name = Some(app_name.to_string());
        client_options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);

        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
        })
    }

    /// Non-unique ascending index on the display name, used by name search.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let toy_name_index = IndexModel::builder()
            .keys(doc! { TOY_NAME_FIELD: 1 })
            .options(
                IndexOptions::builder()
                    .name(TOY_NAME_INDEX.to_string())
                    .build(),
            )
            .build();

        self.listings()
            .create_index(toy_name_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    collection = %self.collection,
                    "Failed to create {} index: {}",
                    TOY_NAME_INDEX,
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!(collection = %self.collection, "Created index on {}", TOY_NAME_FIELD);

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn listings(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    /// Closes pooled connections. Other clones of this handle must not be
    /// used afterwards.
    pub async fn shutdown(self) {
        tracing::info!("Closing MongoDB client");
        self.client.shutdown().await;
    }
}
