//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and sync traits, but AppState pins
//! them to the SQLite, webhook and configured-generator implementations.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use formcraft_core::service::form::FormService;
use formcraft_core::service::submission::SubmissionService;
use formcraft_core::service::user::UserService;
use formcraft_infra::config::{database_url, provider_api_key};
use formcraft_infra::generator::ConfiguredGenerator;
use formcraft_infra::sheets::ConfiguredSpreadsheetSync;
use formcraft_infra::sqlite::api_key::SqliteApiKeyRepository;
use formcraft_infra::sqlite::form::SqliteFormRepository;
use formcraft_infra::sqlite::pool::DatabasePool;
use formcraft_infra::sqlite::response::SqliteResponseRepository;
use formcraft_infra::sqlite::user::SqliteUserRepository;
use formcraft_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteFormService = FormService<SqliteFormRepository>;

pub type ConcreteSubmissionService =
    SubmissionService<SqliteFormRepository, SqliteResponseRepository, ConfiguredSpreadsheetSync>;

pub type ConcreteUserService = UserService<SqliteUserRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub form_service: Arc<ConcreteFormService>,
    pub submission_service: Arc<ConcreteSubmissionService>,
    pub user_service: Arc<ConcreteUserService>,
    pub generator: Arc<ConfiguredGenerator>,
    pub api_keys: SqliteApiKeyRepository,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(data_dir: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = provider_api_key(config.generator.provider);
        Ok(Self::from_parts(db_pool, config, data_dir, api_key))
    }

    /// Wire services over an open pool.
    pub fn from_parts(
        db_pool: DatabasePool,
        config: AppConfig,
        data_dir: PathBuf,
        provider_key: Option<SecretString>,
    ) -> Self {
        let form_service = FormService::new(SqliteFormRepository::new(db_pool.clone()));
        let submission_service = SubmissionService::new(
            SqliteFormRepository::new(db_pool.clone()),
            SqliteResponseRepository::new(db_pool.clone()),
            ConfiguredSpreadsheetSync::from_config(&config.sheets),
        );
        let user_service = UserService::new(SqliteUserRepository::new(db_pool.clone()));
        let generator = ConfiguredGenerator::from_config(&config.generator, provider_key);

        Self {
            form_service: Arc::new(form_service),
            submission_service: Arc::new(submission_service),
            user_service: Arc::new(user_service),
            generator: Arc::new(generator),
            api_keys: SqliteApiKeyRepository::new(db_pool),
            config: Arc::new(config),
            data_dir,
        }
    }
}
