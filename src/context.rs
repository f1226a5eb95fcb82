/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    error::AppResult,
    history::HistoryLedger,
    mailer::Mailer,
    predictor::{ArtifactModel, DiseaseModel},
    reference::DiseaseCatalog,
    report::{PdfReportRenderer, ReportRenderer},
    signup::SignupWorkflow,
    store::JsonStore,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub accounts: Arc<AccountManager>,
    pub signups: Arc<SignupWorkflow>,
    pub history: Arc<HistoryLedger>,
    pub mailer: Arc<Mailer>,
    pub model: Arc<dyn DiseaseModel>,
    pub renderer: Arc<dyn ReportRenderer>,
    pub catalog: Arc<DiseaseCatalog>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        // Validate configuration
        config.validate()?;

        // Open the record store, creating the data directory if needed
        let store = Arc::new(JsonStore::open(&config.storage.data_directory).await?);

        // Store-backed services
        let history = Arc::new(HistoryLedger::new(Arc::clone(&store)));
        let accounts = Arc::new(AccountManager::new(
            Arc::clone(&store),
            Arc::clone(&history),
        ));

        // Email mailer
        let mailer = Arc::new(Mailer::new(config.email.clone())?);
        if !mailer.is_configured() {
            tracing::warn!("Email not configured; confirmation and diagnosis emails are skipped");
        }

        let base_url = Self::base_url(&config);
        let signups = Arc::new(SignupWorkflow::new(
            Arc::clone(&store),
            Arc::clone(&mailer),
            base_url,
        ));

        // Prediction and report collaborators
        let model: Arc<dyn DiseaseModel> = Arc::new(ArtifactModel::load(&config.model.artifact)?);
        let renderer: Arc<dyn ReportRenderer> = Arc::new(PdfReportRenderer);
        let catalog = Arc::new(DiseaseCatalog::load(&config.model.disease_info));

        Ok(Self {
            config: Arc::new(config),
            accounts,
            signups,
            history,
            mailer,
            model,
            renderer,
            catalog,
        })
    }

    fn base_url(config: &ServerConfig) -> String {
        config.service.public_url.clone().unwrap_or_else(|| {
            format!(
                "http://{}:{}",
                config.service.hostname, config.service.port
            )
        })
    }

    /// Public service URL, used in confirmation links
    pub fn service_url(&self) -> String {
        Self::base_url(&self.config)
    }
}
