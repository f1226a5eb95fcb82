/// Clinia - symptom assessment service
///
/// Collects questionnaire-style symptom input, queries a pre-trained
/// classification model, and returns a condition label with generated PDF
/// reports and email notifications. Accounts, signup confirmation, usage
/// quotas, and prediction history live in flat JSON collections.

mod account;
mod api;
mod config;
mod context;
mod error;
mod history;
mod mailer;
mod predictor;
mod reference;
mod report;
mod server;
mod signup;
mod store;
mod validation;

use config::ServerConfig;
use context::AppContext;
use error::AppResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ____  _      ___  _   _  ___     _
 / ___|| |    |_ _|| \ | ||_ _|   / \
| |    | |     | | |  \| | | |   / _ \
| |___ | |___  | | | |\  | | |  / ___ \
 \____||_____||___||_| \_||___|/_/   \_\

        Symptom assessment service v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
