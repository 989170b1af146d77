use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use notification_cell::services::MailClient;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::services::TurnDispatcher;

/// Built once at startup; the store and mail clients inside are reused by
/// every request.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: TurnDispatcher,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let supabase = Arc::new(SupabaseClient::new(&config).context("Failed to build store client")?);
        let mailer = Arc::new(MailClient::new(&config).context("Failed to build mail client")?);

        info!("Store client ready for {}", supabase.get_base_url());

        Ok(Self {
            dispatcher: TurnDispatcher::new(&config, supabase, mailer),
            config: Arc::new(config),
        })
    }
}
