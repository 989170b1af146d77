use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_EMERGENCY_KEYWORDS: [&str; 3] = ["emergency", "unconscious", "severe breathing"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub store_timeout_secs: u64,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub mail_timeout_secs: u64,
    pub emergency_keywords: Vec<String>,
    pub visit_cost_estimate: f64,
    pub insured_copay: f64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            store_timeout_secs: parse_or("STORE_TIMEOUT_SECS", 10),
            mail_api_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_API_URL not set, confirmation emails disabled");
                    String::new()
                }),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "appointments@clinic.local".to_string()),
            mail_timeout_secs: parse_or("MAIL_TIMEOUT_SECS", 10),
            emergency_keywords: env::var("TRIAGE_EMERGENCY_KEYWORDS")
                .map(|raw| parse_keywords(&raw))
                .unwrap_or_else(|_| default_emergency_keywords()),
            visit_cost_estimate: parse_or("VISIT_COST_ESTIMATE", 150.0),
            insured_copay: parse_or("INSURED_COPAY", 25.0),
            port: parse_or("PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_api_url.is_empty() && !self.mail_api_key.is_empty()
    }
}

pub fn default_emergency_keywords() -> Vec<String> {
    DEFAULT_EMERGENCY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Splits a comma-separated keyword list, dropping blanks. Falls back to the
/// defaults when nothing usable is left.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        warn!("TRIAGE_EMERGENCY_KEYWORDS is empty, using defaults");
        return default_emergency_keywords();
    }

    keywords
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
