use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Mailbox API
    pub mailbox_base_url: String,
    pub mailbox_token: String,
    pub search_query: String,
    pub processed_label: Option<String>,

    // OpenAI
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub openai_model: String,

    // Polling cadence (seconds)
    pub poll_interval_secs: u64,
    pub poll_batch: u32,
    pub idle_backoff_max_secs: u64,

    // Network and content limits
    pub network_timeout_secs: u64,
    pub min_body_len: usize,

    // Run budgets (seconds); unset means unbounded in the continuous loop
    pub overall_budget_secs: Option<u64>,
    pub per_message_budget_secs: Option<u64>,

    // Ticker allow-list; empty means unrestricted
    pub allowed_tickers: HashSet<String>,

    // Paths
    pub state_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            mailbox_base_url: required_env("MAILBOX_BASE_URL"),
            mailbox_token: required_env("MAILBOX_TOKEN"),
            search_query: env::var("MAIL_SEARCH_QUERY").unwrap_or_else(|_| {
                r#"from:(account@seekingalpha.com "SA Breaking News")"#.to_string()
            }),
            processed_label: env::var("MAIL_PROCESSED_LABEL")
                .ok()
                .filter(|v| !v.is_empty()),
            openai_api_key: required_env("OPENAI_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|v| !v.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            poll_interval_secs: env::var("POLL_INTERVAL_SEC")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("POLL_INTERVAL_SEC must be a number"),
            poll_batch: env::var("POLL_BATCH")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("POLL_BATCH must be a number"),
            idle_backoff_max_secs: env::var("IDLE_BACKOFF_MAX")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("IDLE_BACKOFF_MAX must be a number"),
            network_timeout_secs: env::var("SOCKET_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("SOCKET_TIMEOUT must be a number"),
            min_body_len: env::var("MIN_BODY_LEN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("MIN_BODY_LEN must be a number"),
            overall_budget_secs: env::var("OVERALL_BUDGET_SEC").ok().map(|v| {
                v.parse().expect("OVERALL_BUDGET_SEC must be a number")
            }),
            per_message_budget_secs: env::var("PER_MESSAGE_BUDGET_SEC").ok().map(|v| {
                v.parse().expect("PER_MESSAGE_BUDGET_SEC must be a number")
            }),
            allowed_tickers: env::var("ALLOWED_TICKERS")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_uppercase())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            state_file: PathBuf::from(
                env::var("STATE_FILE").unwrap_or_else(|_| ".state.json".to_string()),
            ),
            output_dir: PathBuf::from(
                env::var("OUTPUT_DIR").unwrap_or_else(|_| "./out".to_string()),
            ),
        }
    }

    /// Log the effective configuration with secrets omitted.
    pub fn log_redacted(&self) {
        info!(
            mailbox_base_url = %self.mailbox_base_url,
            search_query = %self.search_query,
            model = %self.openai_model,
            poll_interval_secs = self.poll_interval_secs,
            poll_batch = self.poll_batch,
            idle_backoff_max_secs = self.idle_backoff_max_secs,
            min_body_len = self.min_body_len,
            allowed_tickers = self.allowed_tickers.len(),
            state_file = %self.state_file.display(),
            output_dir = %self.output_dir.display(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
