use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    /// Rooms never offered in the booking form (the lobby placeholder is id 1).
    pub excluded_room_ids: Vec<i64>,
    /// Addresses allowed to cancel any booking, on top of the booking's own email.
    pub cancel_override_emails: Vec<String>,
    pub receptionist_phone: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: required("API_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            excluded_room_ids: parse_id_list(
                &env::var("EXCLUDED_ROOM_IDS").unwrap_or_else(|_| "1".into()),
            )?,
            cancel_override_emails: parse_list(
                &env::var("CANCEL_OVERRIDE_EMAILS").unwrap_or_default(),
            ),
            receptionist_phone: env::var("RECEPTIONIST_PHONE").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Configuration pointing at `api_base_url` with every other value defaulted.
    pub fn for_api(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            host: "127.0.0.1".into(),
            port: 8080,
            poll_interval_secs: 30,
            http_timeout_secs: 10,
            excluded_room_ids: vec![1],
            cancel_override_emails: Vec::new(),
            receptionist_phone: None,
        }
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_id_list(raw: &str) -> anyhow::Result<Vec<i64>> {
    parse_list(raw)
        .iter()
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid room id in EXCLUDED_ROOM_IDS: {}", s))
        })
        .collect()
}
