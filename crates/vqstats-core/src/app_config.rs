use chrono::FixedOffset;

/// SMTP settings used to email the summary CSV.
///
/// Only present when `VQSTATS_SMTP_HOST` is set.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_token: String,
    pub api_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on jobs pages fetched per planner.
    pub max_pages: usize,
    /// Server page size; a page shorter than this ends pagination.
    pub page_size: usize,
    /// Offset used for calendar-day truncation and for output timestamps.
    pub tz_offset: FixedOffset,
    pub smtp: Option<SmtpConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_token", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_pages", &self.max_pages)
            .field("page_size", &self.page_size)
            .field("tz_offset", &self.tz_offset)
            .field("smtp", &self.smtp)
            .finish()
    }
}
