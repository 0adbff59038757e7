use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "CONVERTY_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep tokens and records in process memory instead of Postgres
    #[arg(long, env = "CONVERTY_IN_MEMORY", default_value_t = false)]
    pub in_memory: bool,

    /// Run the interactive console alongside the HTTP server
    #[arg(long, default_value_t = false)]
    pub console: bool,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub oauth: OAuthConfig,

    #[command(flatten)]
    pub partner: PartnerConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "CONVERTY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CONVERTY_PORT", default_value_t = 9001)]
    pub port: u16,

    /// How long to wait for in-flight work when shutting down
    #[arg(long, env = "CONVERTY_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Maximum number of pooled connections
    #[arg(long, env = "CONVERTY_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    #[arg(long, env = "CONVERTY_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Readiness probe timeout in milliseconds
    #[arg(long, env = "CONVERTY_DB_HEALTH_TIMEOUT_MS", default_value_t = 2000)]
    pub health_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct OAuthConfig {
    /// OAuth client id issued by the partner platform
    #[arg(long, env = "CONVERTY_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret issued by the partner platform
    #[arg(long, env = "CONVERTY_CLIENT_SECRET")]
    pub client_secret: String,

    /// Callback URL registered with the authorization server
    #[arg(long, env = "CONVERTY_REDIRECT_URI", default_value = "https://convertyapi.serveo.net/api/v1/callback")]
    pub redirect_uri: String,

    /// Authorization endpoint users are redirected to
    #[arg(long, env = "CONVERTY_AUTHORIZE_URL", default_value = "https://partner.converty.shop/oauth2/authorize")]
    pub authorize_url: String,

    /// Token endpoint used for code exchange and refresh
    #[arg(long, env = "CONVERTY_TOKEN_URL", default_value = "https://partner.converty.shop/oauth2/token")]
    pub token_url: String,

    /// Space-separated scopes requested at login
    #[arg(
        long,
        env = "CONVERTY_SCOPE",
        default_value = "read-products create-orders update-orders read-orders"
    )]
    pub scope: String,

    /// User the tokens are stored under when a flow does not name one
    #[arg(long, env = "CONVERTY_DEFAULT_USER_ID", default_value = "user1")]
    pub default_user_id: String,

    /// Lifetime of a pending authorization state in seconds
    #[arg(
        long,
        env = "CONVERTY_STATE_TTL_SECS",
        default_value_t = 600,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub state_ttl_secs: i64,

    /// Refresh token lifetime in seconds when the token response does not report one.
    /// Falls back to the access token lifetime when unset.
    #[arg(long, env = "CONVERTY_REFRESH_TOKEN_TTL_SECS", value_parser = clap::value_parser!(i64).range(0..))]
    pub refresh_token_ttl_secs: Option<i64>,
}

#[derive(Clone, Debug, Args)]
pub struct PartnerConfig {
    /// Base URL of the partner REST API
    #[arg(long, env = "CONVERTY_API_BASE_URL", default_value = "https://api.converty.shop")]
    pub api_base_url: String,

    /// Store id sent with order queries
    #[arg(long, env = "CONVERTY_STORE_ID")]
    pub store_id: Option<String>,

    /// Timeout for every outbound HTTP request in seconds
    #[arg(long, env = "CONVERTY_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "CONVERTY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics (disabled when unset)
    #[arg(long, env = "CONVERTY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_partner_platform() {
        let config = Config::try_parse_from(["converty-bridge", "--client-id", "id", "--client-secret", "secret"])
            .expect("required arguments supplied");

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.oauth.default_user_id, "user1");
        assert_eq!(config.oauth.token_url, "https://partner.converty.shop/oauth2/token");
        assert_eq!(config.partner.request_timeout_secs, 10);
        assert_eq!(config.oauth.refresh_token_ttl_secs, None);
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
        assert!(!config.console);
    }

    #[test]
    fn test_client_credentials_are_required() {
        let result = Config::try_parse_from(["converty-bridge", "--client-id", "id"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_lifetimes_are_rejected() {
        let base = ["converty-bridge", "--client-id", "id", "--client-secret", "secret"];
        let parse = |extra: &[&str]| Config::try_parse_from(base.iter().chain(extra).copied());

        assert!(parse(&["--refresh-token-ttl-secs=-1"]).is_err());
        assert!(parse(&["--state-ttl-secs=-5"]).is_err());
        assert!(parse(&["--state-ttl-secs=0"]).is_err());

        let config = parse(&["--refresh-token-ttl-secs=86400", "--state-ttl-secs=300"]).unwrap();
        assert_eq!(config.oauth.refresh_token_ttl_secs, Some(86_400));
        assert_eq!(config.oauth.state_ttl_secs, 300);
    }
}
