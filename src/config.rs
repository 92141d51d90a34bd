use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the upstream catalog API
    #[serde(default = "default_upstream_api_url")]
    pub upstream_api_url: String,

    /// Bearer token attached to every upstream request
    #[serde(default)]
    pub upstream_token: Option<String>,

    /// Prefix of the per-content movie stream endpoint
    #[serde(default = "default_stream_path_prefix")]
    pub stream_path_prefix: String,

    /// Days of signup history requested for the analytics line chart
    #[serde(default = "default_timeline_days")]
    pub timeline_days: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_upstream_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_stream_path_prefix() -> String {
    "/api/content".to_string()
}

fn default_timeline_days() -> u32 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_api_url: default_upstream_api_url(),
            upstream_token: None,
            stream_path_prefix: default_stream_path_prefix(),
            timeline_days: default_timeline_days(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
