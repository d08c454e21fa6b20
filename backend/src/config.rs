use std::env;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_dir: String,
    /// Where `/detect` uploads are forwarded. Without it the endpoint reports the model as unavailable.
    pub detect_upstream: Option<String>,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::Invalid { key: "MAX_UPLOAD_BYTES", value: raw })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let frontend_dir = lookup("FRONTEND_DIR").unwrap_or_else(|| {
            match lookup("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => format!("{}/../frontend/dist", manifest_dir),
                None => "/usr/src/app/frontend/dist".to_string(),
            }
        });

        let detect_upstream = lookup("DETECT_UPSTREAM_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            port,
            frontend_dir,
            detect_upstream,
            max_upload_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
