use media_services::MediaConfig;

/// Process configuration, read from the environment exactly once at startup
/// and passed to handlers explicitly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string
    pub database_url: String,
    /// Key material for signing the session cookie; at least 32 bytes
    pub session_secret: String,
    /// Registration code that grants the administrator flag
    pub admin_code: String,
    /// Credentials for the hosted image store
    pub media: MediaConfig,
    /// Listen port
    pub port: u16,
}

impl ServerConfig {
    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/yonder_camp".to_string());

        let session_secret = require("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err("SESSION_SECRET must be at least 32 bytes".to_string());
        }

        let admin_code = require("ADMIN_CODE")?;

        let media = MediaConfig {
            api_base: std::env::var("MEDIA_API_BASE")
                .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
            cloud_name: require("MEDIA_CLOUD_NAME")?,
            api_key: require("MEDIA_API_KEY")?,
            api_secret: require("MEDIA_API_SECRET")?,
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT is not a valid port number: {raw}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url,
            session_secret,
            admin_code,
            media,
            port,
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} must be set"))
}
