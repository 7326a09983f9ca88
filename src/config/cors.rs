/// CORS configuration for the API
#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// Origins allowed to call the API
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl CorsConfig {
    /// Load from `CORS_ALLOWED_ORIGINS`, a comma-separated list of origins.
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| Self::default().allowed_origins);

        Self { allowed_origins }
    }
}
