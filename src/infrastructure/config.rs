use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub graphql: GraphqlConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Cross-origin policy. The wide-open policy is opt-in.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub permissive: bool,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_pool_max")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            max_connections: default_pool_max(),
            acquire_timeout_seconds: default_acquire_timeout(),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn memory() -> Self {
        Self {
            backend: "memory".to_string(),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    /// `host/database` portion of the URL, safe to log.
    pub fn redacted_url(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => format!(
                "{}{}",
                parsed.host_str().unwrap_or("localhost"),
                parsed.path()
            ),
            Err(_) => "<unparseable>".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphqlConfig {
    #[serde(default = "default_graphql_path")]
    pub path: String,
    #[serde(default)]
    pub playground: bool,
    #[serde(default)]
    pub enable_mutations: bool,
    #[serde(default)]
    pub depth_limit: Option<usize>,
    #[serde(default)]
    pub complexity_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            path: default_graphql_path(),
            playground: false,
            enable_mutations: false,
            depth_limit: None,
            complexity_limit: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("TODOS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("app.cors.origins")
                    .try_parsing(true),
            );
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;

        if config.database.backend == "postgres" && config.database.url.trim().is_empty() {
            let database_url = match env::var("TODOS__DATABASE__URL") {
                Ok(url) if !url.trim().is_empty() => url,
                _ => match env::var("DATABASE_URL") {
                    Ok(url) if !url.trim().is_empty() => url,
                    _ => {
                        return Err(config::ConfigError::Message(
                            "Missing database URL. Set TODOS__DATABASE__URL or DATABASE_URL."
                                .into(),
                        ));
                    }
                },
            };

            config.database.url = database_url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !self.graphql.path.starts_with('/') {
            return Err(config::ConfigError::Message(format!(
                "Invalid GraphQL path {:?}: it must start with '/'.",
                self.graphql.path
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend() -> String {
    "postgres".to_string()
}

fn default_pool_max() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}
