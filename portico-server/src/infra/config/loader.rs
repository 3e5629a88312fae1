use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use thiserror::Error;
use url::Url;

use super::{
    models::{
        Config, ConfigLoad, ConfigMetadata, ConfigWarnings, ContentConfig, CorsConfig,
        DatabaseConfig, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("portico.toml"),
        PathBuf::from("config/portico.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// `.env`, then the TOML file, then environment overrides.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let ConfigLoad {
            mut config,
            warnings,
        } = compose_config(file_config, env_config)?;
        config.metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Merge file values with environment overrides. Environment wins.
pub fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
) -> Result<ConfigLoad, ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No portico.toml detected; falling back to environment variables",
            "Set PORTICO_CONFIG or pass --config to point at a configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        content: file_content,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database_url = env.database_url.or(file_database.url);
    if let Some(url) = &database_url {
        validate_database_url(url)?;
    }
    let database = DatabaseConfig {
        url: database_url,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };
    if cors.allowed_origins.is_empty() {
        warnings.push("No CORS origins configured; any origin is allowed");
    }

    let mut content = ContentConfig::default();
    match env.content_max_page_size.or(file_content.max_page_size) {
        Some(0) => warnings.push_with_hint(
            "content.max_page_size must be positive; using the default",
            format!("default is {}", content.max_page_size),
        ),
        Some(max_page_size) => content.max_page_size = max_page_size,
        None => {}
    }

    Ok(ConfigLoad {
        config: Config {
            server,
            database,
            cors,
            content,
            metadata: ConfigMetadata::default(),
        },
        warnings,
    })
}

fn validate_database_url(raw: &str) -> Result<(), ConfigLoadError> {
    let url = Url::parse(raw).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}', expected postgres:// or postgresql://")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [database]
        url = "postgres://portico@localhost/portico"

        [cors]
        allowed_origins = ["https://lab.example.org"]

        [content]
        max_page_size = 50
    "#;

    #[test]
    fn file_values_fill_the_config() {
        let file: FileConfig = toml::from_str(SAMPLE).unwrap();
        let ConfigLoad { config, warnings } =
            compose_config(Some(file), EnvConfig::default()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://portico@localhost/portico")
        );
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.cors.allowed_origins, vec!["https://lab.example.org"]);
        assert_eq!(config.content.max_page_size, 50);
        assert!(warnings.is_empty());
    }

    #[test]
    fn environment_overrides_file_values() {
        let file: FileConfig = toml::from_str(SAMPLE).unwrap();
        let env = EnvConfig {
            server_port: Some(9000),
            content_max_page_size: Some(20),
            ..EnvConfig::default()
        };
        let ConfigLoad { config, .. } = compose_config(Some(file), env).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.content.max_page_size, 20);
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let ConfigLoad { config, warnings } = compose_config(None, EnvConfig::default()).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.content.max_page_size, 100);
        assert!(config.database.url.is_none());
        assert_eq!(warnings.items.len(), 2);
        assert!(warnings.items[0].hint.is_some());
    }

    #[test]
    fn non_postgres_urls_are_rejected() {
        let env = EnvConfig {
            database_url: Some("mysql://localhost/portico".into()),
            ..EnvConfig::default()
        };
        assert!(matches!(
            compose_config(None, env),
            Err(ConfigLoadError::UnsupportedDatabaseScheme { .. })
        ));
    }

    #[test]
    fn zero_page_size_falls_back_with_a_warning() {
        let env = EnvConfig {
            content_max_page_size: Some(0),
            ..EnvConfig::default()
        };
        let ConfigLoad { config, warnings } = compose_config(None, env).unwrap();
        assert_eq!(config.content.max_page_size, 100);
        assert!(
            warnings
                .items
                .iter()
                .any(|warning| warning.message.contains("max_page_size"))
        );
    }

    #[test]
    fn file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let parsed = read_file_config(&path).unwrap();
        assert_eq!(parsed.server.port, Some(8080));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[server\nport = ").unwrap();
        assert!(matches!(
            read_file_config(&broken),
            Err(ConfigLoadError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new()
            .with_config_path(dir.path().join("absent.toml"))
            .with_env_file(dir.path().join(".env"));
        assert!(matches!(
            loader.load(),
            Err(ConfigLoadError::MissingConfig { .. })
        ));
    }
}
