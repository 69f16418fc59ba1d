use super::parsing::{
    env_number, env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, ExamSettings, RankingSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("QUIZHUB_HOST", "0.0.0.0");
        let port = env_or_default("QUIZHUB_PORT", "8000");

        let environment =
            parse_environment(env_optional("QUIZHUB_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("QUIZHUB_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Quizhub API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let explicit_secret = env_optional("SECRET_KEY");
        if strict_config && explicit_secret.is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }
        let secret_key = match explicit_secret {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = env_number("ACCESS_TOKEN_EXPIRE_MINUTES", "10080")?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = env_number("POSTGRES_PORT", "5432")?;
        let postgres_user = env_or_default("POSTGRES_USER", "quizhub");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "quizhub");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = env_number("DATABASE_MAX_CONNECTIONS", "30")?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = env_number("REDIS_PORT", "6379")?;
        let redis_db = env_number("REDIS_DB", "0")?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let random_question_limit = env_number("EXAM_RANDOM_QUESTION_LIMIT", "30")?;

        let ranking_cache_ttl_seconds = env_number("RANKING_CACHE_TTL_SECONDS", "30")?;
        let ranking_default_limit = env_number("RANKING_DEFAULT_LIMIT", "20")?;

        let log_level = env_or_default("QUIZHUB_LOG_LEVEL", "info");
        let json = env_optional("QUIZHUB_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            exam: ExamSettings { random_question_limit },
            ranking: RankingSettings {
                cache_ttl_seconds: ranking_cache_ttl_seconds,
                default_limit: ranking_default_limit,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn exam(&self) -> &ExamSettings {
        &self.exam
    }

    pub(crate) fn ranking(&self) -> &RankingSettings {
        &self.ranking
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exam.random_question_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EXAM_RANDOM_QUESTION_LIMIT",
                value: "0".to_string(),
            });
        }

        if self.ranking.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RANKING_DEFAULT_LIMIT",
                value: "0".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !self.api.api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_V1_STR",
                value: self.api.api_v1_str.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::Settings;
    use crate::test_support;

    #[tokio::test]
    async fn load_uses_defaults_for_exam_and_ranking() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("EXAM_RANDOM_QUESTION_LIMIT");
        std::env::remove_var("RANKING_DEFAULT_LIMIT");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.exam().random_question_limit, 30);
        assert_eq!(settings.ranking().default_limit, 20);
        assert_eq!(settings.api().api_v1_str, "/api/v1");
    }

    #[tokio::test]
    async fn load_rejects_zero_question_limit() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAM_RANDOM_QUESTION_LIMIT", "0");

        let result = Settings::load();
        std::env::remove_var("EXAM_RANDOM_QUESTION_LIMIT");

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn strict_mode_requires_explicit_secret() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("QUIZHUB_STRICT_CONFIG", "1");
        std::env::remove_var("SECRET_KEY");

        let result = Settings::load();
        test_support::set_test_env();

        assert!(result.is_err());
    }
}
