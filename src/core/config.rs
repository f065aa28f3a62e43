use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub email: EmailConfig,
    pub workers: WorkerConfig,
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Transactional email API used for task and donation emails.
/// Sending is disabled when either the URL or the key is missing.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

/// Intervals and windows for the background workers
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub job_reminder_interval: Duration,
    pub job_reminder_window_days: i64,
    pub chat_archive_interval: Duration,
    pub chat_archive_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            email: EmailConfig::from_env()?,
            workers: WorkerConfig::from_env()?,
        })
    }
}

/// Read an env var and parse it, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", name))
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins =
            parse_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let max_request_body_size =
            parse_var("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            frontend_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let jwks_cache_ttl_secs = parse_var("JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_var("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "CivicHub API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Community issue and volunteer coordination API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl EmailConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("EMAIL_API_URL").ok().filter(|s| !s.is_empty());
        let api_key = env::var("EMAIL_API_KEY").ok().filter(|s| !s.is_empty());
        let from =
            env::var("EMAIL_FROM").unwrap_or_else(|_| "CivicHub <no-reply@civichub.local>".into());
        let timeout_secs = parse_var("EMAIL_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            api_url,
            api_key,
            from,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }
}

impl WorkerConfig {
    const DEFAULT_JOB_REMINDER_INTERVAL_SECS: u64 = 3600;
    const DEFAULT_JOB_REMINDER_WINDOW_DAYS: i64 = 2;
    const DEFAULT_CHAT_ARCHIVE_INTERVAL_SECS: u64 = 86_400;
    const DEFAULT_CHAT_ARCHIVE_DAYS: i64 = 30;
    const MAX_JOB_REMINDER_WINDOW_DAYS: i64 = 365;
    const MAX_CHAT_ARCHIVE_DAYS: i64 = 36_500;

    pub fn from_env() -> Result<Self, String> {
        Self::build(
            parse_var(
                "JOB_REMINDER_INTERVAL_SECS",
                Self::DEFAULT_JOB_REMINDER_INTERVAL_SECS,
            )?,
            parse_var(
                "JOB_REMINDER_WINDOW_DAYS",
                Self::DEFAULT_JOB_REMINDER_WINDOW_DAYS,
            )?,
            parse_var(
                "CHAT_ARCHIVE_INTERVAL_SECS",
                Self::DEFAULT_CHAT_ARCHIVE_INTERVAL_SECS,
            )?,
            parse_var("CHAT_ARCHIVE_DAYS", Self::DEFAULT_CHAT_ARCHIVE_DAYS)?,
        )
    }

    fn build(
        job_reminder_interval_secs: u64,
        job_reminder_window_days: i64,
        chat_archive_interval_secs: u64,
        chat_archive_days: i64,
    ) -> Result<Self, String> {
        if job_reminder_interval_secs == 0 {
            return Err("JOB_REMINDER_INTERVAL_SECS must be at least 1".to_string());
        }
        if chat_archive_interval_secs == 0 {
            return Err("CHAT_ARCHIVE_INTERVAL_SECS must be at least 1".to_string());
        }
        if !(1..=Self::MAX_JOB_REMINDER_WINDOW_DAYS).contains(&job_reminder_window_days) {
            return Err(format!(
                "JOB_REMINDER_WINDOW_DAYS must be between 1 and {}",
                Self::MAX_JOB_REMINDER_WINDOW_DAYS
            ));
        }
        if !(0..=Self::MAX_CHAT_ARCHIVE_DAYS).contains(&chat_archive_days) {
            return Err(format!(
                "CHAT_ARCHIVE_DAYS must be between 0 and {}",
                Self::MAX_CHAT_ARCHIVE_DAYS
            ));
        }

        Ok(Self {
            job_reminder_interval: Duration::from_secs(job_reminder_interval_secs),
            job_reminder_window_days,
            chat_archive_interval: Duration::from_secs(chat_archive_interval_secs),
            chat_archive_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        let origins = parse_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("CIVICHUB_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".into()),
            password: None,
            title: "t".into(),
            version: "v".into(),
            description: "d".into(),
        };
        assert!(swagger.credentials().is_none());

        swagger.password = Some("secret".into());
        assert_eq!(swagger.credentials().as_deref(), Some("admin:secret"));
    }

    #[test]
    fn test_email_disabled_without_key() {
        let email = EmailConfig {
            api_url: Some("https://mail.test/send".into()),
            api_key: None,
            from: "x@test".into(),
            timeout: Duration::from_secs(1),
        };
        assert!(!email.is_enabled());
    }

    #[test]
    fn test_worker_config_defaults_are_valid() {
        let workers = WorkerConfig::build(3600, 2, 86_400, 30).unwrap();
        assert_eq!(workers.job_reminder_interval, Duration::from_secs(3600));
        assert_eq!(workers.job_reminder_window_days, 2);
        assert_eq!(workers.chat_archive_days, 30);

        // Archiving everything older than today is allowed
        tokio_test::assert_ok!(WorkerConfig::build(60, 365, 60, 0));
    }

    #[test]
    fn test_worker_config_rejects_zero_intervals() {
        let err = WorkerConfig::build(0, 2, 86_400, 30).unwrap_err();
        assert!(err.contains("JOB_REMINDER_INTERVAL_SECS"));

        let err = WorkerConfig::build(3600, 2, 0, 30).unwrap_err();
        assert!(err.contains("CHAT_ARCHIVE_INTERVAL_SECS"));
    }

    #[test]
    fn test_worker_config_rejects_out_of_range_days() {
        for window in [0, -1, 366, i64::MAX] {
            let err = WorkerConfig::build(3600, window, 86_400, 30).unwrap_err();
            assert!(err.contains("JOB_REMINDER_WINDOW_DAYS"), "window {}", window);
        }

        for days in [-1, i64::MIN, i64::MAX] {
            let err = WorkerConfig::build(3600, 2, 86_400, days).unwrap_err();
            assert!(err.contains("CHAT_ARCHIVE_DAYS"), "days {}", days);
        }
    }
}
