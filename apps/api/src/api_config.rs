use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use sanad_core::{AppError, UserId, UserIdentity};
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

const DEFAULT_API_HOST: &str = "127.0.0.1";
const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SUPER_ADMIN_DISPLAY_NAME: &str = "Super Admin";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub super_admin: Option<UserIdentity>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = parse_optional_env(
            "DATABASE_MAX_CONNECTIONS",
            env::var("DATABASE_MAX_CONNECTIONS").ok(),
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?;
        let frontend_url = normalize_frontend_url(
            env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_owned())
                .as_str(),
        )?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_owned());
        let api_port = parse_optional_env("API_PORT", env::var("API_PORT").ok(), DEFAULT_API_PORT)?;
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let super_admin = parse_super_admin(
            env::var("SUPER_ADMIN_USER_ID").ok(),
            env::var("SUPER_ADMIN_DISPLAY_NAME").ok(),
            env::var("SUPER_ADMIN_EMAIL").ok(),
        )?;

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            super_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    let value =
        env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_optional_env<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}

/// Builds the bootstrap operator identity from `SUPER_ADMIN_*` values.
fn parse_super_admin(
    user_id: Option<String>,
    display_name: Option<String>,
    email: Option<String>,
) -> Result<Option<UserIdentity>, AppError> {
    let Some(user_id) = user_id.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };

    let uuid = Uuid::parse_str(user_id.trim()).map_err(|error| {
        AppError::Validation(format!("invalid SUPER_ADMIN_USER_ID '{user_id}': {error}"))
    })?;
    let display_name = display_name
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SUPER_ADMIN_DISPLAY_NAME.to_owned());
    let email = email
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    Ok(Some(UserIdentity::new(UserId::from_uuid(uuid), display_name, email)))
}

/// Reduces the frontend URL to its origin, the form browsers send in `Origin`.
fn normalize_frontend_url(value: &str) -> Result<String, AppError> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL '{value}': {error}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "FRONTEND_URL must use http or https, got '{value}'"
        )));
    }

    Ok(url.origin().ascii_serialization())
}
