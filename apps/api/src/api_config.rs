use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use formwell_application::{RateLimitRule, SubmissionQuotaMode};
use formwell_core::{AccountId, AppError};
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;

const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_EMAIL_FROM_ADDRESS: &str = "noreply@formwell.local";
const DEFAULT_NOTIFICATION_QUEUE_CAPACITY: usize = 256;
const GATEWAY_SECRET_MIN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub enum BillingProviderConfig {
    Static { pro_accounts: Vec<AccountId> },
    Http { base_url: String, api_key: String },
}

#[derive(Debug, Clone)]
pub struct HttpEmailRuntimeConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Logging,
    Http(HttpEmailRuntimeConfig),
}

#[derive(Debug, Clone)]
pub enum RateLimitStoreConfig {
    Postgres,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub gateway_shared_secret: String,
    pub billing_provider: BillingProviderConfig,
    pub email_provider: EmailProviderConfig,
    pub notification_queue_capacity: usize,
    pub submission_quota_mode: SubmissionQuotaMode,
    pub rate_limit_store: RateLimitStoreConfig,
    pub public_submit_rate_limit: RateLimitRule,
    pub trusted_proxies: Vec<IpNet>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let gateway_shared_secret = required_env("GATEWAY_SHARED_SECRET")?;
        if gateway_shared_secret.len() < GATEWAY_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "GATEWAY_SHARED_SECRET must be at least {GATEWAY_SECRET_MIN_LENGTH} characters"
            )));
        }

        let billing_provider = match env::var("BILLING_PROVIDER")
            .unwrap_or_else(|_| "static".to_owned())
            .as_str()
        {
            "static" => BillingProviderConfig::Static {
                pro_accounts: parse_account_list(
                    env::var("BILLING_PRO_ACCOUNTS").unwrap_or_default().as_str(),
                )?,
            },
            "http" => BillingProviderConfig::Http {
                base_url: required_non_empty_env("BILLING_API_BASE_URL")?,
                api_key: required_non_empty_env("BILLING_API_KEY")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "BILLING_PROVIDER must be either 'static' or 'http', got '{other}'"
                )));
            }
        };

        let email_provider = match optional_non_empty_env("EMAIL_API_KEY") {
            Some(api_key) => EmailProviderConfig::Http(HttpEmailRuntimeConfig {
                api_url: env::var("EMAIL_API_URL")
                    .unwrap_or_else(|_| DEFAULT_EMAIL_API_URL.to_owned()),
                api_key,
                from_address: env::var("EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| DEFAULT_EMAIL_FROM_ADDRESS.to_owned()),
            }),
            None => EmailProviderConfig::Logging,
        };

        let notification_queue_capacity = parse_env_or(
            "NOTIFICATION_QUEUE_CAPACITY",
            DEFAULT_NOTIFICATION_QUEUE_CAPACITY,
        )?;
        if notification_queue_capacity == 0 {
            return Err(AppError::Validation(
                "NOTIFICATION_QUEUE_CAPACITY must be greater than zero".to_owned(),
            ));
        }

        let submission_quota_mode = optional_non_empty_env("SUBMISSION_QUOTA_MODE")
            .map(|value| SubmissionQuotaMode::from_str(value.as_str()))
            .transpose()?
            .unwrap_or_default();

        let rate_limit_store = match env::var("RATE_LIMIT_STORE")
            .unwrap_or_else(|_| "postgres".to_owned())
            .as_str()
        {
            "postgres" => RateLimitStoreConfig::Postgres,
            "redis" => RateLimitStoreConfig::Redis {
                redis_url: required_non_empty_env("REDIS_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be either 'postgres' or 'redis', got '{other}'"
                )));
            }
        };

        let default_rule = RateLimitRule::public_submit();
        let public_submit_rate_limit = RateLimitRule::new(
            default_rule.category,
            parse_env_or("PUBLIC_SUBMIT_RATE_LIMIT", default_rule.max_attempts)?,
            parse_env_or(
                "PUBLIC_SUBMIT_RATE_LIMIT_WINDOW_SECONDS",
                default_rule.window_seconds,
            )?,
        );
        if public_submit_rate_limit.max_attempts <= 0 || public_submit_rate_limit.window_seconds <= 0
        {
            return Err(AppError::Validation(
                "public submit rate limit and window must be greater than zero".to_owned(),
            ));
        }

        let trusted_proxies =
            parse_trusted_proxies(env::var("TRUSTED_PROXY_CIDRS").unwrap_or_default().as_str())?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            gateway_shared_secret,
            billing_provider,
            email_provider,
            notification_queue_capacity,
            submission_quota_mode,
            rate_limit_store,
            public_submit_rate_limit,
            trusted_proxies,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn redis_url(&self) -> Option<&str> {
        match &self.rate_limit_store {
            RateLimitStoreConfig::Redis { redis_url } => Some(redis_url.as_str()),
            RateLimitStoreConfig::Postgres => None,
        }
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

/// Parses a comma separated list of account ids, ignoring blanks.
fn parse_account_list(value: &str) -> Result<Vec<AccountId>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            AccountId::from_str(entry).map_err(|error| {
                AppError::Validation(format!("invalid BILLING_PRO_ACCOUNTS entry: {error}"))
            })
        })
        .collect()
}

/// Parses a comma separated list of CIDRs. Bare addresses become host routes.
fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            IpNet::from_str(entry)
                .or_else(|_| IpAddr::from_str(entry).map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid TRUSTED_PROXY_CIDRS entry '{entry}': {error}"
                    ))
                })
        })
        .collect()
}

fn parse_env_or<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_non_empty_env(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
