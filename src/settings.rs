//! Runtime settings read from the environment.

use std::time::Duration;

use anyhow::{bail, Context};

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Env: `HOST`, default `0.0.0.0`.
    pub host: String,
    /// Env: `PORT`, default `5000`.
    pub port: u16,
    /// Env: `DATABASE_URL`. Unset selects the in-memory store.
    pub database_url: Option<String>,
    /// Env: `DATABASE_MAX_CONNECTIONS`, default `5`.
    pub database_max_connections: u32,
    /// Env: `RUN_MIGRATIONS` (`1`/`true`), default off.
    pub run_migrations: bool,
    /// Env: `JWT_SECRET`, required, at least 32 characters.
    pub jwt_secret: String,
    /// Env: `ACCESS_TOKEN_AGE` in seconds, default `3600`.
    pub access_token_age: Duration,
    /// Env: `FRONTEND_URL`, extra allowed CORS origin.
    pub frontend_url: Option<String>,
    /// Env: `SEED_USERS` as `id:username,...`. Registered in the in-memory
    /// store at startup; ignored by the Postgres backend.
    pub seed_users: Vec<SeedUser>,
}

/// A user provisioned into the in-memory store at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
}

impl SeedUser {
    /// Parses `user-123:dicoding,user-456:johndoe`. Blank entries are skipped.
    pub fn parse_list(raw: &str) -> anyhow::Result<Vec<SeedUser>> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((id, username)) if !id.trim().is_empty() && !username.trim().is_empty() => Ok(SeedUser {
                    id: id.trim().to_owned(),
                    username: username.trim().to_owned(),
                }),
                _ => bail!("SEED_USERS entry {entry:?} is not of the form id:username"),
            })
            .collect()
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match var(name) {
                Some(v) => v.trim().parse().with_context(|| format!("{name} has an invalid value: {v:?}")),
                None => Ok(default),
            }
        }

        let Some(jwt_secret) = var("JWT_SECRET") else {
            bail!("JWT_SECRET must be set");
        };
        if jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} characters long");
        }

        let run_migrations = var("RUN_MIGRATIONS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&var, "PORT", 5000)?,
            database_url: var("DATABASE_URL").filter(|v| !v.is_empty()),
            database_max_connections: parsed(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            run_migrations,
            jwt_secret,
            access_token_age: Duration::from_secs(parsed(&var, "ACCESS_TOKEN_AGE", 3600)?),
            frontend_url: var("FRONTEND_URL").filter(|v| !v.is_empty()),
            seed_users: match var("SEED_USERS") {
                Some(raw) => SeedUser::parse_list(&raw)?,
                None => Vec::new(),
            },
        })
    }
}
