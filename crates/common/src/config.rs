use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Default parameter values for the parameterised queries, keyed by the
/// HTTP parameter each one binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    /// `valorActual` for query 1: coins strictly above this current value.
    pub valor_actual: i64,

    /// `valorMonedas` for query 2: wallets with strictly more contracts.
    pub valor_monedas: i64,

    /// `valorPorcentaje` for query 9: contracts strictly above this percentage of the maximum.
    pub valor_porcentaje: i64,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            valor_actual: 50,
            valor_monedas: 2,
            valor_porcentaje: 90,
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string. Takes precedence over `dataset_path`.
    pub database_url: Option<String>,

    /// JSON dataset served from memory when no database is configured
    pub dataset_path: Option<String>,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Apply the bundled migrations on startup (default: false)
    pub run_migrations: bool,

    /// Address the HTTP server listens on (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Per-endpoint parameter defaults
    pub query_defaults: QueryDefaults,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = QueryDefaults::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            dataset_path: lookup("DATASET_PATH").filter(|v| !v.is_empty()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false)?,
            bind_addr: parse_or(&lookup, "API_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            query_defaults: QueryDefaults {
                valor_actual: parse_or(&lookup, "QUERY1_VALOR_ACTUAL", defaults.valor_actual)?,
                valor_monedas: parse_or(&lookup, "QUERY2_VALOR_MONEDAS", defaults.valor_monedas)?,
                valor_porcentaje: parse_or(
                    &lookup,
                    "QUERY9_VALOR_PORCENTAJE",
                    defaults.valor_porcentaje,
                )?,
            },
        };

        if config.database_url.is_none() && config.dataset_path.is_none() {
            anyhow::bail!("Either DATABASE_URL or DATASET_PATH environment variable is required");
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
