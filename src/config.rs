// Application configuration, loaded from environment variables and CLI flags.

use std::time::Duration;

use crate::presence::DEFAULT_PRESENCE_TTL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub frontend_origin: Option<String>,
    /// Upsert static content and this month's season at startup.
    pub seed_on_start: bool,
    /// How long a presence ping stays visible.
    pub presence_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:creature-hunt.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `FRONTEND_ORIGIN` - Origin allowed by CORS
    /// - `SEED_ON_START` - Set to `false` or `0` to skip seeding
    /// - `PRESENCE_TTL_SECS` - Presence lifetime in seconds (default: 180)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--no-seed` - Skip seeding (same as `SEED_ON_START=false`)
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = env("DATABASE_URL")
            .unwrap_or_else(|| "sqlite:creature-hunt.db?mode=rwc".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3001);

        let frontend_origin = env("FRONTEND_ORIGIN").filter(|v| !v.trim().is_empty());

        let seed_on_start = !args.iter().any(|a| a == "--no-seed")
            && env("SEED_ON_START")
                .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
                .unwrap_or(true);

        let presence_ttl = env("PRESENCE_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PRESENCE_TTL);

        Config {
            database_url,
            port,
            frontend_origin,
            seed_on_start,
            presence_ttl,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
