use std::env;
use std::path::Path;

use crate::vault::CoalescerConfig;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    /// Directory to bind as the vault at startup (optional)
    pub const VAULT_PATH: &str = "VAULT_PATH";
    /// Directory holding the browser client's static files
    pub const FRONTEND_DIR: &str = "FRONTEND_DIR";
    /// Set to "1" or "true" to skip static file serving
    pub const DISABLE_FRONTEND: &str = "DISABLE_FRONTEND";
    pub const WATCH_DEBOUNCE_MS: &str = "VAULT_WATCH_DEBOUNCE_MS";
    /// Longest a continuously changing file is held before its event is sent
    pub const WATCH_MAX_WAIT_MS: &str = "VAULT_WATCH_MAX_WAIT_MS";
    pub const GATEWAY_CLIENT_BUFFER: &str = "GATEWAY_CLIENT_BUFFER";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 3000;
    pub const BIND_ADDRESS: &str = "0.0.0.0";
    pub const FRONTEND_DIRS: &[&str] = &["./frontend", "../frontend"];
    pub const WATCH_DEBOUNCE_MS: u64 = 150;
    pub const WATCH_MAX_WAIT_MS: u64 = 1000;
    pub const GATEWAY_CLIENT_BUFFER: usize = 64;
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub initial_vault_path: Option<String>,
    /// None when static serving is disabled or no directory was found
    pub frontend_dir: Option<String>,
    pub watch_debounce_ms: u64,
    pub watch_max_wait_ms: u64,
    pub gateway_client_buffer: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_or(env_vars::PORT, defaults::PORT),
            bind_address: env::var(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|_| defaults::BIND_ADDRESS.to_string()),
            initial_vault_path: env::var(env_vars::VAULT_PATH)
                .ok()
                .filter(|p| !p.trim().is_empty()),
            frontend_dir: resolve_frontend_dir(),
            watch_debounce_ms: parse_or(env_vars::WATCH_DEBOUNCE_MS, defaults::WATCH_DEBOUNCE_MS),
            watch_max_wait_ms: parse_or(env_vars::WATCH_MAX_WAIT_MS, defaults::WATCH_MAX_WAIT_MS),
            gateway_client_buffer: parse_or(
                env_vars::GATEWAY_CLIENT_BUFFER,
                defaults::GATEWAY_CLIENT_BUFFER,
            ),
        }
    }

    pub fn coalescer_config(&self) -> CoalescerConfig {
        CoalescerConfig {
            debounce_ms: self.watch_debounce_ms,
            max_wait_ms: self.watch_max_wait_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            bind_address: defaults::BIND_ADDRESS.to_string(),
            initial_vault_path: None,
            frontend_dir: None,
            watch_debounce_ms: defaults::WATCH_DEBOUNCE_MS,
            watch_max_wait_ms: defaults::WATCH_MAX_WAIT_MS,
            gateway_client_buffer: defaults::GATEWAY_CLIENT_BUFFER,
        }
    }
}

/// Parse an env var, falling back (with a warning) when it is unset or invalid
fn parse_or<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{}={:?} is not valid, using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Pick the static frontend directory: explicit override first, then the
/// conventional locations relative to the working directory.
fn resolve_frontend_dir() -> Option<String> {
    if env::var(env_vars::DISABLE_FRONTEND).map(|v| is_truthy(&v)).unwrap_or(false) {
        log::info!("Frontend serving disabled via {} env var", env_vars::DISABLE_FRONTEND);
        return None;
    }

    if let Ok(dir) = env::var(env_vars::FRONTEND_DIR) {
        if Path::new(&dir).is_dir() {
            return Some(dir);
        }
        log::warn!("{} points at {}, which is not a directory", env_vars::FRONTEND_DIR, dir);
        return None;
    }

    let found = defaults::FRONTEND_DIRS
        .iter()
        .find(|d| Path::new(d).is_dir())
        .map(|d| d.to_string());
    if found.is_none() {
        log::warn!(
            "Frontend not found in {} - static file serving disabled",
            defaults::FRONTEND_DIRS.join(" or ")
        );
    }
    found
}
