//! Runtime configuration from environment variables, overridden by command-line flags.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::identity::SessionStore;
use crate::storage::{FileKv, KvBackend, MemoryKv, UnavailableKv};

pub const ENV_HTTP_PORT: &str = "PERMITDESK_HTTP_PORT";
pub const ENV_STATE_DIR: &str = "PERMITDESK_STATE_DIR";
pub const ENV_PERSIST: &str = "PERMITDESK_PERSIST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http_port: u16,
    /// Directory holding the persisted session store.
    pub state_dir: PathBuf,
    /// When false the session lives in memory only.
    pub persist: bool,
}

impl Default for Config {
    fn default() -> Self { Self { http_port: 7878, state_dir: PathBuf::from("state"), persist: true } }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_port_env(name: &str) -> Option<u16> {
    env::var(name).ok().and_then(|v| v.parse::<u16>().ok())
}

fn parse_bool_env(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_bool(&v))
}

/// Value following `flag`, if both are present.
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() { return Some(args[i + 1].as_str()); }
        i += 1;
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool { args.iter().any(|a| a == flag) }

impl Config {
    /// Defaults, then environment, then `args`.
    pub fn from_env_and_args(args: &[String]) -> Self {
        let mut cfg = Config::default();
        if let Some(p) = parse_port_env(ENV_HTTP_PORT) { cfg.http_port = p; }
        if let Ok(dir) = env::var(ENV_STATE_DIR) { if !dir.trim().is_empty() { cfg.state_dir = PathBuf::from(dir); } }
        if let Some(b) = parse_bool_env(ENV_PERSIST) { cfg.persist = b; }
        cfg.apply_args(args);
        cfg
    }

    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(v) = arg_value(args, "--http-port") {
            match v.parse::<u16>() {
                Ok(p) => self.http_port = p,
                Err(_) => warn!(target: "config", "ignoring invalid --http-port '{}'", v),
            }
        }
        if let Some(v) = arg_value(args, "--state-dir") { self.state_dir = PathBuf::from(v); }
        if has_flag(args, "--no-persist") { self.persist = false; }
    }

    /// Storage backend for the session. A state dir that cannot be opened yields a
    /// backend that always fails, so the session degrades to memory.
    pub fn session_backend(&self) -> Box<dyn KvBackend> {
        if !self.persist { return Box::new(MemoryKv::new()); }
        match FileKv::open(self.state_dir.join("session"), "session") {
            Ok(kv) => Box::new(kv),
            Err(e) => {
                warn!(target: "config", "session storage at {:?} unavailable: {}", self.state_dir, e);
                Box::new(UnavailableKv::new(e.to_string()))
            }
        }
    }

    pub fn open_session(&self) -> SessionStore { SessionStore::open(self.session_backend()) }
}
