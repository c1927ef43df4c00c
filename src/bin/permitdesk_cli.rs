//!
//! permitdesk CLI binary
//! ---------------------
//! Inspect route decisions and navigation for a role, and manage the persisted
//! session, either locally against the state folder or against a running server.

use std::env;

use anyhow::{bail, Result};
use serde_json::{json, Value};

use permitdesk::cli::connectivity::HttpSession;
use permitdesk::cli::{decision_json, print_nav};
use permitdesk::config::{arg_value, has_flag, Config};
use permitdesk::identity::{Role, SessionStore};
use permitdesk::navigation::{self, Surface};
use permitdesk::routes;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} route <path> [--role R]\n  {program} nav <desktop|mobile> [--role R] [--path P]\n  {program} login <LGU|BusinessOwner>\n  {program} logout\n  {program} whoami\n\nFlags:\n  --role R            Evaluate as role R instead of the persisted session\n  --state-dir PATH    Session storage folder (env: PERMITDESK_STATE_DIR, default state)\n  --connect <url>     Talk to a running server instead of local state\n  -h, --help          Show this help\n\nExamples:\n  {program} login BusinessOwner\n  {program} route /home\n  {program} nav mobile --path /biznest/form\n  {program} --connect http://127.0.0.1:7878 whoami"
    );
}

/// Positional arguments, skipping flags and the values they take.
fn positionals(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--role" | "--path" | "--state-dir" | "--connect" => { i += 2; continue; }
            a if a.starts_with('-') => {}
            a => out.push(a.to_string()),
        }
        i += 1;
    }
    out
}

/// Program name and the remaining arguments; argv may be empty.
fn split_program(argv: Vec<String>) -> (String, Vec<String>) {
    let program = argv.first().cloned().unwrap_or_else(|| "permitdesk_cli".into());
    (program, argv.into_iter().skip(1).collect())
}

fn role_for(args: &[String], session: &SessionStore) -> Result<Option<Role>> {
    match arg_value(args, "--role") {
        Some(r) => Ok(Some(r.parse::<Role>()?)),
        None => Ok(session.role()),
    }
}

fn print_json(v: &Value) { println!("{}", serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())); }

fn run_local(cmd: &[String], args: &[String]) -> Result<()> {
    let cfg = Config::from_env_and_args(args);
    let session = cfg.open_session();
    match cmd.first().map(|s| s.as_str()) {
        Some("route") => {
            let Some(path) = cmd.get(1) else { bail!("route requires a path") };
            let role = role_for(args, &session)?;
            print_json(&decision_json(path, routes::guard(role, path)));
        }
        Some("nav") => {
            let Some(surface) = cmd.get(1).and_then(|s| Surface::parse(s)) else { bail!("nav requires desktop or mobile") };
            let role = role_for(args, &session)?;
            let items = navigation::filter(role, surface);
            let active = arg_value(args, "--path").and_then(|p| navigation::active_item(&items, p));
            let v = json!({"surface": surface, "items": items, "active": active});
            if !print_nav(&v) { println!("(no navigation for role {:?})", role); }
        }
        Some("login") => {
            let Some(raw) = cmd.get(1) else { bail!("login requires a role") };
            let role = session.set_role_str(raw)?;
            print_json(&json!({"status":"ok","role": role,"degraded": session.is_degraded()}));
        }
        Some("logout") => {
            session.clear_role();
            print_json(&json!({"status":"ok"}));
        }
        Some("whoami") => print_json(&json!({"role": session.role(),"backend": session.backend_kind(),"degraded": session.is_degraded()})),
        Some(other) => bail!("unknown command '{}'", other),
        None => bail!("missing command"),
    }
    Ok(())
}

async fn run_remote(url: &str, cmd: &[String], args: &[String]) -> Result<()> {
    let http = HttpSession::connect(url)?;
    match cmd.first().map(|s| s.as_str()) {
        Some("route") => {
            let Some(path) = cmd.get(1) else { bail!("route requires a path") };
            if arg_value(args, "--role").is_some() { bail!("--role is not supported with --connect; log in instead"); }
            print_json(&http.route(path).await?);
        }
        Some("nav") => {
            let Some(surface) = cmd.get(1) else { bail!("nav requires desktop or mobile") };
            let v = http.nav(surface, arg_value(args, "--path")).await?;
            if !print_nav(&v) { println!("(no navigation for the current session)"); }
        }
        Some("login") => {
            let Some(raw) = cmd.get(1) else { bail!("login requires a role") };
            print_json(&http.login(raw).await?);
        }
        Some("logout") => print_json(&http.logout().await?),
        Some("whoami") => print_json(&http.whoami().await?),
        Some(other) => bail!("unknown command '{}'", other),
        None => bail!("missing command"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let (program, args) = split_program(env::args().collect());
    if args.is_empty() || has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage(&program);
        return Ok(());
    }
    let cmd = positionals(&args);
    let result = match arg_value(&args, "--connect") {
        Some(url) => run_remote(url, &cmd, &args).await,
        None => run_local(&cmd, &args),
    };
    if let Err(e) = &result {
        eprintln!("error: {:#}", e);
        print_usage(&program);
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positionals_skip_flag_values() {
        let args: Vec<String> = ["nav", "--role", "LGU", "mobile", "--path", "/home", "--no-persist"].iter().map(|s| s.to_string()).collect();
        assert_eq!(positionals(&args), vec!["nav", "mobile"]);
    }

    #[test]
    fn empty_argv_falls_back_to_default_program_name() {
        let (program, args) = split_program(Vec::new());
        assert_eq!(program, "permitdesk_cli");
        assert!(args.is_empty());
        let (program, args) = split_program(vec!["pd".into(), "whoami".into()]);
        assert_eq!(program, "pd");
        assert_eq!(args, vec!["whoami"]);
    }
}
