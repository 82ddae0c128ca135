use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::{path::PathBuf, sync::Arc};
use teamleader_auth::callback;
use teamleader_client::{AuthorizationOutcome, Connection, Params};
use teamleader_config::Config;
use teamleader_store::SqliteTokenStore;
use teamleader_types::{Clock as _, SystemClock};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "teamleader", about = "teamleader: command line client for the Teamleader Focus API")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// SQLite database path (default: ~/.teamleader/tokens.db).
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the URL that starts the authorization flow.
    Authorize,
    /// Obtain tokens, either from a code or through the browser.
    Login {
        /// Authorization code from the redirect; skips the browser flow.
        #[arg(long)]
        code: Option<String>,
    },
    /// Remove stored tokens.
    Logout,
    /// Show whether tokens are stored and when they expire.
    Status,
    /// Issue a GET request and print the JSON response.
    Get {
        /// Endpoint, e.g. `contacts.list` or `users.me`.
        endpoint: String,
        /// Query parameter as `key=value`; nest with `filter[term]=acme`.
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Follow pagination and merge every page.
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("config error")?;
    init_tracing(&config.log.level);

    match cli.command {
        Commands::Authorize => cmd_authorize(&config),
        Commands::Login { code } => cmd_login(&config, cli.db, code).await,
        Commands::Logout => cmd_logout(&config, cli.db).await,
        Commands::Status => cmd_status(&config, cli.db).await,
        Commands::Get {
            endpoint,
            params,
            all,
        } => cmd_get(&config, cli.db, &endpoint, &params, all).await,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_authorize(config: &Config) -> Result<()> {
    let credentials = config.credentials()?;
    println!("{}", credentials.authorization_url());
    Ok(())
}

async fn cmd_login(config: &Config, db: Option<PathBuf>, code: Option<String>) -> Result<()> {
    let conn = connect(config, db).await?;

    let code = match code {
        Some(code) => code,
        None => {
            let listener = callback::bind_callback(config.callback_port).await?;
            let url = conn.credentials().authorization_url();
            eprintln!("Opening browser for authorization:\n  {url}");
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "could not open a browser; visit the URL manually");
            }
            callback::accept_code(listener)
                .await
                .context("waiting for authorization redirect")?
        }
    };

    match conn.authorize(Some(&code)).await.context("login failed")? {
        AuthorizationOutcome::Authorized => eprintln!("logged in"),
        AuthorizationOutcome::RedirectRequired { url } => eprintln!("authorize at: {url}"),
    }
    Ok(())
}

async fn cmd_logout(config: &Config, db: Option<PathBuf>) -> Result<()> {
    let conn = connect(config, db).await?;
    conn.tokens().clear_tokens().await.context("logout failed")?;
    eprintln!("logged out");
    Ok(())
}

async fn cmd_status(config: &Config, db: Option<PathBuf>) -> Result<()> {
    let conn = connect(config, db).await?;
    match conn.tokens().token_set().await? {
        Some(set) => {
            let now = SystemClock.now();
            if set.expires_at > now {
                println!("authenticated (access token expires in {}s)", set.expires_at - now);
            } else {
                println!("authenticated (access token expired, will refresh on next call)");
            }
        }
        None => println!("not authenticated"),
    }
    Ok(())
}

async fn cmd_get(
    config: &Config,
    db: Option<PathBuf>,
    endpoint: &str,
    raw_params: &[String],
    all: bool,
) -> Result<()> {
    let mut params = Params::new();
    for raw in raw_params {
        insert_param(&mut params, raw)?;
    }

    let conn = connect(config, db).await?;
    let json = conn
        .get_with(endpoint, params, all)
        .await
        .with_context(|| format!("GET {endpoint} failed"))?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn connect(config: &Config, db: Option<PathBuf>) -> Result<Connection> {
    let credentials = config.credentials()?;
    let store = open_store(db).await?;
    Ok(Connection::new(credentials, Arc::new(store)))
}

async fn open_store(db: Option<PathBuf>) -> Result<SqliteTokenStore> {
    let path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let url = format!("sqlite://{}", path.display());
    SqliteTokenStore::new(&url)
        .await
        .map_err(|e| anyhow::anyhow!("database error: {e}"))
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".teamleader").join("tokens.db")
}

/// Parse `a[b][c]=v` into `params`. Values that read as JSON scalars keep
/// their type; anything else is a string.
fn insert_param(params: &mut Params, raw: &str) -> Result<()> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("parameter `{raw}` is not KEY=VALUE"))?;
    let mut path: Vec<&str> = key.split('[').map(|s| s.trim_end_matches(']')).collect();
    if path.iter().any(|s| s.is_empty()) {
        anyhow::bail!("parameter key `{key}` is malformed");
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(value.to_string()),
    };

    let Some(last) = path.pop() else {
        anyhow::bail!("parameter key `{key}` is malformed");
    };
    let mut target = params;
    for segment in path {
        let entry = target
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        target = entry
            .as_object_mut()
            .with_context(|| format!("parameter `{segment}` is both a value and a group"))?;
    }
    target.insert(last.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_param_nested_and_typed() {
        let mut params = Params::new();
        insert_param(&mut params, "page[size]=20").unwrap();
        insert_param(&mut params, "page[number]=2").unwrap();
        insert_param(&mut params, "filter[term]=acme inc").unwrap();
        insert_param(&mut params, "active=true").unwrap();
        assert_eq!(
            Value::Object(params),
            json!({
                "page": {"size": 20, "number": 2},
                "filter": {"term": "acme inc"},
                "active": true,
            })
        );
    }

    #[test]
    fn test_insert_param_rejects_malformed() {
        let mut params = Params::new();
        assert!(insert_param(&mut params, "novalue").is_err());
        assert!(insert_param(&mut params, "a[]=1").is_err());
        insert_param(&mut params, "a=1").unwrap();
        assert!(insert_param(&mut params, "a[b]=2").is_err());
    }

    #[test]
    fn test_cli_parses_get() {
        let cli = Cli::try_parse_from([
            "teamleader",
            "--db",
            "/tmp/t.db",
            "get",
            "contacts.list",
            "-p",
            "page[size]=5",
            "--all",
        ])
        .unwrap();
        let Commands::Get { endpoint, params, all } = cli.command else {
            panic!("expected get");
        };
        assert_eq!(endpoint, "contacts.list");
        assert_eq!(params, ["page[size]=5"]);
        assert!(all);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
    }
}
