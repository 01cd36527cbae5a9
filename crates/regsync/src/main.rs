// # regsync - registrar reconciliation runner
//
// This binary is a THIN integration layer:
// - All reconciliation logic lives in regsync-core
// - All registrar HTTP lives in regsync-client-zone
// - Configuration is via environment variables only
//
// It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Building the zone.eu client, state store and engine
// 4. Running exactly one command and printing its outcome as JSON
//
// ## Commands
//
// ```text
// regsync <create|read|delete|plan> <declaration.json>
// regsync update <declaration.json> [previous-id]
// regsync refresh
// regsync import <kind> <id>
// ```
//
// A declaration file holds one JSON object tagged by `kind`:
//
// ```json
// {"kind": "zone_domain_nameservers", "domain": "example.com",
//  "nameservers": [{"hostname": "ns1.example.com"}, {"hostname": "ns2.example.com"}]}
// ```
//
// ## Configuration
//
// ### Registrar
// - `ZONE_API_URL`: API base URL (default `https://api.zone.eu/v2`)
// - `ZONE_USERNAME`: account username
// - `ZONE_API_KEY`: API key
// - `ZONE_TIMEOUT_SECS`: per-call timeout (default 60)
// - `REGSYNC_CLIENT_CONFIG`: optional JSON file with explicit `api_url`,
//   `username`, `api_key` and `timeout_secs`; an empty or missing username or
//   API key falls back to the `ZONE_*` variable
//
// ### Engine
// - `REGSYNC_MODE`: `live` (default) or `dry-run`
// - `REGSYNC_NAMESERVER_POLICY`: `full-replace` (default) or `set-diff`
//
// ### State Store
// - `REGSYNC_STATE_STORE_TYPE`: `memory` (default) or `file`
// - `REGSYNC_STATE_STORE_PATH`: path to state file (for file store)
//
// ### Logging
// - `REGSYNC_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export ZONE_USERNAME=alice
// export ZONE_API_KEY=your_key
// export REGSYNC_STATE_STORE_TYPE=file
// export REGSYNC_STATE_STORE_PATH=/var/lib/regsync/state.json
//
// regsync plan nameservers.json
// regsync create nameservers.json
// ```

use anyhow::{Context, Result};
use regsync_client_zone::ZoneClient;
use regsync_core::config::{ClientConfig, EngineConfig, RegsyncConfig, StateStoreConfig};
use regsync_core::{
    Declaration, EngineEvent, Hook, HookOutcome, NameserverPolicy, Observation, Plan,
    ResourceKind, SyncEngine,
};
use serde_json::{Value, json};
use std::env;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Command succeeded
/// - 1: Configuration or usage error
/// - 2: Runtime error (registrar, state store, validation)
#[derive(Debug, Clone, Copy)]
enum RegsyncExitCode {
    /// Command completed
    Success = 0,
    /// Configuration error or bad invocation
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<RegsyncExitCode> for ExitCode {
    fn from(code: RegsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// One invocation of the binary
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Run a lifecycle hook against a declaration file
    Hook { hook: Hook, file: String },
    /// Update, optionally from a previously tracked identifier
    Update {
        file: String,
        previous_id: Option<String>,
    },
    /// Re-read every tracked resource
    Refresh,
    /// Adopt an existing resource
    Import { kind: String, id: String },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let usage = "usage: regsync <create|read|update|delete|plan> <declaration.json> | refresh | import <kind> <id>";

        match args {
            [cmd] if cmd == "refresh" => Ok(Command::Refresh),
            [cmd, kind, id] if cmd == "import" => Ok(Command::Import {
                kind: kind.clone(),
                id: id.clone(),
            }),
            [cmd, file] if cmd == "update" => Ok(Command::Update {
                file: file.clone(),
                previous_id: None,
            }),
            [cmd, file, previous] if cmd == "update" => Ok(Command::Update {
                file: file.clone(),
                previous_id: Some(previous.clone()),
            }),
            [cmd, file] => {
                let hook: Hook = cmd.parse().map_err(|_| anyhow::anyhow!("{}", usage))?;
                Ok(Command::Hook {
                    hook,
                    file: file.clone(),
                })
            }
            _ => anyhow::bail!("{}", usage),
        }
    }
}

/// Application configuration
struct Config {
    client: ClientConfig,
    mode: String,
    nameserver_policy: String,
    state_store_type: String,
    state_store_path: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            client: load_client_config(env::var("REGSYNC_CLIENT_CONFIG").ok().as_deref())?,
            mode: env::var("REGSYNC_MODE").unwrap_or_else(|_| "live".to_string()),
            nameserver_policy: env::var("REGSYNC_NAMESERVER_POLICY")
                .unwrap_or_else(|_| NameserverPolicy::default().to_string()),
            state_store_type: env::var("REGSYNC_STATE_STORE_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            state_store_path: env::var("REGSYNC_STATE_STORE_PATH").ok(),
            log_level: env::var("REGSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration and build the core configuration from it
    fn validate(&self) -> Result<RegsyncConfig> {
        let dry_run = match self.mode.to_lowercase().as_str() {
            "live" => false,
            "dry-run" => true,
            _ => anyhow::bail!(
                "REGSYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        };

        let nameserver_policy: NameserverPolicy = self
            .nameserver_policy
            .parse()
            .context("REGSYNC_NAMESERVER_POLICY")?;

        let state_store = match self.state_store_type.as_str() {
            "memory" => StateStoreConfig::Memory,
            "file" => {
                let Some(path) = self.state_store_path.as_ref().filter(|p| !p.is_empty()) else {
                    anyhow::bail!(
                        "REGSYNC_STATE_STORE_PATH is required when REGSYNC_STATE_STORE_TYPE=file. \
                        Set it via: export REGSYNC_STATE_STORE_PATH=/var/lib/regsync/state.json"
                    );
                };

                // Check parent directory exists
                if let Some(parent) = std::path::Path::new(path).parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.exists()
                {
                    anyhow::bail!(
                        "REGSYNC_STATE_STORE_PATH parent directory does not exist: {}. \
                            Create it first: mkdir -p {}",
                        parent.display(),
                        parent.display()
                    );
                }

                StateStoreConfig::File { path: path.clone() }
            }
            _ => anyhow::bail!(
                "REGSYNC_STATE_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.state_store_type
            ),
        };

        if parse_log_level(&self.log_level).is_none() {
            anyhow::bail!(
                "REGSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        if !self.client.api_url.starts_with("https://") && !self.client.api_url.starts_with("http://")
        {
            anyhow::bail!(
                "ZONE_API_URL must use HTTP or HTTPS scheme. Got: {}",
                self.client.api_url
            );
        }

        let config = RegsyncConfig {
            client: self.client.clone(),
            state_store,
            engine: EngineConfig {
                dry_run,
                nameserver_policy,
                ..EngineConfig::default()
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return RegsyncExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RegsyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    let regsync_config = match config.validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return RegsyncExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RegsyncExitCode::ConfigError.into();
    }

    info!(
        "regsync starting [mode: {}, nameserver policy: {}, state store: {}]",
        if regsync_config.engine.dry_run { "DRY-RUN" } else { "LIVE" },
        regsync_config.engine.nameserver_policy,
        regsync_config.state_store.type_name()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RegsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        tokio::select! {
            result = run(regsync_config, command) => match result {
                Ok(output) => {
                    println!("{}", output);
                    RegsyncExitCode::Success
                }
                Err(e) => {
                    error!("{:#}", e);
                    RegsyncExitCode::RuntimeError
                }
            },
            signal = wait_for_interrupt() => {
                // Calls not yet issued are abandoned; applied ones stay applied
                warn!("Interrupted by {}; the next run converges from the current remote state", signal);
                RegsyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one command and render its outcome
async fn run(config: RegsyncConfig, command: Command) -> Result<String> {
    let client = ZoneClient::shared(&config.client)?;
    let state_store = regsync_core::state::open(&config.state_store).await?;
    let (engine, events) = SyncEngine::from_config(client, state_store, &config)?;

    let output = match command {
        Command::Hook { hook, file } => {
            let declaration = load_declaration(&file)?;
            let outcome = engine.run(hook, &declaration).await;
            drain_events(events);
            render_outcome(&outcome?)?
        }
        Command::Update { file, previous_id } => {
            let declaration = load_declaration(&file)?;
            let outcome = match previous_id {
                Some(previous) => engine.update_from(&declaration, &previous).await,
                None => engine.run(Hook::Update, &declaration).await,
            };
            drain_events(events);
            render_outcome(&outcome?)?
        }
        Command::Refresh => {
            let refreshed = engine.refresh().await;
            drain_events(events);
            let mut entries = Vec::new();
            for (key, observation) in refreshed? {
                entries.push(json!({
                    "key": key.to_string(),
                    "state": render_observation(&observation)?,
                }));
            }
            Value::Array(entries)
        }
        Command::Import { kind, id } => {
            let kind: ResourceKind = engine.registry().resolve(&kind)?;
            let observation = engine.import(kind, &id).await;
            drain_events(events);
            render_observation(&observation?)?
        }
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

/// Explicit client settings from a file, or `ZONE_*` variables alone
fn load_client_config(file: Option<&str>) -> Result<ClientConfig> {
    let Some(file) = file.filter(|f| !f.is_empty()) else {
        return Ok(ClientConfig::from_env()?);
    };

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read client config file {}", file))?;
    parse_client_config(&raw).with_context(|| format!("Invalid client config in {}", file))
}

fn parse_client_config(raw: &str) -> Result<ClientConfig> {
    let explicit: ClientConfig = serde_json::from_str(raw)?;
    Ok(explicit.with_env_fallback())
}

fn load_declaration(file: &str) -> Result<Declaration> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read declaration file {}", file))?;
    let declaration: Declaration = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid declaration in {}", file))?;
    debug!("Loaded {} declaration {}", declaration.kind(), declaration.id());
    Ok(declaration)
}

fn render_outcome(outcome: &HookOutcome) -> Result<Value> {
    Ok(match outcome {
        HookOutcome::Observed(observation) => render_observation(observation)?,
        HookOutcome::Deleted => json!({ "deleted": true }),
        HookOutcome::Planned(plan) => render_plan(plan)?,
    })
}

fn render_observation(observation: &Observation) -> Result<Value> {
    Ok(observation
        .attributes()?
        .unwrap_or_else(|| json!({ "absent": true })))
}

/// `convergence` is always `divergent` for a nameserver set under full-replace
fn render_plan(plan: &Plan) -> Result<Value> {
    let mut operations = Vec::with_capacity(plan.len());
    for operation in plan {
        operations.push(json!({
            "operation": operation.kind().to_string(),
            "target": operation.target().to_string(),
            "payload": operation.payload()?,
        }));
    }
    Ok(json!({
        "convergence": plan.convergence(),
        "operations": operations,
    }))
}

/// Log engine events collected while the command ran
fn drain_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Ok(event) = events.try_recv() {
        debug!("Engine event: {:?}", event);
    }
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_interrupt() -> &'static str {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        warn!("Failed to set up signal handlers; interrupts will not be reported");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_interrupt() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => {
            warn!("Failed to wait for CTRL-C: {}", e);
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> Config {
        Config {
            client: ClientConfig::new("alice", "key"),
            mode: "live".to_string(),
            nameserver_policy: "full-replace".to_string(),
            state_store_type: "memory".to_string(),
            state_store_path: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse(&args(&["plan", "ns.json"])).unwrap(),
            Command::Hook {
                hook: Hook::Plan,
                file: "ns.json".to_string()
            }
        );
        assert_eq!(
            Command::parse(&args(&["update", "ns.json", "example.com/ns-old.example.com"]))
                .unwrap(),
            Command::Update {
                file: "ns.json".to_string(),
                previous_id: Some("example.com/ns-old.example.com".to_string())
            }
        );
        assert_eq!(Command::parse(&args(&["refresh"])).unwrap(), Command::Refresh);
        assert_eq!(
            Command::parse(&args(&["import", "zone_domain", "example.com"])).unwrap(),
            Command::Import {
                kind: "zone_domain".to_string(),
                id: "example.com".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Command::parse(&args(&[])).is_err());
        assert!(Command::parse(&args(&["apply", "ns.json"])).is_err());
        assert!(Command::parse(&args(&["refresh", "extra"])).is_err());
    }

    #[test]
    fn test_validate_builds_core_config() {
        let mut cfg = config();
        cfg.mode = "dry-run".to_string();
        cfg.nameserver_policy = "set-diff".to_string();

        let core = cfg.validate().unwrap();
        assert!(core.engine.dry_run);
        assert_eq!(core.engine.nameserver_policy, NameserverPolicy::SetDiff);
        assert_eq!(core.state_store, StateStoreConfig::Memory);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = config();
        cfg.mode = "yolo".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.nameserver_policy = "merge".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.state_store_type = "file".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.log_level = "loud".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.client.api_key = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_explicit_client_config_is_kept() {
        let client = parse_client_config(
            r#"{"api_url":"http://localhost:8080/v2","username":"bob","api_key":"file-key","timeout_secs":5}"#,
        )
        .unwrap();
        assert_eq!(client.api_url, "http://localhost:8080/v2");
        assert_eq!(client.username, "bob");
        assert_eq!(client.api_key, "file-key");
        assert_eq!(client.timeout_secs, 5);

        assert!(parse_client_config("{\"username\": 7}").is_err());
    }

    #[test]
    fn test_render_plan() {
        use regsync_core::Operation;

        let plan = Plan::from(vec![Operation::DeleteNameserver {
            domain: "example.com".to_string(),
            hostname: "ns0.example.com".to_string(),
        }]);

        let rendered = render_plan(&plan).unwrap();
        assert_eq!(rendered["operations"].as_array().unwrap().len(), 1);
        assert_eq!(rendered["convergence"], json!("divergent"));
    }
}
