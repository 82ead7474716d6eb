//! CLI entrypoint for the socket99 harness.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use socket99::{OpenResult, SocketConfig, SocketOption};
use socket99_core::socket::SO_REUSEADDR;
use socket99_harness::cases::{self, CASES, CaseParams, CaseReport, option_labels};
use socket99_harness::structured_log::{self, LogEmitter, LogEntry, LogLevel, Outcome};
use socket99_harness::HarnessError;

/// Socket opening scenarios for socket99.
#[derive(Debug, Parser)]
#[command(name = "socket99-harness")]
#[command(about = "Open sockets from declarative configs and run exchange scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List scenario names and what they do.
    List,
    /// Run one scenario.
    Run {
        /// Scenario name, as printed by `list`.
        case: String,
        #[arg(long, default_value = cases::DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = cases::DEFAULT_PORT)]
        port: u32,
        /// Unix-domain socket path.
        #[arg(long, default_value = cases::DEFAULT_PATH)]
        path: PathBuf,
        /// JSONL log file (falls back to $SOCKET99_LOG).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Open one socket and report the result.
    Open(OpenArgs),
}

#[derive(Debug, clap::Args)]
struct OpenArgs {
    /// JSON document with the base configuration; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u32>,
    /// Unix-domain socket path; selects a Unix socket.
    #[arg(long)]
    path: Option<PathBuf>,
    /// Literal IPv4 address, used instead of `--host`.
    #[arg(long)]
    ipv4: Option<String>,
    /// Literal IPv6 address, used instead of `--host`.
    #[arg(long)]
    ipv6: Option<String>,
    #[arg(long)]
    server: bool,
    #[arg(long)]
    datagram: bool,
    #[arg(long)]
    nonblocking: bool,
    /// Listen backlog; 0 selects the platform maximum.
    #[arg(long)]
    backlog: Option<i32>,
    /// Set SO_REUSEADDR before binding.
    #[arg(long)]
    reuse_addr: bool,
    /// JSONL log file (falls back to $SOCKET99_LOG).
    #[arg(long)]
    log: Option<PathBuf>,
}

impl OpenArgs {
    fn socket_config(&self) -> Result<SocketConfig, HarnessError> {
        let mut cfg: SocketConfig = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => SocketConfig::default(),
        };

        if let Some(host) = &self.host {
            cfg.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(path) = &self.path {
            cfg.path = Some(path.clone());
        }
        if let Some(ipv4) = &self.ipv4 {
            cfg.ipv4 = Some(ipv4.clone());
        }
        if let Some(ipv6) = &self.ipv6 {
            cfg.ipv6 = Some(ipv6.clone());
        }
        if let Some(backlog) = self.backlog {
            cfg.backlog_size = backlog;
        }
        cfg.server |= self.server;
        cfg.datagram |= self.datagram;
        cfg.nonblocking |= self.nonblocking;
        if self.reuse_addr {
            cfg.socket_options.push(SocketOption::flag(SO_REUSEADDR, true));
        }
        Ok(cfg)
    }
}

fn emitter(log: Option<PathBuf>) -> io::Result<LogEmitter> {
    let path = log.or_else(|| {
        std::env::var_os(structured_log::LOG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });
    match path {
        Some(path) => LogEmitter::to_file(&path, &structured_log::default_run_id()),
        None => Ok(LogEmitter::disabled()),
    }
}

fn open_once(args: &OpenArgs) -> Result<(), HarnessError> {
    let cfg = args.socket_config()?;
    let mut log = emitter(args.log.clone())?;

    let result = socket99::open(&cfg);
    let (level, outcome) = if result.is_ok() {
        (LogLevel::Info, Outcome::Pass)
    } else {
        (LogLevel::Error, Outcome::Fail)
    };
    log.emit_entry(
        LogEntry::new("", level, "socket_open")
            .with_case("open")
            .with_open_result(&result)
            .with_outcome(outcome)
            .with_details(serde_json::json!({
                "config": serde_json::to_value(&cfg)?,
                "options": option_labels(&cfg.socket_options),
            })),
    )?;
    log.flush()?;

    if result.is_ok() {
        result.write_to(io::stdout().lock())?;
    }
    result.into_result().map(drop).map_err(HarnessError::from)
}

fn execute(command: Command) -> Result<(), HarnessError> {
    match command {
        Command::List => {
            let mut out = io::stdout().lock();
            for case in &CASES {
                writeln!(out, "'{}':\n    {}", case.name, case.description)?;
            }
        }
        Command::Run {
            case,
            host,
            port,
            path,
            log,
        } => {
            let case = cases::lookup(&case).ok_or(HarnessError::UnknownCase(case))?;
            let params = CaseParams { host, port, path };
            let mut log = emitter(log)?;
            let report = case.run_logged(&params, &mut log)?;
            if let CaseReport::Received(text) = &report {
                println!("Got: '{text}'");
            }
            println!("pass {}", case.name);
        }
        Command::Open(args) => open_once(&args)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut stderr = io::stderr().lock();
            // Nothing sensible is left to do if stderr itself fails.
            let _ = match err {
                HarnessError::Open(err) => OpenResult::from(err).write_to(&mut stderr),
                other => writeln!(stderr, "{other}"),
            };
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_uses_scenario_defaults() {
        let cli = Cli::try_parse_from(["harness", "run", "tcp_client"]).unwrap();
        match cli.command {
            Command::Run {
                case,
                host,
                port,
                path,
                log,
            } => {
                assert_eq!(case, "tcp_client");
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8080);
                assert_eq!(path, PathBuf::from("test_foo"));
                assert!(log.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_requires_a_case() {
        assert!(Cli::try_parse_from(["harness", "run"]).is_err());
    }

    #[test]
    fn open_flags_build_config() {
        let cli = Cli::try_parse_from([
            "harness",
            "open",
            "--ipv4",
            "127.0.0.1",
            "--port",
            "9000",
            "--server",
            "--nonblocking",
            "--backlog",
            "16",
            "--reuse-addr",
        ])
        .unwrap();
        let Command::Open(args) = cli.command else {
            panic!("expected open");
        };
        let cfg = args.socket_config().unwrap();
        assert_eq!(cfg.ipv4.as_deref(), Some("127.0.0.1"));
        assert_eq!(cfg.port, 9000);
        assert!(cfg.server);
        assert!(cfg.nonblocking);
        assert!(!cfg.datagram);
        assert_eq!(cfg.backlog_size, 16);
        assert_eq!(cfg.socket_options, [SocketOption::flag(SO_REUSEADDR, true)]);
    }

    #[test]
    fn open_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!(
            "socket99-harness-cfg-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{"host":"example.invalid","port":80,"datagram":true}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "harness",
            "open",
            "--config",
            path.to_str().unwrap(),
            "--host",
            "localhost",
        ])
        .unwrap();
        let Command::Open(args) = cli.command else {
            panic!("expected open");
        };
        let cfg = args.socket_config().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.host.as_deref(), Some("localhost"));
        assert_eq!(cfg.port, 80);
        assert!(cfg.datagram);
        assert!(cfg.socket_options.is_empty());
    }
}
