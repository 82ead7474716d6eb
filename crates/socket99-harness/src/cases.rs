//! Scenario registry: one socket per case, one `"hello\n"` exchanged.
//!
//! Client cases send the greeting and pass when every byte was accepted.
//! Server cases wait for one peer and pass when it delivered any data.
//! Run a server case and the matching client case against the same
//! [`CaseParams`] to exercise a full exchange.

use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::os::fd::OwnedFd;
use std::os::unix::net::{UnixDatagram, UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use socket99::{SocketConfig, SocketOption, Status};
use socket99_core::socket::sockopt_name;

use crate::error::HarnessError;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u32 = 8080;
pub const DEFAULT_PATH: &str = "test_foo";

/// Payload every client sends.
pub const HELLO: &[u8] = b"hello\n";

const RECV_BUF: usize = 1024;
const ACCEPT_POLL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Parameters and reports
// ---------------------------------------------------------------------------

/// Endpoint shared by a server case and its client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseParams {
    pub host: String,
    pub port: u32,
    pub path: PathBuf,
}

impl Default for CaseParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: PathBuf::from(DEFAULT_PATH),
        }
    }
}

/// What a passing case did with its socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseReport {
    /// Bytes handed to the kernel by a client.
    Sent(usize),
    /// Text delivered by the peer of a server.
    Received(String),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type Exercise = fn(OwnedFd, &SocketConfig) -> Result<CaseReport, HarnessError>;

/// A named scenario.
pub struct Case {
    pub name: &'static str,
    pub description: &'static str,
    config: fn(&CaseParams) -> SocketConfig,
    exercise: Exercise,
}

/// Every scenario, in listing order.
pub static CASES: [Case; 9] = [
    Case {
        name: "tcp_client",
        description: "connect to the endpoint via TCP and send \"hello\\n\"",
        config: tcp_client,
        exercise: send_stream,
    },
    Case {
        name: "tcp_server",
        description: "listen on the endpoint via TCP and print the client's message",
        config: tcp_server,
        exercise: accept_and_read,
    },
    Case {
        name: "tcp_server_nonblocking",
        description: "listen on the endpoint via non-blocking TCP and print the client's message",
        config: tcp_server_nonblocking,
        exercise: poll_accept_and_read,
    },
    Case {
        name: "udp_client",
        description: "send \"hello\\n\" to the endpoint via UDP",
        config: udp_client,
        exercise: send_to_resolved,
    },
    Case {
        name: "udp_server",
        description: "bind the endpoint via UDP and print the client's message",
        config: udp_server,
        exercise: recv_udp,
    },
    Case {
        name: "unix_client_stream",
        description: "connect to the socket path and send \"hello\\n\" (stream)",
        config: unix_client,
        exercise: send_unix_stream,
    },
    Case {
        name: "unix_client_datagram",
        description: "connect to the socket path and send \"hello\\n\" (datagram)",
        config: unix_client_datagram,
        exercise: send_unix_datagram,
    },
    Case {
        name: "unix_server_stream",
        description: "listen on the socket path and print the client's message (stream)",
        config: unix_server,
        exercise: accept_unix_and_read,
    },
    Case {
        name: "unix_server_datagram",
        description: "bind the socket path and print the client's message (datagram)",
        config: unix_server_datagram,
        exercise: recv_unix_datagram,
    },
];

fn tcp_client(p: &CaseParams) -> SocketConfig {
    SocketConfig::inet(&p.host, p.port)
}

fn tcp_server(p: &CaseParams) -> SocketConfig {
    tcp_client(p).with_server()
}

fn tcp_server_nonblocking(p: &CaseParams) -> SocketConfig {
    tcp_server(p).with_nonblocking()
}

fn udp_client(p: &CaseParams) -> SocketConfig {
    tcp_client(p).with_datagram()
}

fn udp_server(p: &CaseParams) -> SocketConfig {
    tcp_server(p).with_datagram()
}

fn unix_client(p: &CaseParams) -> SocketConfig {
    SocketConfig::unix(&p.path)
}

fn unix_client_datagram(p: &CaseParams) -> SocketConfig {
    unix_client(p).with_datagram()
}

fn unix_server(p: &CaseParams) -> SocketConfig {
    unix_client(p).with_server()
}

fn unix_server_datagram(p: &CaseParams) -> SocketConfig {
    unix_server(p).with_datagram()
}

/// Finds a case by exact name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Case> {
    CASES.iter().find(|case| case.name == name)
}

impl Case {
    /// The configuration this case opens with.
    #[must_use]
    pub fn config(&self, params: &CaseParams) -> SocketConfig {
        (self.config)(params)
    }

    /// Opens the socket, runs the exchange and checks the result.
    ///
    /// Unix server cases remove a stale socket file before binding and
    /// remove their own file afterwards.
    pub fn run(&self, params: &CaseParams) -> Result<CaseReport, HarnessError> {
        let cfg = self.config(params);
        let owns_path = cfg.server && cfg.is_unix();
        if owns_path {
            remove_if_present(&params.path)?;
        }

        let outcome = socket99::try_open(&cfg)
            .map_err(HarnessError::from)
            .and_then(|fd| (self.exercise)(fd, &cfg));

        if owns_path {
            remove_if_present(&params.path)?;
        }

        match outcome? {
            CaseReport::Sent(n) if n != HELLO.len() => Err(HarnessError::mismatch(
                self.name,
                format!("sent {n} of {} bytes", HELLO.len()),
            )),
            CaseReport::Received(text) if text.is_empty() => Err(HarnessError::mismatch(
                self.name,
                "peer closed without sending data",
            )),
            report => Ok(report),
        }
    }

    /// [`run`](Self::run) wrapped in `case_start` / `case_end` log records.
    pub fn run_logged(
        &self,
        params: &CaseParams,
        log: &mut LogEmitter,
    ) -> Result<CaseReport, HarnessError> {
        let cfg = self.config(params);
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "case_start")
                .with_case(self.name)
                .with_details(serde_json::json!({
                    "config": serde_json::to_value(&cfg)?,
                    "options": option_labels(&cfg.socket_options),
                })),
        )?;

        let started = Instant::now();
        let result = self.run(params);
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let entry = LogEntry::new("", LogLevel::Info, "case_end")
            .with_case(self.name)
            .with_duration_ms(elapsed);
        let entry = match &result {
            Ok(report) => entry
                .with_status(Status::Ok)
                .with_outcome(Outcome::Pass)
                .with_details(serde_json::to_value(report)?),
            Err(HarnessError::Open(err)) => LogEntry {
                level: LogLevel::Error,
                ..entry.with_open_error(err).with_outcome(Outcome::Fail)
            },
            Err(other) => LogEntry {
                level: LogLevel::Error,
                ..entry
                    .with_outcome(Outcome::Error)
                    .with_details(serde_json::json!({ "error": other.to_string() }))
            },
        };
        log.emit_entry(entry)?;
        log.flush()?;
        result
    }
}

/// Symbolic names of the configured options, for logs.
#[must_use]
pub fn option_labels(options: &[SocketOption]) -> Vec<String> {
    options
        .iter()
        .map(|opt| match sockopt_name(opt.name) {
            Some(name) => name.to_string(),
            None => format!("option {}", opt.name),
        })
        .collect()
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

fn read_message(mut reader: impl Read) -> io::Result<CaseReport> {
    let mut buf = [0u8; RECV_BUF];
    let n = reader.read(&mut buf)?;
    Ok(CaseReport::Received(
        String::from_utf8_lossy(&buf[..n]).into_owned(),
    ))
}

fn send_stream(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let mut stream = TcpStream::from(fd);
    Ok(CaseReport::Sent(stream.write(HELLO)?))
}

fn accept_and_read(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let listener = TcpListener::from(fd);
    let (stream, _) = listener.accept()?;
    Ok(read_message(stream)?)
}

fn poll_accept_and_read(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let listener = TcpListener::from(fd);
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                let report = read_message(stream)?;
                if report != CaseReport::Received(String::new()) {
                    return Ok(report);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Sends to the first candidate the opener's resolver yields that takes the
/// whole greeting.
fn send_to_resolved(fd: OwnedFd, cfg: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let socket = UdpSocket::from(fd);
    let targets = socket99::resolve(cfg)?;
    if targets.is_empty() {
        return Err(HarnessError::Resolve {
            host: cfg.node().unwrap_or_default().to_string(),
            port: cfg.port,
            reason: "no IPv4 or IPv6 candidate".into(),
        });
    }

    let mut last = Ok(0);
    for addr in targets {
        last = socket.send_to(HELLO, addr);
        if matches!(last, Ok(n) if n == HELLO.len()) {
            break;
        }
    }
    Ok(CaseReport::Sent(last?))
}

fn recv_udp(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let socket = UdpSocket::from(fd);
    let mut buf = [0u8; RECV_BUF];
    let (n, _) = socket.recv_from(&mut buf)?;
    Ok(CaseReport::Received(
        String::from_utf8_lossy(&buf[..n]).into_owned(),
    ))
}

fn send_unix_stream(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let mut stream = UnixStream::from(fd);
    Ok(CaseReport::Sent(stream.write(HELLO)?))
}

fn send_unix_datagram(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let socket = UnixDatagram::from(fd);
    Ok(CaseReport::Sent(socket.send(HELLO)?))
}

fn accept_unix_and_read(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let listener = UnixListener::from(fd);
    let (stream, _) = listener.accept()?;
    Ok(read_message(stream)?)
}

fn recv_unix_datagram(fd: OwnedFd, _: &SocketConfig) -> Result<CaseReport, HarnessError> {
    let socket = UnixDatagram::from(fd);
    let mut buf = [0u8; RECV_BUF];
    let n = socket.recv(&mut buf)?;
    Ok(CaseReport::Received(
        String::from_utf8_lossy(&buf[..n]).into_owned(),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use socket99_core::socket::{SO_KEEPALIVE, SO_REUSEADDR};

    #[test]
    fn case_names_are_unique_and_resolvable() {
        for case in &CASES {
            assert!(std::ptr::eq(lookup(case.name).unwrap(), case));
        }
        assert!(lookup("tcp").is_none());
        assert!(lookup("TCP_CLIENT").is_none());
    }

    #[test]
    fn default_params() {
        let params = CaseParams::default();
        assert_eq!(params.host, "127.0.0.1");
        assert_eq!(params.port, 8080);
        assert_eq!(params.path, PathBuf::from("test_foo"));
    }

    #[test]
    fn configs_match_case_roles() {
        let params = CaseParams::default();
        for case in &CASES {
            let cfg = case.config(&params);
            assert_eq!(cfg.server, case.name.contains("server"), "{}", case.name);
            assert_eq!(cfg.is_unix(), case.name.starts_with("unix"), "{}", case.name);
            let datagram = case.name.starts_with("udp") || case.name.ends_with("datagram");
            assert_eq!(cfg.datagram, datagram, "{}", case.name);
            assert_eq!(cfg.nonblocking, case.name.ends_with("nonblocking"), "{}", case.name);
            assert!(cfg.check().is_ok());
        }
    }

    #[test]
    fn option_labels_name_known_options() {
        let labels = option_labels(&[
            SocketOption::flag(SO_REUSEADDR, true),
            SocketOption::flag(SO_KEEPALIVE, false),
            SocketOption::int(4242, 1),
        ]);
        assert_eq!(labels, ["SO_REUSEADDR", "SO_KEEPALIVE", "option 4242"]);
    }

    #[test]
    fn remove_if_present_ignores_missing_file() {
        let path = std::env::temp_dir().join(format!("socket99-absent-{}", std::process::id()));
        remove_if_present(&path).unwrap();
    }
}
