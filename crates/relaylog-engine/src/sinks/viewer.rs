//! Remote log-viewer sink.
//!
//! Records are sent as single-line JSON: one datagram per record over UDP,
//! one newline-terminated line per record over TCP.

use crate::record::LogRecord;
use crate::severity::Severity;
use crate::sink::Sink;
use chrono::{DateTime, Utc};
use relaylog_core::errors::require_non_blank;
use relaylog_core::{LogError, Result};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;
use std::time::Duration;

const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Bounds how long a stalled viewer can hold the connection lock.
const TCP_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Transport and address family of a viewer endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Udp4,
    Udp6,
    Tcp,
    Tcp4,
    Tcp6,
}

impl Protocol {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "udp" => Some(Protocol::Udp),
            "udp4" => Some(Protocol::Udp4),
            "udp6" => Some(Protocol::Udp6),
            "tcp" => Some(Protocol::Tcp),
            "tcp4" => Some(Protocol::Tcp4),
            "tcp6" => Some(Protocol::Tcp6),
            _ => None,
        }
    }

    pub const fn scheme(self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Udp4 => "udp4",
            Protocol::Udp6 => "udp6",
            Protocol::Tcp => "tcp",
            Protocol::Tcp4 => "tcp4",
            Protocol::Tcp6 => "tcp6",
        }
    }

    pub const fn is_udp(self) -> bool {
        matches!(self, Protocol::Udp | Protocol::Udp4 | Protocol::Udp6)
    }

    fn accepts(self, addr: &SocketAddr) -> bool {
        match self {
            Protocol::Udp4 | Protocol::Tcp4 => addr.is_ipv4(),
            Protocol::Udp6 | Protocol::Tcp6 => addr.is_ipv6(),
            Protocol::Udp | Protocol::Tcp => true,
        }
    }
}

/// A parsed `scheme://host:port` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkAddress {
    protocol: Protocol,
    host: String,
    port: u16,
}

impl SinkAddress {
    /// Parse `udp://1.2.3.4:9999`, `tcp://logs.example.com:4505`,
    /// `udp6://[::1]:9999` and friends. Host names are resolved on connect.
    ///
    /// # Errors
    ///
    /// Returns `LogError::InvalidArgument` for a blank address and
    /// `LogError::InvalidAddress` for anything unparseable.
    pub fn parse(address: &str) -> Result<Self> {
        let address = require_non_blank("address", Some(address))?.trim();
        let invalid = |reason: &str| LogError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, authority) = address
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://host:port"))?;
        let protocol = Protocol::from_scheme(scheme)
            .ok_or_else(|| invalid("unsupported scheme (udp, udp4, udp6, tcp, tcp4, tcp6)"))?;
        let authority = authority.trim_end_matches('/');
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        let port: u16 = port.parse().map_err(|_| invalid("port is not a number"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            protocol,
            host: host.to_string(),
            port,
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn resolve(&self) -> io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .find(|addr| self.protocol.accepts(addr))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no {} address for {}", self.protocol.scheme(), self.host),
                )
            })
    }
}

impl fmt::Display for SinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.protocol.scheme(), self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.protocol.scheme(), self.host, self.port)
        }
    }
}

/// Description of a viewer sink prepared by the caller.
///
/// A target without a name is given a generated one when it is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerTarget {
    pub name: Option<String>,
    pub address: String,
    pub include_source_info: bool,
}

impl ViewerTarget {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
            include_source_info: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Also send the emitting thread and process id with each record.
    pub fn with_source_info(mut self, include: bool) -> Self {
        self.include_source_info = include;
        self
    }

    /// Build the sink this target describes.
    ///
    /// # Errors
    ///
    /// Fails when the address does not parse.
    pub fn build(&self) -> Result<ViewerSink> {
        Ok(ViewerSink::new(
            SinkAddress::parse(&self.address)?,
            self.include_source_info,
        ))
    }
}

#[derive(Serialize)]
struct ViewerPayload<'a> {
    timestamp: &'a DateTime<Utc>,
    severity: Severity,
    logger: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_id: Option<u32>,
}

enum Connection {
    Udp { socket: UdpSocket, peer: SocketAddr },
    Tcp(TcpStream),
}

/// Sends records to a remote log viewer.
///
/// The connection is opened on first write and reopened after a failure,
/// so an unreachable endpoint never fails construction.
pub struct ViewerSink {
    address: SinkAddress,
    include_source_info: bool,
    connection: Mutex<Option<Connection>>,
}

impl ViewerSink {
    pub fn new(address: SinkAddress, include_source_info: bool) -> Self {
        Self {
            address,
            include_source_info,
            connection: Mutex::new(None),
        }
    }

    pub fn address(&self) -> &SinkAddress {
        &self.address
    }

    fn encode(&self, record: &LogRecord) -> io::Result<String> {
        let payload = ViewerPayload {
            timestamp: &record.timestamp,
            severity: record.severity,
            logger: &record.logger,
            message: &record.message,
            thread: record
                .thread
                .as_deref()
                .filter(|_| self.include_source_info),
            process_id: self.include_source_info.then_some(record.process_id),
        };
        serde_json::to_string(&payload).map_err(io::Error::from)
    }

    fn connect(&self) -> io::Result<Connection> {
        let peer = self.address.resolve()?;
        if self.address.protocol.is_udp() {
            let local: SocketAddr = if peer.is_ipv4() {
                ([0, 0, 0, 0], 0).into()
            } else {
                (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
            };
            let socket = UdpSocket::bind(local)?;
            Ok(Connection::Udp { socket, peer })
        } else {
            let stream = TcpStream::connect_timeout(&peer, TCP_CONNECT_TIMEOUT)?;
            stream.set_nodelay(true)?;
            stream.set_write_timeout(Some(TCP_WRITE_TIMEOUT))?;
            Ok(Connection::Tcp(stream))
        }
    }
}

impl fmt::Debug for ViewerSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerSink")
            .field("address", &self.address.to_string())
            .field("include_source_info", &self.include_source_info)
            .finish()
    }
}

impl Sink for ViewerSink {
    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let payload = self.encode(record)?;
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "viewer sink lock poisoned"))?;
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }

        let result = match guard.as_mut() {
            Some(Connection::Udp { socket, peer }) => {
                socket.send_to(payload.as_bytes(), *peer).map(|_| ())
            }
            Some(Connection::Tcp(stream)) => stream
                .write_all(payload.as_bytes())
                .and_then(|()| stream.write_all(b"\n")),
            None => Ok(()),
        };
        if result.is_err() {
            *guard = None;
        }
        result
    }

    fn flush(&self) -> io::Result<()> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "viewer sink lock poisoned"))?;
        match guard.as_mut() {
            Some(Connection::Tcp(stream)) => stream.flush(),
            _ => Ok(()),
        }
    }

    fn kind(&self) -> &'static str {
        "viewer"
    }
}
