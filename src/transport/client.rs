use std::io::{self, Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::protocol::{Request, Response, TERMINATOR};
use crate::transport::Transport;

const READ_CHUNK: usize = 4096;

/// Where a long-lived analyzer listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// `host:port`
    Tcp(String),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Address {
    /// Parse a configured address. On unix, anything that looks like a path
    /// is a socket file; everything else is `host:port`.
    pub fn parse(raw: &str) -> Self {
        #[cfg(unix)]
        if raw.starts_with('/') || raw.starts_with('.') || raw.starts_with('~') {
            return Address::Unix(PathBuf::from(raw));
        }
        Address::Tcp(raw.to_string())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Tcp(addr) => write!(f, "tcp://{}", addr),
            #[cfg(unix)]
            Address::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
        }
    }
}

/// Client for a persistent analyzer server.
///
/// One request is in flight per connection at a time; concurrent callers
/// block on the connection lock. Failures are never retried here.
pub struct AnalyzerClient {
    address: Address,
    connection: Mutex<Connection>,
}

impl AnalyzerClient {
    /// Connect to the analyzer
    pub fn connect(address: Address) -> Result<Self> {
        let connection = match &address {
            Address::Tcp(addr) => TcpStream::connect(addr)
                .map(Connection::Tcp)
                .map_err(|e| Error::transport(format!("connecting to {}", address), e))?,
            #[cfg(unix)]
            Address::Unix(path) => UnixStream::connect(path)
                .map(Connection::Unix)
                .map_err(|e| Error::transport(format!("connecting to {}", address), e))?,
        };

        debug!(%address, "Connected to analyzer");

        Ok(Self {
            address,
            connection: Mutex::new(connection),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Transport for AnalyzerClient {
    fn request(&self, request: &Request) -> Result<Response> {
        let line = request.encode()?;
        let op = request.op();

        let mut connection = self.connection.lock();

        connection
            .write_all(&line)
            .and_then(|_| connection.flush())
            .map_err(|e| Error::transport(format!("sending {}", op), e))?;
        trace!(op, bytes = line.len(), "Sent request");

        let response = read_response(&mut *connection)?;
        drop(connection);

        debug!(op, bytes = response.len(), "Received response");
        Response::decode(&response)
    }
}

/// Read until the buffered bytes end with the terminator
fn read_response<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut response = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::transport("receiving response", e)),
        };

        if n == 0 {
            if response.is_empty() {
                return Err(Error::transport(
                    "receiving response",
                    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by analyzer"),
                ));
            }
            return Err(Error::protocol(format!(
                "connection closed after {} bytes of an incomplete response",
                response.len()
            )));
        }

        response.extend_from_slice(&chunk[..n]);
        if response.last() == Some(&TERMINATOR) {
            return Ok(response);
        }
    }
}
