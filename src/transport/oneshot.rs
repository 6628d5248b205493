use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::protocol::{Request, Response};
use crate::transport::Transport;

/// Runs the analyzer as a fresh subprocess for every request.
///
/// The request line goes to stdin and the response line is read from
/// stdout. Anything written to stderr fails the request.
#[derive(Debug, Clone)]
pub struct OneShotAnalyzer {
    program: String,
    args: Vec<String>,
}

impl OneShotAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; the first element is the program
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| Error::Config {
            message: "analyzer command is empty".to_string(),
        })?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl Transport for OneShotAnalyzer {
    fn request(&self, request: &Request) -> Result<Response> {
        let line = request.encode()?;
        let op = request.op();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::transport(format!("spawning {}", self.program), e))?;

        // Fed from its own thread so a chatty analyzer cannot fill its
        // output pipes while the request is still being written
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&line)));

        let output = child
            .wait_with_output()
            .map_err(|e| Error::transport(format!("waiting for {}", self.program), e))?;

        let sent = match writer.map(|w| w.join()) {
            None | Some(Ok(Ok(()))) => Ok(()),
            Some(Ok(Err(e))) => Err(e),
            Some(Err(_)) => Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")),
        };

        if !output.stderr.is_empty() {
            return Err(Error::analyzer(
                String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            ));
        }
        if !output.status.success() {
            return Err(Error::analyzer(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        match sent {
            Ok(()) => {}
            // Answered and exited without reading the whole request
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(op, "Analyzer closed stdin early");
            }
            Err(e) => return Err(Error::transport(format!("sending {}", op), e)),
        }

        debug!(op, bytes = output.stdout.len(), "Analyzer subprocess finished");
        Response::decode(&output.stdout)
    }
}
