/*!
 # One-shot sign sessions

 A [`SignSession`] owns nothing until [`execute`](SignSession::execute) is
 called; each call opens the port, writes exactly one command frame, reads
 the sign's answer and closes the port again. The handle is dropped on
 every exit path, so the port is released even when the exchange fails
 half-way. Retrying is left to the caller.
*/

use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, instrument, trace, warn};

use crate::protocol::{SignCommand, SignState};
use crate::{Error, Result};

/// Longest line the sign is ever expected to send back
const MAX_RESPONSE_LEN: usize = 256;

/// Answer to one executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The sign acknowledged a write command
    Ack,
    /// Decoded state from a [`SignCommand::ReadState`]
    State(SignState),
}

/// A single command/response exchange with the sign over serial
#[derive(Debug, Clone)]
pub struct SignSession {
    port_name: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SignSession {
    /// Default per-read timeout, matching the sign's worst-case reply delay
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new(port_name: &str, baud_rate: u32, timeout: Duration) -> SignSession {
        SignSession {
            port_name: port_name.to_string(),
            baud_rate,
            timeout,
        }
    }

    /// Opens the port, sends `command` and waits for the sign's answer.
    ///
    /// Write commands are acknowledged with a 2-digit status code; anything
    /// nonzero surfaces as [`Error::SignCommunication`]. `ReadState` gets a
    /// full state line instead, decoded by the protocol module. An expired
    /// timeout is indistinguishable from an absent device here; both come
    /// back as [`Error::DeviceTimeout`] or a communication error.
    #[instrument(skip(self), fields(port = %self.port_name))]
    pub fn execute(&self, command: &SignCommand) -> Result<Response> {
        let frame = command.encode()?;
        debug!("Opening {} at {} baud", self.port_name, self.baud_rate);

        let mut port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| {
                Error::SignCommunication(format!("opening {} failed: {e}", self.port_name))
            })?;

        // The boxed port handle drops at the end of this scope on every
        // path, which closes the device.
        trace!("Writing {} byte frame", frame.len());
        port.write_all(&frame)
            .map_err(|e| map_io_error(e, self.timeout))?;

        match command {
            SignCommand::ReadState => {
                let line = read_line(&mut port, self.timeout)?;
                trace!("State line: {line}");
                Ok(Response::State(SignState::decode(&line)?))
            }
            _ => {
                let status = read_ack(&mut port, self.timeout)?;
                if status != 0 {
                    warn!("Sign acknowledged with failure status {status:02}");
                    return Err(Error::SignCommunication(format!(
                        "sign reported failure status {status:02}"
                    )));
                }
                debug!("Command acknowledged");
                Ok(Response::Ack)
            }
        }
    }
}

fn map_io_error(e: std::io::Error, timeout: Duration) -> Error {
    if e.kind() == std::io::ErrorKind::TimedOut {
        Error::DeviceTimeout(timeout)
    } else {
        Error::SignCommunication(e.to_string())
    }
}

/// Reads the 2-ASCII-digit acknowledgment that follows a write command
fn read_ack<R: Read>(reader: &mut R, timeout: Duration) -> Result<u8> {
    let mut buf = [0u8; 2];
    reader
        .read_exact(&mut buf)
        .map_err(|e| map_io_error(e, timeout))?;
    std::str::from_utf8(&buf)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .ok_or_else(|| {
            Error::SignCommunication(format!("unparseable acknowledgment {:?}", buf))
        })
}

/// Reads one `\n`-terminated response line, byte by byte
fn read_line<R: Read>(reader: &mut R, timeout: Duration) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => {
                return Err(Error::SignCommunication(
                    "response ended before line terminator".to_string(),
                ))
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                if byte[0] != b'\r' {
                    line.push(byte[0]);
                }
                if line.len() > MAX_RESPONSE_LEN {
                    return Err(Error::MalformedResponse(format!(
                        "response line exceeds {MAX_RESPONSE_LEN} bytes"
                    )));
                }
            }
            Err(e) => return Err(map_io_error(e, timeout)),
        }
    }
    String::from_utf8(line)
        .map_err(|_| Error::MalformedResponse("response line is not ASCII".to_string()))
}
