/*!
 # Meeting Sign Controller Library

 A Rust library for driving an 8-group LED meeting sign over a USB serial
 link, mirroring calendar "busy" state onto the sign with a manual-override
 mode and a small fixed ASCII command protocol.

 ## Features

 * Serial device discovery by USB product description
 * Command encoding (all-off, preset colors, per-group colors, read-back)
 * One-shot command/response sessions with bounded timeouts
 * Calendar-driven occupancy decision with quiet hours and manual override
 * Terminal rendering of the sign's read-back state

 ## Example

 ```rust,no_run
 use meeting_sign::*;
 use std::time::Duration;

 fn main() -> Result<()> {
     // Initialize tracing for logs
     tracing_subscriber::fmt::init();

     // Find the sign and turn every group off
     let port = transport::discover("USB Serial")?;
     let session = SignSession::new(&port.port_name, 115_200, Duration::from_millis(500));
     session.execute(&SignCommand::AllOff)?;

     Ok(())
 }
 ```
*/

use thiserror::Error;

/// Custom error types for the meeting sign controller library
#[derive(Error, Debug)]
pub enum Error {
    /// No serial port matched the configured descriptor
    #[error("No serial device matching \"{0}\" found")]
    DeviceNotFound(String),

    /// The sign did not answer within the configured timeout
    #[error("Sign did not respond within {0:?}")]
    DeviceTimeout(std::time::Duration),

    /// Serial I/O failure or nonzero acknowledgment from the sign
    #[error("Sign communication error: {0}")]
    SignCommunication(String),

    /// A read-state response that does not match the wire format
    #[error("Malformed sign response: {0}")]
    MalformedResponse(String),

    /// Unusable configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Value out of range
    #[error("Value {0} out of range ({1}..{2})")]
    ValueOutOfRange(u32, u32, u32),
}

// Import needed for Result type extension
pub type Result<T> = std::result::Result<T, Error>;

// Re-export modules
pub mod calendar;
pub mod config;
pub mod occupancy;
pub mod protocol;
pub mod render;
pub mod session;
pub mod transport;

// Re-export key types
pub use calendar::{CalendarEvent, EventSource, JsonFileSource};
pub use config::SignConfig;
pub use occupancy::{decide, ManualOverride, OccupancyResult, QuietWindow};
pub use protocol::{GroupColor, Preset, Rgb, SignCommand, SignState, LED_GROUPS};
pub use session::{Response, SignSession};
