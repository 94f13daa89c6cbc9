/*!
 # Controller configuration

 One explicit [`SignConfig`] struct carries every knob the components need;
 nothing reads ambient global state. The file doubles as the persistence
 layer for the manual override, so the automatic updater and the manual
 switch agree on who owns the sign.
*/

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::occupancy::{ManualOverride, QuietWindow};
use crate::{Error, Result};

/// Persistent configuration for the sign controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// USB product description the transport locator matches against
    pub descriptor_match: String,
    /// Serial baud rate of the sign's microcontroller
    pub baud_rate: u32,
    /// Start of the active calendar-fetching hours (`HH:MM`)
    pub window_start: String,
    /// End of the active calendar-fetching hours (`HH:MM`)
    pub window_end: String,
    /// Calendar whose events drive the sign
    pub calendar_id: String,
    /// Minutes before an event's start at which the lamp already turns on
    pub start_offset_minutes: i64,
    /// Whether all-day events count as busy
    pub include_all_day: bool,
    /// Manual override flag; blocks automatic updates while set
    pub manual: bool,
    /// Last lamp state set by the operator
    pub manual_led_on: bool,
}

impl Default for SignConfig {
    fn default() -> SignConfig {
        SignConfig {
            descriptor_match: "USB Serial".to_string(),
            baud_rate: 115_200,
            window_start: "08:00".to_string(),
            window_end: "18:00".to_string(),
            calendar_id: String::new(),
            start_offset_minutes: 5,
            include_all_day: false,
            manual: false,
            manual_led_on: false,
        }
    }
}

impl SignConfig {
    /// Loads the TOML config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<SignConfig> {
        if !path.exists() {
            return Ok(SignConfig::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("parsing {}: {e}", path.display())))
    }

    /// Writes the config back, persisting the manual override state
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("serializing config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Configuration(format!("writing {}: {e}", path.display())))
    }

    /// The active fetching hours, or `None` when the configured strings
    /// are unusable. The decision engine fails open to "always fetch" in
    /// that case, so a typo cannot silently keep the sign dark.
    pub fn quiet_window(&self) -> Option<QuietWindow> {
        match QuietWindow::parse(&self.window_start, &self.window_end) {
            Ok(window) => Some(window),
            Err(e) => {
                warn!("Configured fetching hours are unusable ({e}), defaulting to fetch");
                None
            }
        }
    }

    pub fn manual_override(&self) -> ManualOverride {
        ManualOverride {
            enabled: self.manual,
            led_on: self.manual_led_on,
        }
    }

    pub fn start_offset(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.start_offset_minutes)
    }

    /// Records an operator decision. Switching the lamp on claims the sign
    /// (blocks automatic updates); switching it off hands control back.
    pub fn set_override(&mut self, on: bool) {
        self.manual = on;
        self.manual_led_on = on;
    }
}
