/*!
 # Sign wire protocol

 This module implements the fixed ASCII command set of the sign's
 microcontroller firmware. Every frame is `<opcode><payload>.\r\n`:

 * `A` — set all 8 groups to one color, payload is three 2-digit channels
 * `M` — set individual groups, payload is one 8-char block per group
 * `R` — read back the current state, payload empty

 The read-back response is a single line of 25 comma-separated integers:
 8 RGB triples followed by a status code (0 = success).
*/

use crate::{Error, Result};

/// Number of independently addressable color zones on the sign
pub const LED_GROUPS: usize = 8;

/// Highest PWM step per color channel (17 levels, 0-16)
pub const PWM_MAX: u8 = 16;

/// Integer count of a well-formed read-state response line
const STATE_FIELDS: usize = LED_GROUPS * 3 + 1;

/// One RGB color in the sign's 0-16 PWM step scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red channel (0-16)
    pub red: u8,
    /// Green channel (0-16)
    pub green: u8,
    /// Blue channel (0-16)
    pub blue: u8,
}

impl Rgb {
    /// All channels dark
    pub const OFF: Rgb = Rgb {
        red: 0,
        green: 0,
        blue: 0,
    };

    pub const fn new(red: u8, green: u8, blue: u8) -> Rgb {
        Rgb { red, green, blue }
    }

    /// True when every channel is zero
    pub fn is_off(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }

    fn validate(&self) -> Result<()> {
        for channel in [self.red, self.green, self.blue] {
            if channel > PWM_MAX {
                return Err(Error::ValueOutOfRange(channel as u32, 0, PWM_MAX as u32));
            }
        }
        Ok(())
    }
}

/// A color assignment for one of the sign's 8 groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupColor {
    /// Group position on the sign (0-7)
    pub group: u8,
    /// Color to set
    pub color: Rgb,
}

impl GroupColor {
    pub const fn new(group: u8, color: Rgb) -> GroupColor {
        GroupColor { group, color }
    }
}

/// Named color presets for the all-groups `A` command
///
/// The 6-digit payloads are part of the protocol contract; they were taken
/// straight from the firmware's color table and are not plain RGB triples
/// in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Red,
    Orange,
    Yellow,
    Green,
    Aquamarine,
    Blue,
    Purple,
    Violet,
    Pink,
    Indigo,
}

impl Preset {
    /// The fixed 6-digit `A` payload for this preset
    pub fn payload(&self) -> &'static str {
        match self {
            Preset::Red => "160000",
            Preset::Orange => "160100",
            Preset::Yellow => "160300",
            Preset::Green => "000800",
            Preset::Aquamarine => "000801",
            Preset::Blue => "000016",
            Preset::Purple => "050016",
            Preset::Violet => "160016",
            Preset::Pink => "320102",
            Preset::Indigo => "020116",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Preset::Red => "red",
            Preset::Orange => "orange",
            Preset::Yellow => "yellow",
            Preset::Green => "green",
            Preset::Aquamarine => "aquamarine",
            Preset::Blue => "blue",
            Preset::Purple => "purple",
            Preset::Violet => "violet",
            Preset::Pink => "pink",
            Preset::Indigo => "indigo",
        };
        write!(f, "{name}")
    }
}

/// A command the sign understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignCommand {
    /// Turn every group off (`A000000`)
    AllOff,
    /// Set every group to a named preset color
    AllOn(Preset),
    /// Set up to 8 individual groups in one frame
    SetGroups(Vec<GroupColor>),
    /// Ask the sign for its current per-group state
    ReadState,
}

impl SignCommand {
    /// The canonical rainbow pattern the sign shows when a meeting is on.
    ///
    /// Encodes byte-for-byte to the 64-character `M` payload the original
    /// firmware was tuned against.
    pub fn meeting_pattern() -> SignCommand {
        SignCommand::SetGroups(vec![
            GroupColor::new(0, Rgb::new(16, 0, 0)),
            GroupColor::new(2, Rgb::new(16, 1, 0)),
            GroupColor::new(4, Rgb::new(16, 3, 0)),
            GroupColor::new(6, Rgb::new(0, 8, 0)),
            GroupColor::new(7, Rgb::new(0, 8, 1)),
            GroupColor::new(5, Rgb::new(0, 0, 16)),
            GroupColor::new(3, Rgb::new(5, 0, 16)),
            GroupColor::new(1, Rgb::new(16, 0, 16)),
        ])
    }

    /// Encodes the command into a complete wire frame, terminator included
    pub fn encode(&self) -> Result<Vec<u8>> {
        let frame = match self {
            SignCommand::AllOff => "A000000".to_string(),
            SignCommand::AllOn(preset) => format!("A{}", preset.payload()),
            SignCommand::SetGroups(groups) => {
                if groups.is_empty() || groups.len() > LED_GROUPS {
                    return Err(Error::ValueOutOfRange(
                        groups.len() as u32,
                        1,
                        LED_GROUPS as u32,
                    ));
                }
                let mut payload = String::with_capacity(groups.len() * 8);
                for gc in groups {
                    if gc.group as usize >= LED_GROUPS {
                        return Err(Error::ValueOutOfRange(
                            gc.group as u32,
                            0,
                            LED_GROUPS as u32 - 1,
                        ));
                    }
                    gc.color.validate()?;
                    payload.push_str(&format!(
                        "{:02}{:02}{:02}{:02}",
                        gc.group, gc.color.red, gc.color.green, gc.color.blue
                    ));
                }
                format!("M{payload}")
            }
            SignCommand::ReadState => "R".to_string(),
        };
        Ok(format!("{frame}.\r\n").into_bytes())
    }
}

/// Decoded answer to a [`SignCommand::ReadState`] request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignState {
    /// Current color of each group, in group order
    pub groups: [Rgb; LED_GROUPS],
    /// Whether the firmware reported the read as successful
    pub status_ok: bool,
}

impl SignState {
    /// Decodes one response line of 25 comma-separated integers.
    ///
    /// A nonzero trailing status still decodes; the caller decides whether
    /// to trust the data. Everything else that deviates from the format is
    /// a [`Error::MalformedResponse`].
    pub fn decode(line: &str) -> Result<SignState> {
        let mut values = Vec::with_capacity(STATE_FIELDS);
        for token in line.trim().split(',') {
            let value: i64 = token.trim().parse().map_err(|_| {
                Error::MalformedResponse(format!("non-integer field \"{}\"", token.trim()))
            })?;
            values.push(value);
        }

        if values.len() != STATE_FIELDS {
            return Err(Error::MalformedResponse(format!(
                "expected {} integers, got {}",
                STATE_FIELDS,
                values.len()
            )));
        }

        let mut groups = [Rgb::OFF; LED_GROUPS];
        for (i, group) in groups.iter_mut().enumerate() {
            let channels = &values[i * 3..i * 3 + 3];
            for &channel in channels {
                if !(0..=PWM_MAX as i64).contains(&channel) {
                    return Err(Error::MalformedResponse(format!(
                        "channel value {channel} outside 0-{PWM_MAX}"
                    )));
                }
            }
            *group = Rgb::new(channels[0] as u8, channels[1] as u8, channels[2] as u8);
        }

        Ok(SignState {
            groups,
            status_ok: values[STATE_FIELDS - 1] == 0,
        })
    }
}
