/*!
 # State rendering

 Turns a decoded [`SignState`] into a one-line strip for the terminal,
 one glyph per LED group.
*/

use crate::protocol::{SignState, PWM_MAX};

/// Renders the 8 groups as `O` (lit) / `.` (dark) glyphs.
///
/// With `use_color`, lit glyphs are wrapped in an ANSI truecolor escape
/// scaled up from the sign's 0-16 PWM steps. Pure formatting; well-formed
/// states never fail to render.
pub fn render(state: &SignState, use_color: bool) -> String {
    let mut out = String::new();
    for color in &state.groups {
        if color.is_off() {
            out.push('.');
        } else if use_color {
            let r = scale(color.red);
            let g = scale(color.green);
            let b = scale(color.blue);
            out.push_str(&format!("\x1b[38;2;{r};{g};{b}mO\x1b[0m"));
        } else {
            out.push('O');
        }
    }
    out
}

fn scale(channel: u8) -> u8 {
    (channel as u16 * 255 / PWM_MAX as u16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Rgb, LED_GROUPS};

    fn state_with(groups: [Rgb; LED_GROUPS]) -> SignState {
        SignState {
            groups,
            status_ok: true,
        }
    }

    #[test]
    fn plain_rendering_marks_lit_groups() {
        let mut groups = [Rgb::OFF; LED_GROUPS];
        groups[0] = Rgb::new(16, 0, 0);
        groups[7] = Rgb::new(0, 0, 1);
        assert_eq!(render(&state_with(groups), false), "O......O");
    }

    #[test]
    fn all_dark_renders_dots() {
        assert_eq!(render(&state_with([Rgb::OFF; LED_GROUPS]), false), "........");
        assert_eq!(render(&state_with([Rgb::OFF; LED_GROUPS]), true), "........");
    }

    #[test]
    fn color_rendering_uses_truecolor_escapes() {
        let mut groups = [Rgb::OFF; LED_GROUPS];
        groups[3] = Rgb::new(16, 0, 8);
        let out = render(&state_with(groups), true);
        assert!(out.contains("\x1b[38;2;255;0;127mO\x1b[0m"));
        assert_eq!(out.matches('.').count(), 7);
    }
}
