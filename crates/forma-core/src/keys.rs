//! Mouse buttons, key codes and shortcut strings.
//!
//! Key codes follow the X keysym numbering. Shortcut codes combine a key code
//! with [`ALT_MASK`] / [`CONTROL_MASK`]; control characters are stored as
//! their ASCII control code (`^A` is 1) with the control bit dropped.

use crate::logging::targets;

pub const LEFT_MOUSE: i32 = 1;
pub const MIDDLE_MOUSE: i32 = 2;
pub const RIGHT_MOUSE: i32 = 3;
pub const SCROLL_UP: i32 = 4;
pub const SCROLL_DOWN: i32 = 5;

/// Is `button` one of the wheel pseudo-buttons?
pub fn is_wheel(button: i32) -> bool {
    button == SCROLL_UP || button == SCROLL_DOWN
}

pub const ALT_MASK: i64 = 1 << 25;
pub const CONTROL_MASK: i64 = 1 << 26;

/// Maximum number of shortcuts a widget can have.
pub const MAX_SHORTCUTS: usize = 8;

pub mod code {
    pub const BACKSPACE: i32 = 0xff08;
    pub const TAB: i32 = 0xff09;
    pub const RETURN: i32 = 0xff0d;
    pub const ESCAPE: i32 = 0x1b;
    pub const HOME: i32 = 0xff50;
    pub const LEFT: i32 = 0xff51;
    pub const UP: i32 = 0xff52;
    pub const RIGHT: i32 = 0xff53;
    pub const DOWN: i32 = 0xff54;
    pub const PAGE_UP: i32 = 0xff55;
    pub const PAGE_DOWN: i32 = 0xff56;
    pub const END: i32 = 0xff57;
    pub const F1: i32 = 0xffbe;
    pub const DELETE: i32 = 0xffff;
}

/// Parse a shortcut string into shortcut codes.
///
/// - `^x` is Ctrl-x (case-insensitive for letters), `^[` is Escape
/// - `#x` is Alt-x (case-sensitive)
/// - `&n` with n in 1..=35 is function key n, `&A`..`&D` are up, down,
///   right and left
/// - `^^`, `^#`, `^&` stand for the literal character
///
/// An `&` followed by anything else is skipped. Strings producing more than
/// [`MAX_SHORTCUTS`] codes are truncated and an error is logged.
pub fn parse_shortcut(spec: &str) -> Vec<i64> {
    let chars: Vec<char> = spec.chars().collect();
    let mut codes = Vec::new();
    let mut offset: i64 = 0;
    let mut i = 0;

    let prev_is_caret = |i: usize| i > 0 && chars[i - 1] == '^';

    while i < chars.len() && codes.len() < MAX_SHORTCUTS {
        let c = chars[i];
        match c {
            '^' | '#' | '&' if offset & CONTROL_MASK != 0 && prev_is_caret(i) => {
                codes.push(c as i64 + offset - CONTROL_MASK);
                offset = 0;
            }
            '^' => {
                if chars.get(i + 1) == Some(&'[') {
                    codes.push(i64::from(code::ESCAPE));
                    i += 1;
                    offset = 0;
                } else {
                    offset += CONTROL_MASK;
                }
            }
            '#' => offset += ALT_MASK,
            '&' => {
                let next = chars.get(i + 1).copied();
                let key = match next {
                    Some('A') => Some(code::UP),
                    Some('B') => Some(code::DOWN),
                    Some('C') => Some(code::RIGHT),
                    Some('D') => Some(code::LEFT),
                    Some(d @ '1'..='9') => {
                        let mut n = d as i32 - '0' as i32;
                        if let Some(d2) = chars.get(i + 2).and_then(|c| c.to_digit(10)) {
                            let two = n * 10 + d2 as i32;
                            if two <= 35 {
                                n = two;
                                i += 1;
                            }
                        }
                        Some(code::F1 + n - 1)
                    }
                    _ => None,
                };
                if let Some(key) = key {
                    codes.push(i64::from(key) + offset);
                }
                offset = 0;
                i += 1;
            }
            _ => {
                if offset & (CONTROL_MASK | ALT_MASK) != 0 {
                    let mut sc = c.to_ascii_uppercase() as i64;
                    if offset & CONTROL_MASK != 0 {
                        sc -= 'A' as i64 - 1;
                    }
                    codes.push(sc + (offset & !CONTROL_MASK));
                } else {
                    codes.push(c as i64 + offset);
                }
                offset = 0;
            }
        }
        i += 1;
    }

    if i < chars.len() {
        tracing::error!(target: targets::SHORTCUT, spec, "too many shortcuts (> {MAX_SHORTCUTS})");
    }
    codes
}

/// Shortcut code for a key press with the given modifiers.
pub fn shortcut_code(key: i32, ctrl: bool, alt: bool) -> i64 {
    let mut code = i64::from(key);
    if ctrl {
        if let Some(c) = u8::try_from(key).ok().filter(|c| c.is_ascii_alphabetic()) {
            code = i64::from(c.to_ascii_uppercase() - b'A' + 1);
        } else {
            code += CONTROL_MASK;
        }
    }
    if alt {
        code += ALT_MASK;
    }
    code
}

/// 1-based position in `label` of the character a shortcut string
/// underlines, if any.
pub fn underline_pos(label: &str, spec: &str) -> Option<usize> {
    let s: Vec<char> = spec.chars().collect();
    let first = s.iter().enumerate().find_map(|(i, &c)| {
        if !c.is_ascii_alphanumeric() {
            return None;
        }
        if i == 0 || (s[i - 1] != '&' && !s[i - 1].is_ascii_digit()) {
            Some((i, c))
        } else {
            None
        }
    });
    let (idx, c) = first?;

    let find = |needle: char| label.chars().position(|l| l == needle);
    let pos = if idx == 0 {
        find(c)
    } else {
        find(c).or_else(|| {
            let swapped = if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            find(swapped)
        })
    }?;
    Some(pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_characters() {
        assert_eq!(parse_shortcut("ab"), vec!['a' as i64, 'b' as i64]);
    }

    #[test]
    fn test_control_is_case_insensitive() {
        assert_eq!(parse_shortcut("^c"), vec![3]);
        assert_eq!(parse_shortcut("^C"), vec![3]);
    }

    #[test]
    fn test_alt_keeps_case_and_mask() {
        assert_eq!(parse_shortcut("#x"), vec!['X' as i64 + ALT_MASK]);
    }

    #[test]
    fn test_escape_and_literals() {
        assert_eq!(parse_shortcut("^["), vec![0x1b]);
        assert_eq!(parse_shortcut("^^"), vec!['^' as i64]);
        assert_eq!(parse_shortcut("^#"), vec!['#' as i64]);
        assert_eq!(parse_shortcut("^&"), vec!['&' as i64]);
    }

    #[test]
    fn test_function_and_cursor_keys() {
        assert_eq!(parse_shortcut("&1"), vec![i64::from(code::F1)]);
        assert_eq!(parse_shortcut("&12"), vec![i64::from(code::F1) + 11]);
        assert_eq!(parse_shortcut("&A&D"), vec![i64::from(code::UP), i64::from(code::LEFT)]);
        assert!(parse_shortcut("&E").is_empty());
    }

    #[test]
    fn test_too_many_truncates() {
        assert_eq!(parse_shortcut("abcdefghijk").len(), MAX_SHORTCUTS);
    }

    #[test]
    fn test_shortcut_code_matches_parse() {
        assert_eq!(shortcut_code('c' as i32, true, false), parse_shortcut("^c")[0]);
        assert_eq!(shortcut_code('q' as i32, false, false), parse_shortcut("q")[0]);
    }

    #[test]
    fn test_underline_pos() {
        assert_eq!(underline_pos("Quit", "^q"), Some(1));
        assert_eq!(underline_pos("Open", "&1"), None);
        assert_eq!(underline_pos("Save", "v"), Some(3));
    }
}
