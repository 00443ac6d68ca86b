//! Keyboard input types.
//!
//! [`KeyEvent`] mirrors the parts of a DOM `keydown` the chord parser reads:
//! the legacy key code (`event.which`) and the shift/ctrl/alt flags. Hosts
//! driven from a terminal can convert crossterm events via `From`.

use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    PageUp,
    PageDown,
    F(u8),
    /// A key with no dedicated variant, by legacy key code.
    Code(u32),
}

impl Key {
    /// The legacy DOM key code (`event.which`).
    pub fn key_code(self) -> u32 {
        match self {
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::Space => 32,
            Key::PageUp => 33,
            Key::PageDown => 34,
            Key::End => 35,
            Key::Home => 36,
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
            Key::Delete => 46,
            Key::F(n) => 111 + u32::from(n),
            // Letter keys report their upper-case code regardless of shift.
            Key::Char(c) => c.to_ascii_uppercase() as u32,
            Key::Code(code) => code,
        }
    }

    /// Build a key from a legacy DOM key code.
    pub fn from_key_code(code: u32) -> Key {
        match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            27 => Key::Escape,
            32 => Key::Space,
            33 => Key::PageUp,
            34 => Key::PageDown,
            35 => Key::End,
            36 => Key::Home,
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            46 => Key::Delete,
            112..=123 => Key::F((code - 111) as u8),
            48..=57 | 65..=90 => match char::from_u32(code) {
                Some(c) => Key::Char(c),
                None => Key::Code(code),
            },
            _ => Key::Code(code),
        }
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no modifier bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keydown with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key event with no modifiers held.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// Build from a legacy key code and the three modifier flags.
    pub fn from_dom(which: u32, shift: bool, ctrl: bool, alt: bool) -> Self {
        let mut modifiers = Modifiers::NONE;
        if shift {
            modifiers = modifiers | Modifiers::SHIFT;
        }
        if ctrl {
            modifiers = modifiers | Modifiers::CTRL;
        }
        if alt {
            modifiers = modifiers | Modifiers::ALT;
        }
        Self::new(Key::from_key_code(which), modifiers)
    }
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

/// Convert crossterm key modifiers to our `Modifiers`.
fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

/// Terminal keys map onto the DOM model: BackTab is Tab with shift held, a
/// literal space is `Space`.
impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(ct: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::KeyCode;

        let mut modifiers = convert_modifiers(ct.modifiers);
        let code = match ct.code {
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => {
                modifiers = modifiers | Modifiers::SHIFT;
                Key::Tab
            }
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            // No DOM key code; resolves to a modifier-only chord.
            _ => Key::Code(0),
        };
        KeyEvent { code, modifiers }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::SHIFT));
        assert_eq!(mods & Modifiers::CTRL, Modifiers::CTRL);
        assert!(Modifiers::NONE.is_empty());
    }

    // ── Key codes ────────────────────────────────────────────────────

    #[test]
    fn key_codes_round_trip_named_keys() {
        for key in [
            Key::Tab,
            Key::Enter,
            Key::Escape,
            Key::Space,
            Key::End,
            Key::Home,
            Key::Left,
            Key::Up,
            Key::Right,
            Key::Down,
            Key::F(5),
        ] {
            assert_eq!(Key::from_key_code(key.key_code()), key);
        }
    }

    #[test]
    fn letters_use_upper_case_codes() {
        assert_eq!(Key::Char('a').key_code(), 65);
        assert_eq!(Key::from_key_code(65), Key::Char('A'));
        assert_eq!(Key::from_key_code(190), Key::Code(190));
    }

    #[test]
    fn from_dom_sets_flags() {
        let ev = KeyEvent::from_dom(38, true, false, true);
        assert_eq!(ev.code, Key::Up);
        assert!(ev.modifiers.contains(Modifiers::SHIFT | Modifiers::ALT));
        assert!(!ev.modifiers.contains(Modifiers::CTRL));
    }

    // ── From<crossterm::event::KeyEvent> ─────────────────────────────

    #[test]
    fn from_crossterm_char_and_ctrl() {
        let ct = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('c'),
            crossterm::event::KeyModifiers::CONTROL,
        );
        let ke = KeyEvent::from(ct);
        assert_eq!(ke.code, Key::Char('c'));
        assert!(ke.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn from_crossterm_backtab_is_shift_tab() {
        let ct = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::BackTab,
            crossterm::event::KeyModifiers::NONE,
        );
        let ke = KeyEvent::from(ct);
        assert_eq!(ke.code, Key::Tab);
        assert_eq!(ke.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn from_crossterm_space_and_arrows() {
        let space = KeyEvent::from(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char(' '),
            crossterm::event::KeyModifiers::NONE,
        ));
        assert_eq!(space.code, Key::Space);

        for (ct_code, expected) in [
            (crossterm::event::KeyCode::Left, Key::Left),
            (crossterm::event::KeyCode::Right, Key::Right),
            (crossterm::event::KeyCode::Up, Key::Up),
            (crossterm::event::KeyCode::Down, Key::Down),
            (crossterm::event::KeyCode::Esc, Key::Escape),
        ] {
            let ct = crossterm::event::KeyEvent::new(ct_code, crossterm::event::KeyModifiers::NONE);
            assert_eq!(KeyEvent::from(ct).code, expected);
        }
    }
}
