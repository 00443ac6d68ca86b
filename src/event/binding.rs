//! Key command tables and chord dispatch.
//!
//! [`KeyCommandRegistry`] maps a component name to a table of
//! `chord -> command` entries. Chords are the strings produced by
//! [`parse_chord`] (`TAB`, `SHIFT_ARROW_UP`, `CTRL_S`, ...). Tables may be
//! direction aware: an `ltr` and an `rtl` map merged at lookup time by
//! [`merge_for_direction`].

use std::collections::HashMap;

use tracing::{debug, warn};

use super::focus::{find_focusable, FocusTraps, TrapOutcome};
use super::input::{KeyEvent, Modifiers};
use crate::dom::{Dom, NodeId};

// ---------------------------------------------------------------------------
// Chords
// ---------------------------------------------------------------------------

/// Symbolic names for the key codes the chord grammar recognises.
fn named_key(code: u32) -> Option<&'static str> {
    Some(match code {
        9 => "TAB",
        13 => "ENTER",
        27 => "ESCAPE",
        32 => "SPACE",
        35 => "END",
        36 => "HOME",
        37 => "ARROW_LEFT",
        38 => "ARROW_UP",
        39 => "ARROW_RIGHT",
        40 => "ARROW_DOWN",
        _ => return None,
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Remove the first run of non-word characters.
fn strip_first_non_word_run(s: &str) -> String {
    let Some(start) = s.find(|c: char| !is_word_char(c)) else {
        return s.to_owned();
    };
    let end = s[start..]
        .find(is_word_char)
        .map_or(s.len(), |offset| start + offset);
    format!("{}{}", &s[..start], &s[end..])
}

/// Normalise a keydown into its chord string.
///
/// Named keys resolve through the key-code table; anything else falls back to
/// the upper-cased character of its code. Modifiers are prepended as
/// `SHIFT_`, then `CTRL_`, then `ALT_`, so holding all three gives
/// `ALT_CTRL_SHIFT_<key>`.
pub fn parse_chord(event: &KeyEvent) -> String {
    let code = event.code.key_code();
    let mut key = match named_key(code) {
        Some(name) => name.to_owned(),
        None => {
            let printable: String = char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            strip_first_non_word_run(&printable)
        }
    };

    if event.modifiers.contains(Modifiers::SHIFT) {
        key = format!("SHIFT_{key}");
    }
    if event.modifiers.contains(Modifiers::CTRL) {
        key = format!("CTRL_{key}");
    }
    if event.modifiers.contains(Modifiers::ALT) {
        key = format!("ALT_{key}");
    }

    match key.strip_suffix('_') {
        Some(trimmed) => trimmed.to_owned(),
        None => key,
    }
}

// ---------------------------------------------------------------------------
// CommandTable
// ---------------------------------------------------------------------------

/// A `chord -> command` map.
pub type CommandMap = HashMap<String, String>;

/// Merge direction-specific tables: the active direction's entries win.
pub fn merge_for_direction(ltr: &CommandMap, rtl: &CommandMap, is_rtl: bool) -> CommandMap {
    let (base, overlay) = if is_rtl { (ltr, rtl) } else { (rtl, ltr) };
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// The commands a component responds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTable {
    /// Same bindings in both text directions.
    Flat(CommandMap),
    /// Per-direction bindings, merged on every lookup.
    Directional { ltr: CommandMap, rtl: CommandMap },
}

fn to_map<I, K, V>(entries: I) -> CommandMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl CommandTable {
    /// Build a direction-independent table.
    pub fn flat<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Flat(to_map(entries))
    }

    /// Build a direction-aware table.
    pub fn directional<I, J, K, V>(ltr: I, rtl: J) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        J: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Directional {
            ltr: to_map(ltr),
            rtl: to_map(rtl),
        }
    }

    /// The command bound to `chord` for the given direction.
    pub fn lookup(&self, chord: &str, is_rtl: bool) -> Option<String> {
        match self {
            Self::Flat(map) => map.get(chord).cloned(),
            Self::Directional { ltr, rtl } => {
                merge_for_direction(ltr, rtl, is_rtl).remove(chord)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// KeyHandlers
// ---------------------------------------------------------------------------

type CommandFn<'a, R> = Box<dyn FnMut() -> R + 'a>;

/// Caller-supplied callbacks for one `handle_key` call.
///
/// `on` binds a command name; `handled` receives the return value of a
/// command that fired; `unhandled` runs when no command fired.
pub struct KeyHandlers<'a, R = ()> {
    commands: HashMap<String, CommandFn<'a, R>>,
    handled: Option<Box<dyn FnMut(R) + 'a>>,
    unhandled: Option<Box<dyn FnMut() + 'a>>,
}

impl<'a, R> KeyHandlers<'a, R> {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            handled: None,
            unhandled: None,
        }
    }

    /// Bind a command callback.
    pub fn on(mut self, command: impl Into<String>, f: impl FnMut() -> R + 'a) -> Self {
        self.commands.insert(command.into(), Box::new(f));
        self
    }

    /// Called after a command fired, with its return value.
    pub fn handled(mut self, f: impl FnMut(R) + 'a) -> Self {
        self.handled = Some(Box::new(f));
        self
    }

    /// Called when the chord maps to no bound command.
    pub fn unhandled(mut self, f: impl FnMut() + 'a) -> Self {
        self.unhandled = Some(Box::new(f));
        self
    }
}

impl<R> Default for KeyHandlers<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for KeyHandlers<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<_> = self.commands.keys().collect();
        commands.sort();
        f.debug_struct("KeyHandlers")
            .field("commands", &commands)
            .field("handled", &self.handled.is_some())
            .field("unhandled", &self.unhandled.is_some())
            .finish()
    }
}

/// What `handle_key` did with a keydown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDispatch {
    /// This command's callback ran.
    Command(String),
    /// No bound command matched; `unhandled` ran if present.
    Unhandled,
    /// No table is registered for the component; nothing ran.
    UnknownComponent,
}

// ---------------------------------------------------------------------------
// KeyCommandRegistry
// ---------------------------------------------------------------------------

/// Per-component command tables plus the active focus traps.
#[derive(Debug, Default)]
pub struct KeyCommandRegistry {
    tables: HashMap<String, CommandTable>,
    traps: FocusTraps,
}

impl KeyCommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the table for `component`, replacing any previous one.
    pub fn register(&mut self, component: impl Into<String>, table: CommandTable) {
        self.tables.insert(component.into(), table);
    }

    /// The table registered for `component`.
    pub fn table(&self, component: &str) -> Option<&CommandTable> {
        self.tables.get(component)
    }

    /// Number of registered component tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no component has registered a table.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Resolve `event` against `component`'s table and run the matching callback.
    pub fn handle_key<R>(
        &self,
        event: &KeyEvent,
        component: &str,
        is_rtl: bool,
        handlers: &mut KeyHandlers<'_, R>,
    ) -> KeyDispatch {
        let Some(table) = self.tables.get(component) else {
            warn!(component, "component not defined in keyboard command tables");
            return KeyDispatch::UnknownComponent;
        };

        let chord = parse_chord(event);
        let fired = table.lookup(&chord, is_rtl).and_then(|name| {
            let callback = handlers.commands.get_mut(&name)?;
            Some((name, callback()))
        });

        match fired {
            Some((name, value)) => {
                if let Some(handled) = handlers.handled.as_mut() {
                    handled(value);
                }
                debug!(component, chord = %chord, command = %name, "key command fired");
                KeyDispatch::Command(name)
            }
            None => {
                if let Some(unhandled) = handlers.unhandled.as_mut() {
                    unhandled();
                }
                KeyDispatch::Unhandled
            }
        }
    }

    // ── Focus trapping ───────────────────────────────────────────────

    /// Visible tab stops inside `container`.
    pub fn find_focusable(&self, dom: &Dom, container: NodeId) -> Vec<NodeId> {
        find_focusable(dom, container)
    }

    /// Keep TAB cycling inside `container`. Re-trapping rebinds.
    pub fn trap_focus(&mut self, dom: &Dom, container: NodeId) {
        self.traps.trap(dom, container);
    }

    /// Stop trapping focus in `container`.
    pub fn release_focus(&mut self, container: NodeId) -> bool {
        self.traps.release(container)
    }

    /// Offer a keydown on `target` to the active traps.
    pub fn on_keydown(&self, dom: &mut Dom, target: NodeId, event: &KeyEvent) -> TrapOutcome {
        self.traps.on_keydown(dom, target, event)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
