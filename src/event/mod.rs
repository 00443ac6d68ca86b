//! Event system: keyboard input, chord commands, focus traps, namespaced events.

pub mod binding;
pub mod focus;
pub mod handler;
pub mod input;
pub mod message;

pub use binding::{
    merge_for_direction, parse_chord, CommandMap, CommandTable, KeyCommandRegistry, KeyDispatch,
    KeyHandlers,
};
pub use focus::{find_focusable, FocusTraps, TrapOutcome};
pub use handler::EventDispatcher;
pub use input::{Key, KeyEvent, Modifiers};
pub use message::{Envelope, Propagation, ZfEvent};
