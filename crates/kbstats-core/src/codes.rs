// Kbstats Symbol Tables
// Maps evdev (type, code) pairs to the names from linux/input-event-codes.h

use std::sync::OnceLock;

use indexmap::IndexMap;
use strum_macros::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Sentinel returned for any type or code with no registered name.
pub const UNKNOWN: &str = "?";

/// End-of-report synchronization code (EV_SYN / SYN_REPORT).
pub const SYN_REPORT: u16 = 0;

/// Highest event type value the protocol defines.
pub const EV_MAX: u16 = 0x1f;

/// Event type (category) identifiers from the evdev protocol.
///
/// This is the closed set of categories the decoder understands. Raw type
/// values outside it decode to [`UNKNOWN`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum EventType {
    #[strum(serialize = "EV_SYN")]
    Syn = 0x00,
    #[strum(serialize = "EV_KEY")]
    Key = 0x01,
    #[strum(serialize = "EV_REL")]
    Rel = 0x02,
    #[strum(serialize = "EV_MSC")]
    Msc = 0x04,
    #[strum(serialize = "EV_SW")]
    Sw = 0x05,
    #[strum(serialize = "EV_LED")]
    Led = 0x11,
    #[strum(serialize = "EV_SND")]
    Snd = 0x12,
    #[strum(serialize = "EV_REP")]
    Rep = 0x14,
    #[strum(serialize = "EV_FF")]
    Ff = 0x15,
    #[strum(serialize = "EV_PWR")]
    Pwr = 0x16,
    #[strum(serialize = "EV_FF_STATUS")]
    FfStatus = 0x17,
}

impl EventType {
    /// Symbolic name, e.g. "EV_KEY"
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Highest valid code for this type, or None for types that carry no
    /// enumerable codes (EV_PWR).
    pub fn max_code(self) -> Option<u16> {
        match self {
            EventType::Syn => Some(0x0f),
            EventType::Key => Some(0x2ff),
            EventType::Rel => Some(0x0f),
            EventType::Msc => Some(0x07),
            EventType::Sw => Some(0x10),
            EventType::Led => Some(0x0f),
            EventType::Snd => Some(0x07),
            EventType::Rep => Some(0x01),
            EventType::Ff => Some(0x7f),
            EventType::Pwr => None,
            EventType::FfStatus => Some(0x01),
        }
    }

    /// Code-name table for this type, if one is registered.
    ///
    /// Types without a table report every code as unknown.
    pub fn code_table(self) -> Option<&'static IndexMap<u16, &'static str>> {
        match self {
            EventType::Syn => Some(syn_table()),
            EventType::Key => Some(key_table()),
            EventType::Rep => Some(repeat_table()),
            EventType::FfStatus => Some(ff_status_table()),
            _ => None,
        }
    }
}

/// Errors from resolving a textual key argument to a numeric code.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("could not interpret value {0:?}")]
    InvalidNumber(String),

    #[error("no code named {0:?} for {1}")]
    NotFound(String, EventType),
}

/// Symbolic name for a raw event type value, or "?" if it is not one of
/// the known categories.
pub fn event_name(kind: u16) -> &'static str {
    EventType::from_repr(kind).map_or(UNKNOWN, EventType::name)
}

/// Symbolic name for a (type, code) pair, or "?" if the type is unknown,
/// the code exceeds the type's maximum, or no name is registered.
///
/// Every path range-checks before table access; arbitrary driver-supplied
/// values degrade to the sentinel, never an out-of-bounds access.
pub fn code_name(kind: u16, code: u16) -> &'static str {
    let Some(kind) = EventType::from_repr(kind) else {
        return UNKNOWN;
    };
    match kind.max_code() {
        Some(max) if code <= max => {}
        _ => return UNKNOWN,
    }
    kind.code_table()
        .and_then(|table| table.get(&code))
        .copied()
        .unwrap_or(UNKNOWN)
}

/// Highest valid code for a raw event type value.
pub fn max_code(kind: u16) -> Option<u16> {
    EventType::from_repr(kind).and_then(EventType::max_code)
}

/// Resolve a textual key argument to a numeric code.
///
/// Digit-leading text is parsed directly as a number, decimal or 0x-hex,
/// without consulting the table. Anything else must exactly match a
/// registered name for the given type.
pub fn resolve_code(kind: EventType, text: &str) -> Result<u16, ResolveError> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => text.parse(),
        };
        return parsed.map_err(|_| ResolveError::InvalidNumber(text.to_string()));
    }
    kind.code_table()
        .and_then(|table| table.iter().find(|(_, name)| **name == text))
        .map(|(code, _)| *code)
        .ok_or_else(|| ResolveError::NotFound(text.to_string(), kind))
}

fn syn_table() -> &'static IndexMap<u16, &'static str> {
    static SYNS: OnceLock<IndexMap<u16, &'static str>> = OnceLock::new();
    SYNS.get_or_init(|| {
        IndexMap::from([
            (0, "SYN_REPORT"),
            (1, "SYN_CONFIG"),
            (2, "SYN_MT_REPORT"),
            (3, "SYN_DROPPED"),
        ])
    })
}

fn repeat_table() -> &'static IndexMap<u16, &'static str> {
    static REPEATS: OnceLock<IndexMap<u16, &'static str>> = OnceLock::new();
    REPEATS.get_or_init(|| IndexMap::from([(0, "REP_DELAY"), (1, "REP_PERIOD")]))
}

fn ff_status_table() -> &'static IndexMap<u16, &'static str> {
    static STATUSES: OnceLock<IndexMap<u16, &'static str>> = OnceLock::new();
    STATUSES.get_or_init(|| IndexMap::from([(0, "FF_STATUS_STOPPED"), (1, "FF_STATUS_PLAYING")]))
}

fn key_table() -> &'static IndexMap<u16, &'static str> {
    static KEYS: OnceLock<IndexMap<u16, &'static str>> = OnceLock::new();
    KEYS.get_or_init(|| {
        IndexMap::from([
            (0, "KEY_RESERVED"),
            (1, "KEY_ESC"),
            (2, "KEY_1"),
            (3, "KEY_2"),
            (4, "KEY_3"),
            (5, "KEY_4"),
            (6, "KEY_5"),
            (7, "KEY_6"),
            (8, "KEY_7"),
            (9, "KEY_8"),
            (10, "KEY_9"),
            (11, "KEY_0"),
            (12, "KEY_MINUS"),
            (13, "KEY_EQUAL"),
            (14, "KEY_BACKSPACE"),
            (15, "KEY_TAB"),
            (16, "KEY_Q"),
            (17, "KEY_W"),
            (18, "KEY_E"),
            (19, "KEY_R"),
            (20, "KEY_T"),
            (21, "KEY_Y"),
            (22, "KEY_U"),
            (23, "KEY_I"),
            (24, "KEY_O"),
            (25, "KEY_P"),
            (26, "KEY_LEFTBRACE"),
            (27, "KEY_RIGHTBRACE"),
            (28, "KEY_ENTER"),
            (29, "KEY_LEFTCTRL"),
            (30, "KEY_A"),
            (31, "KEY_S"),
            (32, "KEY_D"),
            (33, "KEY_F"),
            (34, "KEY_G"),
            (35, "KEY_H"),
            (36, "KEY_J"),
            (37, "KEY_K"),
            (38, "KEY_L"),
            (39, "KEY_SEMICOLON"),
            (40, "KEY_APOSTROPHE"),
            (41, "KEY_GRAVE"),
            (42, "KEY_LEFTSHIFT"),
            (43, "KEY_BACKSLASH"),
            (44, "KEY_Z"),
            (45, "KEY_X"),
            (46, "KEY_C"),
            (47, "KEY_V"),
            (48, "KEY_B"),
            (49, "KEY_N"),
            (50, "KEY_M"),
            (51, "KEY_COMMA"),
            (52, "KEY_DOT"),
            (53, "KEY_SLASH"),
            (54, "KEY_RIGHTSHIFT"),
            (55, "KEY_KPASTERISK"),
            (56, "KEY_LEFTALT"),
            (57, "KEY_SPACE"),
            (58, "KEY_CAPSLOCK"),
            (59, "KEY_F1"),
            (60, "KEY_F2"),
            (61, "KEY_F3"),
            (62, "KEY_F4"),
            (63, "KEY_F5"),
            (64, "KEY_F6"),
            (65, "KEY_F7"),
            (66, "KEY_F8"),
            (67, "KEY_F9"),
            (68, "KEY_F10"),
            (69, "KEY_NUMLOCK"),
            (70, "KEY_SCROLLLOCK"),
            (71, "KEY_KP7"),
            (72, "KEY_KP8"),
            (73, "KEY_KP9"),
            (74, "KEY_KPMINUS"),
            (75, "KEY_KP4"),
            (76, "KEY_KP5"),
            (77, "KEY_KP6"),
            (78, "KEY_KPPLUS"),
            (79, "KEY_KP1"),
            (80, "KEY_KP2"),
            (81, "KEY_KP3"),
            (82, "KEY_KP0"),
            (83, "KEY_KPDOT"),
            (87, "KEY_F11"),
            (88, "KEY_F12"),
            (96, "KEY_KPENTER"),
            (97, "KEY_RIGHTCTRL"),
            (98, "KEY_KPSLASH"),
            (100, "KEY_RIGHTALT"),
            (102, "KEY_HOME"),
            (103, "KEY_UP"),
            (104, "KEY_PAGEUP"),
            (105, "KEY_LEFT"),
            (106, "KEY_RIGHT"),
            (107, "KEY_END"),
            (108, "KEY_DOWN"),
            (109, "KEY_PAGEDOWN"),
            (110, "KEY_INSERT"),
            (111, "KEY_DELETE"),
            (112, "KEY_MACRO"),
            (113, "KEY_MUTE"),
            (114, "KEY_VOLUMEDOWN"),
            (115, "KEY_VOLUMEUP"),
            (116, "KEY_POWER"),
            (117, "KEY_KPEQUAL"),
            (118, "KEY_KPPLUSMINUS"),
            (119, "KEY_PAUSE"),
            (125, "KEY_LEFTMETA"),
            (126, "KEY_RIGHTMETA"),
            (127, "KEY_COMPOSE"),
            (128, "KEY_STOP"),
            (129, "KEY_AGAIN"),
            (130, "KEY_PROPS"),
            (131, "KEY_UNDO"),
            (132, "KEY_FRONT"),
            (133, "KEY_COPY"),
            (134, "KEY_OPEN"),
            (135, "KEY_PASTE"),
            (136, "KEY_FIND"),
            (137, "KEY_CUT"),
            (138, "KEY_HELP"),
            (139, "KEY_MENU"),
            (140, "KEY_CALC"),
            (141, "KEY_SETUP"),
            (142, "KEY_SLEEP"),
            (143, "KEY_WAKEUP"),
            (144, "KEY_FILE"),
            (145, "KEY_SENDFILE"),
            (146, "KEY_DELETEFILE"),
            (158, "KEY_BACK"),
            (159, "KEY_FORWARD"),
            (173, "KEY_REFRESH"),
            (174, "KEY_EXIT"),
            (175, "KEY_MOVE"),
            (176, "KEY_EDIT"),
            (177, "KEY_SCROLLUP"),
            (178, "KEY_SCROLLDOWN"),
            (179, "KEY_KPLEFTPAREN"),
            (180, "KEY_KPRIGHTPAREN"),
            (224, "KEY_BRIGHTNESSDOWN"),
            (225, "KEY_BRIGHTNESSUP"),
            (0x200, "KEY_NUMERIC_0"),
            (0x201, "KEY_NUMERIC_1"),
            (0x202, "KEY_NUMERIC_2"),
            (0x203, "KEY_NUMERIC_3"),
            (0x204, "KEY_NUMERIC_4"),
            (0x205, "KEY_NUMERIC_5"),
            (0x206, "KEY_NUMERIC_6"),
            (0x207, "KEY_NUMERIC_7"),
            (0x208, "KEY_NUMERIC_8"),
            (0x209, "KEY_NUMERIC_9"),
            (0x20a, "KEY_NUMERIC_STAR"),
            (0x20b, "KEY_NUMERIC_POUND"),
            (0x250, "KEY_BRIGHTNESS_MIN"),
            (0x251, "KEY_BRIGHTNESS_MAX"),
        ])
    })
}
