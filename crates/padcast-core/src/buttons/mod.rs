//! Semantic button name to Linux input code table.
//!
//! The group server speaks in *semantic* button names that mirror the Linux
//! `input-event-codes.h` identifiers (`"BTN_A"`, `"BTN_DPAD_UP"`, …).  The
//! virtual gamepad needs the numeric code behind each name, both to declare
//! which keys the device supports when it is registered and to translate every
//! incoming `key_event`.
//!
//! Reference: https://github.com/torvalds/linux/blob/master/include/uapi/linux/input-event-codes.h
//!
//! # Why a slice and not a `HashMap`?
//!
//! The table has fewer than twenty entries and is never written after the
//! program starts.  A `static` slice needs no lazy initialisation, keeps the
//! declaration order (which is the order buttons are listed at startup), and a
//! linear scan over it is faster than hashing the name.
//!
//! Unknown names are *not* an error here: [`ButtonTable::lookup`] returns
//! `None` and the caller decides what to do (the device sink logs a warning
//! and drops the event).

/// One row of the button table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEntry {
    /// Semantic name used on the wire, e.g. `"BTN_A"`.
    pub name: &'static str,
    /// Linux `EV_KEY` code, e.g. `0x130` for `BTN_A`.
    pub code: u16,
}

/// An ordered, immutable mapping from semantic button name to input code.
#[derive(Debug)]
pub struct ButtonTable {
    entries: &'static [ButtonEntry],
}

impl ButtonTable {
    /// Wraps a static slice of entries.
    pub const fn new(entries: &'static [ButtonEntry]) -> Self {
        Self { entries }
    }

    /// Returns the input code for `name`, or `None` if the name is not in the table.
    ///
    /// Matching is exact and case-sensitive, like the server's own names.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.code)
    }

    /// Iterates over every semantic name in declaration order.
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Returns the raw entries in declaration order.
    pub fn entries(&self) -> &'static [ButtonEntry] {
        self.entries
    }

    /// Number of buttons in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The buttons of the virtual Xbox 360 style gamepad.
pub static GAMEPAD_BUTTONS: ButtonTable = ButtonTable::new(&[
    // D-pad
    ButtonEntry { name: "BTN_DPAD_UP", code: 0x220 },
    ButtonEntry { name: "BTN_DPAD_DOWN", code: 0x221 },
    ButtonEntry { name: "BTN_DPAD_LEFT", code: 0x222 },
    ButtonEntry { name: "BTN_DPAD_RIGHT", code: 0x223 },
    // Face buttons (BTN_A = BTN_SOUTH, BTN_B = BTN_EAST, BTN_X = BTN_NORTH, BTN_Y = BTN_WEST)
    ButtonEntry { name: "BTN_A", code: 0x130 },
    ButtonEntry { name: "BTN_B", code: 0x131 },
    ButtonEntry { name: "BTN_X", code: 0x133 },
    ButtonEntry { name: "BTN_Y", code: 0x134 },
    // Shoulders and triggers
    ButtonEntry { name: "BTN_TL", code: 0x136 },
    ButtonEntry { name: "BTN_TR", code: 0x137 },
    ButtonEntry { name: "BTN_TL2", code: 0x138 },
    ButtonEntry { name: "BTN_TR2", code: 0x139 },
    // Menu buttons
    ButtonEntry { name: "BTN_SELECT", code: 0x13a },
    ButtonEntry { name: "BTN_START", code: 0x13b },
    ButtonEntry { name: "BTN_MODE", code: 0x13c },
    // Stick clicks
    ButtonEntry { name: "BTN_THUMBL", code: 0x13d },
    ButtonEntry { name: "BTN_THUMBR", code: 0x13e },
]);

// ── Tests ─────────────────────────────────────────────────────────────────────
