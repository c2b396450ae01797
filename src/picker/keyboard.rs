use crate::calc::date_math::{add_days, add_months, start_of_week};
use chrono::NaiveDate;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Char(char),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

/// What the facade should do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Moved(NaiveDate),
    Activate(NaiveDate),
    Close,
    Today,
    Clear,
    Apply,
    Ignored,
}

/// Keyboard focus over the calendar cells, independent of the selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardNav {
    enabled: bool,
    active: bool,
    focused: Option<NaiveDate>,
}

impl Default for KeyboardNav {
    fn default() -> Self {
        KeyboardNav {
            enabled: true,
            active: false,
            focused: None,
        }
    }
}

impl KeyboardNav {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn focused(&self) -> Option<NaiveDate> {
        self.focused.filter(|_| self.active)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.deactivate();
        }
    }

    pub fn activate(&mut self, date: NaiveDate) {
        if !self.enabled {
            return;
        }
        self.active = true;
        self.focused = Some(date);
        debug!(%date, "keyboard focus active");
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.focused = None;
    }

    /// Moves focus without touching the selection. Ignored while inactive.
    pub fn set_focused(&mut self, date: NaiveDate) -> bool {
        if !self.active {
            return false;
        }
        self.focused = Some(date);
        true
    }

    pub fn handle(&mut self, key: KeyInput, modifiers: Modifiers, first_day: u32) -> KeyAction {
        let Some(current) = self.focused.filter(|_| self.active) else {
            return KeyAction::Ignored;
        };

        if modifiers.ctrl && !modifiers.alt && !modifiers.shift && key == KeyInput::Enter {
            return KeyAction::Apply;
        }

        let target = match key {
            KeyInput::Left => add_days(current, -1),
            KeyInput::Right => add_days(current, 1),
            KeyInput::Up => add_days(current, -7),
            KeyInput::Down => add_days(current, 7),
            KeyInput::Home => start_of_week(current, first_day),
            KeyInput::End => add_days(start_of_week(current, first_day), 6),
            KeyInput::PageUp => add_months(current, if modifiers.shift { -12 } else { -1 }),
            KeyInput::PageDown => add_months(current, if modifiers.shift { 12 } else { 1 }),
            KeyInput::Enter | KeyInput::Space => return KeyAction::Activate(current),
            KeyInput::Escape => return KeyAction::Close,
            KeyInput::Char(c) if !modifiers.ctrl && !modifiers.alt => {
                return match c.to_ascii_lowercase() {
                    't' => KeyAction::Today,
                    'c' => KeyAction::Clear,
                    _ => KeyAction::Ignored,
                };
            }
            KeyInput::Char(_) => return KeyAction::Ignored,
        };
        self.focused = Some(target);
        KeyAction::Moved(target)
    }
}
