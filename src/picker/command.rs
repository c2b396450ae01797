use crate::picker::events::TimerToken;
use crate::picker::keyboard::{KeyInput, Modifiers};
use crate::picker::time::TimeInput;

/// Which of the two calendars an action targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Everything a host can ask the picker to do. UI layers translate their
/// own input events into these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Show,
    Hide,
    Toggle,
    Apply,
    Cancel,
    /// A calendar cell was activated; `date` is the cell's `YYYY-MM-DD` value.
    ActivateDay { side: Side, date: String },
    HoverDay { side: Side, date: String },
    LeaveCalendar,
    ActivateRange { label: String },
    /// `direction` is negative for previous, positive for next.
    Navigate { side: Side, direction: i32 },
    SelectMonthYear { side: Side, year: i32, month: u32 },
    ChangeTime { side: Side, time: TimeInput },
    Key { key: KeyInput, modifiers: Modifiers },
    OutsideClick,
    OutsideFocus,
    ViewportChanged,
    /// The host input's text was edited.
    InputChanged(String),
    Timer(TimerToken),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// State changed; re-render.
    Updated,
    /// Nothing to do in the current state.
    Ignored,
}

impl Outcome {
    pub fn is_updated(&self) -> bool {
        *self == Outcome::Updated
    }
}
