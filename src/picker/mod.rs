pub mod calendars;
pub mod command;
pub mod events;
pub mod facade;
pub mod host;
pub mod keyboard;
pub mod options;
pub mod ranges;
pub mod selection;
pub mod time;
pub mod view;

pub use calendars::{CalendarPair, CalendarState, MonthChange};
pub use command::{Command, Outcome, Side};
pub use events::{
    ListenerKind, ListenerRegistry, PickerEvent, PickerHooks, ScheduledTimer, TimerKind,
    TimerQueue, TimerToken,
};
pub use facade::{ChangeCallback, DateRangePicker};
pub use host::{
    Drops, HostDocument, HostElement, HostKind, HostTarget, MemoryDocument, MemoryElement, Opens,
    Positioner,
};
pub use keyboard::{KeyAction, KeyInput, KeyboardNav, Modifiers};
pub use options::{PickerOptions, ResolvedOptions};
pub use ranges::{chosen_label, common_ranges, find_range, NamedRange};
pub use selection::{Placement, Selection};
pub use time::{minute_steps, round_to_increment, Meridiem, TimeInput};
pub use view::{CellFlags, DayCell, MonthView, PickerView, RangeItem, TimeOption, TimeView};
