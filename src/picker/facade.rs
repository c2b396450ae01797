use crate::calc::date_math::parse_date;
use crate::calc::{validate_date, ValidationError, ValidationRules};
use crate::error::{PickerError, Result};
use crate::picker::calendars::{CalendarPair, MonthChange};
use crate::picker::command::{Command, Outcome, Side};
use crate::picker::events::{
    ListenerRegistry, PickerEvent, PickerHooks, ScheduledTimer, TimerKind, TimerQueue,
    TimerToken,
};
use crate::picker::host::{HostElement, HostKind, HostTarget, Positioner};
use crate::picker::keyboard::{KeyAction, KeyInput, KeyboardNav, Modifiers};
use crate::picker::options::{PickerOptions, ResolvedOptions};
use crate::picker::ranges::{chosen_label, find_range, NamedRange};
use crate::picker::selection::Selection;
use crate::picker::time::{round_to_increment, TimeInput};
use crate::picker::view::{build_view, selected_text, PickerView, ViewInputs};
use crate::theme::{render_theme, StyleDescriptor, Theme};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info, warn};

/// Receives `(start, end, chosen_label)` when a close changed the selection.
pub type ChangeCallback = Box<dyn FnMut(NaiveDateTime, NaiveDateTime, Option<&str>)>;

type Clock = Box<dyn Fn() -> NaiveDateTime>;

/// Cell values sent with `ActivateDay`/`HoverDay`.
const CELL_FORMAT: &str = "YYYY-MM-DD";

/// A date range picker bound to one host element.
///
/// All input arrives through [`DateRangePicker::dispatch`]; the convenience
/// methods (`show`, `hide`, ...) are thin wrappers around it.
pub struct DateRangePicker {
    host: Box<dyn HostElement>,
    options: ResolvedOptions,
    hooks: PickerHooks,
    callback: Option<ChangeCallback>,
    selection: Selection,
    calendars: CalendarPair,
    keyboard: KeyboardNav,
    listeners: ListenerRegistry,
    timers: TimerQueue,
    positioner: Option<Box<dyn Positioner>>,
    show_calendars: bool,
    clock: Clock,
    destroyed: bool,
}

impl DateRangePicker {
    pub fn new(
        target: HostTarget<'_>,
        options: PickerOptions,
        callback: Option<ChangeCallback>,
    ) -> Result<Self> {
        let clock: Clock = Box::new(|| Local::now().naive_local());
        Self::build(target, options, callback, clock)
    }

    /// Like `new`, with a fixed notion of "now".
    pub fn new_at(
        target: HostTarget<'_>,
        options: PickerOptions,
        callback: Option<ChangeCallback>,
        now: NaiveDateTime,
    ) -> Result<Self> {
        Self::build(target, options, callback, Box::new(move || now))
    }

    fn build(
        target: HostTarget<'_>,
        options: PickerOptions,
        callback: Option<ChangeCallback>,
        clock: Clock,
    ) -> Result<Self> {
        let host = target.resolve()?;
        let (options, hooks) = options.resolve(clock());

        let start = options.start_date;
        let end = if options.single_date_picker {
            options.normalize_end(start).max(start)
        } else {
            options.end_date
        };
        let selection = Selection::new(start, Some(end));
        let calendars = CalendarPair::new(&selection, &options);

        let mut picker = DateRangePicker {
            host,
            show_calendars: options.always_show_calendars || options.ranges.is_empty(),
            options,
            hooks,
            callback,
            selection,
            calendars,
            keyboard: KeyboardNav::default(),
            listeners: ListenerRegistry::default(),
            timers: TimerQueue::default(),
            positioner: None,
            clock,
            destroyed: false,
        };
        picker.update_label();
        picker.update_element();
        info!(host = %picker.host.id(), start = %start, end = %end, "picker attached");
        Ok(picker)
    }

    pub fn show(&mut self) -> Result<Outcome> {
        self.dispatch(Command::Show)
    }

    pub fn hide(&mut self) -> Result<Outcome> {
        self.dispatch(Command::Hide)
    }

    pub fn toggle(&mut self) -> Result<Outcome> {
        self.dispatch(Command::Toggle)
    }

    /// Routes a command to its transition. Validation rejections come back
    /// as `Err(PickerError::Validation)` with the selection untouched.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        if self.destroyed {
            return match command {
                Command::Timer(_) => Ok(Outcome::Ignored),
                _ => Err(PickerError::Destroyed),
            };
        }

        match command {
            Command::Show => Ok(self.open()),
            Command::Hide => Ok(self.close()),
            Command::Toggle => Ok(if self.selection.is_open {
                self.close()
            } else {
                self.open()
            }),
            Command::Apply => Ok(self.apply()),
            Command::Cancel => Ok(self.cancel()),
            Command::ActivateDay { side, date } => self.activate_cell(side, &date),
            Command::HoverDay { side, date } => Ok(self.hover_cell(side, &date)),
            Command::LeaveCalendar => Ok(if self.selection.leave() {
                Outcome::Updated
            } else {
                Outcome::Ignored
            }),
            Command::ActivateRange { label } => Ok(self.activate_range(&label)),
            Command::Navigate { side, direction } => {
                if !self.selection.is_open {
                    return Ok(Outcome::Ignored);
                }
                let change = self.calendars.navigate(side, direction, &self.options);
                Ok(self.month_moved(change))
            }
            Command::SelectMonthYear { side, year, month } => {
                if !self.selection.is_open {
                    return Ok(Outcome::Ignored);
                }
                let change = self
                    .calendars
                    .select_month_year(side, year, month, &self.options);
                Ok(self.month_moved(change))
            }
            Command::ChangeTime { side, time } => self.change_time(side, time),
            Command::Key { key, modifiers } => self.key(key, modifiers),
            Command::OutsideClick => {
                if self.listeners.active() == 0 {
                    return Ok(Outcome::Ignored);
                }
                self.close();
                self.host.dispatch(PickerEvent::OutsideClick);
                Ok(Outcome::Updated)
            }
            Command::OutsideFocus => {
                if self.listeners.active() == 0 {
                    return Ok(Outcome::Ignored);
                }
                Ok(self.close())
            }
            Command::ViewportChanged => {
                if !self.selection.is_open {
                    return Ok(Outcome::Ignored);
                }
                self.timers.schedule(TimerKind::Reposition);
                Ok(Outcome::Updated)
            }
            Command::InputChanged(text) => self.input_changed(&text),
            Command::Timer(token) => Ok(self.timer_fired(token)),
        }
    }

    fn open(&mut self) -> Outcome {
        if self.selection.is_open {
            return Outcome::Ignored;
        }
        self.selection.snapshot();
        self.selection.hover = None;
        self.update_label();
        self.show_calendars = self.options.always_show_calendars
            || self.options.ranges.is_empty()
            || self.is_custom_label();

        self.listeners.register_all(self.host.as_mut());
        self.timers.schedule(TimerKind::Reposition);
        self.timers.schedule(TimerKind::FocusSettle);

        self.calendars.derive(&self.selection, &self.options);
        self.selection.is_open = true;
        self.host.dispatch(PickerEvent::Show);
        self.hooks.opened();
        info!(start = %self.selection.start, "picker opened");
        Outcome::Updated
    }

    fn close(&mut self) -> Outcome {
        if !self.selection.is_open {
            return Outcome::Ignored;
        }
        if self.selection.revert_if_incomplete() {
            debug!("incomplete selection discarded");
        }
        self.update_label();

        if self.selection.changed_since_open() {
            let start = self.selection.start;
            let end = self.selection.end.unwrap_or(start);
            if let Some(callback) = self.callback.as_mut() {
                callback(start, end, self.selection.chosen_label.as_deref());
            }
        }
        self.update_element();
        self.teardown();

        self.selection.is_open = false;
        self.calendars.derive(&self.selection, &self.options);
        self.host.dispatch(PickerEvent::Hide);
        self.hooks.closed();
        info!(start = %self.selection.start, end = ?self.selection.end, "picker closed");
        Outcome::Updated
    }

    fn teardown(&mut self) {
        self.listeners.unregister_all(self.host.as_mut());
        self.timers.invalidate();
        self.keyboard.deactivate();
        self.selection.hover = None;
    }

    fn apply(&mut self) -> Outcome {
        if !self.selection.is_open || !self.selection.is_complete(self.options.single_date_picker)
        {
            return Outcome::Ignored;
        }
        info!(label = ?self.selection.chosen_label, "selection applied");
        self.close();
        self.host.dispatch(PickerEvent::Apply);
        Outcome::Updated
    }

    fn cancel(&mut self) -> Outcome {
        if !self.selection.is_open {
            return Outcome::Ignored;
        }
        self.selection.restore_snapshot();
        self.close();
        self.host.dispatch(PickerEvent::Cancel);
        Outcome::Updated
    }

    /// Unbinds from the host. No callback fires; later commands fail with
    /// `PickerError::Destroyed` and late timers are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.teardown();
        self.selection.is_open = false;
        self.callback = None;
        self.positioner = None;
        self.destroyed = true;
        info!(host = %self.host.id(), "picker destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn activate_cell(&mut self, side: Side, text: &str) -> Result<Outcome> {
        if !self.selection.is_open {
            return Ok(Outcome::Ignored);
        }
        let Some(date) = parse_date(text, CELL_FORMAT).map(|d| d.date()) else {
            debug!(text, "unparseable cell value");
            return Ok(Outcome::Ignored);
        };
        let overflow = self.calendars.side(side).matrix.is_overflow(date);
        if overflow && !self.options.overflow_days_selectable {
            return Ok(Outcome::Ignored);
        }
        self.activate(date, Some(side))
    }

    /// Runs a day through validation, the veto hook and the state machine.
    /// `from` is the calendar that was clicked; keyboard activation has none.
    fn activate(&mut self, date: NaiveDate, from: Option<Side>) -> Result<Outcome> {
        if !self.options.day_in_bounds(date) {
            debug!(%date, "day outside bounds");
            return Ok(Outcome::Ignored);
        }

        let mut value = date.and_time(NaiveTime::MIN);
        if self.options.time_picker {
            // A click takes the time shown under its calendar; the keyboard
            // goes by the role the day will fill.
            let side = from.unwrap_or_else(|| {
                let picking_start =
                    self.selection.end.is_some() || date < self.selection.start.date();
                if picking_start { Side::Left } else { Side::Right }
            });
            value = date.and_time(self.selection.side_value(side).time());
            if !self.options.time_picker_seconds {
                value = value.with_second(0).unwrap_or(value);
            }
        }

        if let Err(err) = validate_date(value, &self.options.validation) {
            return Err(self.reject(err));
        }
        if !self.hooks.allows(value) {
            debug!(%value, "activation vetoed");
            return Ok(Outcome::Ignored);
        }

        let placement = match self.selection.place_day(value, &self.options) {
            Ok(placement) => placement,
            Err(err) => return Err(self.reject(err)),
        };
        self.update_label();
        self.calendars.derive(&self.selection, &self.options);
        self.hooks.date_selected(value);

        if placement.is_complete() {
            let start = self.selection.start;
            let end = self.selection.end.unwrap_or(start);
            self.hooks.range_selected(start, end);
            if self.options.auto_apply {
                self.apply();
            }
        }
        Ok(Outcome::Updated)
    }

    fn reject(&mut self, err: ValidationError) -> PickerError {
        warn!(code = err.code(), %err, "selection rejected");
        self.hooks.validation_failed(&err);
        self.host.dispatch(PickerEvent::ValidationError(err));
        PickerError::Validation(err)
    }

    fn hover_cell(&mut self, side: Side, text: &str) -> Outcome {
        if !self.selection.is_open {
            return Outcome::Ignored;
        }
        let Some(date) = parse_date(text, CELL_FORMAT).map(|d| d.date()) else {
            return Outcome::Ignored;
        };
        if !self.options.day_in_bounds(date) {
            return Outcome::Ignored;
        }
        if self.calendars.side(side).matrix.is_overflow(date)
            && !self.options.overflow_days_selectable
        {
            return Outcome::Ignored;
        }
        self.hooks.hovered(date);
        if self.selection.hover(date) {
            Outcome::Updated
        } else {
            Outcome::Ignored
        }
    }

    fn activate_range(&mut self, label: &str) -> Outcome {
        if !self.selection.is_open {
            return Outcome::Ignored;
        }
        if self.options.custom_label() == Some(label) {
            self.selection.chosen_label = Some(label.to_string());
            self.reveal_calendars();
            return Outcome::Updated;
        }
        let Some(range) = find_range(&self.options.ranges, label) else {
            debug!(label, "unknown range");
            return Outcome::Ignored;
        };
        let start = self.options.clamp(self.options.normalize_start(range.start));
        let end = self.options.clamp(self.options.normalize_end(range.end));

        self.selection.set_range(start, end);
        self.update_label();
        self.calendars.derive(&self.selection, &self.options);
        self.reveal_calendars();
        debug!(label, %start, %end, "range preset chosen");
        if self.options.auto_apply {
            self.apply();
        }
        Outcome::Updated
    }

    fn reveal_calendars(&mut self) {
        self.show_calendars = true;
        self.host.dispatch(PickerEvent::ShowCalendar);
    }

    fn month_moved(&mut self, change: Option<MonthChange>) -> Outcome {
        let Some(change) = change else {
            return Outcome::Ignored;
        };
        self.hooks.month_changed(change.month);
        if change.year_changed {
            self.hooks.year_changed(change.month.year());
        }
        Outcome::Updated
    }

    fn change_time(&mut self, side: Side, time: TimeInput) -> Result<Outcome> {
        if !self.selection.is_open || !self.options.time_picker {
            return Ok(Outcome::Ignored);
        }
        let day = self.selection.side_value(side).date();
        let Some(mut value) = time.on_date(day) else {
            debug!(?time, "time out of range");
            return Ok(Outcome::Ignored);
        };
        if !self.options.time_picker_seconds {
            value = value.with_second(0).unwrap_or(value);
        }
        let value = round_to_increment(value, self.options.time_picker_increment_minutes);

        match self.selection.change_time(side, value, &self.options) {
            Ok(true) => {
                self.update_label();
                Ok(Outcome::Updated)
            }
            Ok(false) => Ok(Outcome::Ignored),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn key(&mut self, key: KeyInput, modifiers: Modifiers) -> Result<Outcome> {
        if !self.selection.is_open {
            return Ok(Outcome::Ignored);
        }
        if !self.keyboard.is_active() {
            return Ok(if key == KeyInput::Escape {
                self.close()
            } else {
                Outcome::Ignored
            });
        }

        match self.keyboard.handle(key, modifiers, self.options.locale.first_day) {
            KeyAction::Moved(date) => {
                let change = self.calendars.reveal(date, &self.options);
                self.month_moved(change);
                Ok(Outcome::Updated)
            }
            KeyAction::Activate(date) => self.activate(date, None),
            KeyAction::Close => Ok(self.close()),
            KeyAction::Today => self.select_today(),
            KeyAction::Clear => {
                let today = (self.clock)();
                self.selection.start = self.options.normalize_start(today);
                self.selection.end = None;
                self.selection.hover = None;
                self.selection.chosen_label = None;
                self.calendars.derive(&self.selection, &self.options);
                self.keyboard.set_focused(today.date());
                debug!("selection cleared");
                Ok(Outcome::Updated)
            }
            KeyAction::Apply => Ok(self.apply()),
            KeyAction::Ignored => Ok(Outcome::Ignored),
        }
    }

    fn select_today(&mut self) -> Result<Outcome> {
        let today = (self.clock)();
        let start = self.options.normalize_start(today);
        if let Err(err) = validate_date(start, &self.options.validation) {
            return Err(self.reject(err));
        }
        let end = self.options.normalize_end(today);
        self.selection.set_range(start, end);
        self.update_label();
        self.calendars.derive(&self.selection, &self.options);
        self.keyboard.set_focused(today.date());
        Ok(Outcome::Updated)
    }

    fn input_changed(&mut self, text: &str) -> Result<Outcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let format = self.options.locale.format.clone();
        let invalid = || PickerError::InvalidDateParse {
            input: text.to_string(),
            pattern: format.clone(),
        };
        let parse = |part: &str| parse_date(part, &format).ok_or_else(invalid);

        let parts: Vec<&str> = if self.options.single_date_picker {
            vec![text]
        } else {
            text.split(self.options.locale.separator.as_str()).collect()
        };
        let (start, end) = match parts.as_slice() {
            [one] => (parse(one)?, parse(one)?),
            [first, second] => (parse(first)?, parse(second)?),
            _ => return Err(invalid()),
        };
        debug!(%start, %end, "host input parsed");
        self.set_start_date(start)?;
        self.set_end_date(end)?;
        Ok(Outcome::Updated)
    }

    fn timer_fired(&mut self, token: TimerToken) -> Outcome {
        if !self.timers.is_current(token) {
            debug!(?token, "stale timer ignored");
            return Outcome::Ignored;
        }
        if !self.selection.is_open {
            return Outcome::Ignored;
        }
        match token.kind {
            TimerKind::Reposition => match self.positioner.as_mut() {
                Some(positioner) => {
                    positioner.position(self.options.opens, self.options.drops);
                    Outcome::Updated
                }
                None => Outcome::Ignored,
            },
            TimerKind::FocusSettle => {
                if !self.keyboard.is_enabled() {
                    return Outcome::Ignored;
                }
                self.keyboard.activate(self.selection.start.date());
                Outcome::Updated
            }
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(PickerError::Destroyed);
        }
        Ok(())
    }

    /// Moves the start. Raises the end when it would fall before the start.
    pub fn set_start_date(&mut self, date: NaiveDateTime) -> Result<()> {
        self.ensure_alive()?;
        let start = self.options.clamp(self.options.normalize_start(date));
        self.selection.start = start;
        if self.options.single_date_picker {
            self.selection.end = Some(self.options.normalize_end(start).max(start));
        } else if self.selection.end.is_some_and(|end| end < start) {
            self.selection.end = Some(self.options.normalize_end(start).max(start));
        }
        self.refresh();
        Ok(())
    }

    /// Moves the end, never before the start and never past `max_span_days`.
    pub fn set_end_date(&mut self, date: NaiveDateTime) -> Result<()> {
        self.ensure_alive()?;
        let start = self.selection.start;
        let mut end = self.options.clamp(self.options.normalize_end(date));
        if end < start {
            end = self.options.normalize_end(start).max(start);
        }
        if let Some(span) = self.options.max_span_days.filter(|span| *span > 0) {
            let limit = self.options.normalize_end(start + Duration::days(span - 1));
            end = end.min(limit).max(start);
        }
        if self.options.single_date_picker {
            end = self.options.normalize_end(start).max(start);
        }
        self.selection.end = Some(end);
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.update_label();
        self.calendars.derive(&self.selection, &self.options);
        if !self.selection.is_open {
            self.update_element();
        }
    }

    pub fn get_start_date(&self) -> NaiveDateTime {
        self.selection.start
    }

    pub fn get_end_date(&self) -> Option<NaiveDateTime> {
        self.selection.end
    }

    pub fn is_open(&self) -> bool {
        self.selection.is_open
    }

    pub fn chosen_label(&self) -> Option<&str> {
        self.selection.chosen_label.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn calendars(&self) -> &CalendarPair {
        &self.calendars
    }

    pub fn element_value(&self) -> String {
        self.host.value()
    }

    /// Replaces the rule set as a whole.
    pub fn update_validation(&mut self, rules: ValidationRules) {
        debug!(?rules, "validation rules replaced");
        self.options.validation = rules;
    }

    pub fn set_ranges(&mut self, ranges: Vec<NamedRange>) {
        self.options.ranges = ranges;
        self.update_label();
    }

    pub fn validate_date(&self, date: NaiveDateTime) -> std::result::Result<(), ValidationError> {
        validate_date(date, &self.options.validation)
    }

    /// Range rules including `max_span_days`.
    pub fn validate_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> std::result::Result<(), ValidationError> {
        self.options.check_range(start, end)
    }

    pub fn enable_keyboard_navigation(&mut self) {
        self.keyboard.set_enabled(true);
        if self.selection.is_open {
            self.keyboard.activate(self.selection.start.date());
        }
    }

    pub fn disable_keyboard_navigation(&mut self) {
        self.keyboard.set_enabled(false);
    }

    pub fn set_keyboard_focused_date(&mut self, date: NaiveDate) -> bool {
        if !self.keyboard.set_focused(date) {
            return false;
        }
        let change = self.calendars.reveal(date, &self.options);
        self.month_moved(change);
        true
    }

    pub fn keyboard_focused_date(&self) -> Option<NaiveDate> {
        self.keyboard.focused()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.options.theme = theme;
    }

    pub fn theme(&self) -> &Theme {
        &self.options.theme
    }

    pub fn style(&self) -> StyleDescriptor {
        render_theme(&self.options.theme)
    }

    pub fn set_positioner(&mut self, positioner: Box<dyn Positioner>) {
        self.positioner = Some(positioner);
    }

    /// Timers scheduled since the last call. The host waits out each delay
    /// and sends the token back as `Command::Timer`.
    pub fn take_timers(&mut self) -> Vec<ScheduledTimer> {
        self.timers.drain()
    }

    pub fn view(&self, today: NaiveDate) -> PickerView {
        build_view(&ViewInputs {
            selection: &self.selection,
            calendars: &self.calendars,
            keyboard: &self.keyboard,
            options: &self.options,
            show_calendars: self.show_calendars,
            today,
        })
    }

    fn is_custom_label(&self) -> bool {
        self.options
            .custom_label()
            .is_some_and(|custom| self.selection.chosen_label.as_deref() == Some(custom))
    }

    fn update_label(&mut self) {
        self.selection.chosen_label = chosen_label(
            &self.options.ranges,
            self.selection.start,
            self.selection.end,
            self.options.custom_label(),
        );
    }

    fn update_element(&mut self) {
        if self.host.kind() != HostKind::Input || !self.options.auto_update_input {
            return;
        }
        let text = selected_text(&self.selection, &self.options);
        if self.host.value() != text {
            self.host.set_value(&text);
            self.host.dispatch(PickerEvent::Change);
        }
    }
}
