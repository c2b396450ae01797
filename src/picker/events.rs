use crate::calc::ValidationError;
use crate::picker::host::HostElement;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Notification dispatched on the host element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerEvent {
    Show,
    Hide,
    Apply,
    Cancel,
    OutsideClick,
    ShowCalendar,
    ValidationError(ValidationError),
    Change,
}

impl PickerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PickerEvent::Show => "show.daterangepicker",
            PickerEvent::Hide => "hide.daterangepicker",
            PickerEvent::Apply => "apply.daterangepicker",
            PickerEvent::Cancel => "cancel.daterangepicker",
            PickerEvent::OutsideClick => "outsideClick.daterangepicker",
            PickerEvent::ShowCalendar => "showCalendar.daterangepicker",
            PickerEvent::ValidationError(_) => "validationError.daterangepicker",
            PickerEvent::Change => "change",
        }
    }
}

type Hook = Option<Box<dyn FnMut()>>;
type DateHook = Option<Box<dyn FnMut(NaiveDate)>>;

/// Optional host callbacks. Every hook is invoked synchronously from the
/// transition that triggers it.
#[derive(Default)]
pub struct PickerHooks {
    pub on_open: Hook,
    pub on_close: Hook,
    pub on_month_change: DateHook,
    pub on_year_change: Option<Box<dyn FnMut(i32)>>,
    pub on_date_hover: DateHook,
    pub on_validation_error: Option<Box<dyn FnMut(&ValidationError)>>,
    /// Returning `false` vetoes the activation.
    pub before_date_select: Option<Box<dyn FnMut(NaiveDateTime) -> bool>>,
    pub on_date_select: Option<Box<dyn FnMut(NaiveDateTime)>>,
    pub on_range_select: Option<Box<dyn FnMut(NaiveDateTime, NaiveDateTime)>>,
}

impl fmt::Debug for PickerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerHooks")
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_month_change", &self.on_month_change.is_some())
            .field("on_year_change", &self.on_year_change.is_some())
            .field("on_date_hover", &self.on_date_hover.is_some())
            .field("on_validation_error", &self.on_validation_error.is_some())
            .field("before_date_select", &self.before_date_select.is_some())
            .field("on_date_select", &self.on_date_select.is_some())
            .field("on_range_select", &self.on_range_select.is_some())
            .finish()
    }
}

impl PickerHooks {
    pub(crate) fn opened(&mut self) {
        if let Some(hook) = self.on_open.as_mut() {
            hook();
        }
    }

    pub(crate) fn closed(&mut self) {
        if let Some(hook) = self.on_close.as_mut() {
            hook();
        }
    }

    pub(crate) fn month_changed(&mut self, month: NaiveDate) {
        if let Some(hook) = self.on_month_change.as_mut() {
            hook(month);
        }
    }

    pub(crate) fn year_changed(&mut self, year: i32) {
        if let Some(hook) = self.on_year_change.as_mut() {
            hook(year);
        }
    }

    pub(crate) fn hovered(&mut self, date: NaiveDate) {
        if let Some(hook) = self.on_date_hover.as_mut() {
            hook(date);
        }
    }

    pub(crate) fn validation_failed(&mut self, error: &ValidationError) {
        if let Some(hook) = self.on_validation_error.as_mut() {
            hook(error);
        }
    }

    pub(crate) fn allows(&mut self, date: NaiveDateTime) -> bool {
        self.before_date_select
            .as_mut()
            .is_none_or(|hook| hook(date))
    }

    pub(crate) fn date_selected(&mut self, date: NaiveDateTime) {
        if let Some(hook) = self.on_date_select.as_mut() {
            hook(date);
        }
    }

    pub(crate) fn range_selected(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        if let Some(hook) = self.on_range_select.as_mut() {
            hook(start, end);
        }
    }
}

/// Document and window listeners held only while the panel is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerKind {
    OutsideMouseDown,
    OutsideFocusIn,
    WindowResize,
    WindowScroll,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::OutsideMouseDown,
        ListenerKind::OutsideFocusIn,
        ListenerKind::WindowResize,
        ListenerKind::WindowScroll,
    ];
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    registered: Vec<ListenerKind>,
}

impl ListenerRegistry {
    pub fn register_all(&mut self, host: &mut dyn HostElement) {
        for kind in ListenerKind::ALL {
            if !self.registered.contains(&kind) {
                host.listen(kind);
                self.registered.push(kind);
            }
        }
        debug!(count = self.registered.len(), "listeners registered");
    }

    pub fn unregister_all(&mut self, host: &mut dyn HostElement) {
        for kind in self.registered.drain(..) {
            host.unlisten(kind);
        }
        debug!("listeners unregistered");
    }

    pub fn active(&self) -> usize {
        self.registered.len()
    }

    pub fn is_registered(&self, kind: ListenerKind) -> bool {
        self.registered.contains(&kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Reposition,
    /// Delay before keyboard focus lands on the start date.
    FocusSettle,
}

impl TimerKind {
    pub fn delay(&self) -> Duration {
        match self {
            TimerKind::Reposition => Duration::ZERO,
            TimerKind::FocusSettle => Duration::from_millis(200),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub token: TimerToken,
    pub delay: Duration,
}

/// Fire-and-forget timers. The host drains the queue, waits out each delay
/// and hands the token back; tokens from an older generation are stale.
#[derive(Debug, Default)]
pub struct TimerQueue {
    generation: u64,
    pending: Vec<ScheduledTimer>,
}

impl TimerQueue {
    pub fn schedule(&mut self, kind: TimerKind) -> TimerToken {
        let token = TimerToken {
            kind,
            generation: self.generation,
        };
        self.pending.push(ScheduledTimer {
            token,
            delay: kind.delay(),
        });
        token
    }

    pub fn drain(&mut self) -> Vec<ScheduledTimer> {
        std::mem::take(&mut self.pending)
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending.clear();
    }

    pub fn is_current(&self, token: TimerToken) -> bool {
        token.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::host::{HostKind, MemoryElement};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names_are_stable() {
        assert_eq!(PickerEvent::Show.name(), "show.daterangepicker");
        assert_eq!(PickerEvent::OutsideClick.name(), "outsideClick.daterangepicker");
        assert_eq!(
            PickerEvent::ValidationError(ValidationError::DisabledDate).name(),
            "validationError.daterangepicker"
        );
        assert_eq!(PickerEvent::Change.name(), "change");
    }

    #[test]
    fn test_registry_registers_once_and_tears_down() {
        let mut host = MemoryElement::new("picker", HostKind::Input);
        let mut registry = ListenerRegistry::default();
        registry.register_all(&mut host);
        registry.register_all(&mut host);
        assert_eq!(registry.active(), 4);
        assert_eq!(host.listening(), 4);
        registry.unregister_all(&mut host);
        assert_eq!(registry.active(), 0);
        assert_eq!(host.listening(), 0);
    }

    #[test]
    fn test_repeated_cycles_do_not_leak() {
        let mut host = MemoryElement::new("picker", HostKind::Input);
        let mut registry = ListenerRegistry::default();
        for _ in 0..5 {
            registry.register_all(&mut host);
            registry.unregister_all(&mut host);
        }
        assert_eq!(host.listening(), 0);
        assert!(!registry.is_registered(ListenerKind::WindowScroll));
    }

    #[test]
    fn test_invalidate_makes_tokens_stale() {
        let mut timers = TimerQueue::default();
        let token = timers.schedule(TimerKind::FocusSettle);
        assert!(timers.is_current(token));
        timers.invalidate();
        assert!(!timers.is_current(token));
        assert!(timers.drain().is_empty());
    }

    #[test]
    fn test_drain_hands_out_delays() {
        let mut timers = TimerQueue::default();
        timers.schedule(TimerKind::Reposition);
        timers.schedule(TimerKind::FocusSettle);
        let drained = timers.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].delay, Duration::from_millis(200));
        assert!(timers.drain().is_empty());
    }

    #[test]
    fn test_veto_hook() {
        let mut hooks = PickerHooks::default();
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(hooks.allows(day));
        hooks.before_date_select = Some(Box::new(|_| false));
        assert!(!hooks.allows(day));
    }

    #[test]
    fn test_hooks_record_calls() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut hooks = PickerHooks {
            on_year_change: Some(Box::new(move |year| sink.borrow_mut().push(year))),
            ..Default::default()
        };
        hooks.year_changed(2026);
        hooks.closed();
        assert_eq!(*seen.borrow(), vec![2026]);
        assert!(format!("{hooks:?}").contains("on_year_change: true"));
    }
}
