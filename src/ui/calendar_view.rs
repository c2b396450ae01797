use crate::ui::Tui;
use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use crossterm::event::{
    self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use datex::data::SavedSelection;
use datex::picker::{
    CellFlags, ChangeCallback, Command, DateRangePicker, Drops, HostElement, HostKind,
    HostTarget, KeyInput, MemoryElement, Modifiers, MonthView, Opens, PickerOptions, PickerView,
    Positioner, Side, TimeInput, TimeView, TimerToken,
};
use datex::theme::{parse_hex_color, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration as StdDuration, Instant};
use tracing::debug;

// Calendar grid geometry: 7 cells of 3 columns each
const MONTH_WIDTH: u16 = 21;
const CELL_WIDTH: u16 = 3;
const MONTH_GAP: u16 = 2;
// nav/title row + weekday header + 6 weeks
const MONTH_HEIGHT: u16 = 8;
const INPUT_WIDTH: u16 = 44;
const FOOTER_MIN_WIDTH: u16 = 44;

#[derive(PartialEq)]
enum Mode {
    Normal,
    /// Typing into the host input line.
    Edit,
}

/// Clickable regions recorded during the last render.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Target {
    Input,
    Day { side: Side, date: String },
    Prev(Side),
    Next(Side),
    Range(String),
    Apply,
    Cancel,
}

/// Records where the picker asked the panel to open.
struct PanelPlacement(Rc<Cell<(Opens, Drops)>>);

impl Positioner for PanelPlacement {
    fn position(&mut self, opens: Opens, drops: Drops) {
        self.0.set((opens, drops));
    }
}

/// Terminal colours derived from the picker theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Palette {
    text: Color,
    background: Color,
    secondary: Color,
    border: Color,
    hover: Color,
    selected: Color,
    range: Color,
    today: Color,
    disabled: Color,
    apply: Color,
    cancel: Color,
}

impl Palette {
    pub(crate) fn from_theme(theme: &Theme) -> Self {
        Palette {
            text: theme_color(&theme.text_color, Color::Black),
            background: theme_color(&theme.background_color, Color::White),
            secondary: theme_color(&theme.secondary_color, Color::Gray),
            border: theme_color(&theme.border_color, Color::Gray),
            hover: theme_color(&theme.hover_color, Color::Gray),
            selected: theme_color(&theme.selected_color, Color::Blue),
            range: theme_color(&theme.range_color, Color::LightBlue),
            today: theme_color(&theme.today_color, Color::Blue),
            disabled: theme_color(&theme.disabled_color, Color::DarkGray),
            apply: theme_color(&theme.apply_button_color, Color::Blue),
            cancel: theme_color(&theme.cancel_button_color, Color::DarkGray),
        }
    }
}

pub(crate) fn theme_color(value: &str, fallback: Color) -> Color {
    parse_hex_color(value)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

pub struct App {
    picker: DateRangePicker,
    input: MemoryElement,
    today: NaiveDate,
    mode: Mode,
    input_buffer: String,
    status: Option<String>,
    /// Which side's time the h/H/m/M keys adjust.
    time_side: Side,
    hovering: bool,
    placement: Rc<Cell<(Opens, Drops)>>,
    applied: Rc<RefCell<Option<SavedSelection>>>,
    timers: Vec<(Instant, TimerToken)>,
    hits: Vec<(Rect, Target)>,
    panel: Option<Rect>,
}

impl App {
    pub fn new(options: PickerOptions) -> Result<Self> {
        Self::build(options, None)
    }

    fn build(options: PickerOptions, now: Option<NaiveDateTime>) -> Result<Self> {
        let input = MemoryElement::new("datex-input", HostKind::Input);
        let applied = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&applied);
        let callback: ChangeCallback = Box::new(move |start, end, label| {
            *sink.borrow_mut() = Some(SavedSelection::new(start, end, label));
        });

        let target = HostTarget::Element(Box::new(input.clone()));
        let mut picker = match now {
            Some(now) => DateRangePicker::new_at(target, options, Some(callback), now)?,
            None => DateRangePicker::new(target, options, Some(callback))?,
        };
        let placement = Rc::new(Cell::new((picker.options().opens, picker.options().drops)));
        picker.set_positioner(Box::new(PanelPlacement(Rc::clone(&placement))));

        let today = now.unwrap_or_else(|| Local::now().naive_local()).date();
        Ok(App {
            picker,
            input,
            today,
            mode: Mode::Normal,
            input_buffer: String::new(),
            status: None,
            time_side: Side::Left,
            hovering: false,
            placement,
            applied,
            timers: Vec::new(),
            hits: Vec::new(),
            panel: None,
        })
    }

    /// The last range the picker reported on close.
    pub fn applied(&self) -> Option<SavedSelection> {
        self.applied.borrow().clone()
    }

    /// Detaches the picker; late timers and callbacks are dropped.
    pub fn finish(&mut self) -> Option<SavedSelection> {
        self.picker.destroy();
        self.timers.clear();
        self.applied()
    }

    fn send(&mut self, command: Command) {
        debug!(?command, "ui command");
        if let Err(err) = self.picker.dispatch(command) {
            self.status = Some(err.to_string());
        }
        for timer in self.picker.take_timers() {
            self.timers.push((Instant::now() + timer.delay, timer.token));
        }
    }

    /// Hands back every timer whose delay has elapsed by `now`.
    pub fn fire_due(&mut self, now: Instant) {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(at, _)| *at <= now);
        self.timers = pending;
        for (_, token) in due {
            self.send(Command::Timer(token));
        }
    }

    pub fn viewport_changed(&mut self) {
        self.send(Command::ViewportChanged);
    }

    // ── Input handling ────────────────────────────────────────────────────────

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.mode == Mode::Edit {
            self.handle_edit_key(code);
            return false;
        }

        self.status = None;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        if code == KeyCode::Char('q') || (ctrl && code == KeyCode::Char('c')) {
            return true;
        }

        if !self.picker.is_open() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => self.send(Command::Show),
                KeyCode::Char('e') => {
                    self.input_buffer.clear();
                    self.mode = Mode::Edit;
                }
                _ => {}
            }
            return false;
        }

        let time_picker = self.picker.options().time_picker;
        match code {
            KeyCode::Char('[') => self.cycle_range(-1),
            KeyCode::Char(']') => self.cycle_range(1),
            KeyCode::Char('<') => self.send(Command::Navigate {
                side: Side::Left,
                direction: -1,
            }),
            KeyCode::Char('>') => {
                let side = if self.picker.options().single_date_picker {
                    Side::Left
                } else {
                    Side::Right
                };
                self.send(Command::Navigate { side, direction: 1 });
            }
            KeyCode::Char('a') => self.send(Command::Apply),
            KeyCode::Tab if time_picker => {
                self.time_side = match self.time_side {
                    Side::Left if !self.picker.options().single_date_picker => Side::Right,
                    _ => Side::Left,
                };
            }
            KeyCode::Char(c @ ('h' | 'H' | 'm' | 'M')) if time_picker => self.step_time(c),
            _ => {
                if let Some(key) = key_input(code) {
                    self.send(Command::Key {
                        key,
                        modifiers: Modifiers {
                            shift: modifiers.contains(KeyModifiers::SHIFT),
                            ctrl,
                            alt: modifiers.contains(KeyModifiers::ALT),
                        },
                    });
                }
            }
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                self.mode = Mode::Normal;
                self.status = None;
                self.send(Command::InputChanged(text));
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    /// Moves through the range list, wrapping at either end.
    fn cycle_range(&mut self, step: i32) {
        let view = self.picker.view(self.today);
        let count = view.ranges.len() as i32;
        if count == 0 {
            return;
        }
        let next = match view.ranges.iter().position(|r| r.active) {
            Some(i) => (i as i32 + step).rem_euclid(count),
            None if step > 0 => 0,
            None => count - 1,
        };
        let label = view.ranges[next as usize].label.clone();
        self.send(Command::ActivateRange { label });
    }

    fn step_time(&mut self, key: char) {
        let options = self.picker.options();
        let increment = options.time_picker_increment_minutes.max(1) as i64;
        let twenty_four = options.time_picker_24_hour;
        let delta = match key {
            'h' => Duration::hours(-1),
            'H' => Duration::hours(1),
            'm' => Duration::minutes(-increment),
            _ => Duration::minutes(increment),
        };
        let value = self.picker.selection().side_value(self.time_side);
        // Wrap within the day; the date never changes from here.
        let (time, _) = value.time().overflowing_add_signed(delta);
        let time = TimeInput::from_datetime(value.date().and_time(time), twenty_four);
        self.send(Command::ChangeTime {
            side: self.time_side,
            time,
        });
    }

    pub fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let hit = self.hit_at(column, row);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.status = None;
                let command = match hit {
                    Some(Target::Input) => Command::Toggle,
                    Some(Target::Day { side, date }) => Command::ActivateDay { side, date },
                    Some(Target::Prev(side)) => Command::Navigate { side, direction: -1 },
                    Some(Target::Next(side)) => Command::Navigate { side, direction: 1 },
                    Some(Target::Range(label)) => Command::ActivateRange { label },
                    Some(Target::Apply) => Command::Apply,
                    Some(Target::Cancel) => Command::Cancel,
                    None if self.picker.is_open() && !self.in_panel(column, row) => {
                        Command::OutsideClick
                    }
                    None => return,
                };
                self.send(command);
            }
            MouseEventKind::Moved => match hit {
                Some(Target::Day { side, date }) => {
                    self.hovering = true;
                    self.send(Command::HoverDay { side, date });
                }
                _ if self.hovering => {
                    self.hovering = false;
                    self.send(Command::LeaveCalendar);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn hit_at(&self, column: u16, row: u16) -> Option<Target> {
        self.hits
            .iter()
            .find(|(rect, _)| contains(*rect, column, row))
            .map(|(_, target)| target.clone())
    }

    fn in_panel(&self, column: u16, row: u16) -> bool {
        self.panel.is_some_and(|panel| contains(panel, column, row))
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&mut self, f: &mut Frame) {
        self.hits.clear();
        self.panel = None;

        let view = self.picker.view(self.today);
        let palette = Palette::from_theme(self.picker.theme());
        let (opens, drops) = self.placement.get();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(0),    // input + panel
                Constraint::Length(1), // help / status
            ])
            .split(f.area());

        self.render_title(f, chunks[0]);

        let body = chunks[1];
        let input_width = INPUT_WIDTH.min(body.width);
        let input_height = 3.min(body.height);
        let input_y = if drops == Drops::Up {
            body.y + body.height - input_height
        } else {
            body.y
        };
        let input_rect = Rect::new(
            body.x + (body.width - input_width) / 2,
            input_y,
            input_width,
            input_height,
        );
        self.render_input(f, input_rect, &palette);

        if view.open {
            let (width, height) = panel_size(&view);
            let panel = place_panel(input_rect, body, width, height, opens, drops);
            self.render_panel(f, panel, &view, &palette);
            self.panel = Some(panel);
        }

        self.render_help(f, chunks[2], view.open);
    }

    fn render_title(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "datex",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(label) = self.picker.chosen_label() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                label.to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_input(&mut self, f: &mut Frame, area: Rect, palette: &Palette) {
        let (text, style) = if self.mode == Mode::Edit {
            (
                format!("{}_", self.input_buffer),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else {
            (self.input.value(), Style::default())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Date range ");
        f.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
        self.hits.push((area, Target::Input));
    }

    fn render_panel(&mut self, f: &mut Frame, panel: Rect, view: &PickerView, palette: &Palette) {
        f.render_widget(Clear, panel);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border));
        let inner = block.inner(panel);
        f.render_widget(block, panel);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let body_height = inner.height.saturating_sub(1);
        let ranges_width = ranges_width(view);
        if ranges_width > 0 {
            let area = Rect::new(inner.x, inner.y, ranges_width.min(inner.width), body_height);
            self.render_ranges(f, area, view, palette);
        }

        if view.show_calendars {
            let mut x = inner.x + ranges_width + u16::from(ranges_width > 0);
            let months = [
                Some((&view.left, &view.left_time)),
                view.right.as_ref().map(|m| (m, &view.right_time)),
            ];
            for (month, time) in months.into_iter().flatten() {
                let width = MONTH_WIDTH.min((inner.x + inner.width).saturating_sub(x));
                let area = Rect::new(x, inner.y, width, body_height);
                self.render_month(f, area, month, palette);
                if let Some(time) = time {
                    if body_height > MONTH_HEIGHT {
                        let row = Rect::new(x, inner.y + MONTH_HEIGHT, width, 1);
                        self.render_time(f, row, month.side, time);
                    }
                }
                x += MONTH_WIDTH + MONTH_GAP;
            }
        }

        let footer = Rect::new(inner.x, inner.y + body_height, inner.width, 1);
        self.render_footer(f, footer, view, palette);
    }

    fn render_ranges(&mut self, f: &mut Frame, area: Rect, view: &PickerView, palette: &Palette) {
        let width = area.width as usize;
        let mut lines = Vec::new();
        for (i, item) in view.ranges.iter().enumerate() {
            let style = if item.active {
                Style::default()
                    .fg(palette.background)
                    .bg(palette.selected)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!(" {:<w$}", item.label, w = width.saturating_sub(1)),
                style,
            )));
            if (i as u16) < area.height {
                self.hits.push((
                    Rect::new(area.x, area.y + i as u16, area.width, 1),
                    Target::Range(item.label.clone()),
                ));
            }
        }
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_month(&mut self, f: &mut Frame, area: Rect, month: &MonthView, palette: &Palette) {
        let nav = Style::default().fg(palette.selected).add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(vec![
            Span::styled(if month.can_prev { "‹ " } else { "  " }, nav),
            Span::styled(
                format!("{:^17}", month.title),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Span::styled(if month.can_next { " ›" } else { "  " }, nav),
        ])];
        if month.can_prev {
            self.hits.push((Rect::new(area.x, area.y, 2, 1), Target::Prev(month.side)));
        }
        if month.can_next {
            self.hits.push((
                Rect::new(area.x + MONTH_WIDTH - 2, area.y, 2, 1),
                Target::Next(month.side),
            ));
        }

        let header: String = month
            .weekdays
            .iter()
            .map(|w| format!("{:<3}", w.chars().take(2).collect::<String>()))
            .collect();
        lines.push(Line::from(Span::styled(
            header,
            Style::default().fg(palette.secondary),
        )));

        for (row, week) in month.weeks().enumerate() {
            let y = area.y + 2 + row as u16;
            let mut spans = Vec::new();
            for (col, cell) in week.iter().enumerate() {
                spans.push(Span::styled(
                    format!("{:>2}", cell.date.day()),
                    day_style(&cell.flags, palette),
                ));
                spans.push(Span::raw(" "));
                if y < area.y + area.height {
                    self.hits.push((
                        Rect::new(area.x + col as u16 * CELL_WIDTH, y, CELL_WIDTH, 1),
                        Target::Day {
                            side: month.side,
                            date: cell.key(),
                        },
                    ));
                }
            }
            lines.push(Line::from(spans));
        }

        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_time(&self, f: &mut Frame, area: Rect, side: Side, time: &TimeView) {
        let marker = if side == self.time_side { "▸ " } else { "  " };
        let style = if time.disabled {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::raw(marker),
            Span::styled(time_label(time), style),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&mut self, f: &mut Frame, area: Rect, view: &PickerView, palette: &Palette) {
        let cancel = format!("[{}]", view.cancel_label);
        let apply = format!("[{}]", view.apply_label);
        let buttons_width = (cancel.chars().count() + 1 + apply.chars().count()) as u16;

        let apply_style = if view.apply_enabled {
            Style::default().fg(palette.apply).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.disabled).add_modifier(Modifier::DIM)
        };
        let text_width = (area.width.saturating_sub(buttons_width)) as usize;
        let line = Line::from(vec![
            Span::raw(format!("{:<w$}", view.selected_text, w = text_width)),
            Span::styled(cancel.clone(), Style::default().fg(palette.cancel)),
            Span::raw(" "),
            Span::styled(apply.clone(), apply_style),
        ]);
        f.render_widget(Paragraph::new(line), area);

        let cancel_x = area.x + text_width as u16;
        let apply_x = cancel_x + cancel.chars().count() as u16 + 1;
        self.hits.push((
            Rect::new(cancel_x, area.y, cancel.chars().count() as u16, 1),
            Target::Cancel,
        ));
        self.hits.push((
            Rect::new(apply_x, area.y, apply.chars().count() as u16, 1),
            Target::Apply,
        ));
    }

    fn render_help(&self, f: &mut Frame, area: Rect, open: bool) {
        let line = match &self.status {
            Some(status) => Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Red),
            )),
            None if self.mode == Mode::Edit => {
                Line::from("type a date or range · Enter set · Esc discard")
            }
            None if open => Line::from(
                "arrows move · Enter pick · t today · c clear · [ ] ranges · < > month · a apply · Esc close · q quit",
            ),
            None => Line::from("Enter open · e edit · q quit"),
        };
        f.render_widget(
            Paragraph::new(line).style(Style::default().add_modifier(Modifier::DIM)),
            area,
        );
    }
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    loop {
        app.fire_due(Instant::now());
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key.code, key.modifiers) {
                        break;
                    }
                }
                CEvent::Mouse(mouse) => app.handle_mouse(mouse.kind, mouse.column, mouse.row),
                CEvent::Resize(..) => app.viewport_changed(),
                _ => {}
            }
        }
    }
    Ok(())
}

// ── Layout helpers ────────────────────────────────────────────────────────────

fn key_input(code: KeyCode) -> Option<KeyInput> {
    Some(match code {
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        KeyCode::PageUp => KeyInput::PageUp,
        KeyCode::PageDown => KeyInput::PageDown,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Esc => KeyInput::Escape,
        KeyCode::Char(' ') => KeyInput::Space,
        KeyCode::Char(c) => KeyInput::Char(c),
        _ => return None,
    })
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

fn ranges_width(view: &PickerView) -> u16 {
    view.ranges
        .iter()
        .map(|r| r.label.chars().count() as u16 + 2)
        .max()
        .unwrap_or(0)
}

/// Outer size of the panel, borders included.
pub(crate) fn panel_size(view: &PickerView) -> (u16, u16) {
    let ranges = ranges_width(view);
    let months: u16 = match (view.show_calendars, view.right.is_some()) {
        (false, _) => 0,
        (true, false) => 1,
        (true, true) => 2,
    };
    let calendars = months * MONTH_WIDTH + months.saturating_sub(1) * MONTH_GAP;
    let gap = u16::from(ranges > 0 && calendars > 0);
    let width = (ranges + gap + calendars).max(FOOTER_MIN_WIDTH);

    let calendar_height = if months > 0 {
        MONTH_HEIGHT + u16::from(view.left_time.is_some())
    } else {
        0
    };
    let body = calendar_height.max(view.ranges.len() as u16);
    (width + 2, body + 1 + 2)
}

/// Positions the panel next to `anchor` inside `bounds`. `opens` aligns it
/// horizontally; `drops` puts it below or above, `Auto` picking whichever
/// side has room.
pub(crate) fn place_panel(
    anchor: Rect,
    bounds: Rect,
    width: u16,
    height: u16,
    opens: Opens,
    drops: Drops,
) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);

    let x = match opens {
        Opens::Left => (anchor.x + anchor.width).saturating_sub(width),
        Opens::Right => anchor.x,
        Opens::Center => (anchor.x + anchor.width / 2).saturating_sub(width / 2),
    };
    let x = x.clamp(bounds.x, bounds.x + bounds.width - width);

    let below = anchor.y + anchor.height;
    let bottom = bounds.y + bounds.height;
    let space_below = bottom.saturating_sub(below);
    let space_above = anchor.y.saturating_sub(bounds.y);
    let up = match drops {
        Drops::Up => true,
        Drops::Down => false,
        Drops::Auto => space_below < height && space_above > space_below,
    };
    let y = if up {
        anchor.y.saturating_sub(height).max(bounds.y)
    } else {
        below.min(bottom - height)
    };
    Rect::new(x, y, width, height)
}

fn time_label(time: &TimeView) -> String {
    let selected = &time.selected;
    let mut label = format!("{:02}:{:02}", selected.hour, selected.minute);
    if time.seconds.is_some() {
        label.push_str(&format!(":{:02}", selected.second));
    }
    if let Some(meridiem) = time.meridiem {
        label.push(' ');
        label.push_str(meridiem.label());
    }
    label
}

/// Determines the ratatui `Style` for a calendar day cell from its flags.
pub(crate) fn day_style(flags: &CellFlags, palette: &Palette) -> Style {
    let style = if flags.start || flags.end {
        Style::default()
            .fg(palette.background)
            .bg(palette.selected)
            .add_modifier(Modifier::BOLD)
    } else if flags.hover_end {
        Style::default()
            .fg(palette.text)
            .bg(palette.hover)
            .add_modifier(Modifier::BOLD)
    } else if flags.in_range {
        Style::default().fg(palette.text).bg(palette.range)
    } else if flags.hover_range {
        Style::default().fg(palette.text).bg(palette.hover)
    } else if flags.disabled || flags.invalid {
        let modifier = if flags.invalid {
            Modifier::CROSSED_OUT
        } else {
            Modifier::DIM
        };
        Style::default().fg(palette.disabled).add_modifier(modifier)
    } else if flags.overflow {
        Style::default().add_modifier(Modifier::DIM)
    } else if flags.today {
        Style::default()
            .fg(palette.today)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else if flags.weekend {
        Style::default().fg(palette.secondary)
    } else {
        Style::default()
    };

    if flags.focused {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datex::picker::common_ranges;
    use ratatui::{backend::TestBackend, Terminal};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn noon() -> NaiveDateTime {
        d(2025, 6, 10).and_hms_opt(12, 0, 0).unwrap()
    }

    fn app_with(options: PickerOptions) -> App {
        App::build(options, Some(noon())).unwrap()
    }

    fn app() -> App {
        app_with(PickerOptions::default())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn open_and_settle(app: &mut App) {
        press(app, KeyCode::Enter);
        app.fire_due(Instant::now() + StdDuration::from_secs(1));
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
    }

    fn position_of(app: &App, target: &Target) -> (u16, u16) {
        let (rect, _) = app
            .hits
            .iter()
            .find(|(_, t)| t == target)
            .unwrap_or_else(|| panic!("no hit region for {target:?}"));
        (rect.x, rect.y)
    }

    fn day(side: Side, date: NaiveDate) -> Target {
        Target::Day {
            side,
            date: date.format("%Y-%m-%d").to_string(),
        }
    }

    fn click(app: &mut App, (column, row): (u16, u16)) {
        app.handle_mouse(MouseEventKind::Down(MouseButton::Left), column, row);
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    #[test]
    fn test_q_returns_true() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_enter_opens_and_escape_closes() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Enter));
        assert!(app.picker.is_open());
        press(&mut app, KeyCode::Esc);
        assert!(!app.picker.is_open());
    }

    #[test]
    fn test_arrow_keys_wait_for_focus_settle() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.picker.keyboard_focused_date(), None);

        app.fire_due(Instant::now() + StdDuration::from_secs(1));
        assert_eq!(app.picker.keyboard_focused_date(), Some(d(2025, 6, 10)));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.picker.keyboard_focused_date(), Some(d(2025, 6, 11)));
    }

    #[test]
    fn test_keyboard_range_then_apply_reports_selection() {
        let mut app = app();
        open_and_settle(&mut app);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.picker.get_end_date(), None);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));

        assert!(!app.picker.is_open());
        let applied = app.applied().unwrap();
        assert_eq!(applied.start.unwrap().date(), d(2025, 6, 10));
        assert_eq!(applied.end.unwrap().date(), d(2025, 6, 12));
        assert!(app.input.value().starts_with("06/10/2025"));
    }

    #[test]
    fn test_cancel_leaves_nothing_applied() {
        let mut app = app();
        open_and_settle(&mut app);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert!(app.applied().is_none());
        assert_eq!(app.picker.get_start_date().date(), d(2025, 6, 10));
    }

    #[test]
    fn test_brackets_cycle_named_ranges() {
        let mut app = app_with(PickerOptions {
            ranges: common_ranges(d(2025, 6, 10)),
            ..Default::default()
        });
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.picker.chosen_label(), Some("Today"));

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.picker.chosen_label(), Some("Yesterday"));
        assert_eq!(app.picker.get_start_date().date(), d(2025, 6, 9));
        assert!(app.picker.is_open());
    }

    #[test]
    fn test_bracket_wraps_to_custom_range_and_shows_calendars() {
        let mut app = app_with(PickerOptions {
            ranges: common_ranges(d(2025, 6, 10)),
            ..Default::default()
        });
        press(&mut app, KeyCode::Enter);
        assert!(!app.picker.view(app.today).show_calendars);
        press(&mut app, KeyCode::Char('['));
        assert!(app.picker.view(app.today).show_calendars);
    }

    #[test]
    fn test_angle_brackets_navigate_months() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('>'));
        assert_eq!(app.picker.view(app.today).left.month, d(2025, 7, 1));
        press(&mut app, KeyCode::Char('<'));
        press(&mut app, KeyCode::Char('<'));
        assert_eq!(app.picker.view(app.today).left.month, d(2025, 5, 1));
    }

    #[test]
    fn test_edit_mode_sets_range_from_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "06/01/2025 - 06/05/2025");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.picker.get_start_date().date(), d(2025, 6, 1));
        assert_eq!(app.picker.get_end_date().unwrap().date(), d(2025, 6, 5));
        assert_eq!(app.input.value(), "06/01/2025 - 06/05/2025");
        assert!(app.status.is_none());
    }

    #[test]
    fn test_edit_mode_reports_bad_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "soon");
        press(&mut app, KeyCode::Enter);
        assert!(app.status.as_deref().unwrap().contains("soon"));
        assert_eq!(app.picker.get_start_date().date(), d(2025, 6, 10));
    }

    #[test]
    fn test_edit_mode_escape_discards() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Esc);
        assert!(app.mode == Mode::Normal);
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_hour_key_moves_start_time() {
        let mut app = app_with(PickerOptions {
            time_picker: true,
            ..Default::default()
        });
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(
            app.picker.get_start_date(),
            d(2025, 6, 10).and_hms_opt(11, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_finish_destroys_picker() {
        let mut app = app();
        assert!(app.finish().is_none());
        assert!(app.picker.is_destroyed());
        press(&mut app, KeyCode::Enter);
        assert!(app.status.is_some());
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_input_toggles() {
        let mut app = app();
        draw(&mut app);
        let input = position_of(&app, &Target::Input);
        click(&mut app, input);
        assert!(app.picker.is_open());
    }

    #[test]
    fn test_click_day_starts_range_and_hover_previews() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        draw(&mut app);
        let target = position_of(&app, &day(Side::Left, d(2025, 6, 15)));
        click(&mut app, target);
        assert_eq!(app.picker.get_start_date().date(), d(2025, 6, 15));
        assert_eq!(app.picker.get_end_date(), None);

        draw(&mut app);
        let (column, row) = position_of(&app, &day(Side::Left, d(2025, 6, 18)));
        app.handle_mouse(MouseEventKind::Moved, column, row);
        assert_eq!(app.picker.selection().hover, Some(d(2025, 6, 18)));

        app.handle_mouse(MouseEventKind::Moved, 0, 0);
        assert_eq!(app.picker.selection().hover, None);
    }

    #[test]
    fn test_click_outside_panel_closes() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        draw(&mut app);
        click(&mut app, (0, 0));
        assert!(!app.picker.is_open());
        assert!(app
            .input
            .event_names()
            .contains(&"outsideClick.daterangepicker"));
    }

    #[test]
    fn test_click_next_arrow_and_apply_button() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        draw(&mut app);
        let next = position_of(&app, &Target::Next(Side::Right));
        click(&mut app, next);
        assert_eq!(app.picker.view(app.today).left.month, d(2025, 7, 1));

        draw(&mut app);
        let apply = position_of(&app, &Target::Apply);
        click(&mut app, apply);
        assert!(!app.picker.is_open());
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    #[test]
    fn test_panel_size_two_months_with_ranges() {
        let mut app = app_with(PickerOptions {
            ranges: common_ranges(d(2025, 6, 10)),
            always_show_calendars: true,
            ..Default::default()
        });
        press(&mut app, KeyCode::Enter);
        let view = app.picker.view(app.today);
        let (width, height) = panel_size(&view);
        // "Last 30 Days" / "Custom Range" + 2, gap, two months and a gap, borders
        assert_eq!(width, 14 + 1 + MONTH_WIDTH * 2 + MONTH_GAP + 2);
        assert_eq!(height, MONTH_HEIGHT + 1 + 2);
    }

    #[test]
    fn test_place_panel_drops_below_and_centers() {
        let bounds = Rect::new(0, 0, 100, 40);
        let anchor = Rect::new(28, 1, 44, 3);
        let panel = place_panel(anchor, bounds, 50, 12, Opens::Center, Drops::Auto);
        assert_eq!(panel, Rect::new(25, 4, 50, 12));
    }

    #[test]
    fn test_place_panel_opens_left_aligns_right_edges() {
        let bounds = Rect::new(0, 0, 100, 40);
        let anchor = Rect::new(28, 1, 44, 3);
        let panel = place_panel(anchor, bounds, 50, 12, Opens::Left, Drops::Down);
        assert_eq!(panel.x + panel.width, 72);
    }

    #[test]
    fn test_place_panel_drops_up_and_clamps() {
        let bounds = Rect::new(0, 0, 60, 40);
        let anchor = Rect::new(0, 30, 44, 3);
        let panel = place_panel(anchor, bounds, 50, 12, Opens::Right, Drops::Up);
        assert_eq!(panel, Rect::new(0, 18, 50, 12));
        let auto = place_panel(anchor, bounds, 50, 12, Opens::Center, Drops::Auto);
        assert_eq!(auto.y, 18);
        assert_eq!(auto.x, 0);
    }

    // ── day_style tests ───────────────────────────────────────────────────────

    fn palette() -> Palette {
        Palette::from_theme(&Theme::default())
    }

    #[test]
    fn test_theme_color_parses_short_and_long_hex() {
        assert_eq!(theme_color("#357ebd", Color::Reset), Color::Rgb(0x35, 0x7e, 0xbd));
        assert_eq!(theme_color("#999", Color::Reset), Color::Rgb(153, 153, 153));
        assert_eq!(theme_color("teal", Color::Reset), Color::Reset);
    }

    #[test]
    fn test_style_start_and_end() {
        let flags = CellFlags {
            start: true,
            ..Default::default()
        };
        let expected = Style::default()
            .fg(Color::Rgb(255, 255, 255))
            .bg(Color::Rgb(0x35, 0x7e, 0xbd))
            .add_modifier(Modifier::BOLD);
        assert_eq!(day_style(&flags, &palette()), expected);
        let end = CellFlags {
            end: true,
            in_range: true,
            ..Default::default()
        };
        assert_eq!(day_style(&end, &palette()), expected);
    }

    #[test]
    fn test_style_in_range() {
        let flags = CellFlags {
            in_range: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&flags, &palette()),
            Style::default()
                .fg(Color::Rgb(0, 0, 0))
                .bg(Color::Rgb(0xeb, 0xf4, 0xf8))
        );
    }

    #[test]
    fn test_style_hover_end_is_bold() {
        let flags = CellFlags {
            hover_range: true,
            hover_end: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&flags, &palette()),
            Style::default()
                .fg(Color::Rgb(0, 0, 0))
                .bg(Color::Rgb(238, 238, 238))
                .add_modifier(Modifier::BOLD)
        );
    }

    #[test]
    fn test_style_disabled_and_invalid() {
        let disabled = CellFlags {
            disabled: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&disabled, &palette()),
            Style::default()
                .fg(Color::Rgb(153, 153, 153))
                .add_modifier(Modifier::DIM)
        );
        let invalid = CellFlags {
            invalid: true,
            today: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&invalid, &palette()),
            Style::default()
                .fg(Color::Rgb(153, 153, 153))
                .add_modifier(Modifier::CROSSED_OUT)
        );
    }

    #[test]
    fn test_style_today() {
        let flags = CellFlags {
            today: true,
            weekend: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&flags, &palette()),
            Style::default()
                .fg(Color::Rgb(0x35, 0x7e, 0xbd))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        );
    }

    #[test]
    fn test_style_overflow_dims() {
        let flags = CellFlags {
            overflow: true,
            weekend: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&flags, &palette()),
            Style::default().add_modifier(Modifier::DIM)
        );
    }

    #[test]
    fn test_style_focused_reverses() {
        let flags = CellFlags {
            focused: true,
            ..Default::default()
        };
        assert_eq!(
            day_style(&flags, &palette()),
            Style::default().add_modifier(Modifier::REVERSED)
        );
    }

    #[test]
    fn test_style_plain() {
        assert_eq!(day_style(&CellFlags::default(), &palette()), Style::default());
    }

    #[test]
    fn test_time_label_twelve_hour_with_seconds() {
        let time = TimeView {
            selected: TimeInput::new(9, 5)
                .with_seconds(7)
                .with_meridiem(datex::picker::Meridiem::Pm),
            hours: Vec::new(),
            minutes: Vec::new(),
            seconds: Some(Vec::new()),
            meridiem: Some(datex::picker::Meridiem::Pm),
            disabled: false,
        };
        assert_eq!(time_label(&time), "09:05:07 PM");
    }
}
