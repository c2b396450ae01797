use crate::ui::calendar_view::{run_app, App};
use crate::ui::{restore_terminal, setup_terminal};
use anyhow::Result;
use chrono::Local;
use datex::calc::format_date;
use datex::data::{HolidayData, Persistable, PickerConfig, SavedSelection};
use tracing::info;

pub fn run() -> Result<()> {
    let config = PickerConfig::load()?;
    let holidays = HolidayData::load()?;
    let saved = SavedSelection::load()?;

    let today = Local::now().date_naive();
    let mut options = config.to_options(today, &holidays);
    saved.apply_to(&mut options);
    let format = config.locale().format;
    let mut app = App::new(options)?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;

    match app.finish() {
        Some(selection) => {
            write_applied(&selection, &format, &mut std::io::stdout())?;
            selection.save()?;
            info!(start = ?selection.start, end = ?selection.end, "selection saved");
        }
        None => println!("No range applied."),
    }
    Ok(())
}

pub(crate) fn write_applied<W: std::io::Write>(
    selection: &SavedSelection,
    format: &str,
    out: &mut W,
) -> Result<()> {
    let (Some(start), Some(end)) = (selection.start, selection.end) else {
        writeln!(out, "No range applied.")?;
        return Ok(());
    };
    write!(
        out,
        "Applied: {} - {}",
        format_date(start, format),
        format_date(end, format)
    )?;
    match &selection.label {
        Some(label) => writeln!(out, " ({label})")?,
        None => writeln!(out)?,
    }
    Ok(())
}
