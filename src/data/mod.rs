pub mod holiday;
pub mod locale;
pub mod persistence;
pub mod picker_config;
pub mod saved_selection;

pub use holiday::{Holiday, HolidayData};
pub use locale::Locale;
pub use persistence::Persistable;
pub use picker_config::{DateSpan, LocaleSetting, PickerConfig, RangeEntry, RulesConfig};
pub use saved_selection::SavedSelection;
