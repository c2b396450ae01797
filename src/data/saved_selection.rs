use crate::data::persistence::Persistable;
use crate::picker::options::PickerOptions;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `selection.json`: the last applied range, restored on the next run.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct SavedSelection {
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Persistable for SavedSelection {
    fn filename() -> &'static str {
        "selection.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl SavedSelection {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, label: Option<&str>) -> Self {
        SavedSelection {
            start: Some(start),
            end: Some(end),
            label: label.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// Seeds the initial range. A lone end is ignored.
    pub fn apply_to(&self, options: &mut PickerOptions) {
        if let Some(start) = self.start {
            options.start_date = Some(start);
            options.end_date = Some(self.end.unwrap_or(start));
        }
    }
}
