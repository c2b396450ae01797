use crate::calc::{end_of_day, ValidationRules};
use crate::data::holiday::HolidayData;
use crate::data::locale::Locale;
use crate::data::persistence::Persistable;
use crate::picker::host::{Drops, Opens};
use crate::picker::options::PickerOptions;
use crate::picker::ranges::{common_ranges, NamedRange};
use crate::theme::Theme;
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Either a built-in locale name (`en`, `es`, `fr`, `de`, ...) or a full
/// inline locale table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum LocaleSetting {
    Name(String),
    Inline(Locale),
}

impl Default for LocaleSetting {
    fn default() -> Self {
        LocaleSetting::Name("en".to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RangeEntry {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The serializable part of the validation rules. Custom predicates only
/// exist in code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RulesConfig {
    pub disabled_dates: Vec<NaiveDate>,
    /// Sunday-based, 0..=6.
    pub disabled_weekdays: Vec<u32>,
    pub business_days_only: bool,
    pub min_days_between: Option<i64>,
    pub max_days_between: Option<i64>,
    pub enabled_ranges: Vec<DateSpan>,
    /// Reject the dates listed in holidays.yaml.
    pub disable_holidays: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            disabled_dates: Vec::new(),
            disabled_weekdays: Vec::new(),
            business_days_only: false,
            min_days_between: None,
            max_days_between: None,
            enabled_ranges: Vec::new(),
            disable_holidays: true,
        }
    }
}

impl RulesConfig {
    pub fn to_rules(&self, holidays: &HolidayData) -> ValidationRules {
        let disabled_weekdays = self
            .disabled_weekdays
            .iter()
            .copied()
            .filter(|day| {
                let valid = *day < 7;
                if !valid {
                    warn!(day, "ignoring weekday outside 0..=6");
                }
                valid
            })
            .collect();
        ValidationRules {
            disabled_dates: self.disabled_dates.iter().copied().collect(),
            disabled_weekdays,
            business_days_only: self.business_days_only,
            min_days_between: self.min_days_between,
            max_days_between: self.max_days_between,
            custom: None,
            holidays: if self.disable_holidays {
                holidays.holiday_dates()
            } else {
                Default::default()
            },
            enabled_ranges: self
                .enabled_ranges
                .iter()
                .map(|span| (span.start.min(span.end), span.start.max(span.end)))
                .collect(),
        }
    }
}

/// The `picker` section of config.yaml. Every field is optional in the file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PickerConfig {
    pub single_date_picker: bool,
    pub linked_calendars: bool,
    pub auto_apply: bool,
    pub always_show_calendars: bool,
    pub show_custom_range_label: bool,
    pub time_picker: bool,
    pub time_picker_24_hour: bool,
    pub time_picker_increment_minutes: u32,
    pub time_picker_seconds: bool,
    pub restart_on_earlier_date: bool,
    pub overflow_days_selectable: bool,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub max_span_days: Option<i64>,
    pub opens: Opens,
    pub drops: Drops,
    pub locale: LocaleSetting,
    pub theme: String,
    /// Prepend Today, Yesterday, Last 7 Days, ... to `ranges`.
    pub preset_ranges: bool,
    pub ranges: Vec<RangeEntry>,
    pub validation: RulesConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        let defaults = PickerOptions::default();
        PickerConfig {
            single_date_picker: defaults.single_date_picker,
            linked_calendars: defaults.linked_calendars,
            auto_apply: defaults.auto_apply,
            always_show_calendars: defaults.always_show_calendars,
            show_custom_range_label: defaults.show_custom_range_label,
            time_picker: defaults.time_picker,
            time_picker_24_hour: defaults.time_picker_24_hour,
            time_picker_increment_minutes: defaults.time_picker_increment_minutes,
            time_picker_seconds: defaults.time_picker_seconds,
            restart_on_earlier_date: defaults.restart_on_earlier_date,
            overflow_days_selectable: defaults.overflow_days_selectable,
            min_date: None,
            max_date: None,
            min_year: None,
            max_year: None,
            max_span_days: None,
            opens: defaults.opens,
            drops: defaults.drops,
            locale: LocaleSetting::default(),
            theme: "default".to_string(),
            preset_ranges: true,
            ranges: Vec::new(),
            validation: RulesConfig::default(),
        }
    }
}

/// Reads the `picker` key from config.yaml; other keys are ignored.
#[derive(Serialize, Deserialize, Default, Debug)]
struct ConfigWrapper {
    #[serde(default)]
    picker: PickerConfig,
}

impl Persistable for ConfigWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl PickerConfig {
    pub fn load() -> Result<Self> {
        Ok(ConfigWrapper::load()?.picker)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        Ok(ConfigWrapper::load_from(dir)?.picker)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        ConfigWrapper {
            picker: self.clone(),
        }
        .save_to(dir)
    }

    /// Unknown names fall back to English.
    pub fn locale(&self) -> Locale {
        match &self.locale {
            LocaleSetting::Inline(locale) => locale.clone(),
            LocaleSetting::Name(name) => Locale::named(name).unwrap_or_else(|| {
                warn!(name = %name, "unknown locale, using English");
                Locale::english()
            }),
        }
    }

    /// Unknown presets fall back to the default theme.
    pub fn theme(&self) -> Theme {
        Theme::preset(&self.theme).unwrap_or_else(|| {
            warn!(theme = %self.theme, "unknown theme preset, using default");
            Theme::default()
        })
    }

    pub fn named_ranges(&self, today: NaiveDate) -> Vec<NamedRange> {
        let mut ranges = if self.preset_ranges {
            common_ranges(today)
        } else {
            Vec::new()
        };
        ranges.extend(self.ranges.iter().map(|entry| {
            NamedRange::new(
                &entry.label,
                entry.start.and_time(NaiveTime::MIN),
                entry.end.and_time(NaiveTime::MIN),
            )
        }));
        ranges
    }

    pub fn to_options(&self, today: NaiveDate, holidays: &HolidayData) -> PickerOptions {
        PickerOptions {
            min_date: self.min_date.map(|d| d.and_time(NaiveTime::MIN)),
            max_date: self.max_date.map(|d| end_of_day(d.and_time(NaiveTime::MIN))),
            min_year: self.min_year,
            max_year: self.max_year,
            max_span_days: self.max_span_days,
            auto_apply: self.auto_apply,
            single_date_picker: self.single_date_picker,
            linked_calendars: self.linked_calendars,
            always_show_calendars: self.always_show_calendars,
            show_custom_range_label: self.show_custom_range_label,
            time_picker: self.time_picker,
            time_picker_24_hour: self.time_picker_24_hour,
            time_picker_increment_minutes: self.time_picker_increment_minutes,
            time_picker_seconds: self.time_picker_seconds,
            restart_on_earlier_date: self.restart_on_earlier_date,
            overflow_days_selectable: self.overflow_days_selectable,
            ranges: self.named_ranges(today),
            locale: Some(self.locale()),
            validation: self.validation.to_rules(holidays),
            opens: self.opens,
            drops: self.drops,
            theme: self.theme(),
            ..Default::default()
        }
    }
}
