use serde::{Deserialize, Serialize};

const ENGLISH_DAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display strings and formats for one language.
///
/// `days_of_week` is Sunday-first; the calendar header rotates it by `first_day`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Locale {
    pub format: String,
    pub separator: String,
    pub apply_label: String,
    pub cancel_label: String,
    pub custom_range_label: String,
    pub days_of_week: Vec<String>,
    pub month_names: Vec<String>,
    pub first_day: u32,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::english()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Locale {
    pub fn english() -> Self {
        Locale {
            format: "MM/DD/YYYY".to_string(),
            separator: " - ".to_string(),
            apply_label: "Apply".to_string(),
            cancel_label: "Cancel".to_string(),
            custom_range_label: "Custom Range".to_string(),
            days_of_week: strings(&ENGLISH_DAYS),
            month_names: strings(&ENGLISH_MONTHS),
            first_day: 0,
        }
    }

    pub fn spanish() -> Self {
        Locale {
            format: "DD/MM/YYYY".to_string(),
            separator: " - ".to_string(),
            apply_label: "Aplicar".to_string(),
            cancel_label: "Cancelar".to_string(),
            custom_range_label: "Rango Personalizado".to_string(),
            days_of_week: strings(&["Do", "Lu", "Ma", "Mi", "Ju", "Vi", "Sa"]),
            month_names: strings(&[
                "Enero",
                "Febrero",
                "Marzo",
                "Abril",
                "Mayo",
                "Junio",
                "Julio",
                "Agosto",
                "Septiembre",
                "Octubre",
                "Noviembre",
                "Diciembre",
            ]),
            first_day: 1,
        }
    }

    pub fn spanish_with_time() -> Self {
        Locale {
            format: "DD/MM/YYYY HH:mm".to_string(),
            ..Locale::spanish()
        }
    }

    pub fn french() -> Self {
        Locale {
            format: "DD/MM/YYYY".to_string(),
            separator: " - ".to_string(),
            apply_label: "Appliquer".to_string(),
            cancel_label: "Annuler".to_string(),
            custom_range_label: "Plage Personnalisée".to_string(),
            days_of_week: strings(&["Di", "Lu", "Ma", "Me", "Je", "Ve", "Sa"]),
            month_names: strings(&[
                "Janvier",
                "Février",
                "Mars",
                "Avril",
                "Mai",
                "Juin",
                "Juillet",
                "Août",
                "Septembre",
                "Octobre",
                "Novembre",
                "Décembre",
            ]),
            first_day: 1,
        }
    }

    pub fn german() -> Self {
        Locale {
            format: "DD.MM.YYYY".to_string(),
            separator: " - ".to_string(),
            apply_label: "Anwenden".to_string(),
            cancel_label: "Abbrechen".to_string(),
            custom_range_label: "Benutzerdefiniert".to_string(),
            days_of_week: strings(&["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"]),
            month_names: strings(&[
                "Januar",
                "Februar",
                "März",
                "April",
                "Mai",
                "Juni",
                "Juli",
                "August",
                "September",
                "Oktober",
                "November",
                "Dezember",
            ]),
            first_day: 1,
        }
    }

    /// Built-in locale by name (`en`, `es`, `es-time`, `fr`, `de`).
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Locale::english()),
            "es" | "spanish" => Some(Locale::spanish()),
            "es-time" => Some(Locale::spanish_with_time()),
            "fr" | "french" => Some(Locale::french()),
            "de" | "german" => Some(Locale::german()),
            _ => None,
        }
    }

    /// Repairs malformed fields instead of rejecting them.
    pub fn normalized(mut self) -> Self {
        self.first_day %= 7;
        if self.days_of_week.len() != 7 {
            self.days_of_week = strings(&ENGLISH_DAYS);
        }
        if self.month_names.len() != 12 {
            self.month_names = strings(&ENGLISH_MONTHS);
        }
        if self.format.trim().is_empty() {
            self.format = "MM/DD/YYYY".to_string();
        }
        self
    }

    /// Month name for a 1-based month number.
    pub fn month_name(&self, month: u32) -> &str {
        month
            .checked_sub(1)
            .and_then(|idx| self.month_names.get(idx as usize))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Header labels in display order, starting at `first_day`.
    pub fn weekday_header(&self) -> Vec<&str> {
        (0..7)
            .map(|i| {
                let idx = ((self.first_day + i) % 7) as usize;
                self.days_of_week.get(idx).map(String::as_str).unwrap_or("")
            })
            .collect()
    }
}
