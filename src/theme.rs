use serde::{Deserialize, Serialize};

/// Colour and typography tokens handed to the renderer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub hover_color: String,
    pub selected_color: String,
    pub range_color: String,
    pub today_color: String,
    pub disabled_color: String,
    pub apply_button_color: String,
    pub cancel_button_color: String,
    pub border_radius: String,
    pub font_size: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            primary_color: "#357ebd".to_string(),
            secondary_color: "#ccc".to_string(),
            background_color: "#ffffff".to_string(),
            border_color: "#ddd".to_string(),
            text_color: "#000000".to_string(),
            hover_color: "#eee".to_string(),
            selected_color: "#357ebd".to_string(),
            range_color: "#ebf4f8".to_string(),
            today_color: "#357ebd".to_string(),
            disabled_color: "#999".to_string(),
            apply_button_color: "#357ebd".to_string(),
            cancel_button_color: "#999".to_string(),
            border_radius: "4px".to_string(),
            font_size: "15px".to_string(),
            font_family: "Arial".to_string(),
        }
    }
}

impl Theme {
    pub fn bootstrap() -> Self {
        Theme {
            primary_color: "#0d6efd".to_string(),
            secondary_color: "#6c757d".to_string(),
            background_color: "#ffffff".to_string(),
            border_color: "#dee2e6".to_string(),
            text_color: "#212529".to_string(),
            hover_color: "#e9ecef".to_string(),
            selected_color: "#0d6efd".to_string(),
            range_color: "#cfe2ff".to_string(),
            today_color: "#0d6efd".to_string(),
            disabled_color: "#adb5bd".to_string(),
            apply_button_color: "#198754".to_string(),
            cancel_button_color: "#dc3545".to_string(),
            border_radius: "6px".to_string(),
            font_size: "14px".to_string(),
            font_family: "system-ui, -apple-system, \"Segoe UI\", Roboto, Arial, sans-serif"
                .to_string(),
        }
    }

    pub fn material() -> Self {
        Theme {
            primary_color: "#1976d2".to_string(),
            secondary_color: "#757575".to_string(),
            background_color: "#ffffff".to_string(),
            border_color: "#e0e0e0".to_string(),
            text_color: "#212121".to_string(),
            hover_color: "#f5f5f5".to_string(),
            selected_color: "#1976d2".to_string(),
            range_color: "#e3f2fd".to_string(),
            today_color: "#1976d2".to_string(),
            disabled_color: "#bdbdbd".to_string(),
            apply_button_color: "#4caf50".to_string(),
            cancel_button_color: "#f44336".to_string(),
            border_radius: "4px".to_string(),
            font_size: "14px".to_string(),
            font_family: "Roboto, \"Helvetica Neue\", Arial, sans-serif".to_string(),
        }
    }

    /// Looks up a preset by name: `default`, `bootstrap` or `material`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(Theme::default()),
            "bootstrap" => Some(Theme::bootstrap()),
            "material" => Some(Theme::material()),
            _ => None,
        }
    }
}

/// Output of [`render_theme`]: CSS custom properties in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub variables: Vec<(String, String)>,
}

impl StyleDescriptor {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Renders the variables as one CSS rule for `selector`.
    pub fn to_css(&self, selector: &str) -> String {
        let mut css = format!("{selector} {{\n");
        for (key, value) in &self.variables {
            css.push_str(&format!("  {key}: {value};\n"));
        }
        css.push('}');
        css
    }
}

pub fn render_theme(theme: &Theme) -> StyleDescriptor {
    let pairs = [
        ("--datex-primary-color", &theme.primary_color),
        ("--datex-secondary-color", &theme.secondary_color),
        ("--datex-background-color", &theme.background_color),
        ("--datex-border-color", &theme.border_color),
        ("--datex-text-color", &theme.text_color),
        ("--datex-hover-color", &theme.hover_color),
        ("--datex-selected-color", &theme.selected_color),
        ("--datex-range-color", &theme.range_color),
        ("--datex-today-color", &theme.today_color),
        ("--datex-disabled-color", &theme.disabled_color),
        ("--datex-apply-button-color", &theme.apply_button_color),
        ("--datex-cancel-button-color", &theme.cancel_button_color),
        ("--datex-border-radius", &theme.border_radius),
        ("--datex-font-size", &theme.font_size),
        ("--datex-font-family", &theme.font_family),
    ];
    StyleDescriptor {
        variables: pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    }
}

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_theme_emits_every_token_in_order() {
        let style = render_theme(&Theme::default());
        assert_eq!(style.variables.len(), 15);
        assert_eq!(style.variables[0].0, "--datex-primary-color");
        assert_eq!(style.get("--datex-primary-color"), Some("#357ebd"));
        assert_eq!(style.get("--datex-font-family"), Some("Arial"));
    }

    #[test]
    fn test_render_theme_is_pure() {
        let theme = Theme::material();
        assert_eq!(render_theme(&theme), render_theme(&theme));
    }

    #[test]
    fn test_to_css_scopes_variables() {
        let css = render_theme(&Theme::bootstrap()).to_css(".datex-picker");
        assert!(css.starts_with(".datex-picker {"));
        assert!(css.contains("--datex-apply-button-color: #198754;"));
        assert!(css.ends_with('}'));
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(Theme::preset("Bootstrap"), Some(Theme::bootstrap()));
        assert_eq!(Theme::preset("material"), Some(Theme::material()));
        assert_eq!(Theme::preset("neon"), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#357ebd"), Some((0x35, 0x7e, 0xbd)));
        assert_eq!(parse_hex_color("#ccc"), Some((0xcc, 0xcc, 0xcc)));
        assert_eq!(parse_hex_color("357ebd"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_theme_yaml_partial_uses_defaults() {
        let theme: Theme = serde_norway::from_str("primary_color: \"#ff0000\"").unwrap();
        assert_eq!(theme.primary_color, "#ff0000");
        assert_eq!(theme.font_family, "Arial");
    }
}
