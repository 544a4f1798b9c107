//! Optional TOML configuration: external tool names and display colors.

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub commands: Commands,
    pub theme: Theme,
}

/// Names of the host tools the gateway shells out to; overridable for
/// nonstandard installs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Commands {
    pub aconnect: String,
    pub pw_cli: String,
    pub pw_link: String,
}

impl Default for Commands {
    fn default() -> Self {
        Commands {
            aconnect: "aconnect".into(),
            pw_cli: "pw-cli".into(),
            pw_link: "pw-link".into(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub highlight: String,
    pub marked: String,
    pub label: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            highlight: "cyan".into(),
            marked: "yellow".into(),
            label: "darkgray".into(),
        }
    }
}

impl Theme {
    pub fn highlight_color(&self) -> Color {
        parse_color(&self.highlight)
    }

    pub fn marked_color(&self) -> Color {
        parse_color(&self.marked)
    }

    pub fn label_color(&self) -> Color {
        parse_color(&self.label)
    }
}

fn parse_color(name: &str) -> Color {
    name.parse().unwrap_or(Color::Reset)
}

/// Load the config file when a path was given; otherwise defaults. An
/// explicitly named file that is unreadable or invalid is an error.
pub fn load(path: Option<&str>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_a_file() {
        let config = load(None).unwrap();
        assert_eq!(config.commands.aconnect, "aconnect");
        assert_eq!(config.commands.pw_cli, "pw-cli");
        assert_eq!(config.theme.highlight_color(), Color::Cyan);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[commands]\naconnect = \"/opt/alsa/aconnect\"").unwrap();
        let config = load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.commands.aconnect, "/opt/alsa/aconnect");
        assert_eq!(config.commands.pw_link, "pw-link");
        assert_eq!(config.theme.marked, "yellow");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load(Some("/nonexistent/patchwire.toml")).is_err());
    }

    #[test]
    fn unknown_color_names_fall_back() {
        let theme = Theme {
            highlight: "not-a-color".into(),
            ..Theme::default()
        };
        assert_eq!(theme.highlight_color(), Color::Reset);
    }
}
