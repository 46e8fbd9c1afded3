use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;
use crate::settings::{self, Settings, SettingsSource, TOKEN_ENV};

fn mask_value(s: &str) -> String {
    let head: String = s.chars().take(2).collect();
    if s.chars().count() <= 2 {
        "****".to_string()
    } else {
        format!("{head}****")
    }
}

/// Show the effective settings and their source.
pub(crate) fn run_config_show(
    settings: &Settings,
    source: &SettingsSource,
) -> Result<(), CliError> {
    log::info!(
        "{}",
        "Tabletop Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    log::info!(
        "  Settings from: {}",
        source.if_supports_color(Stdout, |t| t.cyan())
    );
    if std::env::var(TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty()) {
        log::info!(
            "  API token:     {}",
            format!("from {TOKEN_ENV}").if_supports_color(Stdout, |t| t.green())
        );
    }
    log::info!("");

    let mut shown = settings.clone();
    shown.remote.api_token = shown.remote.api_token.as_deref().map(mask_value);
    for line in shown.to_toml()?.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

/// Print the settings file path in use, or where `init` would write.
pub(crate) fn run_config_path(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => settings::locate(None)?
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(settings::user_settings_path),
    };
    println!("{}", path.display());
    Ok(())
}

/// Write a default settings file to `--config` or the user config dir.
pub(crate) fn run_config_init(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(settings::user_settings_path);
    settings::write_default(&path)?;
    log::info!(
        "{} Wrote default settings to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_value("ab"), "****");
        assert_eq!(mask_value("abcdef"), "ab****");
    }
}
