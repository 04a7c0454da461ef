//! Settings CLI commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{SettingsPatch, UiLabels};

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show site settings
    Show,

    /// Merge a JSON object into the settings
    ///
    /// Example: wiki settings set '{"name": "Docs", "accentColor": "green"}'
    Set {
        /// JSON object with the fields to change
        patch: String,
    },

    /// Replace the UI labels with a JSON object
    Labels {
        /// Complete labels object
        labels: String,
    },
}

pub async fn run(cmd: SettingsCommands, output: &Output) -> Result<()> {
    match cmd {
        SettingsCommands::Show => show_settings(output).await,
        SettingsCommands::Set { patch } => {
            let patch: SettingsPatch =
                serde_json::from_str(&patch).context("Invalid settings patch")?;
            if patch.is_empty() {
                bail!("Settings patch is empty");
            }
            save(output, |session| session.edit(|store| store.update_settings(patch))).await
        }
        SettingsCommands::Labels { labels } => {
            let labels: UiLabels = serde_json::from_str(&labels).context("Invalid UI labels")?;
            save(output, |session| session.edit(|store| store.update_ui_labels(labels))).await
        }
    }
}

async fn show_settings(output: &Output) -> Result<()> {
    let session = Session::open(output).await?;
    let settings = session.read(|store| store.document().settings.clone())?;

    if output.is_json() {
        output.data(&settings);
    } else {
        println!("Name: {}", settings.name);
        println!("Description: {}", settings.description);
        println!("Logo text: {}", settings.logo_text);
        if let Some(version) = &settings.version {
            println!("Version: {}", version);
        }
        if let Some(url) = &settings.github_url {
            println!("GitHub: {}", url);
        }
        println!("Default page: {}", settings.default_slug);
        println!("Accent color: {}", settings.accent_color.as_str());
        println!(
            "Toggles: theme={} search={} github={}",
            settings.show_theme_toggle, settings.show_search, settings.show_github
        );

        if !settings.navbar_links.is_empty() {
            println!("\nNavbar links:");
            for link in &settings.navbar_links {
                println!("  {} -> {}", link.label, link.href);
            }
        }
    }

    session.close().await
}

async fn save(output: &Output, apply: impl FnOnce(&Session) -> Result<bool>) -> Result<()> {
    let session = Session::open(output).await?;
    let changed = apply(&session)?;
    session.close().await?;

    if changed {
        output.success("Updated settings");
    } else {
        output.success("No changes");
    }
    Ok(())
}
