use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::launcher::options::{PlaybackOptions, QUALITIES};

const HWDEC_CHOICES: [&str; 2] = [
    "Yes (Default)",
    "No (Only use in case of issues with playback)",
];

/// Asks for the URL (unless one was given on the command line), the quality and hardware decoding.
pub fn prompt_playback(url: Option<String>) -> Result<(String, PlaybackOptions)> {
    let theme = ColorfulTheme::default();

    let url = match url {
        Some(url) => url,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Enter video URL")
            .interact_text()?,
    };

    let labels: Vec<String> = QUALITIES.iter().map(ToString::to_string).collect();
    let quality = Select::with_theme(&theme)
        .with_prompt("Select quality to aim for")
        .items(&labels)
        .default(2)
        .interact()?;

    let hwdec = Select::with_theme(&theme)
        .with_prompt("Use hardware decoding?")
        .items(&HWDEC_CHOICES)
        .default(0)
        .interact()?;

    Ok((
        url.trim().to_string(),
        PlaybackOptions {
            quality: QUALITIES[quality],
            hardware_decoding: hwdec == 0,
        },
    ))
}
