pub mod options;
pub mod player;
pub mod prompt;

use anyhow::Result;
use console::Term;

use crate::dependencies::outcome::Resolution;

pub use player::play;
pub use prompt::prompt_playback;

/// Collects the playback choices and hands the URL to the player.
///
/// Runs whether or not every dependency resolved; a missing player surfaces as a spawn error.
pub async fn run(resolution: &Resolution, url: Option<String>) -> Result<()> {
    let (url, options) = prompt_playback(url)?;

    if let Err(e) = Term::stdout().clear_screen() {
        log::debug!("Failed to clear console: {}", e);
    }

    if options.hardware_decoding {
        log::info!("Starting video playback with hardware decoding on. This might take a second...");
    } else {
        log::info!("Starting video playback with hardware decoding off. This might take a second...");
    }

    play(resolution, &options, &url).await
}
