use std::fmt;

/// Highest vertical resolution yt-dlp is asked to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

pub const QUALITIES: [Quality; 8] = [
    Quality(2160),
    Quality(1440),
    Quality(1080),
    Quality(720),
    Quality(480),
    Quality(360),
    Quality(240),
    Quality(144),
];

impl Quality {
    pub fn height(&self) -> u32 {
        self.0
    }

    pub fn ytdl_format(&self) -> String {
        let height = self.height();
        format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub quality: Quality,
    pub hardware_decoding: bool,
}

impl PlaybackOptions {
    pub fn player_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![format!("--ytdl-format={}", self.quality.ytdl_format())];
        if self.hardware_decoding {
            args.push("--hwdec=auto".to_string());
        }
        args.push(url.to_string());
        args
    }
}
