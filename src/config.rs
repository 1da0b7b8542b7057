use std::path::PathBuf;

/// How the native caption track is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackConfig {
    pub label: String,
    pub language: String,
    pub showing: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            label: "English".to_string(),
            language: "en".to_string(),
            showing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the file-backed store: `videos.json` plus `subtitles/<id>.json`.
    pub store_dir: PathBuf,
    /// Prefix joined with a video's filename to give its playable URL.
    pub media_base_url: String,
    pub track: TrackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_dir: PathBuf::from("."),
            media_base_url: "/public/videos".to_string(),
            track: TrackConfig::default(),
        }
    }
}

impl Config {
    pub fn video_url(&self, filename: &str) -> String {
        join_url(&self.media_base_url, filename)
    }
}

pub(crate) fn join_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_url_has_single_separator() {
        let mut config = Config::default();
        assert_eq!(config.video_url("a.mp4"), "/public/videos/a.mp4");
        config.media_base_url = "https://media.example/videos/".into();
        assert_eq!(config.video_url("a.mp4"), "https://media.example/videos/a.mp4");
    }
}
