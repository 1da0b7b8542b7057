//! JSON shapes exchanged with persistent storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCue {
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

/// `{"subtitles": [...]}`. A missing or `null` list reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitlesDocument {
    #[serde(default)]
    pub subtitles: Option<Vec<WireCue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVideo {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideosDocument {
    #[serde(default)]
    pub videos: Vec<WireVideo>,
}
