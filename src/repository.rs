//! Persistent storage for cue lists and the video catalogue.

use crate::cue::Cue;
use crate::error::{FetchError, PublishError};
use crate::library::Video;
use crate::parser::decode_cues;
use crate::serialiser::encode_cues;
use crate::wire::{SubtitlesDocument, VideosDocument};

use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        VideoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ids double as file names, so only `[A-Za-z0-9_-]` is accepted.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where cue lists are loaded from and published to.
pub trait CueRepository {
    fn fetch_cues(&self, video: &VideoId) -> impl Future<Output = Result<Vec<Cue>, FetchError>>;

    /// Replaces the stored list for `video` wholesale.
    fn publish_cues(
        &self,
        video: &VideoId,
        cues: &[Cue],
    ) -> impl Future<Output = Result<(), PublishError>>;
}

/// Keeps each video's cues in `<root>/subtitles/<id>.json` and the
/// catalogue in `<root>/videos.json`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileRepository { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn subtitles_path(&self, video: &VideoId) -> PathBuf {
        self.root
            .join("subtitles")
            .join(format!("{}.json", video.as_str()))
    }

    /// Reads the catalogue. A missing file is an empty catalogue.
    pub async fn fetch_videos(&self) -> Result<Vec<Video>, FetchError> {
        let path = self.root.join("videos.json");
        let doc: VideosDocument = match read_json(&path).await? {
            Some(doc) => doc,
            None => VideosDocument::default(),
        };
        Ok(doc.videos.into_iter().map(Video::from).collect())
    }
}

impl CueRepository for JsonFileRepository {
    async fn fetch_cues(&self, video: &VideoId) -> Result<Vec<Cue>, FetchError> {
        if !video.is_path_safe() {
            return Err(FetchError::InvalidVideoId(video.to_string()));
        }
        let path = self.subtitles_path(video);
        let doc: Option<SubtitlesDocument> = read_json(&path).await?;
        let wire = doc.and_then(|d| d.subtitles).unwrap_or_default();
        let cues = decode_cues(wire)?;
        info!("fetched {} cues for video {}", cues.len(), video);
        Ok(cues)
    }

    async fn publish_cues(&self, video: &VideoId, cues: &[Cue]) -> Result<(), PublishError> {
        if !video.is_path_safe() {
            return Err(PublishError::InvalidVideoId(video.to_string()));
        }
        let doc = encode_cues(cues)?;
        let data = serde_json::to_vec_pretty(&doc)?;

        let path = self.subtitles_path(video);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!("could not remove {}: {}", tmp.display(), cleanup);
            }
            return Err(err.into());
        }
        info!("published {} cues for video {}", cues.len(), video);
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, FetchError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_safe_ids() {
        assert!(VideoId::new("65a1f0c2-intro_1").is_path_safe());
        assert!(!VideoId::new("").is_path_safe());
        assert!(!VideoId::new("../etc/passwd").is_path_safe());
        assert!(!VideoId::new("a b").is_path_safe());
    }

    #[tokio::test]
    async fn unsafe_id_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        let id = VideoId::new("../x");

        assert!(matches!(
            repo.fetch_cues(&id).await,
            Err(FetchError::InvalidVideoId(_))
        ));
        assert!(matches!(
            repo.publish_cues(&id, &[]).await,
            Err(PublishError::InvalidVideoId(_))
        ));
    }

    #[tokio::test]
    async fn failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        // A non-empty directory in place of the target makes the rename fail.
        let target = dir.path().join("subtitles").join("clip.json");
        std::fs::create_dir_all(target.join("blocker")).unwrap();

        let err = repo.publish_cues(&VideoId::new("clip"), &[]).await.unwrap_err();

        assert!(matches!(err, PublishError::Io(_)));
        assert!(!dir.path().join("subtitles").join("clip.json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());

        assert!(repo.fetch_cues(&VideoId::new("none")).await.unwrap().is_empty());
        assert!(repo.fetch_videos().await.unwrap().is_empty());
    }
}
