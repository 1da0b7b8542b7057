//! The catalogue of videos known to the session.

use crate::config::join_url;
use crate::repository::VideoId;
use crate::wire::WireVideo;

use log::debug;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub filename: String,
    /// Filled in when the video enters a [`VideoLibrary`].
    pub url: Option<String>,
}

impl From<WireVideo> for Video {
    fn from(wire: WireVideo) -> Self {
        Video {
            id: VideoId::new(wire.id),
            title: wire.title,
            description: wire.description,
            filename: wire.filename,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryState {
    pub loading: bool,
    pub videos: Vec<Video>,
    pub selected: Option<VideoId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryCommand {
    Loading,
    SetVideos(Vec<Video>),
    Select(VideoId),
    Remove(VideoId),
}

/// Owns the video list for one session. Readers hold a
/// [`watch::Receiver`] and are woken on every dispatched command.
#[derive(Debug)]
pub struct VideoLibrary {
    state: watch::Sender<LibraryState>,
    media_base_url: String,
}

impl VideoLibrary {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LibraryState::default());
        VideoLibrary {
            state,
            media_base_url: media_base_url.into(),
        }
    }

    pub fn dispatch(&self, command: LibraryCommand) {
        debug!("library command {:?}", command);
        let base = &self.media_base_url;
        self.state.send_modify(|state| match command {
            LibraryCommand::Loading => state.loading = true,
            LibraryCommand::SetVideos(videos) => {
                state.loading = false;
                state.videos = videos
                    .into_iter()
                    .map(|mut video| {
                        video.url = Some(join_url(base, &video.filename));
                        video
                    })
                    .collect();
            }
            LibraryCommand::Select(id) => state.selected = Some(id),
            LibraryCommand::Remove(id) => {
                state.videos.retain(|v| v.id != id);
                if state.selected.as_ref() == Some(&id) {
                    state.selected = None;
                }
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<LibraryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LibraryState {
        self.state.borrow().clone()
    }

    pub fn find(&self, id: &VideoId) -> Option<Video> {
        self.state.borrow().videos.iter().find(|v| &v.id == id).cloned()
    }

    pub fn selected(&self) -> Option<Video> {
        let state = self.state.borrow();
        let id = state.selected.as_ref()?;
        state.videos.iter().find(|v| &v.id == id).cloned()
    }
}
