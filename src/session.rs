//! Authoring workflow: stage a cue, commit it to the store, publish the
//! store to persistent storage.
//!
//! Only [`EditSession::hydrate`] and [`EditSession::publish`] wait on
//! storage. Everything else is synchronous.
//!
//! Publishes are ordered by sequence number and the last one issued wins:
//! a completion for an older ticket never touches local state. A successful
//! publish clears the store only if nothing was edited while it was in
//! flight, so edits made during that window survive.

use crate::cue::{Cue, CueDraft, CueEdit, DraftField};
use crate::error::{CaptionError, FetchError, PublishError};
use crate::repository::{CueRepository, VideoId};
use crate::store::CueStore;

use log::{debug, info, warn};

/// A publish that has been started but whose outcome is not yet applied.
#[derive(Debug, Clone)]
pub struct PublishTicket {
    seq: u64,
    revision: u64,
    video: VideoId,
    cues: Vec<Cue>,
}

impl PublishTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn video(&self) -> &VideoId {
        &self.video
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }
}

pub struct EditSession<R> {
    video: VideoId,
    repository: R,
    store: CueStore,
    staged: CueDraft,
    issued: u64,
}

impl<R: CueRepository> EditSession<R> {
    pub fn new(video: VideoId, repository: R) -> Self {
        EditSession {
            video,
            repository,
            store: CueStore::new(),
            staged: CueDraft::default(),
            issued: 0,
        }
    }

    /// Loads the persisted cues, replacing whatever the store held.
    pub async fn hydrate(&mut self) -> Result<usize, FetchError> {
        let cues = self.repository.fetch_cues(&self.video).await?;
        let count = cues.len();
        self.store.replace(cues);
        info!("hydrated {} cues for video {}", count, self.video);
        Ok(count)
    }

    pub fn video(&self) -> &VideoId {
        &self.video
    }

    pub fn store(&self) -> &CueStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn staged(&self) -> &CueDraft {
        &self.staged
    }

    pub fn staged_mut(&mut self) -> &mut CueDraft {
        &mut self.staged
    }

    /// Starts a fresh, empty draft.
    pub fn stage_new(&mut self) -> &mut CueDraft {
        self.staged = CueDraft::default();
        &mut self.staged
    }

    pub fn set_staged(&mut self, field: DraftField, value: impl Into<String>) {
        self.staged.set(field, value);
    }

    /// Appends the draft to the store. On error the draft is left exactly
    /// as it was so the user can correct it.
    pub fn commit_staged(&mut self) -> Result<(), CaptionError> {
        let cue = self.staged.to_cue()?;
        debug!("committing cue {} --> {}", cue.start(), cue.end());
        self.store.append(cue);
        self.staged = CueDraft::default();
        Ok(())
    }

    pub fn update(&mut self, index: usize, edit: CueEdit) -> Result<(), CaptionError> {
        self.store.update(index, edit)
    }

    /// Validates and snapshots the store for publishing.
    pub fn begin_publish(&mut self) -> Result<PublishTicket, PublishError> {
        for (index, cue) in self.store.snapshot().iter().enumerate() {
            cue.validate()
                .map_err(|source| PublishError::Invalid { index, source })?;
        }
        self.issued += 1;
        Ok(PublishTicket {
            seq: self.issued,
            revision: self.store.revision(),
            video: self.video.clone(),
            cues: self.store.snapshot().to_vec(),
        })
    }

    /// Applies the outcome of a publish. Failures of the latest publish
    /// leave the store and the draft untouched and are handed back to the
    /// caller. Outcomes for older tickets are only logged.
    pub fn finish_publish(
        &mut self,
        ticket: PublishTicket,
        outcome: Result<(), PublishError>,
    ) -> Result<(), PublishError> {
        if ticket.seq != self.issued {
            match outcome {
                Ok(()) => warn!(
                    "publish #{} finished after #{} was issued; ignoring",
                    ticket.seq, self.issued
                ),
                Err(err) => warn!(
                    "publish #{} failed after #{} was issued; ignoring: {}",
                    ticket.seq, self.issued, err
                ),
            }
            return Ok(());
        }
        if let Err(err) = outcome {
            warn!(
                "publish #{} for video {} failed: {}",
                ticket.seq, ticket.video, err
            );
            return Err(err);
        }
        if self.store.revision() == ticket.revision {
            self.store.reset();
        } else {
            info!("cue store changed during publish #{}; keeping newer edits", ticket.seq);
        }
        self.staged = CueDraft::default();
        info!("publish #{} for video {} succeeded", ticket.seq, ticket.video);
        Ok(())
    }

    /// Sends the whole store to the repository.
    pub async fn publish(&mut self) -> Result<(), PublishError> {
        let ticket = self.begin_publish()?;
        let outcome = self
            .repository
            .publish_cues(&ticket.video, &ticket.cues)
            .await;
        self.finish_publish(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Timestamp;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeRepository {
        stored: RefCell<Vec<Cue>>,
        fail: Cell<bool>,
        publishes: Cell<usize>,
    }

    impl CueRepository for FakeRepository {
        async fn fetch_cues(&self, _video: &VideoId) -> Result<Vec<Cue>, FetchError> {
            Ok(self.stored.borrow().clone())
        }

        async fn publish_cues(&self, _video: &VideoId, cues: &[Cue]) -> Result<(), PublishError> {
            self.publishes.set(self.publishes.get() + 1);
            if self.fail.get() {
                return Err(PublishError::Rejected("offline".into()));
            }
            *self.stored.borrow_mut() = cues.to_vec();
            Ok(())
        }
    }

    fn session() -> EditSession<FakeRepository> {
        EditSession::new(VideoId::new("v1"), FakeRepository::default())
    }

    fn cue(start: u64, end: u64, text: &str) -> Cue {
        Cue::new(Timestamp::from_millis(start), Timestamp::from_millis(end), text).unwrap()
    }

    fn stage(session: &mut EditSession<FakeRepository>, start: &str, end: &str, text: &str) {
        let draft = session.stage_new();
        draft.start = start.into();
        draft.end = end.into();
        draft.text = text.into();
    }

    #[test]
    fn stage_new_is_empty() {
        let mut session = session();
        session.set_staged(DraftField::Text, "leftover");
        assert!(session.stage_new().is_empty());
    }

    #[test]
    fn commit_appends_and_clears_draft() {
        let mut session = session();
        stage(&mut session, "00:00:01,000", "00:00:03,500", "Hello");
        session.commit_staged().unwrap();

        assert_eq!(session.store().snapshot(), [cue(1000, 3500, "Hello")]);
        assert!(session.staged().is_empty());
    }

    #[test]
    fn malformed_end_keeps_draft_and_store() {
        let mut session = session();
        session.store.append(cue(0, 500, "existing"));
        stage(&mut session, "00:00:01,000", "00:00:3,500", "Hello");
        let before = session.staged().clone();

        assert_eq!(
            session.commit_staged(),
            Err(CaptionError::MalformedTimestamp("00:00:3,500".into()))
        );
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.staged(), &before);
        assert_eq!(session.staged().start, "00:00:01,000");
        assert_eq!(session.staged().text, "Hello");
    }

    #[test]
    fn inverted_draft_is_rejected() {
        let mut session = session();
        stage(&mut session, "00:00:05,000", "00:00:01,000", "backwards");

        assert!(matches!(
            session.commit_staged(),
            Err(CaptionError::InvalidInterval { .. })
        ));
        assert!(session.store().is_empty());
        assert_eq!(session.staged().text, "backwards");
    }

    #[tokio::test]
    async fn publish_success_resets_everything() {
        let mut session = session();
        stage(&mut session, "00:00:01,000", "00:00:02,000", "a");
        session.commit_staged().unwrap();
        session.set_staged(DraftField::Text, "half typed");

        session.publish().await.unwrap();

        assert!(session.store().is_empty());
        assert!(session.staged().is_empty());
        assert_eq!(*session.repository().stored.borrow(), [cue(1000, 2000, "a")]);
    }

    #[tokio::test]
    async fn publish_failure_preserves_state() {
        let mut session = session();
        stage(&mut session, "00:00:01,000", "00:00:02,000", "a");
        session.commit_staged().unwrap();
        session.set_staged(DraftField::Start, "00:00:04,000");
        session.repository.fail.set(true);

        let before = session.store().snapshot().to_vec();
        let staged = session.staged().clone();
        let err = session.publish().await.unwrap_err();

        assert!(matches!(err, PublishError::Rejected(_)));
        assert_eq!(session.store().snapshot(), before.as_slice());
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.staged(), &staged);
    }

    #[tokio::test]
    async fn inverted_cue_is_not_sent() {
        let mut session = session();
        session.store.append(cue(1000, 2000, "a"));
        session.update(0, CueEdit::Start(Timestamp::from_millis(3000))).unwrap();

        let err = session.publish().await.unwrap_err();
        assert!(matches!(err, PublishError::Invalid { index: 0, .. }));
        assert_eq!(session.repository().publishes.get(), 0);
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut session = session();
        session.store.append(cue(0, 1000, "a"));
        let first = session.begin_publish().unwrap();
        let second = session.begin_publish().unwrap();
        assert!(second.seq() > first.seq());

        session.finish_publish(first, Ok(())).unwrap();
        assert_eq!(session.store().len(), 1);

        session.finish_publish(second, Ok(())).unwrap();
        assert!(session.store().is_empty());
    }

    #[test]
    fn older_failure_after_newer_success_is_ignored() {
        let mut session = session();
        session.store.append(cue(0, 1000, "a"));
        let first = session.begin_publish().unwrap();
        let second = session.begin_publish().unwrap();

        session.finish_publish(second, Ok(())).unwrap();
        assert!(session.store().is_empty());

        let outcome = session.finish_publish(first, Err(PublishError::Rejected("timeout".into())));
        assert!(outcome.is_ok());
        assert!(session.store().is_empty());
    }

    #[test]
    fn latest_failure_is_reported() {
        let mut session = session();
        session.store.append(cue(0, 1000, "a"));
        let ticket = session.begin_publish().unwrap();

        let outcome = session.finish_publish(ticket, Err(PublishError::Rejected("timeout".into())));
        assert!(matches!(outcome, Err(PublishError::Rejected(_))));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn edits_during_publish_survive_success() {
        let mut session = session();
        session.store.append(cue(0, 1000, "a"));
        let ticket = session.begin_publish().unwrap();
        assert_eq!(ticket.cues(), [cue(0, 1000, "a")]);

        session.store.append(cue(1000, 2000, "b"));
        session.finish_publish(ticket, Ok(())).unwrap();

        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn update_out_of_range() {
        let mut session = session();
        assert_eq!(
            session.update(3, CueEdit::Text("x".into())),
            Err(CaptionError::IndexOutOfRange { index: 3, len: 0 })
        );
    }

    #[tokio::test]
    async fn hydrate_replaces_store() {
        let mut session = session();
        *session.repository.stored.borrow_mut() = vec![cue(0, 1000, "a"), cue(1000, 2000, "b")];
        session.store.append(cue(5000, 6000, "local"));

        assert_eq!(session.hydrate().await.unwrap(), 2);
        assert_eq!(session.store().snapshot()[1].text(), "b");
    }
}
