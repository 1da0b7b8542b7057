//! The in-memory list of cues being authored.

use crate::cue::{Cue, CueEdit};
use crate::error::CaptionError;

use log::debug;
use tokio::sync::watch;

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueCommand {
    Append(Cue),
    Update { index: usize, edit: CueEdit },
    Replace(Vec<Cue>),
    Reset,
}

/// Ordered cues in authoring order.
///
/// Neither sorting nor overlap checks happen here. Overlapping cues are
/// allowed, and resolution then favours the lowest index, which may well
/// hide a later cue entirely. That is the established behaviour, so it is
/// kept rather than guessed at.
#[derive(Debug)]
pub struct CueStore {
    cues: Vec<Cue>,
    revision: watch::Sender<u64>,
}

impl Default for CueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CueStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        CueStore {
            cues: Vec::new(),
            revision,
        }
    }

    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let mut store = Self::new();
        store.cues = cues;
        store
    }

    pub fn apply(&mut self, command: CueCommand) -> Result<(), CaptionError> {
        match command {
            CueCommand::Append(cue) => self.append(cue),
            CueCommand::Update { index, edit } => self.update(index, edit)?,
            CueCommand::Replace(cues) => self.replace(cues),
            CueCommand::Reset => self.reset(),
        }
        Ok(())
    }

    pub fn append(&mut self, cue: Cue) {
        self.cues.push(cue);
        self.bump();
    }

    pub fn update(&mut self, index: usize, edit: CueEdit) -> Result<(), CaptionError> {
        let len = self.cues.len();
        let cue = self
            .cues
            .get_mut(index)
            .ok_or(CaptionError::IndexOutOfRange { index, len })?;
        edit.apply_to(cue);
        self.bump();
        Ok(())
    }

    pub fn replace(&mut self, cues: Vec<Cue>) {
        self.cues = cues;
        self.bump();
    }

    pub fn reset(&mut self) {
        self.cues.clear();
        self.bump();
    }

    fn bump(&mut self) {
        self.revision.send_modify(|rev| *rev += 1);
        debug!(
            "cue store now at revision {} with {} cues",
            self.revision(),
            self.cues.len()
        );
    }

    /// Read-only view, in store order.
    pub fn snapshot(&self) -> &[Cue] {
        &self.cues
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Bumped once per successful mutation.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Observers are woken with the new revision after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
