use super::domain::{Candidate, CandidateId, Job, JobId, JobPatch, Stage};
use super::engine::{EngineError, SyncEngine};
use super::query::{CandidateFilter, JobFilter, PageRequest};
use super::store::RecordStore;

/// Error raised by the reconciliation layer. `RolledBack` means the
/// optimistic local state was discarded and the board once again shows
/// the last confirmed state.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("mutation rolled back: {source}")]
    RolledBack {
        #[source]
        source: EngineError,
    },
    #[error("board index out of range: {0}")]
    OutOfRange(usize),
    #[error("candidate '{0}' is not on the board")]
    UnknownCandidate(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Client-visible ordered job list, kept in sync with the engine through
/// optimistic apply and confirm-or-rollback. The displayed state never
/// diverges permanently from confirmed server state: a rejected intent
/// restores the snapshot taken before the local mutation.
#[derive(Debug, Default)]
pub struct JobBoard {
    jobs: Vec<Job>,
}

impl JobBoard {
    pub async fn load<S>(engine: &SyncEngine<S>) -> Result<Self, EngineError>
    where
        S: RecordStore + 'static,
    {
        let mut board = Self::default();
        board.refresh(engine).await?;
        Ok(board)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Re-fetch the authoritative list. The reorder path always ends
    /// here on success, since server-side shifts may not exactly match
    /// the locally spliced guess.
    pub async fn refresh<S>(&mut self, engine: &SyncEngine<S>) -> Result<(), EngineError>
    where
        S: RecordStore + 'static,
    {
        let page = engine
            .list_jobs(JobFilter::default(), PageRequest::new(1, usize::MAX))
            .await?;
        self.jobs = page.data;
        Ok(())
    }

    /// Move the job at `from_index` to `to_index`: splice locally for
    /// immediate feedback, dispatch the reorder intent, then either
    /// refresh from the engine or restore the pre-splice snapshot.
    pub async fn move_job<S>(
        &mut self,
        engine: &SyncEngine<S>,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), ReconcileError>
    where
        S: RecordStore + 'static,
    {
        if from_index >= self.jobs.len() {
            return Err(ReconcileError::OutOfRange(from_index));
        }
        if to_index >= self.jobs.len() {
            return Err(ReconcileError::OutOfRange(to_index));
        }

        let snapshot = self.jobs.clone();
        let from_order = self.jobs[from_index].order;
        let to_order = self.jobs[to_index].order;
        let moved_id = self.jobs[from_index].id.clone();

        let moved = self.jobs.remove(from_index);
        self.jobs.insert(to_index, moved);

        match engine.reorder_job(&moved_id, from_order, to_order).await {
            Ok(()) => {
                self.refresh(engine).await?;
                Ok(())
            }
            Err(source) => {
                self.jobs = snapshot;
                Err(ReconcileError::RolledBack { source })
            }
        }
    }

    /// Single-record edit with low failure consequence: no optimistic
    /// phase, just wait for confirmation and fold the result in.
    pub async fn patch_job<S>(
        &mut self,
        engine: &SyncEngine<S>,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<Job, ReconcileError>
    where
        S: RecordStore + 'static,
    {
        let confirmed = engine.update_job(id, patch).await?;
        if let Some(slot) = self.jobs.iter_mut().find(|job| job.id == *id) {
            *slot = confirmed.clone();
        }
        Ok(confirmed)
    }
}

/// Kanban-style candidate view with optimistic stage moves.
#[derive(Debug, Default)]
pub struct CandidateBoard {
    candidates: Vec<Candidate>,
}

impl CandidateBoard {
    pub async fn load<S>(
        engine: &SyncEngine<S>,
        filter: CandidateFilter,
    ) -> Result<Self, EngineError>
    where
        S: RecordStore + 'static,
    {
        let page = engine
            .list_candidates(filter, PageRequest::new(1, usize::MAX))
            .await?;
        Ok(Self {
            candidates: page.data,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Apply the stage optimistically, dispatch the update, and either
    /// adopt the confirmed record or restore the snapshot.
    pub async fn move_stage<S>(
        &mut self,
        engine: &SyncEngine<S>,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<(), ReconcileError>
    where
        S: RecordStore + 'static,
    {
        let index = self
            .candidates
            .iter()
            .position(|candidate| candidate.id == *id)
            .ok_or_else(|| ReconcileError::UnknownCandidate(id.0.clone()))?;

        let snapshot = self.candidates[index].clone();
        self.candidates[index].stage = stage;

        let patch = super::domain::CandidatePatch {
            stage: Some(stage),
            ..Default::default()
        };
        match engine.update_candidate(id, patch).await {
            Ok(confirmed) => {
                self.candidates[index] = confirmed;
                Ok(())
            }
            Err(source) => {
                self.candidates[index] = snapshot;
                Err(ReconcileError::RolledBack { source })
            }
        }
    }
}
