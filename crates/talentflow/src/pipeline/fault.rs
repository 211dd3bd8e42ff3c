use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulatorConfig;

/// Write intents subject to failure injection. Reads only pay latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    CreateJob,
    UpdateJob,
    ReorderJob,
    UpdateCandidate,
    UpsertAssessment,
    SubmitResponse,
}

impl WriteOp {
    pub const fn label(self) -> &'static str {
        match self {
            WriteOp::CreateJob => "create job",
            WriteOp::UpdateJob => "update job",
            WriteOp::ReorderJob => "reorder job",
            WriteOp::UpdateCandidate => "update candidate",
            WriteOp::UpsertAssessment => "upsert assessment",
            WriteOp::SubmitResponse => "submit response",
        }
    }
}

/// Outcome decided by the policy before any store write happens. A
/// rejected write performs no mutation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteVerdict {
    Commit,
    Reject,
}

/// Strategy supplying the transport simulator's latency and failure
/// decisions. Pluggable so tests can substitute deterministic policies.
pub trait FaultPolicy: Send + Sync {
    /// Delay imposed on the operation before it reaches the store.
    fn latency(&self) -> Duration;

    /// Decide whether a write commits or is rejected with a transient
    /// server error.
    fn write_verdict(&self, op: WriteOp) -> WriteVerdict;
}

/// Production policy: uniform latency in `[floor, floor + jitter)` and
/// probabilistic write rejection, with an elevated rate for reorders
/// since that is the most failure-sensitive path to exercise.
pub struct RandomFaultPolicy {
    rng: Mutex<StdRng>,
    write_failure_rate: f64,
    reorder_failure_rate: f64,
    latency_floor: Duration,
    latency_jitter: Duration,
}

impl RandomFaultPolicy {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Seeded constructor so tests can pin the fault sequence.
    pub fn seeded(config: &SimulatorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SimulatorConfig, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            write_failure_rate: config.write_failure_rate.clamp(0.0, 1.0),
            reorder_failure_rate: config.reorder_failure_rate.clamp(0.0, 1.0),
            latency_floor: Duration::from_millis(config.latency_floor_ms),
            latency_jitter: Duration::from_millis(config.latency_jitter_ms),
        }
    }

    fn failure_rate(&self, op: WriteOp) -> f64 {
        match op {
            WriteOp::ReorderJob => self.reorder_failure_rate,
            _ => self.write_failure_rate,
        }
    }
}

impl FaultPolicy for RandomFaultPolicy {
    fn latency(&self) -> Duration {
        let jitter_ms = self.latency_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.latency_floor;
        }
        let mut rng = self.rng.lock().expect("fault rng poisoned");
        self.latency_floor + Duration::from_millis(rng.gen_range(0..jitter_ms))
    }

    fn write_verdict(&self, op: WriteOp) -> WriteVerdict {
        let rate = self.failure_rate(op);
        if rate <= 0.0 {
            return WriteVerdict::Commit;
        }
        let mut rng = self.rng.lock().expect("fault rng poisoned");
        if rng.gen_bool(rate) {
            WriteVerdict::Reject
        } else {
            WriteVerdict::Commit
        }
    }
}

/// Replays a queued verdict sequence with zero latency; commits once the
/// script runs out. Tests use this to force an exact failure pattern.
#[derive(Default)]
pub struct ScriptedFaultPolicy {
    verdicts: Mutex<VecDeque<WriteVerdict>>,
}

impl ScriptedFaultPolicy {
    pub fn new<I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = WriteVerdict>,
    {
        Self {
            verdicts: Mutex::new(verdicts.into_iter().collect()),
        }
    }

    /// Queue a single rejection ahead of the next write.
    pub fn reject_next(&self) {
        self.verdicts
            .lock()
            .expect("script mutex poisoned")
            .push_back(WriteVerdict::Reject);
    }
}

impl FaultPolicy for ScriptedFaultPolicy {
    fn latency(&self) -> Duration {
        Duration::ZERO
    }

    fn write_verdict(&self, _op: WriteOp) -> WriteVerdict {
        self.verdicts
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(WriteVerdict::Commit)
    }
}

/// Policy that never delays and never rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaults;

impl FaultPolicy for NoFaults {
    fn latency(&self) -> Duration {
        Duration::ZERO
    }

    fn write_verdict(&self, _op: WriteOp) -> WriteVerdict {
        WriteVerdict::Commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(write_rate: f64, reorder_rate: f64) -> SimulatorConfig {
        SimulatorConfig {
            write_failure_rate: write_rate,
            reorder_failure_rate: reorder_rate,
            latency_floor_ms: 5,
            latency_jitter_ms: 10,
        }
    }

    #[test]
    fn latency_stays_within_floor_and_jitter() {
        let policy = RandomFaultPolicy::seeded(&config(0.0, 0.0), 7);
        for _ in 0..100 {
            let latency = policy.latency();
            assert!(latency >= Duration::from_millis(5));
            assert!(latency < Duration::from_millis(15));
        }
    }

    #[test]
    fn zero_rate_always_commits() {
        let policy = RandomFaultPolicy::seeded(&config(0.0, 0.0), 11);
        for _ in 0..200 {
            assert_eq!(policy.write_verdict(WriteOp::UpdateJob), WriteVerdict::Commit);
            assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Commit);
        }
    }

    #[test]
    fn full_rate_always_rejects() {
        let policy = RandomFaultPolicy::seeded(&config(1.0, 1.0), 13);
        assert_eq!(policy.write_verdict(WriteOp::CreateJob), WriteVerdict::Reject);
        assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Reject);
    }

    #[test]
    fn reorder_rate_is_tracked_separately() {
        let policy = RandomFaultPolicy::seeded(&config(0.0, 1.0), 17);
        assert_eq!(policy.write_verdict(WriteOp::UpdateJob), WriteVerdict::Commit);
        assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Reject);
    }

    #[test]
    fn scripted_policy_replays_in_order() {
        let policy = ScriptedFaultPolicy::new([WriteVerdict::Reject, WriteVerdict::Commit]);
        assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Reject);
        assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Commit);
        // Script exhausted: default to commit.
        assert_eq!(policy.write_verdict(WriteOp::ReorderJob), WriteVerdict::Commit);
    }
}
