//! TalentFlow core: a hiring-pipeline tracker built around an
//! optimistic-concurrency synchronization engine. The `pipeline` module
//! carries the record model, the fault-injecting transport policy, the
//! engine, and the client reconciliation layer; `config`, `error`, and
//! `telemetry` carry the application scaffolding.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
