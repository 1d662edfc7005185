//! Bookkeeping for runs of the external housing-market simulator.
//!
//! Spawning and supervising the simulator process is left to a
//! [`SimulatorLauncher`] implementation; the queue only tracks requests and
//! their status. At most one run is active at a time.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DashError, Result};
use crate::version::Version;

/// What to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub version: Version,
    pub seed: u64,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RunStatus {
    Queued,
    Running,
    Succeeded,
    Failed { reason: String },
    Cancelled,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed { .. } | RunStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: u64,
    pub request: RunRequest,
    pub status: RunStatus,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Starts the simulator for a run; returns once the process is spawned.
pub trait SimulatorLauncher {
    fn launch(&mut self, record: &RunRecord) -> core::result::Result<(), String>;
}

/// FIFO run queue with a single active slot
#[derive(Debug)]
pub struct RunQueue {
    capacity: usize,
    known_versions: Vec<Version>,
    records: Vec<RunRecord>,
    pending: VecDeque<u64>,
    active: Option<u64>,
    next_id: u64,
}

impl RunQueue {
    /// `known_versions` are the versions a run may target.
    pub fn new(capacity: usize, known_versions: Vec<Version>) -> Self {
        Self {
            capacity,
            known_versions,
            records: Vec::new(),
            pending: VecDeque::new(),
            active: None,
            next_id: 1,
        }
    }

    pub fn submit(&mut self, request: RunRequest) -> Result<u64> {
        if !self.known_versions.contains(&request.version) {
            return Err(DashError::UnknownVersion(request.version.to_string()));
        }
        if self.pending.len() >= self.capacity {
            return Err(DashError::Run(format!(
                "queue full ({} pending runs)",
                self.pending.len()
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.push(RunRecord {
            id,
            request,
            status: RunStatus::Queued,
            queued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        });
        self.pending.push_back(id);
        info!(run = id, "run queued");
        Ok(id)
    }

    /// Launch the oldest queued run if nothing is active.
    ///
    /// Returns the id of the run that was started, if any.
    pub fn start_next(&mut self, launcher: &mut dyn SimulatorLauncher) -> Option<u64> {
        if self.active.is_some() {
            return None;
        }
        let id = self.pending.pop_front()?;
        let record = self.record_mut(id)?;
        record.status = RunStatus::Running;
        record.started_at = Some(Utc::now());

        let launched = launcher.launch(record);
        match launched {
            Ok(()) => {
                info!(run = id, "run started");
                self.active = Some(id);
            }
            Err(reason) => {
                warn!(run = id, %reason, "run failed to launch");
                record.status = RunStatus::Failed { reason };
                record.finished_at = Some(Utc::now());
            }
        }
        Some(id)
    }

    /// Record the outcome of the active run.
    pub fn complete(&mut self, id: u64, outcome: core::result::Result<(), String>) -> Result<()> {
        if self.active != Some(id) {
            return Err(DashError::Run(format!("run {} is not active", id)));
        }
        let record = self
            .record_mut(id)
            .ok_or_else(|| DashError::Run(format!("unknown run {}", id)))?;
        record.status = match outcome {
            Ok(()) => RunStatus::Succeeded,
            Err(reason) => RunStatus::Failed { reason },
        };
        record.finished_at = Some(Utc::now());
        self.active = None;
        info!(run = id, "run finished");
        Ok(())
    }

    /// Cancel a queued run. Active runs cannot be cancelled here.
    pub fn cancel(&mut self, id: u64) -> Result<()> {
        let pos = self
            .pending
            .iter()
            .position(|&p| p == id)
            .ok_or_else(|| DashError::Run(format!("run {} is not queued", id)))?;
        self.pending.remove(pos);
        if let Some(record) = self.record_mut(id) {
            record.status = RunStatus::Cancelled;
            record.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&RunRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn active(&self) -> Option<&RunRecord> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn record_mut(&mut self, id: u64) -> Option<&mut RunRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeLauncher {
        launched: Vec<u64>,
        fail: bool,
    }

    impl SimulatorLauncher for FakeLauncher {
        fn launch(&mut self, record: &RunRecord) -> core::result::Result<(), String> {
            if self.fail {
                return Err("java not found".into());
            }
            self.launched.push(record.id);
            Ok(())
        }
    }

    fn request(version: &str) -> RunRequest {
        RunRequest {
            version: Version::parse(version).unwrap(),
            seed: 42,
            label: None,
        }
    }

    fn queue() -> RunQueue {
        RunQueue::new(
            2,
            vec![Version::parse("v0").unwrap(), Version::parse("v3.8").unwrap()],
        )
    }

    #[test]
    fn test_fifo_single_active() {
        let mut q = queue();
        let a = q.submit(request("v0")).unwrap();
        let b = q.submit(request("v3.8")).unwrap();
        let mut launcher = FakeLauncher::default();

        assert_eq!(q.start_next(&mut launcher), Some(a));
        assert_eq!(q.start_next(&mut launcher), None);
        assert_eq!(q.active().unwrap().id, a);

        q.complete(a, Ok(())).unwrap();
        assert_eq!(q.get(a).unwrap().status, RunStatus::Succeeded);
        assert_eq!(q.start_next(&mut launcher), Some(b));
        assert_eq!(launcher.launched, vec![a, b]);
    }

    #[test]
    fn test_unknown_version_and_capacity() {
        let mut q = queue();
        assert!(matches!(
            q.submit(request("v9")),
            Err(DashError::UnknownVersion(_))
        ));
        q.submit(request("v0")).unwrap();
        q.submit(request("v0")).unwrap();
        assert!(matches!(q.submit(request("v0")), Err(DashError::Run(_))));
    }

    #[test]
    fn test_launch_failure_marks_failed() {
        let mut q = queue();
        let id = q.submit(request("v0")).unwrap();
        let mut launcher = FakeLauncher {
            fail: true,
            ..Default::default()
        };
        assert_eq!(q.start_next(&mut launcher), Some(id));
        assert!(q.active().is_none());
        let status = &q.get(id).unwrap().status;
        assert!(matches!(status, RunStatus::Failed { reason } if reason == "java not found"));
        assert!(status.is_finished());
    }

    #[test]
    fn test_cancel_only_queued() {
        let mut q = queue();
        let a = q.submit(request("v0")).unwrap();
        let b = q.submit(request("v0")).unwrap();
        q.start_next(&mut FakeLauncher::default());
        assert!(q.cancel(a).is_err());
        q.cancel(b).unwrap();
        assert_eq!(q.get(b).unwrap().status, RunStatus::Cancelled);
        assert_eq!(q.pending_len(), 0);
        assert!(q.complete(b, Ok(())).is_err());
    }
}
