use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use shared::{models::chunk::Chunk, networking::Rank};

use crate::error::{CoordinatorError, CoordinatorResult};

/// Which worker holds which chunk, plus counters for the final report.
#[derive(Debug, Clone)]
pub struct ServerState {
    assignments: HashMap<Rank, Chunk>,
    chunks_per_worker: BTreeMap<Rank, usize>,
    rows_rendered: u64,
    chunks_rendered: usize,
}

impl ServerState {
    pub fn new(workers: usize) -> Self {
        ServerState {
            assignments: HashMap::with_capacity(workers),
            chunks_per_worker: (1..=workers).map(|rank| (rank, 0)).collect(),
            rows_rendered: 0,
            chunks_rendered: 0,
        }
    }

    pub fn assign(&mut self, rank: Rank, chunk: Chunk) {
        // A rank is only reassigned after its reply came back.
        self.assignments.insert(rank, chunk);
    }

    /// Clears the assignment `chunk` answers, failing if the rank was not working on it.
    pub fn complete(&mut self, rank: Rank, chunk: Chunk) -> CoordinatorResult<()> {
        match self.assignments.remove(&rank) {
            Some(expected) if expected == chunk => {
                *self.chunks_per_worker.entry(rank).or_default() += 1;
                self.rows_rendered += chunk.row_count as u64;
                if !chunk.is_terminal() {
                    self.chunks_rendered += 1;
                }
                Ok(())
            }
            expected => Err(CoordinatorError::UnexpectedReply {
                rank,
                expected,
                received: chunk,
            }),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.assignments.len()
    }

    pub fn into_report(self) -> CoordinatorReport {
        CoordinatorReport {
            rows_rendered: self.rows_rendered,
            chunks_rendered: self.chunks_rendered,
            chunks_per_worker: self.chunks_per_worker,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorReport {
    pub rows_rendered: u64,
    pub chunks_rendered: usize,
    /// Replies received per rank, the zero-row ones included.
    pub chunks_per_worker: BTreeMap<Rank, usize>,
}
