// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL plus the state it materializes

use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use av_core::Operation;
use chrono::{DateTime, Utc};
use std::path::Path;

pub struct Journal {
    wal: Wal,
    state: MaterializedState,
}

impl Journal {
    /// Replay `path` into fresh state and keep the log open for appends
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let mut state = MaterializedState::default();
        let entries = Wal::replay(path)?;
        for entry in &entries {
            state.apply(&entry.op);
        }
        tracing::info!(path = %path.display(), entries = entries.len(), "journal replayed");
        Ok(Self {
            wal: Wal::open(path)?,
            state,
        })
    }

    /// Persist first, then apply; a failed write leaves state untouched
    pub fn record(&mut self, op: Operation, at: DateTime<Utc>) -> Result<u64, WalError> {
        let seq = self.wal.append(&op, at)?;
        tracing::debug!(seq, kind = op.kind(), "journal append");
        self.state.apply(&op);
        Ok(seq)
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    pub fn sequence(&self) -> u64 {
        self.wal.sequence()
    }
}
