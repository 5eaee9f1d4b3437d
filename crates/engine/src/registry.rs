// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry
//!
//! The only cross-task mutable state. `Registry` is plain data with atomic
//! operations; `RegistryHandle` runs it on its own task and serializes every
//! request, so a check-and-set is never split across awaits.

use crate::error::RegistryError;
use av_core::{
    AutomationSession, InterviewId, LaunchStatus, ScheduledLaunch, SessionStatus,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Default)]
pub struct Registry {
    /// Launches that are scheduled or launching
    pending: HashMap<InterviewId, ScheduledLaunch>,
    /// Terminal status of launches that left the scheduling set
    finished: HashMap<InterviewId, LaunchStatus>,
    sessions: HashMap<InterviewId, AutomationSession>,
}

impl Registry {
    /// Add a launch. Returns false for an id the registry has already seen.
    pub fn schedule(&mut self, launch: ScheduledLaunch) -> bool {
        let id = &launch.interview_id;
        if launch.status != LaunchStatus::Scheduled
            || self.pending.contains_key(id)
            || self.finished.contains_key(id)
            || self.sessions.contains_key(id)
        {
            return false;
        }
        self.pending.insert(id.clone(), launch);
        true
    }

    /// Move every due launch to `launching` and return them, earliest first
    pub fn claim_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledLaunch> {
        let mut claimed = Vec::new();
        for launch in self.pending.values_mut() {
            if launch.is_due(now) && launch.transition(LaunchStatus::Launching).is_ok() {
                claimed.push(launch.clone());
            }
        }
        claimed.sort_by(|a, b| {
            a.launch_time
                .cmp(&b.launch_time)
                .then_with(|| a.interview_id.cmp(&b.interview_id))
        });
        claimed
    }

    /// Forward-only status change; returns the previous status
    pub fn transition(
        &mut self,
        interview_id: &InterviewId,
        next: LaunchStatus,
    ) -> Result<LaunchStatus, RegistryError> {
        let Some(launch) = self.pending.get_mut(interview_id) else {
            return Err(match self.finished.get(interview_id) {
                Some(from) => RegistryError::InvalidTransition {
                    interview_id: interview_id.clone(),
                    from: *from,
                    to: next,
                },
                None => RegistryError::UnknownInterview(interview_id.clone()),
            });
        };
        let previous = launch.status;
        launch
            .transition(next)
            .map_err(|e| RegistryError::InvalidTransition {
                interview_id: e.interview_id,
                from: e.from,
                to: e.to,
            })?;
        if next.is_terminal() {
            self.pending.remove(interview_id);
            self.finished.insert(interview_id.clone(), next);
        }
        Ok(previous)
    }

    /// Mark a launching interview active and register its session, or do
    /// neither
    pub fn activate(&mut self, session: AutomationSession) -> Result<(), RegistryError> {
        let id = session.interview_id.clone();
        if self.sessions.contains_key(&id) {
            return Err(RegistryError::SessionExists(id));
        }
        self.transition(&id, LaunchStatus::Active)?;
        self.sessions.insert(id, session);
        Ok(())
    }

    /// Returns the applied status, or None when no session is registered
    pub fn update_session(
        &mut self,
        interview_id: &InterviewId,
        status: SessionStatus,
    ) -> Option<SessionStatus> {
        let session = self.sessions.get_mut(interview_id)?;
        session.advance(status);
        Some(session.status)
    }

    /// Unregister a session. Only the first caller gets it back.
    pub fn remove_session(&mut self, interview_id: &InterviewId) -> Option<AutomationSession> {
        let mut session = self.sessions.remove(interview_id)?;
        session.advance(SessionStatus::Ended);
        Some(session)
    }

    pub fn status(&self, interview_id: &InterviewId) -> Option<LaunchStatus> {
        self.pending
            .get(interview_id)
            .map(|l| l.status)
            .or_else(|| self.finished.get(interview_id).copied())
    }

    pub fn session(&self, interview_id: &InterviewId) -> Option<AutomationSession> {
        self.sessions.get(interview_id).cloned()
    }

    pub fn sessions(&self) -> Vec<AutomationSession> {
        let mut sessions: Vec<_> = self.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.interview_id.cmp(&b.interview_id));
        sessions
    }
}

enum Request {
    Schedule {
        launch: ScheduledLaunch,
        reply: oneshot::Sender<bool>,
    },
    ClaimDue {
        now: DateTime<Utc>,
        reply: oneshot::Sender<Vec<ScheduledLaunch>>,
    },
    Transition {
        interview_id: InterviewId,
        next: LaunchStatus,
        reply: oneshot::Sender<Result<LaunchStatus, RegistryError>>,
    },
    Activate {
        session: AutomationSession,
        reply: oneshot::Sender<Result<(), RegistryError>>,
    },
    UpdateSession {
        interview_id: InterviewId,
        status: SessionStatus,
        reply: oneshot::Sender<Option<SessionStatus>>,
    },
    RemoveSession {
        interview_id: InterviewId,
        reply: oneshot::Sender<Option<AutomationSession>>,
    },
    Status {
        interview_id: InterviewId,
        reply: oneshot::Sender<Option<LaunchStatus>>,
    },
    Session {
        interview_id: InterviewId,
        reply: oneshot::Sender<Option<AutomationSession>>,
    },
    Sessions {
        reply: oneshot::Sender<Vec<AutomationSession>>,
    },
}

/// Cloneable handle to the registry task. The task exits when the last
/// handle is dropped.
#[derive(Clone)]
pub struct RegistryHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl RegistryHandle {
    /// Spawn the registry task on the current runtime
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(serve(Registry::default(), rx));
        Self { tx }
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(request(reply))
            .map_err(|_| RegistryError::Closed)?;
        rx.await.map_err(|_| RegistryError::Closed)
    }

    pub async fn schedule(&self, launch: ScheduledLaunch) -> Result<bool, RegistryError> {
        self.call(|reply| Request::Schedule { launch, reply }).await
    }

    pub async fn claim_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledLaunch>, RegistryError> {
        self.call(|reply| Request::ClaimDue { now, reply }).await
    }

    pub async fn transition(
        &self,
        interview_id: &InterviewId,
        next: LaunchStatus,
    ) -> Result<LaunchStatus, RegistryError> {
        let interview_id = interview_id.clone();
        self.call(|reply| Request::Transition {
            interview_id,
            next,
            reply,
        })
        .await?
    }

    pub async fn activate(&self, session: AutomationSession) -> Result<(), RegistryError> {
        self.call(|reply| Request::Activate { session, reply }).await?
    }

    pub async fn update_session(
        &self,
        interview_id: &InterviewId,
        status: SessionStatus,
    ) -> Result<Option<SessionStatus>, RegistryError> {
        let interview_id = interview_id.clone();
        self.call(|reply| Request::UpdateSession {
            interview_id,
            status,
            reply,
        })
        .await
    }

    pub async fn remove_session(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<AutomationSession>, RegistryError> {
        let interview_id = interview_id.clone();
        self.call(|reply| Request::RemoveSession {
            interview_id,
            reply,
        })
        .await
    }

    pub async fn status(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<LaunchStatus>, RegistryError> {
        let interview_id = interview_id.clone();
        self.call(|reply| Request::Status {
            interview_id,
            reply,
        })
        .await
    }

    pub async fn session(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<AutomationSession>, RegistryError> {
        let interview_id = interview_id.clone();
        self.call(|reply| Request::Session {
            interview_id,
            reply,
        })
        .await
    }

    pub async fn sessions(&self) -> Result<Vec<AutomationSession>, RegistryError> {
        self.call(|reply| Request::Sessions { reply }).await
    }
}

async fn serve(mut registry: Registry, mut rx: mpsc::UnboundedReceiver<Request>) {
    while let Some(request) = rx.recv().await {
        // A dropped reply receiver just means the caller went away
        match request {
            Request::Schedule { launch, reply } => {
                let _ = reply.send(registry.schedule(launch));
            }
            Request::ClaimDue { now, reply } => {
                let _ = reply.send(registry.claim_due(now));
            }
            Request::Transition {
                interview_id,
                next,
                reply,
            } => {
                let _ = reply.send(registry.transition(&interview_id, next));
            }
            Request::Activate { session, reply } => {
                let _ = reply.send(registry.activate(session));
            }
            Request::UpdateSession {
                interview_id,
                status,
                reply,
            } => {
                let _ = reply.send(registry.update_session(&interview_id, status));
            }
            Request::RemoveSession {
                interview_id,
                reply,
            } => {
                let _ = reply.send(registry.remove_session(&interview_id));
            }
            Request::Status {
                interview_id,
                reply,
            } => {
                let _ = reply.send(registry.status(&interview_id));
            }
            Request::Session {
                interview_id,
                reply,
            } => {
                let _ = reply.send(registry.session(&interview_id));
            }
            Request::Sessions { reply } => {
                let _ = reply.send(registry.sessions());
            }
        }
    }
    tracing::debug!("session registry stopped");
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
