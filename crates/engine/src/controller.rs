// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session controller
//!
//! Drives one claimed launch: acquire, authenticate, navigate, join, then
//! hand the page to the delivery queue and register the session active.
//! Every failure goes through one path that logs it, releases the page,
//! marks the launch failed and tells the outside world.

use crate::diagnose::{diagnose, is_interactable};
use crate::delivery::{DeliveryQueue, QueueClosed};
use crate::error::{HandoffError, LaunchError, LaunchErrorKind, LaunchStep, RegistryError};
use crate::join::{JoinEngine, JoinOutcome};
use crate::logbook::{LaunchLogs, StepLog};
use crate::monitor::HealthMonitor;
use crate::questions::QuestionTimerSet;
use crate::registry::RegistryHandle;
use crate::scheduler::Launcher;
use av_adapters::{AutomationDriver, CredentialStore, InterviewStore, Page};
use av_core::{
    AutomationSession, Clock, Credential, Event, EventBus, InterviewId, LaunchStatus, Locator,
    ScheduledLaunch, SessionStatus, SignInConfig,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;

/// Launch behavior taken from configuration
#[derive(Debug, Clone)]
pub struct LaunchPolicy {
    /// Attempts for navigation and for the join loop
    pub retry_budget: u32,
    pub stabilization_delay: Duration,
    pub bot_identity: String,
    pub sign_in: Option<SignInConfig>,
    pub snapshot_dir: Option<PathBuf>,
}

pub(crate) struct ControllerParts<D, S: InterviewStore, C: Clock> {
    pub driver: D,
    pub store: S,
    pub clock: C,
    pub registry: RegistryHandle,
    pub queue: DeliveryQueue,
    pub bus: EventBus,
    pub logs: LaunchLogs<C>,
    pub timers: QuestionTimerSet,
    pub join: JoinEngine,
    pub monitor: HealthMonitor<S, C>,
    pub policy: LaunchPolicy,
    pub shutdown: watch::Receiver<bool>,
}

pub struct SessionController<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    inner: Arc<ControllerParts<D, S, C>>,
    /// In-flight launches, drained at shutdown
    launches: Arc<Mutex<JoinSet<()>>>,
}

impl<D, S, C> Clone for SessionController<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            launches: Arc::clone(&self.launches),
        }
    }
}

impl<D, S, C> SessionController<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    pub(crate) fn new(parts: ControllerParts<D, S, C>) -> Self {
        Self {
            inner: Arc::new(parts),
            launches: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Wait for every dispatched launch to finish. With the shutdown flag
    /// set, each stops at its next checkpoint and closes its page.
    pub(crate) async fn drain(&self) {
        let mut launches = std::mem::take(&mut *self.lock_launches());
        while let Some(result) = launches.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "launch task ended abnormally");
            }
        }
    }

    fn lock_launches(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.launches.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drive a launch the registry has already moved to `launching`
    pub async fn launch(&self, launch: ScheduledLaunch) -> Result<AutomationSession, LaunchError> {
        let span = tracing::info_span!("launch", interview_id = %launch.interview_id);
        self.run(launch).instrument(span).await
    }

    async fn run(&self, launch: ScheduledLaunch) -> Result<AutomationSession, LaunchError> {
        let id = launch.interview_id.clone();
        let log = self.inner.logs.writer(&id);
        let started = Instant::now();
        let mut session = AutomationSession::new(id.clone(), self.inner.clock.now());

        if let Err(e) = self.check_cancelled(&id, LaunchStep::Acquire).await {
            return Err(self.fail(&id, None, e, &log).await);
        }
        let mut page = match self.inner.driver.open().await {
            Ok(page) => page,
            Err(e) => {
                let error = LaunchError::acquisition(e.to_string());
                return Err(self.fail(&id, None, error, &log).await);
            }
        };
        log.ok("acquire", "browser session started");

        if let Err(e) = self
            .enter_meeting(page.as_mut(), &launch, &mut session, &log)
            .await
        {
            return Err(self.fail(&id, Some(page), e, &log).await);
        }

        self.activate(page, &launch, session, &log, started).await
    }

    async fn enter_meeting(
        &self,
        page: &mut dyn Page,
        launch: &ScheduledLaunch,
        session: &mut AutomationSession,
        log: &StepLog<C>,
    ) -> Result<(), LaunchError> {
        let id = &launch.interview_id;
        let url = &launch.meeting_config.meeting_url;

        self.check_cancelled(id, LaunchStep::Authenticate).await?;
        self.authenticate(page, url, log).await?;

        self.check_cancelled(id, LaunchStep::Navigate).await?;
        self.navigate(page, url, log).await?;

        session.advance(SessionStatus::Joining);
        self.check_cancelled(id, LaunchStep::Join).await?;
        self.join(page, id, url, log).await?;
        session.advance(SessionStatus::InMeeting);
        Ok(())
    }

    /// Reuse a stored credential, else sign in when a form is configured,
    /// else continue as a guest
    async fn authenticate(
        &self,
        page: &mut dyn Page,
        meeting_url: &str,
        log: &StepLog<C>,
    ) -> Result<(), LaunchError> {
        let identity = &self.inner.policy.bot_identity;
        let stored = match self.inner.store.reusable_credential(identity).await {
            Ok(stored) => stored.filter(Credential::is_usable),
            Err(e) => {
                log.failed("authenticate", format!("credential lookup failed: {e}"));
                None
            }
        };

        if let Some(credential) = stored {
            let installed = apply_credential(page, meeting_url, &credential).await?;
            log.ok("authenticate", format!("reused stored credential ({installed} cookies)"));
            return Ok(());
        }

        let Some(form) = &self.inner.policy.sign_in else {
            log.ok("authenticate", "no stored credential, joining as guest");
            return Ok(());
        };

        let credential = self.sign_in(page, form).await?;
        let count = credential.cookies.len();
        if let Err(e) = self.inner.store.save_credential(identity, credential).await {
            tracing::warn!(error = %e, "could not save credential");
        }
        log.ok("authenticate", format!("signed in, saved {count} cookies"));
        Ok(())
    }

    async fn sign_in(
        &self,
        page: &mut dyn Page,
        form: &SignInConfig,
    ) -> Result<Credential, LaunchError> {
        let failed = |what: &str, e: av_adapters::DriverError| {
            LaunchError::authentication(format!("sign-in {what}: {e}"))
        };
        let username = Locator::css(&form.username_selector);
        let password = Locator::css(&form.password_selector);
        let submit = Locator::css(&form.submit_selector);
        let settle = self.inner.policy.stabilization_delay;

        page.navigate(&form.url).await.map_err(|e| failed("page", e))?;
        page.type_text(&username, &form.username)
            .await
            .map_err(|e| failed("username", e))?;
        // Two-step forms only show the password field after the username
        if !is_interactable(&*page, &password).await {
            page.click(&submit).await.map_err(|e| failed("submit", e))?;
            tokio::time::sleep(settle).await;
        }
        page.type_text(&password, &form.password)
            .await
            .map_err(|e| failed("password", e))?;
        page.click(&submit).await.map_err(|e| failed("submit", e))?;
        tokio::time::sleep(settle).await;

        let cookies = page.cookies().await.map_err(|e| failed("cookies", e))?;
        if cookies.is_empty() {
            return Err(LaunchError::authentication("sign-in produced no cookies"));
        }
        Ok(Credential::new(
            self.inner.policy.bot_identity.clone(),
            cookies,
            self.inner.clock.now(),
        ))
    }

    async fn navigate(
        &self,
        page: &mut dyn Page,
        url: &str,
        log: &StepLog<C>,
    ) -> Result<(), LaunchError> {
        let attempts = self.inner.policy.retry_budget.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match page.navigate(url).await {
                Ok(()) => {
                    log.ok("navigate", url);
                    tokio::time::sleep(self.inner.policy.stabilization_delay).await;
                    return Ok(());
                }
                Err(e) => {
                    log.failed("navigate", format!("attempt {attempt}/{attempts}: {e}"));
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.inner.policy.stabilization_delay).await;
                    }
                }
            }
        }
        Err(LaunchError::navigation(last_error))
    }

    /// Join passes until in the meeting or out of budget. Between passes
    /// the page is reloaded, then re-navigated, alternately.
    async fn join(
        &self,
        page: &mut dyn Page,
        id: &InterviewId,
        url: &str,
        log: &StepLog<C>,
    ) -> Result<(), LaunchError> {
        let budget = self.inner.policy.retry_budget.max(1);
        let mut trail = Vec::new();
        let mut reason = String::new();

        for attempt in 1..=budget {
            let diagnosis = diagnose(&*page).await;
            log.ok("diagnose", format!("{}: {}", diagnosis.state, diagnosis.evidence));

            match self.inner.join.attempt_join(page, diagnosis, url, log).await {
                JoinOutcome::Joined => {
                    log.ok("join", format!("in meeting after {attempt} pass(es)"));
                    return Ok(());
                }
                JoinOutcome::AuthRequired { reason } => {
                    return Err(LaunchError::authentication(reason));
                }
                JoinOutcome::Failed {
                    reason: why,
                    trail: seen,
                } => {
                    trail.extend(seen);
                    reason = why;
                }
            }

            if attempt < budget {
                self.check_cancelled(id, LaunchStep::Join).await?;
                let fallback = if attempt % 2 == 1 {
                    page.reload().await.map(|()| "reload")
                } else {
                    page.navigate(url).await.map(|()| "re-navigate")
                };
                match fallback {
                    Ok(how) => log.ok("join_retry", format!("pass {}: {how}", attempt + 1)),
                    Err(e) => log.failed("join_retry", format!("pass {}: {e}", attempt + 1)),
                }
                tokio::time::sleep(self.inner.policy.stabilization_delay).await;
            }
        }

        Err(LaunchError::join(reason, trail))
    }

    async fn activate(
        &self,
        page: Box<dyn Page>,
        launch: &ScheduledLaunch,
        session: AutomationSession,
        log: &StepLog<C>,
        started: Instant,
    ) -> Result<AutomationSession, LaunchError> {
        let id = &launch.interview_id;

        if let Err(e) = self.check_cancelled(id, LaunchStep::Activate).await {
            return Err(self.fail(id, Some(page), e, log).await);
        }
        let plan = match self.inner.timers.plan_for(&launch.meeting_config) {
            Ok(plan) => plan,
            Err(e) => {
                let error = LaunchError::activation(e.to_string());
                return Err(self.fail(id, Some(page), error, log).await);
            }
        };

        let probe = page.probe();
        if let Err(QueueClosed(page)) = self.inner.queue.bind(id, page, plan.clone()) {
            let error = LaunchError::activation("delivery queue stopped");
            return Err(self.fail(id, page, error, log).await);
        }

        // The queue owns the page now; any failure releases it there
        let armed = match self.inner.timers.arm(&self.inner.queue, id, &plan) {
            Ok(armed) => armed,
            Err(_) => {
                self.inner.queue.release(id).await;
                let error = LaunchError::activation("delivery queue stopped");
                return Err(self.fail(id, None, error, log).await);
            }
        };

        // Recorded before the session becomes visible, so a cleanup that
        // races activation always writes the final `false`
        if let Err(e) = self.inner.store.persist_interview_status(id, true).await {
            tracing::warn!(error = %e, "failed to persist interview status");
        }
        if let Err(e) = self.inner.registry.activate(session.clone()).await {
            self.inner.queue.release(id).await;
            let error = match e {
                RegistryError::InvalidTransition { .. } => {
                    LaunchError::cancelled(LaunchStep::Activate)
                }
                other => LaunchError::activation(other.to_string()),
            };
            return Err(self.fail(id, None, error, log).await);
        }
        self.inner.monitor.spawn(id.clone(), probe);

        log.ok("activate", format!("{armed} questions armed"));
        self.inner.bus.publish(Event::AvatarLaunched {
            interview_id: id.clone(),
            timestamp: self.inner.clock.now(),
        });
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            questions = armed,
            "avatar launched"
        );
        Ok(session)
    }

    /// A launch stops when it is no longer `launching` or the runtime is
    /// shutting down
    async fn check_cancelled(&self, id: &InterviewId, step: LaunchStep) -> Result<(), LaunchError> {
        if *self.inner.shutdown.borrow() {
            return Err(LaunchError::cancelled(step));
        }
        match self.inner.registry.status(id).await {
            Ok(Some(LaunchStatus::Launching)) => Ok(()),
            _ => Err(LaunchError::cancelled(step)),
        }
    }

    async fn fail(
        &self,
        id: &InterviewId,
        page: Option<Box<dyn Page>>,
        error: LaunchError,
        log: &StepLog<C>,
    ) -> LaunchError {
        let mut detail = format!("{}: {}", error.kind, error.cause);
        if !error.trail.is_empty() {
            detail.push_str(&format!(" [trail: {}]", error.trail.join(" -> ")));
        }
        log.failed(error.step.name(), detail);

        if let Some(mut page) = page {
            if error.kind == LaunchErrorKind::Join {
                self.snapshot(page.as_mut(), id, error.step).await;
            }
            if let Err(e) = page.close().await {
                tracing::warn!(error = %e, "closing page after failure");
            }
        }

        if let Err(e) = self
            .inner
            .registry
            .transition(id, LaunchStatus::Failed)
            .await
        {
            tracing::debug!(error = %e, "launch already terminal");
        }
        if let Err(e) = self.inner.store.persist_interview_status(id, false).await {
            tracing::warn!(error = %e, "failed to persist interview status");
        }
        self.inner.bus.publish(Event::AvatarLaunchFailed {
            interview_id: id.clone(),
            error: error.user_reason().to_string(),
            timestamp: self.inner.clock.now(),
        });
        tracing::error!(
            step = %error.step,
            kind = %error.kind,
            cause = %error.cause,
            trail = ?error.trail,
            "launch failed"
        );
        error
    }

    /// Write-once debug snapshot, `<interview_id>-<step>.png`
    async fn snapshot(&self, page: &mut dyn Page, id: &InterviewId, step: LaunchStep) {
        let Some(dir) = &self.inner.policy.snapshot_dir else {
            return;
        };
        let path = dir.join(snapshot_name(id, step));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return;
        }
        let bytes = match page.snapshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "snapshot failed");
                return;
            }
        };
        match write_once(&path, &bytes).await {
            Ok(()) => tracing::info!(path = %path.display(), "failure snapshot written"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "snapshot not written"),
        }
    }
}

impl<D, S, C> Launcher for SessionController<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    fn dispatch(&self, launch: ScheduledLaunch) -> Result<(), HandoffError> {
        // Checked under the lock so drain() never misses a late dispatch
        let mut launches = self.lock_launches();
        if *self.inner.shutdown.borrow() {
            return Err(HandoffError::ShuttingDown);
        }
        while launches.try_join_next().is_some() {}
        let controller = self.clone();
        launches.spawn(async move {
            // Failures are fully handled inside launch()
            let _ = controller.launch(launch).await;
        });
        Ok(())
    }
}

/// Open the meeting origin and install the credential's cookies for it
async fn apply_credential(
    page: &mut dyn Page,
    meeting_url: &str,
    credential: &Credential,
) -> Result<usize, LaunchError> {
    let url = url::Url::parse(meeting_url)
        .map_err(|e| LaunchError::authentication(format!("bad meeting url: {e}")))?;
    let host = url.host_str().unwrap_or_default();
    let cookies = credential.cookies_for(host);

    page.navigate(&url.origin().ascii_serialization())
        .await
        .map_err(|e| LaunchError::authentication(format!("opening meeting origin: {e}")))?;
    page.set_cookies(&cookies)
        .await
        .map_err(|e| LaunchError::authentication(format!("installing cookies: {e}")))?;
    Ok(cookies.len())
}

fn snapshot_name(id: &InterviewId, step: LaunchStep) -> String {
    let safe: String = id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}-{}.png", step.name())
}

async fn write_once(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
