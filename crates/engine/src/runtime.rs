// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime wiring for the avatar engine
//!
//! Owns the long-lived tasks: the registry actor, the delivery consumer,
//! the scheduler loop and the notification forwarder. Per-session monitor
//! tasks are spawned by the controller as sessions go active.

use crate::controller::{ControllerParts, LaunchPolicy, SessionController};
use crate::delivery::DeliveryQueue;
use crate::error::RegistryError;
use crate::join::JoinEngine;
use crate::logbook::LaunchLogs;
use crate::monitor::{HealthMonitor, MonitorPolicy};
use crate::questions::QuestionTimerSet;
use crate::registry::RegistryHandle;
use crate::scheduler::SchedulerLoop;
use crate::teardown::{EndReason, Teardown};
use av_adapters::{AutomationDriver, CredentialStore, InterviewStore, NotifyAdapter};
use av_core::events::SubscriberId;
use av_core::{
    AutomationSession, AvatarConfig, Clock, EventBus, EventReceiver, InterviewId, LaunchLogEntry,
    LaunchStatus, MeetingConfig, NotifyConfig, QuestionPlan, ScheduledLaunch, Subscription,
};
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Runtime adapter dependencies
pub struct RuntimeDeps<D, S, N> {
    pub driver: D,
    pub store: S,
    pub notify: N,
}

/// The running avatar engine
pub struct AvatarRuntime<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    registry: RegistryHandle,
    queue: DeliveryQueue,
    store: S,
    bus: EventBus,
    logs: LaunchLogs<C>,
    clock: C,
    controller: SessionController<D, S, C>,
    scheduler: SchedulerLoop<S, SessionController<D, S, C>, C>,
    teardown: Teardown<S, C>,
    lead_time: Duration,
    notify_subscriber: SubscriberId,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<D, S, C> AvatarRuntime<D, S, C>
where
    D: AutomationDriver,
    S: InterviewStore + CredentialStore,
    C: Clock,
{
    /// Wire everything up and start the background tasks. Must be called
    /// from within a tokio runtime.
    pub fn start<N: NotifyAdapter>(
        deps: RuntimeDeps<D, S, N>,
        config: &AvatarConfig,
        clock: C,
        bus: EventBus,
    ) -> Self {
        let RuntimeDeps {
            driver,
            store,
            notify,
        } = deps;
        let (shutdown, shutdown_rx) = watch::channel(false);

        let registry = RegistryHandle::spawn();
        let queue = DeliveryQueue::spawn(bus.clone(), clock.clone());
        let logs = LaunchLogs::new(config.launch_log_capacity, clock.clone());

        let teardown = Teardown {
            registry: registry.clone(),
            queue: queue.clone(),
            store: store.clone(),
            bus: bus.clone(),
            logs: logs.clone(),
            clock: clock.clone(),
        };
        let monitor = HealthMonitor::new(
            MonitorPolicy {
                interval: config.monitor_interval,
                max_duration: config.max_session_duration,
                max_unresponsive: config.max_unresponsive_checks,
            },
            teardown.clone(),
            shutdown_rx.clone(),
        );

        let controller = SessionController::new(ControllerParts {
            driver,
            store: store.clone(),
            clock: clock.clone(),
            registry: registry.clone(),
            queue: queue.clone(),
            bus: bus.clone(),
            logs: logs.clone(),
            timers: QuestionTimerSet::new(config.questions.clone()),
            join: JoinEngine::new(
                config.stabilization_delay,
                config.join_candidate_limit as usize,
                config.bot_display_name.clone(),
            ),
            monitor,
            policy: LaunchPolicy {
                retry_budget: config.join_retry_budget,
                stabilization_delay: config.stabilization_delay,
                bot_identity: config.bot_identity.clone(),
                sign_in: config.sign_in.clone(),
                snapshot_dir: config.driver.snapshot_dir.clone(),
            },
            shutdown: shutdown_rx.clone(),
        });

        let scheduler = SchedulerLoop::new(
            store.clone(),
            controller.clone(),
            registry.clone(),
            bus.clone(),
            clock.clone(),
            config.scheduler_interval,
        );

        let subscription = Subscription::new("notify", vec!["avatar:**".into()]);
        let notify_subscriber = subscription.id.clone();
        let events = bus.subscribe(subscription);
        let tasks = vec![
            tokio::spawn(scheduler.clone().run(shutdown_rx)),
            tokio::spawn(forward_notifications(
                notify,
                NotifyConfig::new(&config.notify),
                events,
            )),
        ];

        tracing::info!(
            scheduler_interval_ms = config.scheduler_interval.as_millis() as u64,
            questions = config.questions.len(),
            "avatar runtime started"
        );

        Self {
            registry,
            queue,
            store,
            bus,
            logs,
            clock,
            controller,
            scheduler,
            teardown,
            lead_time: config.join_lead_time,
            notify_subscriber,
            shutdown,
            tasks: Mutex::new(tasks),
        }
    }

    /// Register a launch directly, bypassing the store poll
    pub async fn schedule(&self, launch: ScheduledLaunch) -> Result<bool, RegistryError> {
        self.registry.schedule(launch).await
    }

    /// Schedule a launch the configured lead time before `starts_at`
    pub async fn book(
        &self,
        interview_id: impl Into<InterviewId>,
        starts_at: DateTime<Utc>,
        meeting: MeetingConfig,
    ) -> Result<bool, RegistryError> {
        let launch = ScheduledLaunch::book(interview_id, starts_at, self.lead_time, meeting);
        self.schedule(launch).await
    }

    /// Run one scheduler poll now
    pub async fn tick(&self) -> usize {
        self.scheduler.tick().await
    }

    /// The controller the scheduler hands claimed launches to
    pub fn controller(&self) -> &SessionController<D, S, C> {
        &self.controller
    }

    /// Stop a launch or end a session. Returns false when there was
    /// nothing left to cancel.
    pub async fn cancel(&self, interview_id: &InterviewId) -> Result<bool, RegistryError> {
        match self.registry.status(interview_id).await? {
            Some(LaunchStatus::Scheduled | LaunchStatus::Launching) => {
                match self
                    .registry
                    .transition(interview_id, LaunchStatus::Failed)
                    .await
                {
                    Ok(_) => {}
                    // Went active between the two calls
                    Err(RegistryError::InvalidTransition {
                        to: LaunchStatus::Failed,
                        from: LaunchStatus::Active,
                        ..
                    }) => {
                        return Ok(self
                            .teardown
                            .cleanup(interview_id, EndReason::Cancelled)
                            .await)
                    }
                    Err(e) => return Err(e),
                }
                if let Err(e) = self.store.persist_interview_status(interview_id, false).await {
                    tracing::warn!(interview_id = %interview_id, error = %e, "failed to persist interview status");
                }
                self.logs
                    .record(interview_id, "cancel", true, "cancelled before activation");
                Ok(true)
            }
            Some(LaunchStatus::Active) => Ok(self
                .teardown
                .cleanup(interview_id, EndReason::Cancelled)
                .await),
            Some(LaunchStatus::Failed) | None => Ok(false),
        }
    }

    pub async fn launch_status(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<LaunchStatus>, RegistryError> {
        self.registry.status(interview_id).await
    }

    pub async fn session(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<AutomationSession>, RegistryError> {
        self.registry.session(interview_id).await
    }

    pub async fn active_sessions(&self) -> Result<Vec<AutomationSession>, RegistryError> {
        self.registry.sessions().await
    }

    /// Everything logged for one launch, oldest first
    pub fn launch_log(&self, interview_id: &InterviewId) -> Vec<LaunchLogEntry> {
        self.logs.entries(interview_id)
    }

    /// The session's question plan with sent flags
    pub async fn question_plan(&self, interview_id: &InterviewId) -> Option<QuestionPlan> {
        self.queue.plan(interview_id).await
    }

    pub fn events(&self, subscription: Subscription) -> EventReceiver {
        self.bus.subscribe(subscription)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Stop polling, end every active session and wait for the background
    /// tasks to finish
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        tracing::info!("avatar runtime shutting down");

        // Launches still in flight fail at their next checkpoint and close
        // their pages; any that got to active are cleaned up below
        self.controller.drain().await;

        match self.registry.sessions().await {
            Ok(sessions) => {
                for session in sessions {
                    self.teardown
                        .cleanup(&session.interview_id, EndReason::Shutdown)
                        .await;
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not list sessions at shutdown"),
        }
        self.queue.shutdown().await;
        self.bus.unsubscribe(&self.notify_subscriber);

        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "runtime task ended abnormally");
            }
        }
        tracing::info!("avatar runtime stopped");
    }
}

/// Route matching events to the notify adapter until the subscription is
/// dropped. Buffered events are still delivered after that.
async fn forward_notifications<N: NotifyAdapter>(
    notify: N,
    rules: NotifyConfig,
    mut events: EventReceiver,
) {
    while let Some(event) = events.recv().await {
        let Some(notification) = rules.to_notification(&event) else {
            continue;
        };
        if let Err(e) = notify.send(&notification.channel, &notification.message).await {
            tracing::warn!(
                interview_id = %event.interview_id(),
                channel = %notification.channel,
                error = %e,
                "notification failed"
            );
        }
    }
}
