// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message delivery queue
//!
//! One consumer task per process owns every active session's page. Sends
//! run one at a time in (due, enqueue order), so a page is never driven by
//! two sends at once. Failed sends are reported and dropped.

use crate::diagnose::{first_visible, is_interactable};
use crate::ui;
use av_adapters::{DriverError, KeyChord, Page};
use av_core::{Clock, Event, EventBus, InterviewId, Locator, QuestionPlan};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Pause after opening the chat panel before looking for its input
const CHAT_PANEL_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no chat control on the page")]
    ChatNotFound,
    #[error("chat panel has no text input")]
    InputNotFound,
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// The consumer has stopped. Carries the page back when one was being
/// handed over, so the caller can still close it.
pub struct QueueClosed(pub Option<Box<dyn Page>>);

impl std::fmt::Debug for QueueClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("QueueClosed")
            .field(&self.0.is_some())
            .finish()
    }
}

enum Command {
    Bind {
        interview_id: InterviewId,
        page: Box<dyn Page>,
        plan: QuestionPlan,
    },
    Enqueue {
        interview_id: InterviewId,
        text: String,
        delay: Duration,
        question: Option<usize>,
    },
    Release {
        interview_id: InterviewId,
        reply: oneshot::Sender<bool>,
    },
    Plan {
        interview_id: InterviewId,
        reply: oneshot::Sender<Option<QuestionPlan>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the delivery consumer
#[derive(Clone)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl DeliveryQueue {
    /// Spawn the consumer on the current runtime
    pub fn spawn<C: Clock>(bus: EventBus, clock: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = Consumer {
            bindings: HashMap::new(),
            retired: HashMap::new(),
            due: BinaryHeap::new(),
            seq: 0,
            bus,
            clock,
        };
        tokio::spawn(consumer.run(rx));
        Self { tx }
    }

    /// Hand a session's page and plan to the consumer. From here on only
    /// the consumer touches the page.
    pub fn bind(
        &self,
        interview_id: &InterviewId,
        page: Box<dyn Page>,
        plan: QuestionPlan,
    ) -> Result<(), QueueClosed> {
        let command = Command::Bind {
            interview_id: interview_id.clone(),
            page,
            plan,
        };
        match self.tx.send(command) {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(Command::Bind { page, .. })) => Err(QueueClosed(Some(page))),
            Err(_) => Err(QueueClosed(None)),
        }
    }

    /// Send `text` into the session's chat after `delay`
    pub fn enqueue(
        &self,
        interview_id: &InterviewId,
        text: impl Into<String>,
        delay: Duration,
    ) -> Result<(), QueueClosed> {
        self.push(interview_id, text.into(), delay, None)
    }

    /// Like `enqueue`, marking plan question `index` sent on success
    pub fn enqueue_question(
        &self,
        interview_id: &InterviewId,
        index: usize,
        text: impl Into<String>,
        delay: Duration,
    ) -> Result<(), QueueClosed> {
        self.push(interview_id, text.into(), delay, Some(index))
    }

    fn push(
        &self,
        interview_id: &InterviewId,
        text: String,
        delay: Duration,
        question: Option<usize>,
    ) -> Result<(), QueueClosed> {
        self.tx
            .send(Command::Enqueue {
                interview_id: interview_id.clone(),
                text,
                delay,
                question,
            })
            .map_err(|_| QueueClosed(None))
    }

    /// Drop pending sends and close the page. True only for the call that
    /// actually released a binding.
    pub async fn release(&self, interview_id: &InterviewId) -> bool {
        let (reply, rx) = oneshot::channel();
        let command = Command::Release {
            interview_id: interview_id.clone(),
            reply,
        };
        if self.tx.send(command).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Current plan of a bound session, or the final plan of a released one
    pub async fn plan(&self, interview_id: &InterviewId) -> Option<QuestionPlan> {
        let (reply, rx) = oneshot::channel();
        let command = Command::Plan {
            interview_id: interview_id.clone(),
            reply,
        };
        self.tx.send(command).ok()?;
        rx.await.ok().flatten()
    }

    /// Release every binding and stop the consumer
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

struct Binding {
    page: Box<dyn Page>,
    plan: QuestionPlan,
    started: Instant,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    due: Instant,
    seq: u64,
    interview_id: InterviewId,
    text: String,
    question: Option<usize>,
}

struct Consumer<C: Clock> {
    bindings: HashMap<InterviewId, Binding>,
    /// Final plans of released sessions
    retired: HashMap<InterviewId, QuestionPlan>,
    due: BinaryHeap<Reverse<Pending>>,
    seq: u64,
    bus: EventBus,
    clock: C,
}

impl<C: Clock> Consumer<C> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            let next_due = self.due.peek().map(|Reverse(p)| p.due);
            let wake = tokio::time::sleep_until(
                next_due.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
            );

            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        self.release_all().await;
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => {
                        self.release_all().await;
                        break;
                    }
                },
                _ = wake, if next_due.is_some() => self.deliver_due().await,
            }
        }
        tracing::debug!("delivery consumer stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Bind {
                interview_id,
                page,
                plan,
            } => {
                tracing::debug!(interview_id = %interview_id, questions = plan.total(), "page bound");
                let binding = Binding {
                    page,
                    plan,
                    started: Instant::now(),
                };
                if let Some(mut stale) = self.bindings.insert(interview_id.clone(), binding) {
                    tracing::warn!(interview_id = %interview_id, "replacing an existing binding");
                    let _ = stale.page.close().await;
                }
            }
            Command::Enqueue {
                interview_id,
                text,
                delay,
                question,
            } => {
                self.seq += 1;
                self.due.push(Reverse(Pending {
                    due: Instant::now() + delay,
                    seq: self.seq,
                    interview_id,
                    text,
                    question,
                }));
            }
            Command::Release {
                interview_id,
                reply,
            } => {
                let released = self.release(&interview_id).await;
                let _ = reply.send(released);
            }
            Command::Plan {
                interview_id,
                reply,
            } => {
                let plan = self
                    .bindings
                    .get(&interview_id)
                    .map(|b| b.plan.clone())
                    .or_else(|| self.retired.get(&interview_id).cloned());
                let _ = reply.send(plan);
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    async fn deliver_due(&mut self) {
        let now = Instant::now();
        while self.due.peek().is_some_and(|Reverse(p)| p.due <= now) {
            if let Some(Reverse(pending)) = self.due.pop() {
                self.deliver(pending).await;
            }
        }
    }

    async fn deliver(&mut self, pending: Pending) {
        let Some(binding) = self.bindings.get_mut(&pending.interview_id) else {
            tracing::debug!(interview_id = %pending.interview_id, "dropping send for unbound session");
            return;
        };

        let result = send_chat(binding.page.as_mut(), &pending.text).await;
        let elapsed = binding.started.elapsed();
        let interview_id = pending.interview_id;

        match result {
            Ok(()) => {
                if let Some(index) = pending.question {
                    binding.plan.mark_sent(index);
                }
                tracing::info!(
                    interview_id = %interview_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "message delivered"
                );
                self.bus.publish(Event::AvatarMessage {
                    interview_id: interview_id.clone(),
                    message: pending.text,
                    timing: elapsed,
                    timestamp: self.clock.now(),
                });
            }
            Err(e) => {
                tracing::warn!(interview_id = %interview_id, error = %e, "message dropped");
                self.bus.publish(Event::DeliveryFailed {
                    interview_id: interview_id.clone(),
                    message: pending.text,
                    reason: e.to_string(),
                    timestamp: self.clock.now(),
                });
            }
        }

        if pending.question.is_some() {
            self.bus.publish(Event::AvatarStatus {
                interview_id,
                questions_sent: binding.plan.sent_count(),
                questions_total: binding.plan.total(),
                elapsed,
                timestamp: self.clock.now(),
            });
        }
    }

    async fn release(&mut self, interview_id: &InterviewId) -> bool {
        let Some(mut binding) = self.bindings.remove(interview_id) else {
            return false;
        };
        self.due.retain(|Reverse(p)| &p.interview_id != interview_id);
        if let Err(e) = binding.page.close().await {
            tracing::warn!(interview_id = %interview_id, error = %e, "closing page failed");
        }
        self.retired.insert(interview_id.clone(), binding.plan);
        true
    }

    async fn release_all(&mut self) {
        let ids: Vec<InterviewId> = self.bindings.keys().cloned().collect();
        for id in ids {
            self.release(&id).await;
        }
    }
}

/// Open the chat if needed, type `text` and submit it
async fn send_chat(page: &mut dyn Page, text: &str) -> Result<(), DeliveryError> {
    let input = match first_visible(&*page, ui::CHAT_INPUT).await {
        Some(selector) => selector,
        None => {
            open_chat(page).await?;
            tokio::time::sleep(CHAT_PANEL_SETTLE).await;
            first_visible(&*page, ui::CHAT_INPUT)
                .await
                .ok_or(DeliveryError::InputNotFound)?
        }
    };
    page.type_text(&Locator::css(input), text).await?;
    page.press_keys(&KeyChord::enter()).await?;
    Ok(())
}

async fn open_chat(page: &mut dyn Page) -> Result<(), DeliveryError> {
    for selector in ui::CHAT_TOGGLE {
        let locator = Locator::css(*selector);
        if is_interactable(&*page, &locator).await {
            page.click(&locator).await?;
            return Ok(());
        }
    }
    Err(DeliveryError::ChatNotFound)
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
