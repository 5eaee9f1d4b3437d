// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timed interview question plans

use crate::template::interpolate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// A question template from configuration. `{candidate_name}` and
/// `{position}` are filled in when the plan is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    /// Offset from session start
    #[serde(with = "humantime_serde")]
    pub offset: Duration,
    pub text: String,
}

impl QuestionTemplate {
    pub fn new(offset: Duration, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }
}

/// One scheduled question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(with = "humantime_serde")]
    pub offset: Duration,
    pub text: String,
    pub sent: bool,
}

/// Errors building a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("question {index} at {offset:?} comes before the previous question at {previous:?}")]
    NotMonotonic {
        index: usize,
        offset: Duration,
        previous: Duration,
    },
    #[error("question {0} has empty text")]
    EmptyText(usize),
}

/// Ordered questions for one session, monotonic in offset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPlan {
    questions: Vec<Question>,
}

impl QuestionPlan {
    /// Build a plan, rejecting decreasing offsets and blank questions
    pub fn new(entries: Vec<(Duration, String)>) -> Result<Self, PlanError> {
        let mut previous = Duration::ZERO;
        let mut questions = Vec::with_capacity(entries.len());
        for (index, (offset, text)) in entries.into_iter().enumerate() {
            if offset < previous {
                return Err(PlanError::NotMonotonic {
                    index,
                    offset,
                    previous,
                });
            }
            if text.trim().is_empty() {
                return Err(PlanError::EmptyText(index));
            }
            previous = offset;
            questions.push(Question {
                offset,
                text,
                sent: false,
            });
        }
        Ok(Self { questions })
    }

    /// Render templates against the given variables
    pub fn from_templates(
        templates: &[QuestionTemplate],
        vars: &HashMap<String, String>,
    ) -> Result<Self, PlanError> {
        Self::new(
            templates
                .iter()
                .map(|t| (t.offset, interpolate(&t.text, vars)))
                .collect(),
        )
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Unsent questions with their indices, in plan order
    pub fn pending(&self) -> impl Iterator<Item = (usize, &Question)> {
        self.questions.iter().enumerate().filter(|(_, q)| !q.sent)
    }

    /// Flip `sent` for one question. Returns true only the first time.
    pub fn mark_sent(&mut self, index: usize) -> bool {
        match self.questions.get_mut(index) {
            Some(q) if !q.sent => {
                q.sent = true;
                true
            }
            _ => false,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.questions.iter().filter(|q| q.sent).count()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
#[path = "question_tests.rs"]
mod tests;
