// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Question timer set: renders a session's plan and arms one delayed send
//! per question on the delivery queue

use crate::delivery::{DeliveryQueue, QueueClosed};
use av_core::{
    InterviewId, MeetingConfig, MeetingMode, PlanError, QuestionPlan, QuestionTemplate,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct QuestionTimerSet {
    templates: Vec<QuestionTemplate>,
}

impl QuestionTimerSet {
    pub fn new(templates: Vec<QuestionTemplate>) -> Self {
        Self { templates }
    }

    /// Plan for one meeting. Silent meetings get an empty plan.
    pub fn plan_for(&self, meeting: &MeetingConfig) -> Result<QuestionPlan, PlanError> {
        if meeting.mode == MeetingMode::Silent {
            return Ok(QuestionPlan::default());
        }
        let vars = HashMap::from([
            ("candidate_name".to_string(), meeting.candidate_name.clone()),
            ("position".to_string(), meeting.position.clone()),
        ]);
        QuestionPlan::from_templates(&self.templates, &vars)
    }

    /// Enqueue every unsent question at its offset. Offsets count from now,
    /// which is the moment the session became active.
    pub fn arm(
        &self,
        queue: &DeliveryQueue,
        interview_id: &InterviewId,
        plan: &QuestionPlan,
    ) -> Result<usize, QueueClosed> {
        let mut armed = 0;
        for (index, question) in plan.pending() {
            queue.enqueue_question(interview_id, index, question.text.clone(), question.offset)?;
            armed += 1;
        }
        Ok(armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timers() -> QuestionTimerSet {
        QuestionTimerSet::new(vec![
            QuestionTemplate::new(Duration::from_secs(10), "Hi {candidate_name}"),
            QuestionTemplate::new(Duration::from_secs(70), "Why {position}?"),
        ])
    }

    #[test]
    fn plan_interpolates_meeting_details() {
        let meeting = MeetingConfig::new("https://meet.example.com/x", "Ada", "Engineer");

        let plan = timers().plan_for(&meeting).unwrap();

        let texts: Vec<&str> = plan.questions().iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, ["Hi Ada", "Why Engineer?"]);
        assert_eq!(plan.sent_count(), 0);
    }

    #[test]
    fn silent_meetings_have_no_questions() {
        let meeting = MeetingConfig::new("https://meet.example.com/x", "Ada", "Engineer")
            .with_mode(MeetingMode::Silent);

        assert!(timers().plan_for(&meeting).unwrap().is_empty());
    }

    #[test]
    fn out_of_order_templates_are_rejected() {
        let timers = QuestionTimerSet::new(vec![
            QuestionTemplate::new(Duration::from_secs(70), "later"),
            QuestionTemplate::new(Duration::from_secs(10), "earlier"),
        ]);
        let meeting = MeetingConfig::new("https://meet.example.com/x", "Ada", "Engineer");

        assert!(matches!(
            timers.plan_for(&meeting),
            Err(PlanError::NotMonotonic { index: 1, .. })
        ));
    }
}
