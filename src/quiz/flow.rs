//! Quiz flow — which question comes next.
//!
//! Mostly linear, with one branch: the condition and symptom questions are
//! only asked when the user reports digestive issues.

use serde::{Deserialize, Serialize};

use super::model::QuizAnswers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStep {
    MainGoal,
    HasDigestiveIssues,
    DigestiveConditions,
    DigestiveSymptoms,
    RecentSymptoms,
    HealthGoals,
    TrackingFrequency,
    AnalysisPreference,
    Done,
}

impl QuizStep {
    /// The step after `self`, given the answers collected so far.
    pub fn next(&self, answers: &QuizAnswers) -> QuizStep {
        use QuizStep::*;
        match self {
            MainGoal => HasDigestiveIssues,
            HasDigestiveIssues => {
                if answers.has_digestive_issues == Some(true) {
                    DigestiveConditions
                } else {
                    RecentSymptoms
                }
            }
            DigestiveConditions => DigestiveSymptoms,
            DigestiveSymptoms => RecentSymptoms,
            RecentSymptoms => HealthGoals,
            HealthGoals => TrackingFrequency,
            TrackingFrequency => AnalysisPreference,
            AnalysisPreference | Done => Done,
        }
    }

    /// Whether `answers` already holds an answer for this step.
    pub fn is_answered(&self, answers: &QuizAnswers) -> bool {
        use QuizStep::*;
        match self {
            MainGoal => answers.main_goal.is_some(),
            HasDigestiveIssues => answers.has_digestive_issues.is_some(),
            DigestiveConditions => {
                answers.digestive_conditions.is_some() || answers.custom_condition.is_some()
            }
            DigestiveSymptoms => answers.digestive_symptoms.is_some(),
            RecentSymptoms => answers.recent_symptoms.is_some(),
            HealthGoals => answers.health_goals.is_some() || answers.custom_goal.is_some(),
            TrackingFrequency => answers.tracking_frequency.is_some(),
            AnalysisPreference => answers.analysis_preference.is_some(),
            Done => true,
        }
    }

    /// Where to resume a quiz interrupted by an app restart.
    pub fn resume_point(answers: &QuizAnswers) -> QuizStep {
        let mut step = QuizStep::MainGoal;
        while step.is_answered(answers) && step != QuizStep::Done {
            step = step.next(answers);
        }
        step
    }
}
