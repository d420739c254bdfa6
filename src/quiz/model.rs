//! Quiz answer model.

use serde::{Deserialize, Serialize};

/// How often the user plans to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingFrequency {
    #[serde(rename = "After every bowel movement")]
    EveryMovement,
    #[serde(rename = "Once a day")]
    Daily,
    #[serde(rename = "A few times a week")]
    FewTimesAWeek,
    #[serde(rename = "Once a week")]
    Weekly,
    #[serde(rename = "Only when I notice something unusual")]
    WhenUnusual,
}

/// Tone of the generated analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPreference {
    Funny,
    Serious,
    Both,
}

/// Partial quiz answers, accumulated screen by screen.
///
/// Every field is optional. The JSON shape (camelCase) is what the store
/// holds under `poopai_quiz_answers` and what the backend profile expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_digestive_issues: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digestive_conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digestive_symptoms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_symptoms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_goals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_frequency: Option<TrackingFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_preference: Option<AnalysisPreference>,
}

impl QuizAnswers {
    /// Shallow merge: every field set in `partial` replaces ours, everything
    /// else is kept. Lists are replaced, not concatenated.
    pub fn merge(&mut self, partial: QuizAnswers) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.main_goal, partial.main_goal);
        take(&mut self.has_digestive_issues, partial.has_digestive_issues);
        take(&mut self.digestive_conditions, partial.digestive_conditions);
        take(&mut self.custom_condition, partial.custom_condition);
        take(&mut self.digestive_symptoms, partial.digestive_symptoms);
        take(&mut self.recent_symptoms, partial.recent_symptoms);
        take(&mut self.health_goals, partial.health_goals);
        take(&mut self.custom_goal, partial.custom_goal);
        take(&mut self.tracking_frequency, partial.tracking_frequency);
        take(&mut self.analysis_preference, partial.analysis_preference);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
