use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{CandidateId, JobId};

/// Identifier wrapper for assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Identifier wrapper for submitted assessment responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

/// Question kinds supported by the assessment builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    ShortText,
    LongText,
    Numeric,
    FileUpload,
}

/// Constraints attached to a question's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Conditional-display rule: the question is shown only when the answer
/// to `depends_on` equals `show_when`. The referenced question id must
/// exist somewhere in the same assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub depends_on: String,
    pub show_when: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<QuestionValidation>,
    #[serde(rename = "conditionalLogic", skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSection {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<AssessmentQuestion>,
    pub order: usize,
}

/// One assessment per job, replaced wholesale through the upsert path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: AssessmentId,
    pub job_id: JobId,
    pub title: String,
    pub description: String,
    pub sections: Vec<AssessmentSection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied assessment body; id and timestamps are engine-owned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<AssessmentSection>,
}

/// A candidate's submitted answers, keyed by question id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: ResponseId,
    pub assessment_id: AssessmentId,
    pub candidate_id: CandidateId,
    pub responses: BTreeMap<String, Value>,
    pub submitted_at: DateTime<Utc>,
    pub score: u32,
}

/// Structural violations rejected before an assessment reaches the store.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentValidationError {
    #[error("question '{question}' depends on unknown question '{depends_on}'")]
    UnknownConditionalReference { question: String, depends_on: String },
}

/// Check that every conditional rule references a question id that exists
/// within the same assessment, across section boundaries.
pub fn validate_conditionals(sections: &[AssessmentSection]) -> Result<(), AssessmentValidationError> {
    let known: std::collections::HashSet<&str> = sections
        .iter()
        .flat_map(|section| section.questions.iter().map(|question| question.id.as_str()))
        .collect();

    for section in sections {
        for question in &section.questions {
            if let Some(rule) = &question.conditional {
                if !known.contains(rule.depends_on.as_str()) {
                    return Err(AssessmentValidationError::UnknownConditionalReference {
                        question: question.id.clone(),
                        depends_on: rule.depends_on.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Opaque scoring seam. The engine never inspects answers itself; the
/// scorer owns whatever computation produces the stored score.
pub trait ResponseScorer: Send + Sync {
    fn score(&self, assessment: &Assessment, responses: &BTreeMap<String, Value>) -> u32;
}

/// Default scorer: a uniform draw in 1..=100.
pub struct UniformScorer {
    rng: Mutex<StdRng>,
}

impl UniformScorer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for UniformScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseScorer for UniformScorer {
    fn score(&self, _assessment: &Assessment, _responses: &BTreeMap<String, Value>) -> u32 {
        self.rng.lock().expect("scorer rng poisoned").gen_range(1..=100)
    }
}

/// Scorer returning a constant, for deterministic tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub u32);

impl ResponseScorer for FixedScorer {
    fn score(&self, _assessment: &Assessment, _responses: &BTreeMap<String, Value>) -> u32 {
        self.0
    }
}
