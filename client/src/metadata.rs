//! Process metadata: the human side of a ballot, stored off chain.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Text per language tag; `"default"` is the fallback.
pub type MultiLanguage = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetadata {
    #[serde(default = "default_version")]
    pub version: String,
    pub title: MultiLanguage,
    #[serde(default)]
    pub description: MultiLanguage,
    /// Named media URIs, e.g. `header` or `streamUri`.
    #[serde(default)]
    pub media: BTreeMap<String, String>,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: MultiLanguage,
    #[serde(default)]
    pub description: MultiLanguage,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub title: MultiLanguage,
    /// Position of this choice's counter in the raw results row.
    pub value: u32,
}

fn default_version() -> String {
    "1.1".to_string()
}

impl ProcessMetadata {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ClientError> {
        let metadata: Self =
            serde_json::from_slice(bytes).map_err(|e| ClientError::Metadata(e.to_string()))?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ClientError> {
        self.validate()?;
        serde_json::to_vec(self).map_err(|e| ClientError::Metadata(e.to_string()))
    }

    /// A ballot needs a default title, at least one question, and distinct
    /// choice values per question.
    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.title.contains_key("default") {
            return Err(ClientError::Metadata("title has no default text".into()));
        }
        if self.questions.is_empty() {
            return Err(ClientError::Metadata("no questions".into()));
        }
        for (i, question) in self.questions.iter().enumerate() {
            if question.choices.is_empty() {
                return Err(ClientError::Metadata(format!("question {i} has no choices")));
            }
            let mut values = BTreeSet::new();
            if !question.choices.iter().all(|c| values.insert(c.value)) {
                return Err(ClientError::Metadata(format!(
                    "question {i} repeats a choice value"
                )));
            }
        }
        Ok(())
    }
}
