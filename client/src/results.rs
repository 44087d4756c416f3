//! Merging raw vote counters with the ballot's metadata.

use serde::{Deserialize, Serialize};

use crate::metadata::{MultiLanguage, ProcessMetadata};
use crate::ClientError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub title: MultiLanguage,
    pub votes: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestedQuestion {
    pub title: MultiLanguage,
    pub options: Vec<OptionResult>,
}

/// Per-question, per-option results with the ballot's labels.
///
/// The default value is the empty digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestedResults {
    pub title: MultiLanguage,
    pub questions: Vec<DigestedQuestion>,
    pub total_votes: u64,
}

impl DigestedResults {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Label `raw` counters (one row per question, one counter per choice
/// value) with `metadata`.
///
/// Rows and questions are matched by position. A row count that differs
/// from the question count, or a choice value outside its row, is an error.
pub fn digest_results(
    metadata: &ProcessMetadata,
    raw: &[Vec<u128>],
    total_votes: u64,
) -> Result<DigestedResults, ClientError> {
    if raw.len() != metadata.questions.len() {
        return Err(ClientError::ResultsMismatch(format!(
            "{} result rows for {} questions",
            raw.len(),
            metadata.questions.len()
        )));
    }

    let questions = metadata
        .questions
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (question, row))| {
            let options = question
                .choices
                .iter()
                .map(|choice| {
                    let votes = row.get(choice.value as usize).copied().ok_or_else(|| {
                        ClientError::ResultsMismatch(format!(
                            "question {i}: no counter for choice value {} in a row of {}",
                            choice.value,
                            row.len()
                        ))
                    })?;
                    Ok(OptionResult {
                        title: choice.title.clone(),
                        votes,
                    })
                })
                .collect::<Result<Vec<_>, ClientError>>()?;
            Ok(DigestedQuestion {
                title: question.title.clone(),
                options,
            })
        })
        .collect::<Result<Vec<_>, ClientError>>()?;

    Ok(DigestedResults {
        title: metadata.title.clone(),
        questions,
        total_votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Choice, Question};

    fn lang(s: &str) -> MultiLanguage {
        MultiLanguage::from([("default".to_string(), s.to_string())])
    }

    fn metadata() -> ProcessMetadata {
        ProcessMetadata {
            version: "1.1".into(),
            title: lang("Board election"),
            description: MultiLanguage::new(),
            media: Default::default(),
            questions: vec![
                Question {
                    title: lang("Chair"),
                    description: MultiLanguage::new(),
                    choices: vec![
                        Choice { title: lang("Ana"), value: 0 },
                        Choice { title: lang("Ben"), value: 1 },
                    ],
                },
                Question {
                    title: lang("Treasurer"),
                    description: MultiLanguage::new(),
                    choices: vec![
                        Choice { title: lang("Cai"), value: 1 },
                        Choice { title: lang("Dee"), value: 0 },
                    ],
                },
            ],
        }
    }

    #[test]
    fn merges_by_choice_value() {
        let digest = digest_results(&metadata(), &[vec![7, 3], vec![4, 6]], 10).unwrap();
        assert_eq!(digest.total_votes, 10);
        assert_eq!(digest.questions[0].options[0].votes, 7);
        let treasurer = &digest.questions[1].options;
        assert_eq!(treasurer[0].title["default"], "Cai");
        assert_eq!(treasurer[0].votes, 6);
        assert_eq!(treasurer[1].votes, 4);
    }

    #[test]
    fn row_count_mismatch_is_an_error() {
        let err = digest_results(&metadata(), &[vec![1, 2]], 3).unwrap_err();
        assert!(matches!(err, ClientError::ResultsMismatch(_)));
    }

    #[test]
    fn short_row_is_an_error() {
        let err = digest_results(&metadata(), &[vec![1, 2], vec![5]], 3).unwrap_err();
        assert!(matches!(err, ClientError::ResultsMismatch(_)));
    }

    #[test]
    fn serializes_with_camel_case_option_lists() {
        let digest = digest_results(&metadata(), &[vec![7, 3], vec![4, 6]], 10).unwrap();
        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json["totalVotes"], 10);
        assert_eq!(json["questions"][1]["options"][0]["title"]["default"], "Cai");
        assert_eq!(json["questions"][1]["options"][0]["votes"], 6);
    }

    #[test]
    fn default_is_empty() {
        assert!(DigestedResults::default().is_empty());
    }
}
