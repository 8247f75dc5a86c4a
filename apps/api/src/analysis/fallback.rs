//! Fallback Policy — every stage converts its internal failures into a
//! complete default result at its own boundary.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::prompts::{PromptError, PromptTemplate};
use crate::llm_client::{extract_json, LanguageModel, LlmError};

/// Why a stage could not use the model's answer. Never leaves the stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("malformed model response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Render → one gateway call → extract → strict decode into `T`.
pub async fn ask_json<T: DeserializeOwned>(
    llm: &dyn LanguageModel,
    template: &PromptTemplate,
    vars: &HashMap<&str, String>,
) -> Result<T, StageError> {
    let reply = ask_text(llm, template, vars).await?;
    Ok(serde_json::from_str(extract_json(&reply))?)
}

/// Render → one gateway call, returning the raw reply.
pub async fn ask_text(
    llm: &dyn LanguageModel,
    template: &PromptTemplate,
    vars: &HashMap<&str, String>,
) -> Result<String, StageError> {
    let prompt = template.render(vars)?;
    let reply = llm.generate(&prompt).await?;
    debug!("{} reply: {}", template.name, reply);
    Ok(reply)
}

/// Returns the stage outcome, or the stage's default result when it failed.
pub fn recover<T>(stage: &str, outcome: Result<T, StageError>, fallback: impl FnOnce() -> T) -> T {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            warn!("{stage} falling back to default result: {e}");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    const ECHO: PromptTemplate = PromptTemplate {
        name: "echo",
        text: "say {word}",
        variables: &["word"],
    };

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        word: String,
    }

    fn vars() -> HashMap<&'static str, String> {
        HashMap::from([("word", "hi".to_string())])
    }

    #[tokio::test]
    async fn test_ask_json_decodes_fenced_reply() {
        let llm = ScriptedModel::replying("```json\n{\"word\": \"hi\"}\n```");
        let reply: Reply = ask_json(&llm, &ECHO, &vars()).await.unwrap();
        assert_eq!(reply.word, "hi");
        assert_eq!(llm.last_prompt().as_deref(), Some("say hi"));
    }

    #[tokio::test]
    async fn test_ask_json_classifies_failures() {
        let down = ScriptedModel::unavailable();
        let err = ask_json::<Reply>(&down, &ECHO, &vars()).await.unwrap_err();
        assert!(matches!(err, StageError::Generation(_)));

        let chatty = ScriptedModel::replying("I think the word is hi");
        let err = ask_json::<Reply>(&chatty, &ECHO, &vars()).await.unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse(_)));

        let llm = ScriptedModel::replying("{}");
        let err = ask_json::<Reply>(&llm, &ECHO, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, StageError::Prompt(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn test_recover_uses_fallback_only_on_error() {
        assert_eq!(recover("t", Ok(1), || 2), 1);
        let failed: Result<i32, StageError> = Err(StageError::Generation(LlmError::EmptyContent));
        assert_eq!(recover("t", failed, || 2), 2);
    }
}
