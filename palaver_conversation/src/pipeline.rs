//! Fixed, linear sequence of stages.

use palaver_core::{Error, History, LLMProvider, Result, SearchProvider};
use tracing::debug;

use crate::stage::{GenerateStage, GenerationConfig, SearchStage, Stage, StageKind};

/// Stages run in insertion order, each receiving the previous one's output.
/// There is no branching: every transition is unconditional.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// `GENERATE` only.
    #[must_use]
    pub fn direct<P>(provider: P, config: GenerationConfig) -> Self
    where
        P: LLMProvider + 'static,
    {
        Self::new().with_stage(GenerateStage::new(provider, config))
    }

    /// `SEARCH` then `GENERATE`.
    #[must_use]
    pub fn retrieval_augmented<S, P>(search: S, provider: P, config: GenerationConfig) -> Self
    where
        S: SearchProvider + 'static,
        P: LLMProvider + 'static,
    {
        Self::new()
            .with_stage(SearchStage::new(search))
            .with_stage(GenerateStage::new(provider, config))
    }

    #[must_use]
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Run every stage in order.
    ///
    /// Each stage may only append: if its output does not start with the
    /// history it was given, the run fails with [`Error::HistoryRewritten`].
    pub async fn run(&self, mut history: History) -> Result<History> {
        for stage in &self.stages {
            let input = history.messages().to_vec();
            history = stage.run(history).await?;
            if !history.messages().starts_with(&input) {
                return Err(Error::HistoryRewritten {
                    stage: stage.kind().to_string(),
                });
            }
            debug!(
                "Stage {} appended {} message(s)",
                stage.kind(),
                history.len() - input.len()
            );
        }
        Ok(history)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSearch, RecordingSearch, ResetStage, ScriptedModel};
    use palaver_core::{ChatMessage, Role};

    #[test]
    fn test_variants_have_expected_stages() {
        let direct = Pipeline::direct(ScriptedModel::default(), GenerationConfig::default());
        assert_eq!(direct.stage_kinds(), vec![StageKind::Generate]);

        let augmented = Pipeline::retrieval_augmented(
            RecordingSearch::new(""),
            ScriptedModel::default(),
            GenerationConfig::default(),
        );
        assert_eq!(
            augmented.stage_kinds(),
            vec![StageKind::Search, StageKind::Generate]
        );
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_retrieval_augmented_appends_search_then_reply() {
        let search = RecordingSearch::new("sunny");
        let model = ScriptedModel::new(["It is sunny."]);
        let pipeline = Pipeline::retrieval_augmented(
            search.clone(),
            model.clone(),
            GenerationConfig::default().with_system_prompt(None),
        );
        let history = History::new().with_message(ChatMessage::user("Weather?"));

        let history = pipeline.run(history).await.expect("Pipeline failed");

        let roles: Vec<Role> = history.messages().iter().map(ChatMessage::role).collect();
        assert_eq!(roles, vec![Role::User, Role::SearchResult, Role::Assistant]);
        // The model saw the injected search results.
        assert_eq!(model.requests()[0].len(), 2);
        assert_eq!(search.queries(), vec!["Weather?".to_string()]);
    }

    #[tokio::test]
    async fn test_search_failure_skips_generate() {
        let model = ScriptedModel::new(["never sent"]);
        let pipeline =
            Pipeline::retrieval_augmented(FailingSearch, model.clone(), GenerationConfig::default());
        let history = History::new().with_message(ChatMessage::user("q"));

        let result = pipeline.run(history).await;

        assert!(result.is_err());
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn test_empty_pipeline_returns_input() {
        let history = History::new().with_message(ChatMessage::user("q"));

        let out = Pipeline::new()
            .run(history.clone())
            .await
            .expect("Empty pipeline failed");

        assert_eq!(out, history);
    }

    #[tokio::test]
    async fn test_stage_that_drops_history_is_rejected() {
        let model = ScriptedModel::new(["never sent"]);
        let pipeline = Pipeline::new()
            .with_stage(ResetStage)
            .with_stage(GenerateStage::new(model.clone(), GenerationConfig::default()));
        let history = History::new()
            .with_message(ChatMessage::user("q1"))
            .with_message(ChatMessage::assistant("a1"))
            .with_message(ChatMessage::user("q2"));

        let result = pipeline.run(history).await;

        assert!(matches!(
            result,
            Err(Error::HistoryRewritten { ref stage }) if stage == "SEARCH"
        ));
        assert!(model.requests().is_empty());
    }
}
