//! Feature-comparison graph data, built by a three-stage chain.
//!
//! ```text
//! competitors ──► features ──► plots
//! ```
//!
//! Stages run strictly in order and each feeds the next. The first failing
//! stage aborts the chain with [`AnalysisError::StageFailed`]; later stages
//! never reach the backend. Lists supplied by the caller replace the
//! corresponding discovery stage.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::{FieldType, SchemaDescriptor};
use crate::{AnalysisError, ExecCtx};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "graph";

const COMPETITORS_TEMPLATE: &str = "Identify the top 4 competitors in the market niche: {topic}.";

const FEATURES_TEMPLATE: &str = "\
Identify 4 key features for startups in the market niche: {topic}.
Provide each feature as an object with the key \"feature\".";

const PLOTS_TEMPLATE: &str = "\
Based on the features: {features} for the market niche: {topic},
generate startup data for the top competitors in the market ({competitors}) \
with their values to plot on a graph. Every startup gets one plot point per feature.";

/// What to build a graph for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    pub market_niche: String,
    /// Skip competitor discovery and use these names.
    #[serde(default)]
    pub competitors: Option<Vec<String>>,
    /// Skip feature discovery and use these features.
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

impl GraphInput {
    pub fn new(market_niche: impl Into<String>) -> Self {
        Self {
            market_niche: market_niche.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub x_features: String,
    pub y_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupPlots {
    pub name: String,
    pub plots: Vec<Plot>,
}

/// Everything needed to draw the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGraph {
    pub competitors: Vec<String>,
    pub features: Vec<String>,
    pub startups: Vec<StartupPlots>,
}

#[derive(Deserialize)]
struct CompetitorsStage {
    competitors: Vec<String>,
}

#[derive(Deserialize)]
struct Feature {
    feature: String,
}

#[derive(Deserialize)]
struct FeaturesStage {
    lists: Vec<Feature>,
}

#[derive(Deserialize)]
struct PlotsStage {
    startups: Vec<StartupPlots>,
}

pub fn competitors_schema() -> SchemaDescriptor {
    SchemaDescriptor::new("graph_competitors").list("competitors", "Competitor names", FieldType::string_list())
}

pub fn features_schema() -> SchemaDescriptor {
    let feature = SchemaDescriptor::new("feature").string("feature", "Feature name");
    SchemaDescriptor::new("graph_features").list("lists", "Key features", FieldType::object_list(feature))
}

pub fn plots_schema() -> SchemaDescriptor {
    let plot = SchemaDescriptor::new("plot")
        .string("x_features", "Feature name")
        .string("y_value", "Score for this feature");
    let startup = SchemaDescriptor::new("startup")
        .string("name", "Competitor name")
        .list("plots", "One point per feature", FieldType::object_list(plot));
    SchemaDescriptor::new("graph_plots").list("startups", "One entry per competitor", FieldType::object_list(startup))
}

/// Run the chain for `input`.
pub async fn build(ctx: &ExecCtx, input: &GraphInput) -> Result<FeatureGraph> {
    let niche = input.market_niche.as_str();
    if niche.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("market niche must not be empty".into()));
    }

    let competitors = match &input.competitors {
        Some(given) => given.clone(),
        None => {
            let request = GenerationRequest::new("graph_competitors", COMPETITORS_TEMPLATE, niche, competitors_schema());
            let stage: CompetitorsStage = pipeline::generate_as(ctx, request)
                .await
                .map_err(|e| e.in_stage("competitors"))?;
            stage.competitors
        }
    };

    let features = match &input.features {
        Some(given) => given.clone(),
        None => {
            let request = GenerationRequest::new("graph_features", FEATURES_TEMPLATE, niche, features_schema());
            let stage: FeaturesStage = pipeline::generate_as(ctx, request)
                .await
                .map_err(|e| e.in_stage("features"))?;
            stage.lists.into_iter().map(|f| f.feature).collect()
        }
    };

    let request = GenerationRequest::new("graph_plots", PLOTS_TEMPLATE, niche, plots_schema())
        .with_var("features", features.join(", "))
        .with_var("competitors", competitors.join(", "));
    let stage: PlotsStage = pipeline::generate_as(ctx, request)
        .await
        .map_err(|e| e.in_stage("plots"))?;

    info!(
        niche,
        competitors = competitors.len(),
        features = features.len(),
        startups = stage.startups.len(),
        "graph built"
    );
    Ok(FeatureGraph {
        competitors,
        features,
        startups: stage.startups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{ctx_with, fenced};
    use crate::backend::MockReply;
    use serde_json::json;

    fn competitors_reply() -> MockReply {
        MockReply::Text(fenced(&json!({"competitors": ["Byjus", "Coursera"]})))
    }

    fn features_reply() -> MockReply {
        MockReply::Text(fenced(&json!({"lists": [{"feature": "Price"}, {"feature": "Content"}]})))
    }

    fn plots_reply() -> MockReply {
        MockReply::Text(fenced(&json!({"startups": [
            {"name": "Byjus", "plots": [{"x_features": "Price", "y_value": "7"}, {"x_features": "Content", "y_value": "9"}]},
            {"name": "Coursera", "plots": [{"x_features": "Price", "y_value": "5"}, {"x_features": "Content", "y_value": "8"}]}
        ]})))
    }

    #[tokio::test]
    async fn test_full_chain_in_order() {
        let (ctx, mock) = ctx_with(vec![competitors_reply(), features_reply(), plots_reply()]);
        let graph = build(&ctx, &GraphInput::new("edtech")).await.unwrap();

        assert_eq!(graph.competitors, vec!["Byjus", "Coursera"]);
        assert_eq!(graph.features, vec!["Price", "Content"]);
        assert_eq!(graph.startups.len(), 2);
        assert_eq!(graph.startups[1].plots[1].y_value, "8");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("Identify the top 4 competitors"));
        assert!(prompts[1].starts_with("Identify 4 key features"));
        assert!(prompts[2].contains("Based on the features: Price, Content"));
        assert!(prompts[2].contains("(Byjus, Coursera)"));
    }

    #[tokio::test]
    async fn test_competitor_stage_failure_stops_chain() {
        let (ctx, mock) = ctx_with(vec![
            MockReply::Text("no fence at all".into()),
            features_reply(),
            plots_reply(),
        ]);
        let err = build(&ctx, &GraphInput::new("edtech")).await.unwrap_err();

        match &err {
            AnalysisError::StageFailed { stage, source } => {
                assert_eq!(stage, "competitors");
                assert!(matches!(**source, AnalysisError::MalformedResponse(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_outage_in_features_stage() {
        let (ctx, mock) = ctx_with(vec![
            competitors_reply(),
            MockReply::Unavailable("quota exceeded".into()),
            plots_reply(),
        ]);
        let err = build(&ctx, &GraphInput::new("edtech")).await.unwrap_err();
        assert!(matches!(&err, AnalysisError::StageFailed { stage, .. } if stage == "features"));
        assert!(matches!(err.root(), AnalysisError::BackendUnavailable { .. }));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_supplied_lists_skip_discovery() {
        let (ctx, mock) = ctx_with(vec![plots_reply()]);
        let input = GraphInput {
            market_niche: "edtech".into(),
            competitors: Some(vec!["Byjus".into(), "Coursera".into()]),
            features: Some(vec!["Price".into(), "Content".into()]),
        };
        let graph = build(&ctx, &input).await.unwrap();
        assert_eq!(graph.competitors, vec!["Byjus", "Coursera"]);
        assert_eq!(mock.calls(), 1);
        assert!(mock.prompts()[0].starts_with("Based on the features"));
    }

    #[tokio::test]
    async fn test_empty_niche_makes_no_calls() {
        let (ctx, mock) = ctx_with(vec![competitors_reply()]);
        let err = build(&ctx, &GraphInput::new(" ")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_input_lists_are_optional() {
        let input: GraphInput = serde_json::from_str(r#"{"market_niche": "edtech"}"#).unwrap();
        assert_eq!(input, GraphInput::new("edtech"));
    }
}
