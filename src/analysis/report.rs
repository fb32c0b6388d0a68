//! Comprehensive feasibility report, as JSON or as a rendered PDF.
//!
//! The PDF path makes two model round-trips: one for the structured report,
//! one turning it into a styled HTML article (extracted from an ```` ```html ````
//! fence), which the [`DocumentRenderer`] then converts.

use crate::error::Result;
use crate::output_parser::FenceExtractor;
use crate::pipeline::{self, GenerationRequest};
use crate::prompt::{self, PromptVars};
use crate::render::{self, DocumentRenderer};
use crate::schema::SchemaDescriptor;
use crate::{AnalysisError, ExecCtx};
use serde::{Deserialize, Serialize};

/// Key the JSON report is published under.
pub const RESPONSE_KEY: &str = "comprehensive_report";

const REPORT_TEMPLATE: &str = "\
Generate a comprehensive report for the given market description: {topic}

The report should include the following sections with detailed information:
1. Executive Summary
2. Product Feasibility Analysis
    - Market Analysis
    - Product Description
    - Technical Feasibility
    - Operational Feasibility
    - Financial Feasibility
    - Risk Analysis
3. Reliability Analysis
4. Break-Even Analysis
5. Conclusion and Recommendations
6. Appendices";

const HTML_TEMPLATE: &str = "\
Craft a sleek and contemporary medium-like article website about {topic} as a single \
HTML file with inline Tailwind CSS. Use minimalistic gradient effects, background colors, \
shadows, subtle animation, generous padding and careful text alignment. Use minimalistic \
colors and emojis. Tailor it to the provided data and make sure to include the complete data:

{complete}

Return the whole document inside one fenced code block that starts with ```html and ends with ```.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: String,
    pub objectives: String,
    pub key_findings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub target_market: String,
    pub market_need: String,
    pub market_size_growth: String,
    pub competitive_analysis: String,
    pub market_trends: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescription {
    pub product_features: String,
    pub unique_selling_proposition: String,
    pub development_roadmap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFeasibility {
    pub technology_requirements: String,
    pub development_process: String,
    pub technical_challenges: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalFeasibility {
    pub operational_plan: String,
    pub resource_requirements: String,
    pub regulatory_legal_considerations: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialFeasibility {
    pub cost_estimates: String,
    pub revenue_projections: String,
    pub break_even_analysis: String,
    pub funding_requirements: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub swot_analysis: String,
    pub risk_mitigation_strategies: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFeasibilityAnalysis {
    pub market_analysis: MarketAnalysis,
    pub product_description: ProductDescription,
    pub technical_feasibility: TechnicalFeasibility,
    pub operational_feasibility: OperationalFeasibility,
    pub financial_feasibility: FinancialFeasibility,
    pub risk_analysis: RiskAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityRequirements {
    pub performance_standards: String,
    pub user_expectations: String,
    pub regulatory_requirements: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignAnalysis {
    pub design_simplicity: String,
    pub component_selection: String,
    pub redundancy_fail_safes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityPredictionMethods {
    pub historical_data: String,
    pub analytical_methods: String,
    pub accelerated_life_testing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingValidation {
    pub test_plan: String,
    pub environmental_testing: String,
    pub stress_testing: String,
    pub usage_simulation: String,
    pub beta_testing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCollectionAnalysis {
    pub data_sources: String,
    pub failure_data_analysis: String,
    pub statistical_methods: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentMitigation {
    pub risk_identification: String,
    pub risk_assessment: String,
    pub mitigation_strategies: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityAnalysis {
    pub reliability_requirements: ReliabilityRequirements,
    pub design_analysis: DesignAnalysis,
    pub reliability_prediction_methods: ReliabilityPredictionMethods,
    pub testing_validation: TestingValidation,
    pub data_collection_analysis: DataCollectionAnalysis,
    pub risk_assessment_mitigation: RiskAssessmentMitigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostStructure {
    pub fixed_costs: String,
    pub variable_costs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingStrategy {
    pub pricing_model: String,
    pub price_per_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenCalculation {
    pub formula: String,
    pub break_even_units: String,
    pub break_even_sales: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub variable_changes: String,
    pub scenarios: String,
    pub impact_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionMargin {
    pub contribution_margin_per_unit: String,
    pub contribution_margin_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicalRepresentation {
    pub break_even_chart: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenAnalysis {
    pub cost_structure: CostStructure,
    pub pricing_strategy: PricingStrategy,
    pub break_even_calculation: BreakEvenCalculation,
    pub sensitivity_analysis: SensitivityAnalysis,
    pub contribution_margin: ContributionMargin,
    pub graphical_representation: GraphicalRepresentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclusionRecommendations {
    pub feasibility_summary: String,
    pub reliability_summary: String,
    pub break_even_summary: String,
    pub next_steps: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appendices {
    pub supporting_documents: String,
    pub detailed_financial_statements: String,
    pub assumptions: String,
    pub test_results_data: String,
}

/// The full feasibility report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub executive_summary: ExecutiveSummary,
    pub product_feasibility_analysis: ProductFeasibilityAnalysis,
    pub reliability_analysis: ReliabilityAnalysis,
    pub break_even_analysis: BreakEvenAnalysis,
    pub conclusion_recommendations: ConclusionRecommendations,
    pub appendices: Appendices,
}

/// A section made only of prose fields; each instruction is the field name in words.
fn prose(name: &str, fields: &[&str]) -> SchemaDescriptor {
    fields.iter().fold(SchemaDescriptor::new(name), |schema, field| {
        schema.string(*field, field.replace('_', " "))
    })
}

pub fn schema() -> SchemaDescriptor {
    let feasibility = SchemaDescriptor::new("product_feasibility_analysis")
        .object(
            "market_analysis",
            "",
            prose(
                "market_analysis",
                &["target_market", "market_need", "market_size_growth", "competitive_analysis", "market_trends"],
            ),
        )
        .object(
            "product_description",
            "",
            prose(
                "product_description",
                &["product_features", "unique_selling_proposition", "development_roadmap"],
            ),
        )
        .object(
            "technical_feasibility",
            "",
            prose(
                "technical_feasibility",
                &["technology_requirements", "development_process", "technical_challenges"],
            ),
        )
        .object(
            "operational_feasibility",
            "",
            prose(
                "operational_feasibility",
                &["operational_plan", "resource_requirements", "regulatory_legal_considerations"],
            ),
        )
        .object(
            "financial_feasibility",
            "",
            prose(
                "financial_feasibility",
                &["cost_estimates", "revenue_projections", "break_even_analysis", "funding_requirements"],
            ),
        )
        .object(
            "risk_analysis",
            "",
            prose("risk_analysis", &["swot_analysis", "risk_mitigation_strategies"]),
        );

    let reliability = SchemaDescriptor::new("reliability_analysis")
        .object(
            "reliability_requirements",
            "",
            prose(
                "reliability_requirements",
                &["performance_standards", "user_expectations", "regulatory_requirements"],
            ),
        )
        .object(
            "design_analysis",
            "",
            prose(
                "design_analysis",
                &["design_simplicity", "component_selection", "redundancy_fail_safes"],
            ),
        )
        .object(
            "reliability_prediction_methods",
            "",
            prose(
                "reliability_prediction_methods",
                &["historical_data", "analytical_methods", "accelerated_life_testing"],
            ),
        )
        .object(
            "testing_validation",
            "",
            prose(
                "testing_validation",
                &["test_plan", "environmental_testing", "stress_testing", "usage_simulation", "beta_testing"],
            ),
        )
        .object(
            "data_collection_analysis",
            "",
            prose(
                "data_collection_analysis",
                &["data_sources", "failure_data_analysis", "statistical_methods"],
            ),
        )
        .object(
            "risk_assessment_mitigation",
            "",
            prose(
                "risk_assessment_mitigation",
                &["risk_identification", "risk_assessment", "mitigation_strategies"],
            ),
        );

    let break_even = SchemaDescriptor::new("break_even_analysis")
        .object("cost_structure", "", prose("cost_structure", &["fixed_costs", "variable_costs"]))
        .object("pricing_strategy", "", prose("pricing_strategy", &["pricing_model", "price_per_unit"]))
        .object(
            "break_even_calculation",
            "",
            prose("break_even_calculation", &["formula", "break_even_units", "break_even_sales"]),
        )
        .object(
            "sensitivity_analysis",
            "",
            prose("sensitivity_analysis", &["variable_changes", "scenarios", "impact_analysis"]),
        )
        .object(
            "contribution_margin",
            "",
            prose(
                "contribution_margin",
                &["contribution_margin_per_unit", "contribution_margin_ratio"],
            ),
        )
        .object(
            "graphical_representation",
            "",
            prose("graphical_representation", &["break_even_chart"]),
        );

    SchemaDescriptor::new(RESPONSE_KEY)
        .object(
            "executive_summary",
            "Executive summary",
            prose("executive_summary", &["overview", "objectives", "key_findings"]),
        )
        .object("product_feasibility_analysis", "Product feasibility analysis", feasibility)
        .object("reliability_analysis", "Reliability analysis", reliability)
        .object("break_even_analysis", "Break-even analysis", break_even)
        .object(
            "conclusion_recommendations",
            "Conclusion and recommendations",
            prose(
                "conclusion_recommendations",
                &["feasibility_summary", "reliability_summary", "break_even_summary", "next_steps"],
            ),
        )
        .object(
            "appendices",
            "Appendices",
            prose(
                "appendices",
                &["supporting_documents", "detailed_financial_statements", "assumptions", "test_results_data"],
            ),
        )
}

/// Generate the structured report for `niche`.
pub async fn generate(ctx: &ExecCtx, niche: &str) -> Result<ComprehensiveReport> {
    pipeline::generate_as(ctx, GenerationRequest::new(RESPONSE_KEY, REPORT_TEMPLATE, niche, schema())).await
}

/// Ask the model to lay `report` out as a styled HTML article.
pub async fn render_html(ctx: &ExecCtx, niche: &str, report: &ComprehensiveReport) -> Result<String> {
    let complete = serde_json::to_string_pretty(report).map_err(|e| AnalysisError::InvalidPayload {
        reason: e.to_string(),
        text: String::new(),
    })?;
    let mut vars = PromptVars::new();
    vars.insert("complete".into(), complete);
    let prompt = prompt::render(HTML_TEMPLATE, niche, &vars);
    pipeline::generate_markup(ctx, "report_html", prompt, &FenceExtractor::html()).await
}

/// Generate the report, lay it out as HTML and render it to PDF bytes.
pub async fn generate_pdf(ctx: &ExecCtx, renderer: &dyn DocumentRenderer, niche: &str) -> Result<Vec<u8>> {
    let report = generate(ctx, niche).await?;
    let html = render_html(ctx, niche, &report).await?;
    render::html_to_pdf(renderer, &html).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{ctx_with, fenced};
    use crate::backend::MockReply;
    use crate::schema::FieldType;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::path::Path;

    /// Fill every string leaf of `schema` with its own path.
    fn filled(schema: &SchemaDescriptor, prefix: &str) -> Value {
        let mut map = Map::new();
        for field in schema.fields() {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", prefix, field.name)
            };
            let value = match &field.ty {
                FieldType::Object(nested) => filled(nested, &path),
                _ => Value::String(path),
            };
            map.insert(field.name.clone(), value);
        }
        Value::Object(map)
    }

    fn sample_report() -> Value {
        filled(&schema(), "")
    }

    struct EchoRenderer;

    #[async_trait]
    impl DocumentRenderer for EchoRenderer {
        async fn render(&self, html: &Path, pdf: &Path) -> Result<()> {
            let markup = tokio::fs::read_to_string(html).await?;
            tokio::fs::write(pdf, format!("%PDF-1.4\n{}", markup)).await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_report_parses_nested_sections() {
        let (ctx, _) = ctx_with(vec![MockReply::Text(fenced(&sample_report()))]);
        let report = generate(&ctx, "solar").await.unwrap();
        assert_eq!(
            report.break_even_analysis.break_even_calculation.formula,
            "break_even_analysis.break_even_calculation.formula"
        );
        assert_eq!(report.appendices.assumptions, "appendices.assumptions");
    }

    #[tokio::test]
    async fn test_missing_nested_field_names_its_path() {
        let mut value = sample_report();
        value["reliability_analysis"]["testing_validation"]
            .as_object_mut()
            .unwrap()
            .remove("beta_testing");
        let (ctx, _) = ctx_with(vec![MockReply::Text(fenced(&value))]);

        match generate(&ctx, "solar").await.unwrap_err() {
            AnalysisError::SchemaViolation { missing, .. } => {
                assert_eq!(missing, vec!["reliability_analysis.testing_validation.beta_testing"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pdf_pipeline_uses_two_round_trips() {
        let (ctx, mock) = ctx_with(vec![
            MockReply::Text(fenced(&sample_report())),
            MockReply::Text("Here it is:\n```html\n<html><body>🌞 Solar</body></html>\n```".into()),
        ]);
        let pdf = generate_pdf(&ctx, &EchoRenderer, "solar").await.unwrap();

        assert!(pdf.starts_with(b"%PDF"));
        assert!(String::from_utf8_lossy(&pdf).contains("🌞 Solar"));
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("executive_summary.overview"));
        assert!(prompts[1].contains("```html"));
    }

    #[tokio::test]
    async fn test_html_without_fence_is_malformed() {
        let (ctx, _) = ctx_with(vec![
            MockReply::Text(fenced(&sample_report())),
            MockReply::Text("<html></html>".into()),
        ]);
        let err = generate_pdf(&ctx, &EchoRenderer, "solar").await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }
}
