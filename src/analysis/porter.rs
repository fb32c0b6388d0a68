//! Porter's Five Forces analysis.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::SchemaDescriptor;
use crate::ExecCtx;
use serde::{Deserialize, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "market_analysis";

const TEMPLATE: &str = "\
Analyze the market for the startup, given the following description: {topic}

Provide the analysis using Porter's Five Forces model with the following structure:
1. Threat of New Entrants
2. Threat of Substitutes
3. Bargaining Power of Suppliers
4. Bargaining Power of Buyers
5. Competitive Rivalry
Summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveForces {
    pub threat_of_new_entrants: String,
    pub threat_of_substitutes: String,
    pub bargaining_power_of_suppliers: String,
    pub bargaining_power_of_buyers: String,
    pub competitive_rivalry: String,
    pub summary: String,
}

pub fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new("five_forces")
        .string("threat_of_new_entrants", "How easily new players can enter")
        .string("threat_of_substitutes", "Alternatives customers could switch to")
        .string("bargaining_power_of_suppliers", "Leverage held by suppliers")
        .string("bargaining_power_of_buyers", "Leverage held by customers")
        .string("competitive_rivalry", "Intensity of competition among incumbents")
        .string("summary", "Overall assessment")
}

/// Run a Five Forces analysis of `niche`.
pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<FiveForces> {
    pipeline::generate_as(ctx, GenerationRequest::new("five_forces", TEMPLATE, niche, schema())).await
}
