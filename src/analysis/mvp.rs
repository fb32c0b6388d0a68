//! Path to a minimum viable product.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::SchemaDescriptor;
use crate::ExecCtx;
use serde::{Deserialize, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "mvp_analysis";

const TEMPLATE: &str = "\
Analyze the market for a startup in the following niche: {topic}

Provide a detailed path to MVP with the following structure:
1. Core Features
2. Market Valuation
3. Marketing Strategy
4. Timeline and Milestones
5. Budget and Allocation
6. Performance Measurement";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MvpAnalysis {
    pub core_features: String,
    pub market_valuation: String,
    pub marketing_strategy: String,
    pub timeline_and_milestones: String,
    pub budget_and_allocation: String,
    pub performance_measurement: String,
}

pub fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new(RESPONSE_KEY)
        .string("core_features", "Features the first release must have")
        .string("market_valuation", "Estimated size and value of the market")
        .string("marketing_strategy", "How to reach early adopters")
        .string("timeline_and_milestones", "Milestones up to launch")
        .string("budget_and_allocation", "Budget and where it goes")
        .string("performance_measurement", "How success is measured")
}

pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<MvpAnalysis> {
    pipeline::generate_as(ctx, GenerationRequest::new(RESPONSE_KEY, TEMPLATE, niche, schema())).await
}
