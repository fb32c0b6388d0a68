//! Target-market analysis.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::SchemaDescriptor;
use crate::ExecCtx;
use serde::{Deserialize, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "market_analysis";

const TEMPLATE: &str = "\
Analyze the following market information for a startup, specializing in {topic}:

Target Audience
Competitive Landscape
Market Opportunities
Market Challenges
Market Summary

Provide a concise analysis based on the information. Also, summarize the key \
insights and potential areas of focus for {topic}.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMarket {
    pub target_audience: String,
    pub competitive_landscape: String,
    pub market_opportunities: String,
    pub market_challenges: String,
    pub market_summary: String,
}

pub fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new("target_market")
        .string("target_audience", "Who the customers are")
        .string("competitive_landscape", "Who else serves them")
        .string("market_opportunities", "Openings a newcomer can exploit")
        .string("market_challenges", "Obstacles to expect")
        .string("market_summary", "Key insights and areas of focus")
}

pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<TargetMarket> {
    pipeline::generate_as(ctx, GenerationRequest::new("target_market", TEMPLATE, niche, schema())).await
}
