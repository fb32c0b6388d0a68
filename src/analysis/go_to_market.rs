//! Go-to-market strategy for a startup in a niche.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::SchemaDescriptor;
use crate::ExecCtx;
use serde::{Deserialize, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "go_to_market_strategy";

const TEMPLATE: &str = "\
Analyze the market for a startup in the following niche: {topic}

Provide a detailed go-to-market strategy with the following structure:
1. 🎯 Defining the Target Market and Customer Segments
2. 🌟 Developing a Unique Value Proposition and Positioning
3. 💰 Setting an Optimal Pricing Strategy
4. 📣 Creating a Marketing and Communication Plan
5. 🎯 Designing a Tailored Sales Strategy
6. 📈 Tracking Success with Key Performance Indicators (KPIs)
7. Summary";

/// A seven-part go-to-market plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoToMarketStrategy {
    pub target_market_and_segments: String,
    pub value_proposition_and_positioning: String,
    pub pricing_strategy: String,
    pub marketing_and_communication_plan: String,
    pub sales_strategy: String,
    pub kpis: String,
    pub summary: String,
}

/// Shape of [`GoToMarketStrategy`].
pub fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new(RESPONSE_KEY)
        .string("target_market_and_segments", "Target market and customer segments")
        .string("value_proposition_and_positioning", "Unique value proposition and positioning")
        .string("pricing_strategy", "Pricing strategy")
        .string("marketing_and_communication_plan", "Marketing and communication plan")
        .string("sales_strategy", "Sales strategy")
        .string("kpis", "Key performance indicators to track")
        .string("summary", "Short summary of the strategy")
}

/// Generate a go-to-market strategy for `niche`.
pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<GoToMarketStrategy> {
    pipeline::generate_as(ctx, GenerationRequest::new(RESPONSE_KEY, TEMPLATE, niche, schema())).await
}
