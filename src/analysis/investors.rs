//! Likely investors for startups in a niche.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::{FieldType, SchemaDescriptor};
use crate::ExecCtx;
use serde::{Deserialize, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "investor_analysis";

const TEMPLATE: &str = "\
List the top 6 investors for startups in the market niche: {topic}
Provide the name of each investor.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub investor_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorAnalysis {
    pub investors: Vec<Investor>,
}

pub fn schema() -> SchemaDescriptor {
    let investor = SchemaDescriptor::new("investor").string("investor_name", "Fund or angel name");
    SchemaDescriptor::new(RESPONSE_KEY).list("investors", "Top investors", FieldType::object_list(investor))
}

pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<InvestorAnalysis> {
    pipeline::generate_as(ctx, GenerationRequest::new(RESPONSE_KEY, TEMPLATE, niche, schema())).await
}
