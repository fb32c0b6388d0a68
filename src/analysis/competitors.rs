//! Competitor analysis and the competitor directory.
//!
//! [`analyze`] asks for strengths, weaknesses and market share of each direct
//! competitor. [`directory`] asks for names and short descriptions, then
//! resolves a logo for every competitor through a [`LogoLookup`]. Logo
//! failures never fail the directory: the affected `logo` is left empty.

use crate::error::Result;
use crate::logo::LogoLookup;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::{FieldType, SchemaDescriptor};
use crate::ExecCtx;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Key the analysis is published under.
pub const ANALYSIS_KEY: &str = "competitor_analysis";
/// Key the directory is published under.
pub const DIRECTORY_KEY: &str = "competitors";

const ANALYSIS_TEMPLATE: &str = "\
Analyze the competitors in the market niche: {topic}

Provide information about each competitor with the following structure:
- Strengths: one statement per strength
- Weaknesses: one statement per weakness
- Market Share: percentage or description

Also list the indirect competitors.";

const DIRECTORY_TEMPLATE: &str = "\
Analyze the competitors in the market niche: {topic}
Provide information about each competitor: its name and a short description.";

/// One strength or weakness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub stat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub strength: Vec<Statement>,
    pub weakness: Vec<Statement>,
    pub market_share: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    pub list_of_competitor: Vec<Competitor>,
    pub list_of_indirect_competitor: Vec<String>,
}

/// Directory entry as returned by the model, before logo resolution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct DirectoryEntry {
    name: String,
    short_description: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryReply {
    competitors: Vec<DirectoryEntry>,
}

/// A directory entry with its resolved logo (empty when lookup failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    pub short_description: String,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorDirectory {
    pub competitors: Vec<CompetitorProfile>,
}

pub fn analysis_schema() -> SchemaDescriptor {
    let statement = SchemaDescriptor::new("statement").string("stat", "One short statement");
    let competitor = SchemaDescriptor::new("competitor")
        .list("strength", "Strengths of this competitor", FieldType::object_list(statement.clone()))
        .list("weakness", "Weaknesses of this competitor", FieldType::object_list(statement))
        .string("market_share", "Market share as a percentage or description");

    SchemaDescriptor::new(ANALYSIS_KEY)
        .list("list_of_competitor", "Direct competitors", FieldType::object_list(competitor))
        .list(
            "list_of_indirect_competitor",
            "Names of indirect competitors",
            FieldType::string_list(),
        )
}

pub fn directory_schema() -> SchemaDescriptor {
    let entry = SchemaDescriptor::new("competitor")
        .string("name", "Company name")
        .string("short_description", "One or two sentences about the company");
    SchemaDescriptor::new(DIRECTORY_KEY).list("competitors", "Competitors in the niche", FieldType::object_list(entry))
}

/// Strengths, weaknesses and market share of the competitors in `niche`.
pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<CompetitorAnalysis> {
    let request = GenerationRequest::new(ANALYSIS_KEY, ANALYSIS_TEMPLATE, niche, analysis_schema());
    pipeline::generate_as(ctx, request).await
}

/// Competitors in `niche` with one logo lookup per competitor.
///
/// Lookups run concurrently; the result keeps the model's order.
pub async fn directory(ctx: &ExecCtx, logos: &dyn LogoLookup, niche: &str) -> Result<CompetitorDirectory> {
    let request = GenerationRequest::new(DIRECTORY_KEY, DIRECTORY_TEMPLATE, niche, directory_schema());
    let reply: DirectoryReply = pipeline::generate_as(ctx, request).await?;

    let lookups = reply.competitors.iter().map(|entry| async move {
        let query = format!("{} Company Logo", entry.name);
        match logos.lookup(&query).await {
            Ok(url) => url,
            Err(e) => {
                warn!(competitor = %entry.name, error = %e, "logo lookup failed");
                String::new()
            }
        }
    });
    let resolved = join_all(lookups).await;

    let competitors = reply
        .competitors
        .into_iter()
        .zip(resolved)
        .map(|(entry, logo)| CompetitorProfile {
            name: entry.name,
            short_description: entry.short_description,
            logo,
        })
        .collect();

    Ok(CompetitorDirectory { competitors })
}
