//! Profile of a representative startup in a niche.
//!
//! Money and headcount fields are integers. Models sometimes print them as
//! `1.5e6` or `200.0`; integral floats are accepted, anything with a
//! fractional part is a schema violation.

use crate::error::Result;
use crate::pipeline::{self, GenerationRequest};
use crate::schema::{as_integer, SchemaDescriptor};
use crate::ExecCtx;
use serde::{Deserialize, Deserializer, Serialize};

/// Key the result is published under.
pub const RESPONSE_KEY: &str = "startup_info";

const TEMPLATE: &str = "\
Provide detailed information for a startup in the market niche: {topic}.
Include its name, industry sector (description and valuation), description, \
website, valuation, number of employees, sales, revenue and profit. \
All amounts are whole numbers in US dollars.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustrySector {
    pub industry_desc: String,
    #[serde(deserialize_with = "integral")]
    pub industry_valuation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupInfo {
    pub name: String,
    pub industry_sector: IndustrySector,
    pub description: String,
    pub website: String,
    #[serde(deserialize_with = "integral")]
    pub valuation: i64,
    #[serde(deserialize_with = "integral")]
    pub number_of_employees: i64,
    #[serde(deserialize_with = "integral")]
    pub sales: i64,
    #[serde(deserialize_with = "integral")]
    pub revenue: i64,
    #[serde(deserialize_with = "integral")]
    pub profit: i64,
}

/// Accept any JSON number the schema accepts as an integer.
fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    as_integer(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("{} is not an integer", value)))
}

pub fn schema() -> SchemaDescriptor {
    let sector = SchemaDescriptor::new("industry_sector")
        .string("industry_desc", "Industry description")
        .integer("industry_valuation", "Industry valuation in USD");

    SchemaDescriptor::new(RESPONSE_KEY)
        .string("name", "Startup name")
        .object("industry_sector", "Industry the startup belongs to", sector)
        .string("description", "What the startup does")
        .string("website", "Website URL")
        .integer("valuation", "Valuation in USD")
        .integer("number_of_employees", "Headcount")
        .integer("sales", "Units or deals sold per year")
        .integer("revenue", "Annual revenue in USD")
        .integer("profit", "Annual profit in USD (negative for losses)")
}

pub async fn analyze(ctx: &ExecCtx, niche: &str) -> Result<StartupInfo> {
    pipeline::generate_as(ctx, GenerationRequest::new(RESPONSE_KEY, TEMPLATE, niche, schema())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::ctx_replying;
    use crate::AnalysisError;
    use serde_json::json;

    fn reply(valuation: serde_json::Value) -> serde_json::Value {
        json!({
            "name": "Acme Learn",
            "industry_sector": {"industry_desc": "Education technology", "industry_valuation": 2.5e11},
            "description": "Adaptive tutoring",
            "website": "https://acme.example",
            "valuation": valuation,
            "number_of_employees": 120,
            "sales": 4000,
            "revenue": 3_000_000,
            "profit": -250_000
        })
    }

    #[tokio::test]
    async fn test_startup_info_with_integral_floats() {
        let (ctx, _) = ctx_replying(&reply(json!(15_000_000.0)));
        let info = analyze(&ctx, "edtech").await.unwrap();
        assert_eq!(info.valuation, 15_000_000);
        assert_eq!(info.industry_sector.industry_valuation, 250_000_000_000);
        assert_eq!(info.profit, -250_000);
    }

    #[tokio::test]
    async fn test_fractional_valuation_is_mistyped() {
        let (ctx, _) = ctx_replying(&reply(json!(1.5)));
        match analyze(&ctx, "edtech").await.unwrap_err() {
            AnalysisError::SchemaViolation { mistyped, .. } => assert_eq!(mistyped, vec!["valuation"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_valuation_is_mistyped() {
        let (ctx, _) = ctx_replying(&reply(json!(10_000_000_000_000_000_000u64)));
        match analyze(&ctx, "edtech").await.unwrap_err() {
            AnalysisError::SchemaViolation { mistyped, .. } => assert_eq!(mistyped, vec!["valuation"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_string_amount_is_mistyped() {
        let (ctx, _) = ctx_replying(&reply(json!("$15M")));
        assert!(matches!(
            analyze(&ctx, "edtech").await.unwrap_err(),
            AnalysisError::SchemaViolation { .. }
        ));
    }

    #[test]
    fn test_nested_paths_in_schema() {
        let paths: Vec<String> = schema().field_paths().into_iter().map(|(p, _)| p).collect();
        assert!(paths.contains(&"industry_sector.industry_valuation".to_string()));
    }
}
