//! Use-case specializations of the generation pipeline.
//!
//! Each submodule fixes one (schema, prompt template, post-processing) tuple
//! and exposes a typed record plus an async entry point taking the injected
//! [`ExecCtx`](crate::ExecCtx) and the market niche:
//!
//! | Module | Entry point | Response key |
//! |--------|-------------|--------------|
//! | [`go_to_market`] | [`go_to_market::analyze`] | `go_to_market_strategy` |
//! | [`porter`] | [`porter::analyze`] | `market_analysis` |
//! | [`target_market`] | [`target_market::analyze`] | `market_analysis` |
//! | [`mvp`] | [`mvp::analyze`] | `mvp_analysis` |
//! | [`competitors`] | [`competitors::analyze`] | `competitor_analysis` |
//! | [`competitors`] | [`competitors::directory`] | `competitors` |
//! | [`investors`] | [`investors::analyze`] | `investor_analysis` |
//! | [`startup`] | [`startup::analyze`] | `startup_info` |
//! | [`graph`] | [`graph::build`] | `graph` |
//! | [`report`] | [`report::generate`] / [`report::generate_pdf`] | `comprehensive_report` |

pub mod competitors;
pub mod go_to_market;
pub mod graph;
pub mod investors;
pub mod mvp;
pub mod porter;
pub mod report;
pub mod startup;
pub mod target_market;

pub use competitors::{CompetitorAnalysis, CompetitorDirectory, CompetitorProfile};
pub use go_to_market::GoToMarketStrategy;
pub use graph::{FeatureGraph, GraphInput};
pub use investors::InvestorAnalysis;
pub use mvp::MvpAnalysis;
pub use porter::FiveForces;
pub use report::ComprehensiveReport;
pub use startup::StartupInfo;
pub use target_market::TargetMarket;
