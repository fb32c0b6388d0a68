//! # Niche Analyst
//!
//! Structured business analysis of a market niche, generated by a hosted
//! language model.
//!
//! Every analysis runs the same pipeline: render a schema-aware prompt, call
//! the model, cut the fenced JSON payload out of the free-text reply, parse
//! it strictly and validate it against the expected shape. The outcome is a
//! typed record or exactly one classified [`AnalysisError`]; nothing is
//! repaired and nothing is retried.
//!
//! ## Core Concepts
//!
//! - **[`SchemaDescriptor`]** — the declared shape of a result. Drives both the
//!   format instructions in the prompt and validation of the reply.
//! - **[`ExecCtx`]** — injected execution context (HTTP client, backend,
//!   model, sampling config). There is no global client.
//! - **[`Backend`](backend::Backend)** — object-safe model adapter: Gemini,
//!   OpenAI-compatible, or [`MockBackend`] for tests.
//! - **[`PayloadExtractor`](output_parser::PayloadExtractor)** — isolates the
//!   fenced payload inside a reply.
//! - **[`pipeline::generate`]** — one request in, one [`StructuredResult`] or
//!   error out.
//! - **[`analysis`]** — the use cases (go-to-market, Five Forces, target
//!   market, MVP, competitors, investors, startup profile, feature graph,
//!   feasibility report).
//!
//! ## Quick Start
//!
//! ```no_run
//! use niche_analyst::{analysis::go_to_market, ExecCtx};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
//!         .gemini(std::env::var("NICHE_API_KEY")?)
//!         .build()?;
//!
//!     let strategy = go_to_market::analyze(&ctx, "edtech").await?;
//!     println!("{}", strategy.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom schemas
//!
//! ```
//! use niche_analyst::backend::MockBackend;
//! use niche_analyst::pipeline::{generate, GenerationRequest};
//! use niche_analyst::{ExecCtx, SchemaDescriptor};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockBackend::fixed("Sure.\n```json\n{\"pitch\": \"Tutors on demand\"}\n```");
//! let ctx = ExecCtx::builder("http://unused").backend(Arc::new(mock)).build().unwrap();
//!
//! let schema = SchemaDescriptor::new("pitch").string("pitch", "One-line pitch");
//! let request = GenerationRequest::new("pitch", "Pitch a startup in {topic}.", "edtech", schema);
//! let result = generate(&ctx, request).await.unwrap();
//! assert_eq!(result.value["pitch"], "Tutors on demand");
//! # }
//! ```

pub mod analysis;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod exec_ctx;
pub mod logo;
pub mod output_parser;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod schema;
pub mod server;

pub use backend::{GeminiBackend, MockBackend};
#[cfg(feature = "openai")]
pub use backend::OpenAiBackend;
pub use client::LlmConfig;
pub use error::{AnalysisError, Result};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use output_parser::ParseError;
pub use pipeline::{GenerationRequest, StructuredResult};
pub use schema::{FieldType, SchemaDescriptor};
