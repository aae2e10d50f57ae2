//! Parley: small conversational graphs over a local language model.
//!
//! Three flows share one model boundary ([`provider::ModelProvider`]):
//!
//! - an echo bot (`START → chatbot → END`),
//! - a classifier-router bot that answers emotional messages with a
//!   therapist persona and everything else with a logical one,
//! - a tool-using agent whose tools come from an MCP server.
//!
//! ```no_run
//! use parley::prelude::*;
//! use parley::session::run_router_loop;
//!
//! # async fn example() -> parley::error::Result<()> {
//! let config = ParleyConfig::load(None)?;
//! let provider = create_provider(&config)?;
//! let graph = build_router_graph(provider, ClassifierFallback::default())?;
//!
//! let stdin = std::io::stdin();
//! run_router_loop(&graph, &mut stdin.lock(), &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod graph;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod tools;
pub mod types;

#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "cli")]
pub mod cli;
