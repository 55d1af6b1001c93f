//! bizplan - AI-Driven Business Plan Generator
//!
//! Turns a user's skills, budget and risk appetite into a validated business
//! idea with a full nine-section SBA plan. Free-form provider output is
//! normalized into a strict schema, so every returned idea has every section,
//! a closed category and risk level, and an ordered budget range.
//!
//! ## Core Features
//!
//! - **Provider Chain**: Ordered AI backends with retry, backoff, and fallback
//! - **Tolerant Parsing**: Markdown or JSON answers mapped onto one schema
//! - **Rule-Based Classification**: Category, risk, budget, and timeframe
//! - **Pluggable Storage**: In-memory or SQLite idea stores
//!
//! ## Quick Start
//!
//! ```ignore
//! use bizplan::{ConfigLoader, GenerationPipeline};
//! use bizplan::types::{BudgetRange, Preferences, RiskTolerance};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = GenerationPipeline::from_config(&config)?;
//! let prefs = Preferences::new(["baking"], BudgetRange::new(500, 2000)?)
//!     .with_risk_tolerance(RiskTolerance::Low);
//! let idea = pipeline.generate_business_idea(&prefs).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Provider abstraction, fallback chain, prompt builder
//! - [`plan`]: Prompt, parser, classification, and the generation pipeline
//! - [`storage`]: Idea stores (memory, SQLite)
//! - [`config`]: Layered configuration
//! - [`types`]: Schema model, preferences, and errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod plan;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{GenerationFailure, PlanError, Result, ResultExt};

// Schema
pub use types::{BusinessIdea, BusinessPlan, Preferences};

// Storage
pub use storage::{IdeaStore, MemoryStore, PoolConfig, SharedStore, SqliteStore};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use plan::{Classifier, GenerationPipeline, ParseMode, PipelineStage, ResponseParser};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    ChainConfig, ChainOutcome, GenerationOptions, ProviderAdapter, ProviderChain, ProviderConfig,
    TextProvider, with_timeout,
};
