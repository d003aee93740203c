//! # Scenario Generation
//!
//! $$
//! \min_{R}\ \sum_{m<j}\sum_{i=1}^{N}\Big|\hat C^{R}_{mj}\big(\tfrac iN,\tfrac vN\big)-C_{mj}\big(\tfrac iN,\tfrac vN\big)\Big|
//! $$
//!
//! Rank-matching scenario generation: a greedy assignment of ranks per margin that
//! tracks the empirical pair copulas of the data, followed by an inverse margin
//! transform back to the data scale.

pub mod dataset;
pub mod deviation_cache;
pub mod engine;
pub mod generator;
pub mod margin;
pub mod rank_matrix;
pub mod transformer;

pub use dataset::Dataset;
pub use deviation_cache::DeviationCache;
pub use engine::ScenarioEngine;
pub use engine::ScenarioEngineConfig;
pub use engine::ScenarioRun;
pub use generator::GeneratorConfig;
pub use generator::ScenarioGenerator;
pub use margin::MarginType;
pub use rank_matrix::ScenarioRankMatrix;
pub use transformer::ScenarioTransformer;
