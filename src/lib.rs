//! # copula-scengen
//!
//! $$
//! X\in\mathbb R^{n\times d}\ \longmapsto\ S\in\mathbb R^{N\times d},\qquad
//! C_S\approx C_X\ \text{pairwise},\quad F_{S_j}\approx F_{X_j}
//! $$
//!
//! Turns a historical dataset into a small set of representative joint scenarios. The
//! scenario ranks are chosen so the pairwise empirical copulas of the data are
//! reproduced. The margins are recovered by quantile transforms.
//!
//! ## Modules
//!
//! | Module        | Description                                                                         |
//! |---------------|-------------------------------------------------------------------------------------|
//! | [`stats`]     | Pseudo-observations, ECDF step tables, inverse ECDF and content-keyed memoization.  |
//! | [`copulas`]   | Empirical copula evaluator and the running copula track of assigned ranks.          |
//! | [`scengen`]   | Deviation cache, greedy rank scheduler, inverse margin transform and the engine.    |
//! | [`error`]     | Validation error taxonomy shared by every module.                                   |
//!
//! ## Example Usage
//!
//! ```rust
//! use copula_scengen::scengen::{Dataset, ScenarioEngine, ScenarioEngineConfig};
//!
//! let data = ndarray::array![[1.0, 0.2], [3.0, 0.1], [2.0, 0.7], [5.0, 0.4]];
//! let dataset = Dataset::new(data)?;
//! let run = ScenarioEngine::new(ScenarioEngineConfig { n_scenarios: 3, ..Default::default() })
//!   .run(&dataset)?;
//! println!("{:?}", run.scenarios.values());
//! ```

pub mod copulas;
pub mod error;
pub mod scengen;
pub mod stats;

pub use error::Result;
pub use error::ScengenError;
