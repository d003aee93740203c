//! # Stats
//!
//! $$
//! F_n(x)=\frac{1}{n}\sum_{i=1}^n \mathbf 1\{X_i\le x\}
//! $$
//!
pub mod ecdf;
pub mod memo;
pub mod pseudo_observations;
