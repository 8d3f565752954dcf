//! Land-cover class transitions and Markov-chain projection.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!  │  class grids  │────▶│  transition    │────▶│    chain         │
//!  │  T1, T2       │     │  (count, norm) │     │  (P^n projection)│
//!  └──────────────┘     └────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use landtrend_markov::{MatrixMode, project};
//!
//! // Raw counts are detected and row-normalised.
//! let rows = vec![vec![8.0, 2.0], vec![0.0, 10.0]];
//! let projection = project(&rows, 2).unwrap();
//!
//! assert_eq!(projection.mode(), MatrixMode::Counts);
//! assert!((projection.transition()[[0, 0]] - 0.8).abs() < 1e-12);
//! assert!((projection.future()[[0, 0]] - 0.64).abs() < 1e-12);
//! ```

pub mod chain;
pub mod error;
pub mod transition;

pub use chain::{MarkovProjection, MatrixMode, matrix_power, project};
pub use error::MarkovError;
pub use transition::{TransitionMatrix, build_transition_matrix, normalize_rows};
