//! Query solvers: context-free path queries (Hellings, Matrix, Tensor),
//! regular-path queries (tensor closure and synchronous BFS) and CYK
//! membership.

pub mod cfpq;
pub mod cyk;
pub mod rpq;

mod hellings;
mod matrix;
mod tensor;

pub use self::cfpq::{CfpqAlgorithm, cfpq};
pub use self::cyk::cyk;
pub use self::rpq::{RpqMode, rpq_bfs, rpq_tensor};
