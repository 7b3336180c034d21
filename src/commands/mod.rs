//! User-facing operations
//!
//! One operation today: `pull`, which moves history between two local
//! repositories through the path rewriter. The command layer owns process
//! orchestration and status reporting; all stream surgery lives in
//! `stream` and `rewrite`.

pub mod pull;
