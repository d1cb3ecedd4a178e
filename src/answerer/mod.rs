//! Question answering over the document knowledge base.
//!
//! This module provides the `GuardedAnswerer`, which wraps a single
//! retrieval-and-generation call in content-safety checks and turns the
//! returned document locators into time-limited links.

mod guarded_answerer;

pub use guarded_answerer::{AnswerError, GuardedAnswerer, LINK_EXPIRY};
