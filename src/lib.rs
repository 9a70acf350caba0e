//! Spaced-repetition review scheduling for a personal vocabulary list.
//!
//! Each day a [`services::session::ReviewSession`] picks the words that are due for review
//! plus a fixed quota of never-seen words, hands the batch to a delivery channel, and only
//! after delivery succeeds advances every presented word one stage along the forgetting
//! curve.
//!
//! - [`db`]: progress store (JSON file or memory) and the vocabulary list
//! - [`services::interval`]: stage -> next-review interval with jitter
//! - [`services::scheduler`]: queue selection and stage transitions
//! - [`services::delivery`]: the delivery boundary and its outbox/mock providers
//! - [`services::admin`]: statistics and manual stage changes

pub mod config;
pub mod db;
pub mod logging;
pub mod services;
