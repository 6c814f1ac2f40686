//! Normalizes transaction history from many chains into one canonical model.
//!
//! Each chain in [`platforms`] owns a decoder for its explorer's JSON and a
//! pure normalization engine producing [`models::Tx`] values. Chains are
//! selected by coin index through [`platforms::PlatformRegistry`].

pub mod coin;
pub mod models;
pub mod platforms;
pub mod utils;
