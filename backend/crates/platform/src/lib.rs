//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Randomness and constant-time comparison for one-time codes and secrets
//! - Outbound mail transport (SMTP, logging, in-memory)

pub mod crypto;
pub mod mail;
