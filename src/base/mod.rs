//! Core components, types, and utilities for the ssi-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Canned replies and the onboarding script.
//! - Typed real-time events.
//! - Common types and result handling.

pub mod config;
pub mod event;
pub mod replies;
pub mod types;
