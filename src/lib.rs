//! Retail Assistant - Conversational command interpreter
//!
//! This crate turns free-text chat messages into product and stock
//! operations for a retail back office, with a multi-turn confirmation flow
//! and a generative-AI fallback for everything else.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
