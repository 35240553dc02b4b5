//! Dalil - Business Directory Backend
//!
//! This crate implements the payment-to-subscription activation pipeline:
//! payment creation, gateway status reconciliation, and idempotent
//! subscription side effects for directory businesses.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
