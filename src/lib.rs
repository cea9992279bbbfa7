// Copyright 2026 Shutter Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shutter agent library: batch screenshot capture for tracked URL sets.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(
    dead_code,
    unused_imports,
    clippy::new_without_default,
    clippy::should_implement_trait
)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod devices;
pub mod keys;
pub mod report;
pub mod runner;
pub mod sanitize;
pub mod session;
pub mod targets;
pub mod uploader;
