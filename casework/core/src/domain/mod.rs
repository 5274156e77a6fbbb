// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides mod functionality for the system.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements mod

pub mod case;
pub mod commands;
pub mod court_application;
pub mod events;
pub mod hearing;
pub mod linkage;
pub mod relationship;
pub mod repository;
