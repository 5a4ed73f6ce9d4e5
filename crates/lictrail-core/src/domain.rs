// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod errors;
pub mod licenses;
pub mod models;
pub mod repositories;
pub mod versions;
