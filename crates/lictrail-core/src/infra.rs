// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod cli;

pub(crate) mod manifests;
pub(crate) mod networking;
