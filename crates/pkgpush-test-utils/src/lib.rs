// Copyright (C) 2026 PkgPush Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # PkgPush Test Utilities
//!
//! Shared test utilities for pkgpush crates, centered on an in-process mock
//! of the hosting service's REST API:
//! - content-addressed blob/tree/commit store, so identical content yields
//!   identical hashes across runs
//! - per-endpoint call counters for asserting request patterns
//! - fast-forward enforcement on ref updates
//! - failure injection for upload-policy tests

#![allow(clippy::unwrap_used)]

pub mod server;
pub mod state;

// Re-export commonly used items at crate root
pub use server::MockGitHub;
pub use state::{CallCounts, MockCommit, MockState};
