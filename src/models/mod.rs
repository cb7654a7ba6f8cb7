// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod assignment;
pub mod route;
pub mod snapshot;
pub mod stats;

pub use assignment::{AssignmentModel, UserDate};
pub use route::{Route, RouteSummary};
pub use snapshot::{RawRecord, RawRoutes, RouteEntry, Snapshot, UserDates};
pub use stats::{challenge_stats, ChallengeWindow, UserChallengeStats};
