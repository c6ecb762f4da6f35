// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod goal;
pub mod push_event;
pub mod stats;
pub mod token;

pub use activity::{ActivityDetail, ActivityRaw, ActivityStream, ActivitySummary, Stream, StreamSet};
pub use goal::Goal;
pub use push_event::{PushEvent, PushEventKind, PushStatus, SubscriptionEvent};
pub use stats::{ActivityType, AggMethod, AggStats, Freq, ProgressStats, StatsField};
pub use token::OAuthToken;
