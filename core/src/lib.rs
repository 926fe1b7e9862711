//! ORIA Core - Headless Client for the ORIA Learning Companion
//!
//! This crate holds everything the ORIA client does apart from touching a
//! real page: the state store, the optimistic sync pipeline, leveling and
//! quiz arithmetic, the mascot animator, HTML region rendering and the API
//! client. A surface (browser binding, terminal shell, test harness) feeds
//! it [`UiEvent`]s and applies the [`ViewMessage`]s it sends back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Surface                              │
//! │        (DOM binding, headless shell, integration tests)       │
//! └──────────────┬──────────────────────────────▲─────────────────┘
//!                │ UiEvent (up)                 │ ViewMessage (down)
//! ┌──────────────▼──────────────────────────────┴─────────────────┐
//! │                        Controller                              │
//! │  ┌─────────┐  ┌──────────┐  ┌──────────┐  ┌────────────────┐  │
//! │  │  Store  │  │ Commands │  │SyncQueue │  │  View renderer │  │
//! │  └─────────┘  └──────────┘  └────┬─────┘  └────────────────┘  │
//! └──────────────────────────────────┼─────────────────────────────┘
//!                                    │ OriaApi
//!                              ┌─────▼─────┐
//!                              │  Server   │
//!                              └───────────┘
//! ```
//!
//! The mascot runs beside the controller: [`mascot::spawn_mascot`] drives a
//! [`MascotAnimator`] on tokio timers and the surface forwards skin changes
//! to it.
//!
//! # Module Overview
//!
//! - [`api`]: The [`OriaApi`] trait, the reqwest client and a scripted double
//! - [`catalog`]: Static skin catalog
//! - [`config`]: TOML/env/CLI configuration
//! - [`controller`]: Event handling and sync orchestration
//! - [`error`]: Local command rejections
//! - [`events`]: Events from surfaces
//! - [`mascot`]: Idle blink/talk animation
//! - [`messages`]: Messages to surfaces
//! - [`model`]: Wire-compatible gamification state
//! - [`progression`]: XP, leveling and quiz scoring
//! - [`store`]: The single mutable copy of the state
//! - [`sync`]: Commands, transitions and the persistence queue
//! - [`timers`]: Timer service abstraction
//! - [`view`]: HTML region rendering
//!
//! # No Surface Dependencies
//!
//! This crate does not depend on any CLI, terminal or DOM crate. Surfaces
//! live in their own crates.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod mascot;
pub mod messages;
pub mod model;
pub mod progression;
pub mod store;
pub mod sync;
pub mod timers;
pub mod view;

// Re-exports for convenience
pub use api::{ApiError, Endpoint, HttpApi, OriaApi, ScriptedApi};
pub use catalog::{SkinId, StoreItem, ROULETTE_COST, STORE_ITEMS};
pub use controller::Controller;
pub use error::CommandError;
pub use events::UiEvent;
pub use mascot::{MascotAnimator, MascotElement, MascotFrames, MascotHandle, MascotTiming};
pub use messages::{Control, Input, NotifyLevel, Region, View, ViewMessage};
pub use model::{ChatEntry, ChatRole, DailyQuest, Quest, QuizQuestion, SubTask, UserState};
pub use store::Store;
pub use sync::{Command, FailurePolicy, PersistIntent, SyncQueue, Transition};
pub use timers::{ManualTimers, TimerId, TimerService, TokioTimers};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ClientToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
