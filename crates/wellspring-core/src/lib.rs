//! # Wellspring Core Library
//!
//! This library provides the guided-session engine behind the Wellspring
//! wellness companion: breathing exercises, guided meditations and gentle
//! movement routines all run on the same timed phase/cycle model. The CLI
//! binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Catalog**: Built-in pattern definitions (phases, cycles, scripts)
//! - **Session**: A caller-ticked lifecycle state machine, plus a tokio driver
//!   that feeds it one logical second at a time
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`SessionClock`]: Real-time driver with cancellable tick task
//! - [`Catalog`]: Pattern and routine lookup
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, PatternDefinition, PatternKind, PhaseSpec, Routine};
pub use error::{ConfigError, CoreError, SessionError, TickError};
pub use events::Event;
pub use session::{
    IntervalTicks, Progress, SessionClock, SessionEngine, SessionRecord, SessionRecorder,
    SessionStatus, TickSource,
};
pub use storage::Config;
