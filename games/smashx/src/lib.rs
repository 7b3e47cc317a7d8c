//! SmashX Tapper - batched reward-claim bot for the SmashX game
//!
//! Validates an Auth.js session once, then keeps firing batches of
//! concurrent tapping-reward claims through the shared
//! [`core_logic::BatchScheduler`], tallying results in
//! [`core_logic::RunStatistics`].
//!
//! # Architecture
//!
//! - **[`SmashClient`]**: reqwest client with the session cookie and browser
//!   header set installed as default headers, behind the [`SmashApi`] trait
//! - **[`bootstrap`]**: session check then banner profile; failure is fatal
//! - **[`fetch_profile`]**: fresh player profile with fixed-delay retry
//! - **[`ClaimExecutor`]**: one claim end to end, implements
//!   [`core_logic::BatchJob`]
//!
//! # Quick Start
//!
//! ```bash
//! SESSION_TOKEN=... CSRF_TOKEN=... cargo run -p smashx
//!
//! # Overlapping fixed-interval batches, stats exported every 30s
//! cargo run -p smashx -- --mode fixed-interval --export-stats stats.json
//! ```

pub mod claim;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod profile;
pub mod session;
pub mod startup;
pub mod validator;

pub use claim::{ClaimExecutor, ClaimOutcome, ClaimRequest, TapRange};
pub use client::{SmashApi, SmashClient};
pub use config::{BatchModeKind, SmashConfig};
pub use error::SmashError;
pub use fetcher::fetch_profile;
pub use profile::PlayerProfile;
pub use session::{Session, SessionInfo};
pub use startup::{bootstrap, Startup};
pub use validator::validate_session;
