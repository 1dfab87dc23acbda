//! Touch: a personal relationship tracker.
//!
//! Touch keeps a small address book of the people who matter, records every
//! call, message and visit, and turns that history into a *connection health*
//! score per contact. Scores drive a dashboard, a home-screen widget and a
//! short list of gentle reminders.
//!
//! # Connection health
//!
//! Health decays linearly from 100 at the moment of contact to 0 once the
//! contact's desired cadence (`frequency_days`) has fully elapsed. Contacts
//! never reached score 0. Scores are recomputed on every read, never stored.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (bundled) with WAL, shared behind a mutex
//! - **Scoring**: pure functions in [`health`] fed by storage snapshots and an injected clock
//! - **Integrations**: OpenAI-compatible chat and transcription, Razorpay, Expo push
//! - **Transport**: JSON over HTTP via axum, under `/api`
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`crm`]: Contacts, interactions, goals, settings, billing, and data management
//! - [`health`]: Connection health scoring, dashboard aggregation, reminder selection
//! - [`integrations`]: Language model, speech-to-text, payment, and push clients
//! - [`api`]: HTTP handlers and routing
//! - [`server`]: HTTP server startup

pub mod api;
pub mod config;
pub mod crm;
pub mod db;
pub mod health;
pub mod integrations;
pub mod server;
