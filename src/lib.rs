//! Memory and project backend for a Unity voice assistant.
//!
//! A REST service that records conversations, Unity projects, tasks and user
//! preferences in a document store, answers script-template requests, and relays
//! voice session setup to an external realtime provider.
//!
//! | Resource | Collection | Create | List | Update |
//! |----------|------------|--------|------|--------|
//! | Conversations | `conversations` | insert | newest first, default 50 | none |
//! | Projects | `projects` | insert | up to 100 | partial merge, server-stamped `last_modified` |
//! | Tasks | `tasks` | insert | newest first, optional status filter | partial merge |
//! | Memory | `user_memory` | upsert on (user_id, key, category) | optional category filter | via upsert |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`store`]: Collection-oriented document store over the database
//! - [`records`]: Record shapes, timestamp format, and the script template
//! - [`api`]: axum handlers and the shared application context
//! - [`realtime`]: Optional bridge to the realtime voice provider
//! - [`server`]: Router assembly and the HTTP listener lifecycle

pub mod api;
pub mod config;
pub mod db;
pub mod realtime;
pub mod records;
pub mod server;
pub mod store;
