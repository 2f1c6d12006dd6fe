//! # poetry-export
//!
//! Exports the [chinese-poetry](https://github.com/chinese-poetry/chinese-poetry)
//! JSON corpus to SQL insert statements in traditional and simplified
//! script, and loads the simplified statements into a SQLite database.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌──────────┐
//! │ JSON files │──▶│ Extract  │──▶│  Filter  │──▶│ Statement  │──▶│ hant.sql │
//! │ (sources)  │   │ (record) │   │ (valid?) │   │ (INSERT)   │   └────┬─────┘
//! └────────────┘   └──────────┘   └──────────┘   └────────────┘        │
//!                                                                      ▼
//!                                 ┌──────────┐   ┌──────────┐   ┌────────────┐
//!                                 │  SQLite  │◀──│ hans.sql │◀──│ Transcode  │
//!                                 │ poems.db │   └──────────┘   │ (t2s)      │
//!                                 └──────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`sources`] | Source group discovery |
//! | [`extract`] | JSON object → poem record |
//! | [`filter`] | Corrupted-record filter |
//! | [`statement`] | Insert statement rendering |
//! | [`transcode`] | Traditional → simplified stream conversion |
//! | [`pipeline`] | Run orchestration |
//! | [`load`] | SQLite load |
//! | [`db`] | Database connection |

pub mod config;
pub mod db;
pub mod extract;
pub mod filter;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod sources;
pub mod statement;
pub mod stats;
pub mod transcode;
