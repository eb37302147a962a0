//! # Oracle Forge - Command-line front end
//!
//! A terminal front end for the Oracle Forge solo RPG campaign assistant. All
//! backend traffic goes through the typed
//! [`oracle_forge_client::GatewayClient`]; this crate adds configuration, a
//! tag-invalidated query cache, user-facing error banners and the CLI.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`app`] | Command execution over the client and the cache |
//! | [`cache`] | Query cache keyed by path, invalidated by resource tag |
//! | [`cli`] | `clap` command definitions |
//! | [`config`] | TOML configuration with environment override |
//! | [`error`] | Application errors and banners |
//!
//! ## Configuration
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! timeout_secs = 30
//! # api_key = "..."
//!
//! [cache]
//! enabled = true
//! ttl_secs = 60
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! `ORACLE_FORGE_API_URL` overrides `api.base_url`; `--api-url` overrides both.
//!
//! ## Example Usage
//!
//! ```bash
//! oracle-forge adventures list
//! oracle-forge adventures select greyhawk
//! oracle-forge world list greyhawk npcs
//! oracle-forge oracle yes-no "Is the innkeeper lying?" --odds likely
//! oracle-forge maps upload greyhawk ./greyhawk.map
//! oracle-forge journal add "Met the smuggler at the docks" --type note
//!
//! # Several commands sharing one cache
//! printf 'adventures list\nadventures list\n' | oracle-forge shell
//! ```

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
