//! Snapshot persistence.
//!
//! # Submodules
//!
//! - [`store`]: The [`store::SnapshotStore`] key-value abstraction and its
//!   filesystem implementation
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── wiki.json           # Wikipedia top articles (yesterday)
//! ├── trends_google.json  # Google Trends daily searches
//! ├── hn.json             # Hacker News front page
//! ├── apps.json           # App Store top free apps
//! └── last_error.json     # Only written when a whole run fails
//! ```

pub mod store;
