//! Shared building blocks for tui-radio: the station catalog, configuration,
//! platform lookups, the player command line and the ICY marker parser.

pub mod config;
pub mod icy;
pub mod launch;
pub mod platform;
pub mod station;
