pub mod config;
pub mod fake_feed;
pub mod fixture_index;
pub mod fpl_fetch;
pub mod grid;
pub mod http_client;
pub mod model;
pub mod persist;
pub mod prefs;
pub mod ratings;
pub mod session;
pub mod source;
pub mod state;
pub mod visibility;
