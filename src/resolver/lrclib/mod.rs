//! LRCLIB lyrics provider.
//!
//! LRCLIB (<https://lrclib.net>) serves crowd-sourced plain and synced
//! lyrics over a free JSON API, no key required.

mod adapter;
mod client;
mod dto;

pub use client::LrclibClient;
