//! `banquet-clients` — client records and their repository port.

pub mod client;

pub use client::{Client, ClientFilter, ClientPatch, ClientRepository, NewClient};
