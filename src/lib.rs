//! Ticket wallet for the Sobora event marketplace.
//!
//! A thin service in front of the marketplace API: it fetches the signed-in
//! user's tickets, groups them by purchase order into lifecycle sections and
//! gates QR display and transfer actions on each ticket's current state.

pub mod classifier;
pub mod client;
pub mod clock;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod utils;
