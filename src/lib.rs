//! Pokegrid - a terminal browser for Pokemon collections.
//!
//! This library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod auth;
pub mod collection;
pub mod effect;
pub mod favorites;
pub mod filter;
pub mod index;
pub mod pager;
pub mod reducer;
pub mod state;
pub mod ui;
