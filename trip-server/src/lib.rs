//! Multi-stop ride trip server.
//!
//! Saves locations, orders a set of them into a trip starting from an
//! origin, and then requests a ride from a ride-hailing platform for each
//! leg in turn.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod locations;
pub mod ride;
pub mod store;
pub mod trips;
pub mod upstream;
pub mod web;
