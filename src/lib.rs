//! Library crate for room-board-back: the room status engine, its storage backends
//! and the HTTP surface, shared by the binaries and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
