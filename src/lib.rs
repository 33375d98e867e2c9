//! Vellum: a blog content API with a read-through cache.
//!
//! The interesting core is the cache-coherency and cursor-pagination layer:
//! deterministic cache keys derived from query shape ([`cache`]), compound
//! `(created_at, id)` cursors with over-fetch-by-one paging
//! ([`application::pagination`]), and a prefix-based invalidation policy
//! that purges exactly the entries a mutation makes stale
//! ([`cache::Invalidator`]). Everything else — Postgres repositories, the
//! Redis backend, the axum handlers — is composition around that core.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
