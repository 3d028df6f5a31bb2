//! Cluster Membership Coordinator Library
//!
//! This library crate defines the core of a small cluster-membership service.
//! Each participating node periodically announces its presence and its
//! current public key; the coordinator keeps the live roster and answers
//! every announcement with the roster changes the caller has not yet seen.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of three loosely coupled subsystems:
//!
//! - **`roster`**: the membership table. Maps each current member to its
//!   announced key and evicts members that fall silent, using a FIFO timer
//!   queue that tolerates re-insertion.
//! - **`changelog`**: the bounded revision log. Hands out dense monotonic
//!   cursors and serves "everything since cursor C" queries, signalling when
//!   truncation forces a full snapshot instead.
//! - **`coordinator`**: the request/response layer. Fuses an inbound
//!   announcement with the outbound differential update in one round trip,
//!   serialized behind a single lock, and advertises the process's random
//!   instance identity so clients can detect restarts.

pub mod changelog;
pub mod coordinator;
pub mod roster;
