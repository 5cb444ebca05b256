//! Shared helpers for unit tests (compiled only under `cfg(test)`).

pub mod socket_guard;
