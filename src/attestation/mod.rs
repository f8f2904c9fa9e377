//! Off-chain attestation index.
//!
//! The index is eventually consistent with the chain: a fresh attestation may
//! take a while to appear, and the endpoint may fail or return nothing.
//! Callers treat both as ordinary outcomes.

pub mod client;
pub mod types;

pub use client::{AttestationIndex, HttpAttestationIndex};
pub use types::{
    AttestationFilter, AttestationPayload, AttestationRecord, IndexError, IndexQueryOutcome,
    VILLAGER_QUERY,
};
