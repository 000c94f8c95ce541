//! `clipset` — turns long recordings into labeled clip + transcript study sets.
//!
//! This crate provides:
//! - Media decoding into a millisecond-addressable waveform
//! - Silence-based segmentation into bounded speech intervals
//! - Clip extraction (padded, FLAC-encoded, optionally persisted)
//! - A transcription client for the Whisper API (pluggable via a trait)
//! - An idempotent upsert merge into a JSON dataset keyed by stable identifiers
//!
//! The library is designed to be used by both CLI tools and batch jobs,
//! with an emphasis on stable ordering, auditable failure, and minimal surprises.

// High-level API (most consumers should start here).
pub mod config;
pub mod runner;

// Audio decoding and the in-memory waveform representation.
pub mod decoder;
pub mod resample;
pub mod waveform;

// Segmentation and clip extraction.
pub mod clip;
pub mod segmenter;

// Transcription seam and the Whisper API client.
pub mod transcriber;
pub mod whisper_api;

// Run records, dataset persistence, and the merge protocol.
pub mod dataset;
pub mod merge;
pub mod records;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use error::{Error, Result};
