//! Chat relay and transcript export for the ExamWise study assistant.
//!
//! The `relay` binary serves the stateless chat endpoint; the `chat` binary
//! is the terminal client owning the in-memory conversation and the PDF
//! exporter. Everything with behavior lives here so it can be tested.

pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod upstream;
pub mod web;
