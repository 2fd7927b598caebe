//! Cross-module test suite for the block builder
//!
//! This module organizes tests into logical groups: defining blocks,
//! generating code, plugins, property tests and a full language scenario.

#[cfg(test)]
mod builder_tests;
