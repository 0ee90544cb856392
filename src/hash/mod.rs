// Hash indexes and match finding for LZ-style dictionary coders.
//
// This module provides:
// - Digests over short byte windows
// - A growable single-position hash table
// - A ring-backed hash chain with several candidates per digest
// - The match finder driving them over an input window
// - Finder configuration and presets

pub mod chain;
pub mod config;
pub mod digest;
pub mod matching;
pub mod table;
