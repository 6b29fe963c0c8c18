//! Shared fixtures and assertions for sequencer tests.

#![allow(dead_code)]
