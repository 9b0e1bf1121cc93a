//! Warcraft Logs data source and response cache tests
//!
//! These tests use canned GraphQL responses and do not touch the network.

pub mod cache;
pub mod data_source;
