//! Integration tests for crypto-collector

mod mirror_test;
mod pipeline_test;
mod support;
