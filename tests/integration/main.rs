//! Integration tests for the relay server.

mod health_test;
mod helpers;
mod relay_test;
