//! Integration tests

mod concurrency;
mod health;
mod streaming;
