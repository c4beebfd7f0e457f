//! Integration tests for the Flightdeck HTTP surface

mod catalog;
mod health;
