//! Application layer orchestrating the arisan use cases.
//!
//! `ArisanService` is the single entry point: it checks who is signed in,
//! loads documents through the store ports, applies the domain rules and
//! writes the results back.

pub mod engine;
