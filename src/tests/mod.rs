//! tests/mod.rs
//! Pruebas unitarias del servicio.

mod support;

mod processing_tests;
mod transport_tests;
