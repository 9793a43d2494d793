//! Configuration structures for the OCR pipeline.

pub mod config;
