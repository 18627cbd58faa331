//! Background processing

pub mod worker;

pub use worker::IngestionWorker;
