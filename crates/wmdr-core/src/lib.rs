//! WMDR Core Library
//!
//! Rule evaluation and scoring of WIGOS metadata records (WMDR XML) against
//! the key performance indicator rubric.

pub mod batch;
pub mod codelist;
pub mod config;
pub mod document;
pub mod error;
pub mod geo;
pub mod logging;
pub mod report;
pub mod resources;
pub mod rubric;
pub mod schema;
pub mod stats;
pub mod validate;
