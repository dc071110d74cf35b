//! Progress reporting during a batch run

pub mod reporter;
