pub mod changed_files;
pub mod cli;
pub mod coverage;
pub mod error;
pub mod format;
pub mod ingest;
pub mod model;
pub mod parsers;
pub mod report;
