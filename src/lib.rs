pub mod cli;
pub mod config;
pub mod deploy;
pub mod extract;
pub mod materialize;
pub mod report;
pub mod util;
