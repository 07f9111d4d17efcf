//! Command line front end for dynaset forms over SQLite.

pub mod logging;
pub mod render;
pub mod session;
