// crates/dualscope-ui/src/helpers/mod.rs

pub mod log;
