// crates/dualscope-core/src/helpers/mod.rs

pub mod time;
