// src/lib.rs — Library root for kbdedup

pub mod cli;
pub mod corpus;
pub mod dedup;
pub mod infra;
