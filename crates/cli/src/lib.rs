//! Sunghyun Sans web distribution CLI library.

pub mod cli;
