//! distmeta, a small tool for inspecting the Python distributions installed
//! in a set of directories.

#![warn(missing_docs)]

pub mod cli;
