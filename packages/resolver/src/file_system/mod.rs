//! File System Abstraction
//!
//! Everything the resolver knows about the disk goes through [`ReadonlyFileSystem`].
//! `NodeFileSystem` reads the real disk; `testing::MockFileSystem` is an in-memory tree.

pub mod src;
pub mod testing;


pub use src::*;
