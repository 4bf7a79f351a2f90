//! Notes: markdown files in the bound vault, with optional YAML
//! frontmatter and, for `.graph.md` files, an embedded `json_graph` block.
//!
//! Decomposition is pure (`frontmatter`, `graph`, `decompose`,
//! `search_text`); `store` does the filesystem work on top of it.

pub mod decompose;
pub mod file_ops;
pub mod frontmatter;
pub mod graph;
pub mod search_text;
pub mod store;

pub use store::VaultStore;
