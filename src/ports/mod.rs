// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the traits (ports) that define the interfaces between
//! the domain and the outside world. They are implemented by adapters in the
//! adapters layer.

pub mod module_loader;
pub mod parser;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use module_loader::ModuleLoader;
pub use parser::ConfigParser;
pub use source::ConfigSource;
pub use storage::Storage;
