//! x86-64 architecture-specific components.
//!
//! - Stub code generation backend using iced-x86

pub mod stub;

pub use stub::StubBackend;
