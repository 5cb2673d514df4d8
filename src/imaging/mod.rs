//! Pixel work — everything behind the [`ImageBackend`] seam.
//!
//! The module is split into:
//! - **Backend**: [`ImageBackend`] trait, [`Dimensions`], [`EncodeFormat`],
//!   and the test mock
//! - **RustBackend**: production implementation over the `image` crate
//! - **Operations**: the [`render`] pipeline and the format→encoder mapping

pub mod backend;
pub mod operations;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodeFormat, ImageBackend};
pub use operations::{encode_format, render, source_dimensions, RenderError};
pub use rust_backend::RustBackend;
