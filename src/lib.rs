//! # iiif-image
//!
//! A server-side translator for the IIIF Image API request syntax: it
//! turns a URL path like
//!
//! ```text
//! /{identifier}/{region}/{size}/{rotation}/{quality}.{format}
//! /{identifier}/info.json
//! ```
//!
//! into a validated transformation plan, executes it against a pluggable
//! imaging backend, and answers image-information requests.
//!
//! # Architecture: Parse, Plan, Execute
//!
//! A request flows through three stages, each a pure function of its
//! inputs until the final pixel work:
//!
//! ```text
//! 1. Parse     raw path      →  RequestDescriptor   (grammar only, no I/O)
//! 2. Plan      descriptor + source WxH  →  PixelPlan (exact integer ops)
//! 3. Execute   plan  →  backend crop/resize/flip/rotate  →  encoded bytes
//! ```
//!
//! The split exists for three reasons:
//!
//! - **Pass-through short-circuit**: a request whose parameters are all
//!   identity values is detected from the descriptor alone
//!   ([`request::RequestDescriptor::is_unmodified`]) and served as the
//!   original bytes, before any image is decoded.
//! - **Testability**: grammar and geometry are exhaustively unit-tested
//!   without touching a single pixel; the backend is mocked at the
//!   [`imaging::ImageBackend`] seam.
//! - **Late failure with early detection**: value errors that need source
//!   dimensions (empty regions, non-90° rotations, unimplemented
//!   qualities) surface at plan time with precise error kinds, never as
//!   broken pixel output.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`request`] | Path tokenizer, the five segment grammars, [`request::RequestDescriptor`], pass-through predicate |
//! | [`plan`] | Dimension-aware resolution to concrete crop/resize/rotate operations |
//! | [`imaging`] | [`imaging::ImageBackend`] trait, `image`-crate backend, the render pipeline |
//! | [`info`] | `info.json` capability/metadata document |
//! | [`config`] | URL prefix + base URL, TOML-loaded, prefix stripping |
//!
//! # Design Decisions
//!
//! ## Rotation sign convention
//!
//! The protocol specifies clockwise rotation; the backend primitive
//! counts counterclockwise quarter turns. The plan resolver owns the
//! inversion (90° → three CCW turns), so neither the parser nor the
//! backends ever reason about it.
//!
//! ## Everything resolves to exact integers at plan time
//!
//! Single-dimension, percentage, and best-fit sizes are all computed down
//! to an exact `(w, h)` in [`plan::resolve_plan`]. Backends need one
//! resize primitive and zero sizing policy, which keeps the
//! [`imaging::ImageBackend`] trait small and the mock trivial.
//!
//! ## Preserved quirks
//!
//! Two inherited behaviors are kept for compatibility and pinned by
//! tests rather than silently "fixed": percentage *size* scales the
//! original source dimensions (strict IIIF scales the selected region),
//! and unrecognized format tokens fall back to the JPEG encoder instead
//! of failing. See `plan` and `imaging::operations` for the details.

pub mod config;
pub mod imaging;
pub mod info;
pub mod plan;
pub mod request;
