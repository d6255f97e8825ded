// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![warn(unused_results)]
#![warn(unused_qualifications)]
// Cast hygiene
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]

//! Multi-pass screen-space post-processing on wgpu.
//!
//! A pipeline is an ordered list of [`pass::Pass`] objects driven by a
//! [`composer::PassComposer`]. Each frame the composer hands every enabled
//! pass the previous pass's output (the read buffer) and a buffer to draw
//! into (the write buffer), then swaps the two if the pass asks for it.
//! Passes can instead draw straight to the screen, or into a staging
//! target the composer copies to the screen.
//!
//! # Key entry points
//!
//! - [`pass::Pass`] - the contract every stage implements
//! - [`composer::PassComposer`] - owns the buffer pair and runs the chain
//! - [`passes`] - the built-in passes (base, scene, copy)
//! - [`pass::PassRegistry`] - rebuilds passes from persisted records
//! - [`gpu::WgpuRenderer`] - the wgpu backend behind [`renderer::Renderer`]
//! - [`options::Options`] - TOML configuration for the buffer pair

pub mod composer;
pub mod error;
pub mod gpu;
pub mod options;
pub mod pass;
pub mod passes;
pub mod preset;
pub mod renderer;
pub mod util;
