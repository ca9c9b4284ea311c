//! Sunghyun Sans web distribution - dynamic-subset slicing and CSS generation.
//!
//! Turns the per-weight source fonts into full font copies, Unicode-range
//! sliced subset chunks, and `@font-face` stylesheets mapping ranges to chunks.

pub mod codepoints;
pub mod config;
pub mod css;
pub mod engine;
pub mod error;
pub mod io;
pub mod jobs;
pub mod minify;
pub mod pipeline;
pub mod plan;
pub mod registry;
pub mod slicer;
pub mod unicode_range;

pub use codepoints::CodepointSet;
pub use config::{BuildConfig, FAMILIES, FontFamily, WEIGHTS, Weight};
pub use engine::{FontReader, FontSubsetter, HarfBuzzEngine};
pub use error::{BuildError, SubsetError};
pub use io::{ArtifactStore, FsStore, MemoryStore};
pub use pipeline::{BuildPhase, BuildSummary, WebDistBuilder, build_web_dist};
pub use registry::{Registry, RegistryEntry};
pub use slicer::{Slice, make_slices};
