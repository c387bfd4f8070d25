//! Core building blocks: the program registry, input discovery, argument
//! resolution and script templates. These are internal primitives consumed
//! by the high-level `api` module.
pub mod inputs;
pub mod params;
pub mod registry;
pub mod render;
pub mod resolve;
