//! Astrolabe Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Astrolabe
//! architecture diagram toolchain. It includes:
//!
//! - **Kinds**: The closed set of C4 element kinds ([`kind::ElementKind`])
//! - **Model**: The hierarchical input model delivered by the DSL front end ([`model`] module)
//! - **Geometry**: Node extents and padding ([`geometry`] module)
//! - **Text**: Font-metric based text measurement and word wrap ([`text`] module)

pub mod geometry;
pub mod kind;
pub mod model;
pub mod text;
