//! Core data structures that flow through `dft-forge`:
//!
//! - [`types`] – Periodic table elements.
//! - [`atom`] – Minimal atom representation with element and Cartesian coordinates.
//! - [`structure`] – Atomic configurations and the local-energy correction.
//! - [`grid`] – Shape and cell geometry of volumetric grids.
//! - [`density`] – Density grids and their feature transforms.
//! - [`features`] – The ordered, lockable feature collection and its arena.
//!
//! The readers in [`crate::io`] produce [`Structure`] and [`DensityField`]
//! values; the [`crate::assemble`] pipeline turns them into a
//! [`FeatureCollection`].
//!
//! [`Structure`]: structure::Structure
//! [`DensityField`]: density::DensityField
//! [`FeatureCollection`]: features::FeatureCollection

pub mod atom;
pub mod density;
pub mod features;
pub mod grid;
pub mod structure;
pub mod types;
