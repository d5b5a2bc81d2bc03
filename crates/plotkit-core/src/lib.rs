//! # plotkit Core
//!
//! Core types, traits, and utilities for plotkit.
//! Provides drawing-plane geometry, machine profiles and the kinematics
//! models that translate between the drawing plane and native machine axes.

pub mod error;
pub mod filter;
pub mod geometry;
pub mod kinematics;
pub mod profile;

pub use error::ProfileError;

pub use filter::FilterConfig;

pub use geometry::{paths_bbox, BoundingBox, PathSegment, Point, VectorPath};

pub use kinematics::{
    CartesianKinematics, Kinematics, KinematicsModel, StringPulleyKinematics,
};

pub use profile::{
    BedLimits, CartesianParams, FlattenSettings, InverseModel, MachineKind, MachineProfile,
    StringPulleyParams, DEFAULT_CURVE_SAMPLES, DEFAULT_DEGENERATE_FALLBACK,
    DEFAULT_LIFT_THRESHOLD,
};
