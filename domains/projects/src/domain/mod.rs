//! Domain model for the Projects domain

pub mod entities;
pub mod lifecycle;
pub mod ordering;
pub mod sequence;
