//! Multi-stage operations composed from the domain modules

pub mod bootstrap;
