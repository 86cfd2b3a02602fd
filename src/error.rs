//! Error types for the physics core.
//!
//! Only construction and configuration are fallible; stepping the world never
//! returns an error.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A polygon needs at least three vertices.
    TooFewVertices(usize),
    /// The polygon encloses no area (collinear or repeated vertices).
    DegeneratePolygon,
    /// A shape dimension (radius, width, side count) is not usable.
    InvalidDimension(String),
    /// The world settings cannot produce a valid grid.
    InvalidSettings(String),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooFewVertices(count) => {
                write!(f, "polygon needs at least 3 vertices, got {count}")
            }
            Self::DegeneratePolygon => write!(f, "polygon has zero area"),
            Self::InvalidDimension(msg) => write!(f, "invalid shape dimension: {msg}"),
            Self::InvalidSettings(msg) => write!(f, "invalid world settings: {msg}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

pub type Result<T> = std::result::Result<T, PhysicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_problem() {
        let err = PhysicsError::TooFewVertices(2);
        assert!(err.to_string().contains("at least 3"));

        let err = PhysicsError::InvalidSettings("cells_wide must be > 0".into());
        assert!(err.to_string().contains("cells_wide"));
    }
}
