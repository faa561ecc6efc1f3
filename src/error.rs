//! Error types surfaced by the layout core.

use thiserror::Error;

/// Axis of the layout frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors raised while generating, normalizing or (de)serializing graphs.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A caller-supplied parameter is out of range. Raised before any
    /// simulation work starts.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The simulated points have no extent on one axis, so they cannot be
    /// scaled into the output frame.
    #[error("degenerate layout: zero extent ({extent}) on the {axis} axis")]
    DegenerateLayout { axis: Axis, extent: f64 },

    #[error("graph document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors from [`Vector2`](crate::layout::Vector2) arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("division by zero")]
    DivideByZero,
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = GraphError::invalid("nodeCount", "must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "invalid parameter `nodeCount`: must be positive, got 0"
        );
    }

    #[test]
    fn test_degenerate_layout_message() {
        let err = GraphError::DegenerateLayout {
            axis: Axis::Y,
            extent: 0.0,
        };
        assert_eq!(err.to_string(), "degenerate layout: zero extent (0) on the y axis");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: GraphError = parse.unwrap_err().into();
        assert!(matches!(err, GraphError::Json(_)));
    }
}
