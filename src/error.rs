//! Engine error type.
//!
//! All failures are deterministic mathematical preconditions detected at
//! construction time of a recurrence, basis, tensor, or Galerkin system.
//! Once `rhs` and `c0` exist they are total functions; nothing in the
//! integration loop can fail.

/// Error kind for the projection engine.
///
/// Each variant carries the offending parameters so a failure identifies
/// the exact order/dimension/index instead of surfacing as NaN downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Distribution parameters violate their constraints, or a quadrature
    /// request exceeds the tensor-grid cap.
    InvalidParameters(String),
    /// Requested polynomial order above the supported cap.
    InvalidOrder { order: usize, max: usize },
    /// The recurrence produced a non-positive beta_n: the measure lacks
    /// enough finite moments for the requested order.
    DegenerateMoment { order: usize, beta: f64 },
    /// A basis norm E[Phi_k^2] is non-positive or below tolerance, making
    /// the Galerkin division ill-defined.
    SingularNorm { index: usize, norm: f64 },
    /// Recurrence/basis/distribution/weight/coefficient dimensionalities
    /// disagree.
    DimensionMismatch { expected: usize, actual: usize },
    /// A tensor or coefficient vector was built under a different
    /// multi-index ordering than the basis in use.
    IndexOrderingViolation,
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::InvalidParameters(msg) => {
                write!(f, "invalid parameters: {msg}")
            }
            ProjectionError::InvalidOrder { order, max } => {
                write!(f, "polynomial order {order} exceeds supported maximum {max}")
            }
            ProjectionError::DegenerateMoment { order, beta } => {
                write!(
                    f,
                    "degenerate moment sequence: beta_{order} = {beta} is not positive"
                )
            }
            ProjectionError::SingularNorm { index, norm } => {
                write!(f, "basis norm {index} is singular: E[Phi^2] = {norm}")
            }
            ProjectionError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            ProjectionError::IndexOrderingViolation => {
                write!(
                    f,
                    "coupling tensor was built under a different basis ordering"
                )
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ProjectionError>;
