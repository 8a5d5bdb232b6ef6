use thiserror::Error;

use crate::geom::TubeError;

pub type SpiralResult<T> = Result<T, SpiralError>;

/// Construction failures. Interaction (picking, navigation, focus) never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpiralError {
    #[error("invalid time range: start year {start_year} is after end year {end_year}")]
    InvalidRange { start_year: i32, end_year: i32 },
    #[error("invalid resolution parameter `{name}`: {reason}")]
    InvalidResolution {
        name: &'static str,
        reason: &'static str,
    },
    #[error(
        "degenerate geometry: {segments} curve segments cannot give each of {months} months a segment"
    )]
    DegenerateGeometry { segments: usize, months: usize },
    #[error("degenerate geometry: tube sweep failed: {0}")]
    Tube(#[from] TubeError),
}

/// The two failure classes a host needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiralErrorKind {
    /// Malformed time range or resolution parameters.
    InvalidRange,
    /// Resolution too coarse (or geometry otherwise unusable) for the range.
    DegenerateGeometry,
}

impl SpiralError {
    #[must_use]
    pub fn kind(&self) -> SpiralErrorKind {
        match self {
            Self::InvalidRange { .. } | Self::InvalidResolution { .. } => {
                SpiralErrorKind::InvalidRange
            }
            Self::DegenerateGeometry { .. } | Self::Tube(_) => SpiralErrorKind::DegenerateGeometry,
        }
    }

    pub(crate) const fn resolution(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidResolution { name, reason }
    }
}
