// src/core/types.rs
use crate::error::{AutocompleteError, Result};

/// Default number of hits returned per completion query.
pub const DEFAULT_RESULT_SIZE: usize = 10;

/// Default max depth the engines will search beyond a stem.
pub const DEFAULT_RADIUS: usize = 15;

/// Search bounds shared by both engine variants. Callers pass 0 to mean
/// "use the default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub result_size: usize,
    pub radius: usize,
}

impl SearchParams {
    /// Normalizes zeros to the defaults without further validation.
    pub fn new(result_size: usize, radius: usize) -> Self {
        Self {
            result_size: if result_size == 0 {
                DEFAULT_RESULT_SIZE
            } else {
                result_size
            },
            radius: if radius == 0 { DEFAULT_RADIUS } else { radius },
        }
    }

    /// Like `new`, but rejects configurations asking for more results
    /// than the radius allows to be collected.
    pub fn checked(result_size: usize, radius: usize) -> Result<Self> {
        let params = Self::new(result_size, radius);
        if params.result_size > params.radius {
            return Err(AutocompleteError::ResultSizeExceedsRadius {
                result_size: params.result_size,
                radius: params.radius,
            });
        }
        Ok(params)
    }
}
