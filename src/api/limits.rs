use crate::error::{AppError, Result};

/// Endpoints that accept a `limit` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Articles,
    Latest,
    BySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitBounds {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Endpoint {
    pub const fn bounds(self) -> LimitBounds {
        match self {
            Endpoint::Articles => LimitBounds {
                default: 50,
                min: 1,
                max: 1000,
            },
            Endpoint::Latest => LimitBounds {
                default: 10,
                min: 1,
                max: 100,
            },
            Endpoint::BySource => LimitBounds {
                default: 50,
                min: 1,
                max: 500,
            },
        }
    }

    /// Apply the endpoint default, or reject a value outside its bounds.
    pub fn resolve_limit(self, requested: Option<i64>) -> Result<u32> {
        let bounds = self.bounds();
        let Some(limit) = requested else {
            return Ok(bounds.default);
        };

        if limit < i64::from(bounds.min) || limit > i64::from(bounds.max) {
            return Err(AppError::Validation(format!(
                "limit must be between {} and {}, got {}",
                bounds.min, bounds.max, limit
            )));
        }
        Ok(limit as u32)
    }
}
