//! Quantity values.

use std::fmt;

use crate::entity::Entity;

/// A decimal number with an optional uncertainty interval and an optional
/// unit of measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub amount: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    /// `None` for unitless quantities.
    pub unit: Option<Entity>,
}

impl Quantity {
    pub fn new(
        amount: f64,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
        unit: Option<Entity>,
    ) -> Self {
        Self {
            amount,
            lower_bound,
            upper_bound,
            unit,
        }
    }

    pub fn is_unitless(&self) -> bool {
        self.unit.is_none()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)?;
        if let (Some(lower), Some(upper)) = (self.lower_bound, self.upper_bound) {
            write!(f, " [{lower}, {upper}]")?;
        }
        if let Some(unit) = &self.unit {
            write!(f, " {}", unit.id())?;
        }
        Ok(())
    }
}
