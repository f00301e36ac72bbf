//! Property search filters.
//!
//! A [`PropertyFilter`] carries the optional narrowing fields accepted by
//! property search. The accessor methods return the exact values that get
//! bound into a query, so every backend applies the same coercions:
//!
//! - city is capitalized (`"new york"` → `"New york"`) and wrapped in `%`
//! - prices are converted from major to minor currency units
//! - the rating is truncated to an integer
//!
//! A field only counts as set when it is truthy: blank strings and zero
//! numbers are ignored, matching what the listing form submits for
//! untouched inputs.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Optional filters for property search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Substring of the city name.
    #[serde(default)]
    pub city: Option<String>,

    /// Only properties owned by this user.
    #[serde(default, deserialize_with = "lenient::option_integer")]
    pub owner_id: Option<i32>,

    /// Exclusive lower bound on nightly cost, in major units.
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub minimum_price_per_night: Option<f64>,

    /// Exclusive upper bound on nightly cost, in major units.
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub maximum_price_per_night: Option<f64>,

    /// Exclusive lower bound on review rating.
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub minimum_rating: Option<f64>,
}

impl PropertyFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the city filter.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the owner filter.
    pub fn with_owner_id(mut self, owner_id: i32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Sets the minimum nightly price in major units.
    pub fn with_minimum_price_per_night(mut self, price: f64) -> Self {
        self.minimum_price_per_night = Some(price);
        self
    }

    /// Sets the maximum nightly price in major units.
    pub fn with_maximum_price_per_night(mut self, price: f64) -> Self {
        self.maximum_price_per_night = Some(price);
        self
    }

    /// Sets the minimum rating.
    pub fn with_minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }

    /// Returns true if no field would produce a predicate.
    pub fn is_empty(&self) -> bool {
        self.city_term().is_none()
            && self.owner().is_none()
            && self.minimum_cost().is_none()
            && self.maximum_cost().is_none()
            && self.rating_floor().is_none()
    }

    /// The capitalized city name, without wildcards.
    pub fn city_term(&self) -> Option<String> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(normalize_city)
    }

    /// The LIKE pattern bound for the city predicate.
    pub fn city_pattern(&self) -> Option<String> {
        self.city_term()
            .map(|term| format!("%{}%", escape_like(&term)))
    }

    /// The owner id bound for the owner predicate.
    pub fn owner(&self) -> Option<i64> {
        self.owner_id.filter(|id| *id != 0).map(i64::from)
    }

    /// The minimum nightly cost in minor units.
    pub fn minimum_cost(&self) -> Option<i64> {
        truthy(self.minimum_price_per_night).map(to_minor_units)
    }

    /// The maximum nightly cost in minor units.
    pub fn maximum_cost(&self) -> Option<i64> {
        truthy(self.maximum_price_per_night).map(to_minor_units)
    }

    /// The rating threshold, truncated to an integer.
    pub fn rating_floor(&self) -> Option<i64> {
        truthy(self.minimum_rating).map(|r| r.trunc() as i64)
    }
}

fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Converts an amount in major currency units to minor units.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Upper-cases the first character and lower-cases the rest.
pub fn normalize_city(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Escapes LIKE wildcards so user input matches literally.
///
/// Statements using the result must declare `ESCAPE '\'`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
