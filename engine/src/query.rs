use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Date,
    Price,
    Popularity,
    Distance,
}

impl SortMode {
    /// Unknown names fall back to relevance instead of failing the query.
    pub fn parse(name: &str) -> SortMode {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "relevance" => SortMode::Relevance,
            "date" => SortMode::Date,
            "price" => SortMode::Price,
            "popularity" => SortMode::Popularity,
            "distance" => SortMode::Distance,
            other => {
                tracing::debug!(sort = other, "unknown sort mode, using relevance");
                SortMode::Relevance
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Date => "date",
            SortMode::Price => "price",
            SortMode::Popularity => "popularity",
            SortMode::Distance => "distance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    pub origin: GeoPoint,
    /// Falls back to the configured default radius when absent.
    pub radius_km: Option<f64>,
}

impl GeoFilter {
    pub fn radius_or(&self, default_km: f64) -> f64 {
        self.radius_km.unwrap_or(default_km)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_lat: f64,
    pub bottom_lat: f64,
    pub left_lon: f64,
    pub right_lon: f64,
}

impl BoundingBox {
    /// Build from possibly-missing edges; every edge is required.
    pub fn from_edges(
        top_lat: Option<f64>,
        bottom_lat: Option<f64>,
        left_lon: Option<f64>,
        right_lon: Option<f64>,
    ) -> EngineResult<Self> {
        match (top_lat, bottom_lat, left_lon, right_lon) {
            (Some(top_lat), Some(bottom_lat), Some(left_lon), Some(right_lon)) => {
                let bbox = BoundingBox { top_lat, bottom_lat, left_lon, right_lon };
                bbox.validate()?;
                Ok(bbox)
            }
            _ => Err(EngineError::validation(
                "bounding box requires top_lat, bottom_lat, left_lon and right_lon",
            )),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        GeoPoint::new(self.top_lat, self.left_lon).validate()?;
        GeoPoint::new(self.bottom_lat, self.right_lon).validate()?;
        if self.top_lat < self.bottom_lat {
            return Err(EngineError::validation(format!(
                "top_lat {} is below bottom_lat {}",
                self.top_lat, self.bottom_lat
            )));
        }
        Ok(())
    }
}

/// A search request. Build with [`Query::text`] or [`Query::default`] and the `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub category: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub date_range: Option<DateRange>,
    pub price_max: Option<f64>,
    pub geo: Option<GeoFilter>,
    /// 1-based.
    pub page: usize,
    pub size: usize,
    pub sort: SortMode,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: None,
            city: None,
            country: None,
            date_range: None,
            price_max: None,
            geo: None,
            page: 1,
            size: 20,
            sort: SortMode::Relevance,
        }
    }
}

impl Query {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_dates(mut self, from: Option<Date>, to: Option<Date>) -> Self {
        self.date_range = Some(DateRange { from, to });
        self
    }

    pub fn with_price_max(mut self, max: f64) -> Self {
        self.price_max = Some(max);
        self
    }

    pub fn with_origin(mut self, origin: GeoPoint, radius_km: Option<f64>) -> Self {
        self.geo = Some(GeoFilter { origin, radius_km });
        self
    }

    pub fn with_page(mut self, page: usize, size: usize) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Sort mode actually applied: distance needs an origin, otherwise relevance.
    pub fn effective_sort(&self) -> SortMode {
        match (self.sort, &self.geo) {
            (SortMode::Distance, None) => SortMode::Relevance,
            (sort, _) => sort,
        }
    }

    pub fn validate(&self, config: &EngineConfig) -> EngineResult<()> {
        if self.page == 0 {
            return Err(EngineError::validation("page is 1-based and must be at least 1"));
        }
        if self.size == 0 || self.size > config.max_page_size {
            return Err(EngineError::validation(format!(
                "size must be between 1 and {}, got {}",
                config.max_page_size, self.size
            )));
        }
        if let Some(max) = self.price_max {
            if !max.is_finite() || max < 0.0 {
                return Err(EngineError::validation(format!("price_max must be a non-negative number, got {max}")));
            }
        }
        if let Some(geo) = &self.geo {
            geo.origin.validate()?;
            if let Some(r) = geo.radius_km {
                if !r.is_finite() || r < 0.0 {
                    return Err(EngineError::validation(format!("radius must be a non-negative distance, got {r}")));
                }
            }
        }
        Ok(())
    }
}

/// Parse a calendar day in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> EngineResult<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| EngineError::validation(format!("invalid date {s:?}: {e}")))
}

/// Parse a distance such as `50km`, `500m` or `10mi` into kilometres. A bare number is kilometres.
pub fn parse_distance_km(s: &str) -> EngineResult<f64> {
    let s = s.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = s.strip_suffix("km") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("mi") {
        (n, 1.609_344)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 0.001)
    } else {
        (s.as_str(), 1.0)
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| EngineError::validation(format!("invalid distance {s:?}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::validation(format!("distance must be non-negative, got {s:?}")));
    }
    Ok(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn sort_mode_parse_is_lenient() {
        assert_eq!(SortMode::parse("price"), SortMode::Price);
        assert_eq!(SortMode::parse("Popularity"), SortMode::Popularity);
        assert_eq!(SortMode::parse("bogus"), SortMode::Relevance);
        assert_eq!(SortMode::parse(""), SortMode::Relevance);
    }

    #[test]
    fn distance_sort_needs_origin() {
        let q = Query::text("jazz").with_sort(SortMode::Distance);
        assert_eq!(q.effective_sort(), SortMode::Relevance);
        let q = q.with_origin(GeoPoint::new(0.0, 0.0), None);
        assert_eq!(q.effective_sort(), SortMode::Distance);
    }

    #[test]
    fn distance_units() {
        assert_eq!(parse_distance_km("50km").unwrap(), 50.0);
        assert_eq!(parse_distance_km("500m").unwrap(), 0.5);
        assert!((parse_distance_km("10mi").unwrap() - 16.09344).abs() < 1e-9);
        assert_eq!(parse_distance_km("12").unwrap(), 12.0);
        assert!(parse_distance_km("far").is_err());
        assert!(parse_distance_km("-5km").is_err());
    }

    #[test]
    fn dates_parse_as_calendar_days() {
        assert_eq!(parse_date("2026-06-20").unwrap(), date!(2026 - 06 - 20));
        assert!(parse_date("2026-13-01").is_err());
        assert!(parse_date("June 20").is_err());
    }

    #[test]
    fn bounding_box_needs_all_edges() {
        assert!(BoundingBox::from_edges(Some(42.0), Some(39.0), Some(-75.0), Some(-72.0)).is_ok());
        let err = BoundingBox::from_edges(Some(42.0), None, Some(-75.0), Some(-72.0)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(BoundingBox::from_edges(Some(95.0), Some(39.0), Some(-75.0), Some(-72.0)).is_err());
        assert!(BoundingBox::from_edges(Some(39.0), Some(42.0), Some(-75.0), Some(-72.0)).is_err());
    }

    #[test]
    fn query_validation() {
        let cfg = EngineConfig::default();
        assert!(Query::default().validate(&cfg).is_ok());
        assert!(Query::default().with_page(0, 20).validate(&cfg).is_err());
        assert!(Query::default().with_page(1, 0).validate(&cfg).is_err());
        assert!(Query::default().with_price_max(-1.0).validate(&cfg).is_err());
        assert!(Query::default().with_origin(GeoPoint::new(120.0, 0.0), None).validate(&cfg).is_err());
        assert!(Query::default().with_origin(GeoPoint::new(10.0, 0.0), Some(-1.0)).validate(&cfg).is_err());
    }
}
