use crate::error::{DashboardError, Result};
use geo::{coord, Point, Rect};
use serde::Serialize;

/// One establishment from the dataset. Latitude and longitude are always
/// present once the dataset has been cleaned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub area: String,
}

impl Venue {
    /// Geographic position with x = longitude, y = latitude.
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Area => &self.area,
            Field::Address => &self.address,
            Field::Name => &self.name,
            Field::PostalCode => self.postal_code.as_deref().unwrap_or(""),
        }
    }
}

/// Text columns that can back a selection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Field {
    Area,
    Address,
    Name,
    PostalCode,
}

/// Map center, serialised for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Point<f64>> for Centroid {
    fn from(p: Point<f64>) -> Self {
        Centroid {
            latitude: p.y(),
            longitude: p.x(),
        }
    }
}

/// Closed easting/northing window. x is easting, y is northing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRange {
    window: Rect<f64>,
}

impl CoordinateRange {
    /// Builds a window after checking each axis against its domain.
    pub fn new(
        easting: (f64, f64),
        northing: (f64, f64),
        easting_domain: (f64, f64),
        northing_domain: (f64, f64),
    ) -> Result<Self> {
        check_axis("easting", easting, easting_domain)?;
        check_axis("northing", northing, northing_domain)?;
        Ok(CoordinateRange {
            window: Rect::new(
                coord! { x: easting.0, y: northing.0 },
                coord! { x: easting.1, y: northing.1 },
            ),
        })
    }

    pub fn easting(&self) -> (f64, f64) {
        (self.window.min().x, self.window.max().x)
    }

    pub fn northing(&self) -> (f64, f64) {
        (self.window.min().y, self.window.max().y)
    }

    /// Inclusive on every edge. A venue without projected coordinates is
    /// never inside.
    pub fn contains(&self, venue: &Venue) -> bool {
        match (venue.easting, venue.northing) {
            (Some(e), Some(n)) => {
                let (min, max) = (self.window.min(), self.window.max());
                e >= min.x && e <= max.x && n >= min.y && n <= max.y
            }
            _ => false,
        }
    }
}

fn check_axis(axis: &'static str, (min, max): (f64, f64), (lo, hi): (f64, f64)) -> Result<()> {
    let ok = min.is_finite() && max.is_finite() && lo <= min && min <= max && max <= hi;
    if ok {
        Ok(())
    } else {
        Err(DashboardError::InvalidRange { axis, min, max, lo, hi })
    }
}
