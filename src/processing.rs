use crate::data::Dataset;
use crate::error::{DashboardError, Result};
use crate::types::{Centroid, CoordinateRange, Field, Venue};
use geo::{Centroid as _, MultiPoint};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct values of `field`, ascending. Missing postal codes are not
/// offered as an option.
pub fn distinct_sorted(dataset: &Dataset, field: Field) -> Vec<String> {
    let values: BTreeSet<&str> = dataset
        .venues()
        .iter()
        .map(|v| v.field(field))
        .filter(|value| field != Field::PostalCode || !value.is_empty())
        .collect();
    values.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaSelection<'a> {
    pub area: String,
    pub venues: Vec<&'a Venue>,
    pub centroid: Centroid,
}

/// Venues whose area matches exactly, with their mean position.
///
/// An area with no venues has no centroid and is reported as
/// `EmptySelection` rather than a NaN map center.
pub fn filter_by_area<'a>(dataset: &'a Dataset, area: &str) -> Result<AreaSelection<'a>> {
    let venues: Vec<&Venue> = dataset.venues().iter().filter(|v| v.area == area).collect();

    let points: MultiPoint<f64> = venues.iter().map(|v| v.location()).collect();
    let centroid = points
        .centroid()
        .ok_or_else(|| DashboardError::EmptySelection { area: area.to_string() })?;

    Ok(AreaSelection {
        area: area.to_string(),
        venues,
        centroid: centroid.into(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentages {
    pub in_range: f64,
    pub out_of_range: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSummary {
    pub total: usize,
    pub in_range: usize,
    pub out_of_range: usize,
    /// `None` when the dataset is empty.
    pub percentages: Option<Percentages>,
}

/// Counts venues inside the window against the whole dataset, regardless of
/// any area selection.
pub fn filter_by_range(dataset: &Dataset, range: &CoordinateRange) -> RangeSummary {
    let total = dataset.len();
    let in_range = dataset.venues().iter().filter(|v| range.contains(v)).count();
    let out_of_range = total - in_range;

    let percentages = (total > 0).then(|| {
        let in_pct = in_range as f64 / total as f64 * 100.0;
        Percentages {
            in_range: in_pct,
            out_of_range: 100.0 - in_pct,
        }
    });

    RangeSummary {
        total,
        in_range,
        out_of_range,
        percentages,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixCount {
    pub prefix: String,
    pub count: usize,
}

/// Counts venues per leading `prefix_len` characters of the postal code.
/// Codes shorter than the prefix keep their full length; a missing code
/// counts under `""`.
pub fn group_by_postal_prefix<'a, I>(venues: I, prefix_len: usize) -> Vec<PrefixCount>
where
    I: IntoIterator<Item = &'a Venue>,
{
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for venue in venues {
        let code = venue.postal_code.as_deref().unwrap_or("");
        let prefix: String = code.chars().take(prefix_len).collect();
        *groups.entry(prefix).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|(prefix, count)| PrefixCount { prefix, count })
        .collect()
}

/// First venue at `address` in dataset order.
pub fn find_by_address<'a>(dataset: &'a Dataset, address: &str) -> Result<&'a Venue> {
    dataset
        .venues()
        .iter()
        .find(|v| v.address == address)
        .ok_or_else(|| DashboardError::LookupInvariant { address: address.to_string() })
}

pub fn all_by_address<'a>(dataset: &'a Dataset, address: &str) -> Vec<&'a Venue> {
    dataset.venues().iter().filter(|v| v.address == address).collect()
}
