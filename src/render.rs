use crate::config::MapConfig;
use crate::processing::{AreaSelection, PrefixCount, RangeSummary};
use crate::types::{Centroid, Venue};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;
use std::fmt::Write;

/// Initial view and dot styling for one map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Centroid,
    pub zoom: u8,
    pub radius: u32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    pub view: MapView,
    pub features: FeatureCollection,
}

pub fn area_layer(selection: &AreaSelection, map: &MapConfig) -> MapLayer {
    MapLayer {
        view: MapView {
            center: selection.centroid,
            zoom: map.area_zoom,
            radius: map.area_radius,
            color: hex_to_rgb(&map.area_color),
        },
        features: venue_features(selection.venues.iter().copied()),
    }
}

pub fn address_layer(venue: &Venue, map: &MapConfig) -> MapLayer {
    MapLayer {
        view: MapView {
            center: venue.location().into(),
            zoom: map.address_zoom,
            radius: map.address_radius,
            color: hex_to_rgb(&map.address_color),
        },
        features: venue_features(std::iter::once(venue)),
    }
}

/// Points at `[longitude, latitude]` carrying the tooltip fields.
pub fn venue_features<'a, I>(venues: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a Venue>,
{
    venues
        .into_iter()
        .map(|venue| {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![venue.longitude, venue.latitude]))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("id", venue.id.clone());
            feature.set_property("name", venue.name.clone());
            feature.set_property("address", venue.address.clone());
            feature.set_property("postal_code", venue.postal_code.clone());
            feature.set_property("area", venue.area.clone());
            feature
        })
        .collect()
}

pub fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    [channel(0), channel(2), channel(4)]
}

pub fn venue_table(selection: &AreaSelection) -> String {
    let rows: Vec<[&str; 4]> = selection
        .venues
        .iter()
        .map(|v| {
            [
                v.name.as_str(),
                v.address.as_str(),
                v.postal_code.as_deref().unwrap_or(""),
                v.area.as_str(),
            ]
        })
        .collect();
    table(&["Name", "Address", "Postal Code", "Area"], &rows)
}

/// Horizontal bar per prefix, scaled to the largest group.
pub fn prefix_chart(groups: &[PrefixCount]) -> String {
    const WIDTH: usize = 40;
    let max = groups.iter().map(|g| g.count).max().unwrap_or(0);
    let label_width = groups.iter().map(|g| g.prefix.chars().count()).max().unwrap_or(0).max(6);

    let mut out = String::new();
    for group in groups {
        let bar = if max == 0 { 0 } else { (group.count * WIDTH).div_ceil(max) };
        let label = if group.prefix.is_empty() { "(none)" } else { group.prefix.as_str() };
        let _ = writeln!(out, "{:<label_width$}  {} {}", label, "#".repeat(bar), group.count);
    }
    out
}

pub fn range_summary(summary: &RangeSummary) -> String {
    match summary.percentages {
        Some(pct) => format!(
            "In range:      {:>6} ({:.1}%)\nOutside range: {:>6} ({:.1}%)\n",
            summary.in_range, pct.in_range, summary.out_of_range, pct.out_of_range
        ),
        None => "No venues loaded.\n".to_string(),
    }
}

pub fn venue_card(venue: &Venue) -> String {
    format!(
        "Name:        {}\nAddress:     {}\nArea:        {}\nPostal Code: {}\nLocation:    {:.6}, {:.6}\n",
        venue.name,
        venue.address,
        venue.area,
        venue.postal_code.as_deref().unwrap_or(""),
        venue.latitude,
        venue.longitude
    )
}

fn table(headers: &[&str; 4], rows: &[[&str; 4]]) -> String {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[&str; 4]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", cell))
            .collect();
        let _ = writeln!(out, "{}", line.join(" | ").trim_end());
    };
    push_row(headers);
    push_row(&widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str));
    for row in rows {
        push_row(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue() -> Venue {
        Venue {
            id: "7".into(),
            name: "The Lamb".into(),
            address: "94 Lamb's Conduit Street".into(),
            postal_code: Some("WC1N 3LZ".into()),
            easting: Some(530_000.0),
            northing: Some(182_000.0),
            latitude: 51.5223,
            longitude: -0.1188,
            area: "Camden".into(),
        }
    }

    #[test]
    fn parses_hex_colours() {
        assert_eq!(hex_to_rgb("#0096FF"), [0, 150, 255]);
        assert_eq!(hex_to_rgb("FF0000"), [255, 0, 0]);
        assert_eq!(hex_to_rgb("#zz"), [0, 0, 0]);
    }

    #[test]
    fn features_are_lon_lat_points_with_tooltips() {
        let venue = venue();
        let fc = venue_features(std::iter::once(&venue));
        assert_eq!(fc.features.len(), 1);

        let feature = &fc.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(pos) => assert_eq!(pos, &vec![-0.1188, 51.5223]),
            other => panic!("unexpected geometry {:?}", other),
        }
        assert_eq!(feature.property("name").unwrap(), "The Lamb");
        assert_eq!(feature.property("postal_code").unwrap(), "WC1N 3LZ");
        assert_eq!(feature.property("area").unwrap(), "Camden");
    }

    #[test]
    fn address_layer_centres_on_venue() {
        let venue = venue();
        let layer = address_layer(&venue, &MapConfig::default());
        assert_eq!(
            layer.view.center,
            Centroid { latitude: 51.5223, longitude: -0.1188 }
        );
        assert_eq!(layer.view.zoom, 12);
        assert_eq!(layer.view.radius, 100);
        assert_eq!(layer.view.color, [255, 0, 0]);
    }

    #[test]
    fn map_layer_json_shape() {
        let venue = venue();
        let layer = address_layer(&venue, &MapConfig::default());
        let value = serde_json::to_value(&layer).unwrap();

        assert_eq!(
            value["view"],
            serde_json::json!({
                "center": { "latitude": 51.5223, "longitude": -0.1188 },
                "zoom": 12,
                "radius": 100,
                "color": [255, 0, 0]
            })
        );
        assert_eq!(value["features"]["type"], "FeatureCollection");
        let feature = &value["features"]["features"][0];
        assert_eq!(feature["geometry"]["coordinates"], serde_json::json!([-0.1188, 51.5223]));
        assert_eq!(feature["properties"]["address"], "94 Lamb's Conduit Street");
    }

    #[test]
    fn venue_table_lists_columns() {
        let venue = venue();
        let selection = AreaSelection {
            area: "Camden".into(),
            venues: vec![&venue],
            centroid: venue.location().into(),
        };
        let table = venue_table(&selection);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[2].contains("94 Lamb's Conduit Street"));
        assert!(lines[2].contains("WC1N 3LZ"));
    }

    #[test]
    fn prefix_chart_scales_bars() {
        let groups = vec![
            PrefixCount { prefix: "".into(), count: 1 },
            PrefixCount { prefix: "NW1 ".into(), count: 4 },
        ];
        let chart = prefix_chart(&groups);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[0].starts_with("(none)"));
        assert!(lines[0].ends_with(&format!("{} 1", "#".repeat(10))));
        assert!(lines[1].ends_with(&format!("{} 4", "#".repeat(40))));
    }

    #[test]
    fn range_summary_handles_empty_dataset() {
        let summary = RangeSummary {
            total: 0,
            in_range: 0,
            out_of_range: 0,
            percentages: None,
        };
        assert_eq!(range_summary(&summary), "No venues loaded.\n");
    }
}
