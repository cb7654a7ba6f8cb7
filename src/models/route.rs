// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route catalog entry model.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Metres figure in an elevation label such as `"155m (509')"`.
static ELEVATION_METERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+)\s*m").expect("valid elevation regex"));

/// A route from the static catalog.
///
/// Routes have no stable id: they are identified by their position in the
/// catalog, which must be identical on every client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route name (e.g., "Tempus Fugit")
    #[serde(rename = "route")]
    pub name: String,
    /// Map/world the route belongs to
    #[serde(default)]
    pub map: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub length_km: Option<f64>,
    /// Length in miles (catalog may carry it as a number or as "12.3 mi")
    #[serde(default, deserialize_with = "lenient_number")]
    pub length_miles: Option<f64>,
    /// Elevation label as published (e.g., "155m (509')")
    #[serde(default, deserialize_with = "display_string")]
    pub elevation: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lead_in: Option<f64>,
    /// Route badge experience points
    #[serde(default, deserialize_with = "lenient_number")]
    pub badge_xp: Option<f64>,
}

impl Route {
    /// Route length in miles, 0 when unknown.
    pub fn miles(&self) -> f64 {
        self.length_miles.unwrap_or(0.0)
    }

    /// Elevation gain in metres parsed from the label, 0 when unknown.
    pub fn elevation_meters(&self) -> f64 {
        self.elevation
            .as_deref()
            .and_then(|label| ELEVATION_METERS.captures(label))
            .and_then(|caps| caps[1].replace(',', "").parse().ok())
            .unwrap_or(0.0)
    }
}

/// Route summary for API responses.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteSummary {
    pub index: usize,
    pub name: String,
    pub map: String,
    pub miles: f64,
    pub elevation: Option<String>,
    pub elevation_meters: f64,
    pub badge_xp: Option<f64>,
}

impl RouteSummary {
    pub fn new(index: usize, route: &Route) -> Self {
        Self {
            index,
            name: route.name.clone(),
            map: route.map.clone(),
            miles: route.miles(),
            elevation: route.elevation.clone(),
            elevation_meters: route.elevation_meters(),
            badge_xp: route.badge_xp,
        }
    }
}

/// Extract a number from a JSON number or from the digits of a string.
///
/// `"15.2 mi"` -> 15.2, `"1,073"` -> 1073. Anything else is `None`.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let mut digits = String::new();
            let mut seen_dot = false;
            for c in s.chars() {
                if c.is_ascii_digit() {
                    digits.push(c);
                } else if c == '.' {
                    if seen_dot {
                        break;
                    }
                    seen_dot = true;
                    digits.push(c);
                }
            }
            digits.parse().ok()
        }
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_value))
}

fn display_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_value_from_strings() {
        assert_eq!(numeric_value(&json!("15.2 mi")), Some(15.2));
        assert_eq!(numeric_value(&json!("1,073")), Some(1073.0));
        assert_eq!(numeric_value(&json!(10.7)), Some(10.7));
        assert_eq!(numeric_value(&json!("n/a")), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }

    #[test]
    fn test_route_parses_lenient_fields() {
        let route: Route = serde_json::from_value(json!({
            "route": "Castle to Castle",
            "map": "Makuri Islands",
            "length_miles": "15.2 mi",
            "elevation": "155m (509')",
            "badge_xp": "480"
        }))
        .unwrap();

        assert_eq!(route.miles(), 15.2);
        assert_eq!(route.elevation_meters(), 155.0);
        assert_eq!(route.badge_xp, Some(480.0));
        assert_eq!(route.length_km, None);
    }

    #[test]
    fn test_elevation_with_thousands_separator() {
        let route: Route = serde_json::from_value(json!({
            "route": "Road to Sky",
            "elevation": "1,073m (3520')"
        }))
        .unwrap();

        assert_eq!(route.elevation_meters(), 1073.0);
        assert_eq!(route.miles(), 0.0);
    }
}
