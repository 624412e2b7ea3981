//! Nutrition, behavior, environment and skin responses from the worker API.
//!
//! As with the metric responses, only the top-level collections are required.

use serde::{Deserialize, Serialize};

/// Response of `/api/v1/query/meals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealsResponse {
    pub meals: Vec<Meal>,
}

/// A logged meal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    /// JSON-encoded array of [`Ingredient`]
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub cooking_method: Option<String>,
    #[serde(default)]
    pub estimated_glycemic_load: Option<f64>,
}

impl Meal {
    /// Decode the embedded ingredient list, yielding nothing when it is malformed.
    pub fn ingredient_list(&self) -> Vec<Ingredient> {
        self.ingredients
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `/api/v1/query/behavioral`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorResponse {
    pub events: Vec<BehaviorEvent>,
}

/// A behavioral event such as a screen-time session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorEvent {
    #[serde(default)]
    pub category: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub dopamine_debt_score: Option<f64>,
}

/// Response of `/api/v1/query/environmental`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentResponse {
    pub conditions: Vec<EnvironmentCondition>,
}

/// Environmental conditions at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCondition {
    #[serde(default)]
    pub temperature_celsius: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(rename = "aqiUS", default)]
    pub aqi_us: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub pollen_index: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
}

impl EnvironmentCondition {
    /// Health risk flags derived from these conditions. A missing reading
    /// raises no flag.
    pub fn risks(&self) -> Vec<&'static str> {
        let above = |reading: Option<f64>, limit: f64| reading.is_some_and(|v| v > limit);
        let mut risks = Vec::new();
        if above(self.aqi_us, 100.0) {
            risks.push("High AQI");
        }
        if above(self.temperature_celsius, 33.0) {
            risks.push("Extreme Heat");
        }
        if self.temperature_celsius.is_some_and(|t| t < 5.0) {
            risks.push("Extreme Cold");
        }
        if self.pollen_index.is_some_and(|p| p >= 8.0) {
            risks.push("High Pollen");
        }
        if above(self.humidity, 75.0) {
            risks.push("High Humidity");
        }
        if above(self.uv_index, 7.0) {
            risks.push("High UV");
        }
        risks
    }
}

/// Response of `/api/v1/query/skin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinResponse {
    pub analyses: Vec<SkinAnalysis>,
}

/// One skin scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinAnalysis {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub api_source: Option<String>,
    /// JSON-encoded array of [`SkinCondition`]
    #[serde(rename = "conditionsJSON", default)]
    pub conditions_json: Option<String>,
}

impl SkinAnalysis {
    /// Decode the embedded condition list, yielding nothing when it is malformed.
    pub fn conditions(&self) -> Vec<SkinCondition> {
        self.conditions_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinCondition {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub ui_score: Option<f64>,
    /// 0-1
    #[serde(default)]
    pub severity: Option<f64>,
}

impl SkinCondition {
    pub fn severity_label(&self) -> &'static str {
        let severity = self.severity.unwrap_or(0.0);
        if severity >= 0.7 {
            "High"
        } else if severity >= 0.4 {
            "Moderate"
        } else {
            "Low"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(temp: f64, humidity: f64, aqi: f64, uv: f64, pollen: f64) -> EnvironmentCondition {
        EnvironmentCondition {
            temperature_celsius: Some(temp),
            humidity: Some(humidity),
            aqi_us: Some(aqi),
            uv_index: Some(uv),
            pollen_index: Some(pollen),
            condition: Some("Clear".to_string()),
        }
    }

    #[test]
    fn test_environment_risks() {
        assert!(condition(20.0, 50.0, 40.0, 3.0, 2.0).risks().is_empty());
        assert_eq!(
            condition(35.0, 80.0, 150.0, 9.0, 8.0).risks(),
            vec!["High AQI", "Extreme Heat", "High Pollen", "High Humidity", "High UV"]
        );
        assert_eq!(condition(2.0, 50.0, 40.0, 3.0, 2.0).risks(), vec!["Extreme Cold"]);
    }

    #[test]
    fn test_null_readings_raise_no_risk() {
        let response: EnvironmentResponse = serde_json::from_value(serde_json::json!({
            "conditions": [{"temperatureCelsius": null, "humidity": 40, "aqiUS": 20, "pollenIndex": null}]
        }))
        .unwrap();
        let latest = &response.conditions[0];
        assert!(latest.pollen_index.is_none());
        assert!(latest.uv_index.is_none());
        assert!(latest.risks().is_empty());
    }

    #[test]
    fn test_malformed_embedded_json_is_empty() {
        let mut meal = Meal {
            timestamp: Some("t".to_string()),
            source: Some("photo".to_string()),
            event_type: Some("lunch".to_string()),
            ingredients: Some("not json".to_string()),
            cooking_method: None,
            estimated_glycemic_load: None,
        };
        assert!(meal.ingredient_list().is_empty());
        meal.ingredients = None;
        assert!(meal.ingredient_list().is_empty());
    }

    #[test]
    fn test_severity_labels() {
        let mut c = SkinCondition {
            kind: Some("acne".to_string()),
            ui_score: Some(80.0),
            severity: Some(0.7),
        };
        assert_eq!(c.severity_label(), "High");
        c.severity = Some(0.4);
        assert_eq!(c.severity_label(), "Moderate");
        c.severity = Some(0.39);
        assert_eq!(c.severity_label(), "Low");
        c.severity = None;
        assert_eq!(c.severity_label(), "Low");
    }
}
