// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of the raw dashboard payload into [`SpaState`].

use serde_json::Value;

use crate::response::RawSpaPayload;
use crate::types::{
    Component, ComponentType, RangeLimits, SpaClock, TimeOfDay, decimal_from_json,
};

use super::SpaState;

/// Normalizes a raw dashboard payload.
///
/// This never fails: a missing or malformed field yields `None` or the
/// field's default, and the remaining fields are still extracted.
#[must_use]
pub fn normalize(raw: &RawSpaPayload) -> SpaState {
    let time = raw.field("time");
    let limits = raw.field("rangeLimits");

    SpaState {
        desired_temp: decimal_from_json(raw.field("desiredTemp")),
        target_desired_temp: decimal_from_json(raw.field("targetDesiredTemp")),
        current_temp: decimal_from_json(raw.field("currentTemp")),
        panel_locked: flag(raw.field("isPanelLocked")),
        heater_mode: raw.field("heaterMode").as_str().and_then(|s| s.parse().ok()),
        temp_range: raw.field("tempRange").as_str().and_then(|s| s.parse().ok()),
        online: flag(raw.field("isOnline")),
        components: components(raw.field("components")),
        range_limits: RangeLimits {
            high_low: decimal_from_json(&limits["highRangeLow"]),
            high_high: decimal_from_json(&limits["highRangeHigh"]),
            low_low: decimal_from_json(&limits["lowRangeLow"]),
            low_high: decimal_from_json(&limits["lowRangeHigh"]),
        },
        clock: SpaClock {
            time: time.as_str().and_then(|s| s.parse::<TimeOfDay>().ok()),
            time_not_set: is_absent(time),
            military: flag(raw.field("isMilitaryTime")),
        },
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn components(value: &Value) -> Vec<Component> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let component_type = item.get("componentType")?.as_str()?;
            Some(Component {
                component_type: ComponentType::from_vendor(component_type),
                port: item.get("port").and_then(scalar_string),
                value: item.get("value").and_then(scalar_string),
            })
        })
        .collect()
}

// Ports arrive as "0" on most units but as bare numbers on some.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeaterMode, TempRange};
    use serde_json::json;

    fn full_payload() -> RawSpaPayload {
        RawSpaPayload::new(json!({
            "desiredTemp": "100,0",
            "targetDesiredTemp": "100.4",
            "currentTemp": 98.5,
            "isPanelLocked": true,
            "heaterMode": "READY",
            "tempRange": "HIGH",
            "isOnline": true,
            "isMilitaryTime": false,
            "time": "14:07",
            "rangeLimits": {
                "highRangeLow": 80,
                "highRangeHigh": 104,
                "lowRangeLow": 50,
                "lowRangeHigh": "99,0"
            },
            "components": [
                {"componentType": "PUMP", "port": "0", "value": "HIGH"},
                {"componentType": "BLOWER", "port": 1, "value": "OFF"},
                {"componentType": "LIGHT", "port": "0", "value": "ON"},
                {"componentType": "MISTER", "value": "OFF"},
                {"port": "3"}
            ]
        }))
    }

    #[test]
    fn normalizes_full_payload() {
        let state = normalize(&full_payload());
        assert_eq!(state.desired_temp, Some(100.0));
        assert_eq!(state.target_desired_temp, Some(100.4));
        assert_eq!(state.current_temp, Some(98.5));
        assert!(state.panel_locked);
        assert_eq!(state.heater_mode, Some(HeaterMode::Ready));
        assert_eq!(state.temp_range, Some(TempRange::High));
        assert!(state.online);
        assert_eq!(state.range_limits.low_high, Some(99.0));
        assert_eq!(state.active_range_bounds(), Some((80.0, 104.0)));
        assert_eq!(state.clock.hour(), Some(14));
        assert_eq!(state.clock.minute(), Some(7));
        assert!(!state.clock.time_not_set);
        assert!(!state.clock.military);
        assert!(state.light_on());
    }

    #[test]
    fn components_pass_through_unfiltered() {
        let state = normalize(&full_payload());
        // The entry without a componentType cannot be addressed and is dropped.
        assert_eq!(state.components.len(), 4);
        assert_eq!(state.components[1].port.as_deref(), Some("1"));
        assert_eq!(
            state.components[3].component_type,
            ComponentType::Other("MISTER".to_string())
        );
    }

    #[test]
    fn separators_yield_same_float() {
        let comma = json!({"currentTemp": "21,5", "desiredTemp": "21,5"});
        let dot = json!({"currentTemp": "21.5", "desiredTemp": "21.5"});
        let comma = normalize(&RawSpaPayload::new(comma));
        let dot = normalize(&RawSpaPayload::new(dot));
        assert_eq!(comma.current_temp, Some(21.5));
        assert_eq!(comma.current_temp, dot.current_temp);
        assert_eq!(comma.desired_temp, dot.desired_temp);
    }

    #[test]
    fn empty_payload_yields_defaults() {
        let state = normalize(&RawSpaPayload::new(json!({})));
        assert_eq!(state.desired_temp, None);
        assert_eq!(state.heater_mode, None);
        assert!(!state.online);
        assert!(state.components.is_empty());
        assert!(state.clock.time_not_set);
        assert_eq!(state.clock.time, None);
    }

    #[test]
    fn malformed_fields_do_not_abort() {
        let state = normalize(&RawSpaPayload::new(json!({
            "desiredTemp": {"oops": 1},
            "currentTemp": "warm",
            "heaterMode": "TURBO",
            "components": "not-a-list",
            "time": "25:99",
            "isOnline": true
        })));
        assert_eq!(state.desired_temp, None);
        assert_eq!(state.current_temp, None);
        assert_eq!(state.heater_mode, None);
        assert!(state.components.is_empty());
        // A time field is present, so the clock counts as set even if unreadable.
        assert!(!state.clock.time_not_set);
        assert_eq!(state.clock.time, None);
        assert!(state.online);
    }

    #[test]
    fn non_object_payload() {
        let state = normalize(&RawSpaPayload::new(json!([1, 2, 3])));
        let expected = SpaState {
            clock: SpaClock {
                time_not_set: true,
                ..SpaClock::default()
            },
            ..SpaState::default()
        };
        assert_eq!(state, expected);
    }
}
