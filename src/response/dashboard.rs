// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw dashboard payload.

use serde_json::Value;

/// The `data` member of `/spas/{spaId}/dashboard`, kept as untyped JSON.
///
/// The vendor's field types drift (numbers arrive as strings, with either
/// decimal separator), so the payload is not bound to a strict schema here.
/// [`normalize`](crate::state::normalize) turns it into a
/// [`SpaState`](crate::state::SpaState) field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpaPayload(Value);

impl RawSpaPayload {
    /// Wraps a JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped JSON.
    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Returns a top-level field, or `Value::Null` when missing.
    #[must_use]
    pub fn field(&self, name: &str) -> &Value {
        self.0.get(name).unwrap_or(&Value::Null)
    }

    /// Vendor id of the spa, if reported.
    #[must_use]
    pub fn spa_id(&self) -> Option<&str> {
        self.field("_id").as_str()
    }

    /// Serial number of the spa controller, if reported.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.field("serialNumber").as_str()
    }
}

impl From<Value> for RawSpaPayload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_access() {
        let raw = RawSpaPayload::new(json!({"_id": "spa-1", "serialNumber": "SN42"}));
        assert_eq!(raw.spa_id(), Some("spa-1"));
        assert_eq!(raw.serial_number(), Some("SN42"));
        assert!(raw.field("missing").is_null());
    }
}
