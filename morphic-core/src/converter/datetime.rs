// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::converter::{Converter, Convertible, MappedConverter};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Dates travel as ISO-8601 text.
impl Convertible for NaiveDate {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        let base = String::resolve(registry)?;
        registry.leaf(move || {
            MappedConverter::<NaiveDate, String>::new(
                "NaiveDate",
                base,
                |date: &NaiveDate| date.format(DATE_FORMAT).to_string(),
                |text: String| NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok(),
                NaiveDate::default,
            )
        })
    }
}

/// Timestamps travel as milliseconds since the Unix epoch, UTC.
impl Convertible for NaiveDateTime {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        let base = i64::resolve(registry)?;
        registry.leaf(move || {
            MappedConverter::<NaiveDateTime, i64>::new(
                "NaiveDateTime",
                base,
                |at: &NaiveDateTime| at.and_utc().timestamp_millis(),
                |millis: i64| DateTime::from_timestamp_millis(millis).map(|at| at.naive_utc()),
                NaiveDateTime::default,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryValue;

    #[test]
    fn date_from_iso_text() {
        let registry = TypeRegistry::default();
        let c = registry.resolve::<NaiveDate>().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(c.from_entry(EntryValue::Str("2024-02-29")), Some(date));
        assert_eq!(c.from_entry(EntryValue::Str("2024-02-30")), None);
        assert_eq!(c.display(&date, 1), "2024-02-29");
    }

    #[test]
    fn datetime_from_millis() {
        let registry = TypeRegistry::default();
        let c = registry.resolve::<NaiveDateTime>().unwrap();
        let at = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_milli_opt(0, 0, 1, 500)
            .unwrap();
        let millis = at.and_utc().timestamp_millis();
        assert_eq!(c.from_entry(EntryValue::I64(millis)), Some(at));
        assert_eq!(c.copy(&at).unwrap(), at);
    }
}
