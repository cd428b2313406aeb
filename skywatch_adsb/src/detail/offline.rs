/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! bundled offline registry. This is the last resort of the resolver chain, it only knows what was current
//! when the document was created and never has routes.
//!
//! The document is a JSON object keyed by ICAO24 address. Since such files come from various exports the
//! record fields are tolerant of aliases:
//! ```json
//! { "A1B2C3": { "reg": "N12345", "m": "Boeing", "icaotype": "B738", "ownop": "United Airlines" } }
//! ```

use std::{collections::HashMap, fs, path::Path};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};
use skywatch_common::non_empty;

use crate::errors::{parse_error, Result};
use super::{DetailProvider, DetailQuery, PartialDetail};

// field names in order of precedence. Exports sometimes carry more than one of them
const REGISTRATION: &[&str] = &["registration", "reg", "r"];
const MANUFACTURER: &[&str] = &["manufacturer", "m"];
const TYPE_NAME: &[&str] = &["type", "icaotype", "t", "short_type"];
const OWNER: &[&str] = &["owner", "ownop", "o"];

#[derive(Debug,Default,Clone,PartialEq)]
struct OfflineRecord {
    registration: Option<String>,
    manufacturer: Option<String>,
    type_name: Option<String>,
    owner: Option<String>,
}

impl OfflineRecord {
    fn from_object (obj: &Map<String,Value>)->Self {
        OfflineRecord {
            registration: first_field( obj, REGISTRATION),
            manufacturer: first_field( obj, MANUFACTURER),
            type_name: first_field( obj, TYPE_NAME),
            owner: first_field( obj, OWNER),
        }
    }
}

/// first non-empty string value of any of the `names` in `obj`
fn first_field (obj: &Map<String,Value>, names: &[&str])->Option<String> {
    names.iter()
        .filter_map( |name| obj.get( *name).and_then( Value::as_str))
        .find_map( |s| non_empty( Some( s.to_string())))
}

#[derive(Debug,Default)]
pub struct OfflineRegistry {
    records: HashMap<String,OfflineRecord>, // keys are uppercase
    n_skipped: usize,
}

impl OfflineRegistry {
    /// parse a registry document. Records that are not JSON objects are logged and skipped, only a document
    /// that isn't an object keyed by address fails as a whole
    pub fn from_json (src: &str)->Result<Self> {
        let doc: Value = serde_json::from_str( src)?;
        let Value::Object(entries) = doc else {
            return Err( parse_error!("offline registry is not a JSON object"))
        };

        let mut registry = OfflineRegistry::default();
        for (key, value) in &entries {
            match value {
                Value::Object(obj) => {
                    registry.records.insert( key.trim().to_ascii_uppercase(), OfflineRecord::from_object( obj));
                }
                other => {
                    warn!(icao24 = %key, "skipping malformed offline record: {other}");
                    registry.n_skipped += 1;
                }
            }
        }
        Ok(registry)
    }

    pub fn from_path<P: AsRef<Path>> (path: P)->Result<Self> {
        let src = fs::read_to_string( path.as_ref())?;
        let registry = Self::from_json( &src)?;
        info!("loaded offline registry {:?} with {} records ({} skipped)", path.as_ref(), registry.len(), registry.n_skipped);
        Ok(registry)
    }

    pub fn len (&self)->usize { self.records.len() }
    pub fn is_empty (&self)->bool { self.records.is_empty() }
    pub fn n_skipped (&self)->usize { self.n_skipped }

    pub fn lookup (&self, icao24: &str)->Option<PartialDetail> {
        self.records.get( &icao24.trim().to_ascii_uppercase()).map( |rec| PartialDetail {
            registration: rec.registration.clone(),
            manufacturer: rec.manufacturer.clone(),
            type_name: rec.type_name.clone(),
            owner: rec.owner.clone(),
            ..PartialDetail::default()
        })
    }
}

#[async_trait]
impl DetailProvider for OfflineRegistry {
    fn name (&self)->&str { "offline" }

    async fn resolve (&self, query: &DetailQuery)->Result<Option<PartialDetail>> {
        Ok( self.lookup( &query.icao24))
    }
}
