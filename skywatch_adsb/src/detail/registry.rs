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

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use skywatch_common::{net::{self, NetError}, non_empty};

use crate::errors::{parse_error, Result};
use super::{DetailProvider, DetailQuery, PartialDetail};

/// secondary public registry. Responses carry an explicit status:
/// `{"status":"ok","data":{...}}` or `{"status":"not_found"}`
pub struct PublicRegistryProvider {
    client: Client,
    base_url: String,
}

impl PublicRegistryProvider {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        PublicRegistryProvider { client, base_url }
    }

    pub fn query_url (&self, query: &DetailQuery)->String {
        format!("{}/{}", self.base_url, query.icao24)
    }
}

#[async_trait]
impl DetailProvider for PublicRegistryProvider {
    fn name (&self)->&str { "registry" }

    async fn resolve (&self, query: &DetailQuery)->Result<Option<PartialDetail>> {
        let url = self.query_url( query);
        match net::get_checked( &self.client, &url).await {
            Ok(response) => {
                let bytes = response.bytes().await.map_err( NetError::from)?;
                parse_registry_response( &bytes)
            }
            Err(NetError::NotFoundError(_)) => Ok(None),
            Err(e) => Err(e.into())
        }
    }
}

#[derive(Deserialize,Debug)]
struct RegistryResponse {
    status: String,
    data: Option<RegistryRecord>,
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct RegistryRecord {
    registration: Option<String>,
    manufacturer: Option<String>,
    #[serde(alias="model")]
    type_name: Option<String>,
    #[serde(alias="typecode")]
    type_code: Option<String>,
    #[serde(alias="operator")]
    owner: Option<String>,
}

pub fn parse_registry_response (bytes: &[u8])->Result<Option<PartialDetail>> {
    let response: RegistryResponse = serde_json::from_slice( bytes)?;
    match response.status.to_ascii_lowercase().as_str() {
        "ok" => {
            let rec = response.data.unwrap_or_default();
            Ok( Some( PartialDetail {
                registration: non_empty(rec.registration),
                manufacturer: non_empty(rec.manufacturer),
                type_name: non_empty(rec.type_name).or( non_empty(rec.type_code)),
                owner: non_empty(rec.owner),
                ..PartialDetail::default()
            }))
        }
        "not_found" => Ok(None),
        other => Err( parse_error!("unexpected registry status '{}'", other))
    }
}
