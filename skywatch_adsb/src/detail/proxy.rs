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

use crate::errors::Result;
use super::{DetailProvider, DetailQuery, PartialDetail};

/// registry lookup through a local proxy (hexdb style `{base}/aircraft/{icao24}` endpoint)
pub struct ProxyRegistryProvider {
    client: Client,
    base_url: String,
}

impl ProxyRegistryProvider {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        ProxyRegistryProvider { client, base_url }
    }

    pub fn query_url (&self, query: &DetailQuery)->String {
        format!("{}/aircraft/{}", self.base_url, query.icao24)
    }
}

#[async_trait]
impl DetailProvider for ProxyRegistryProvider {
    fn name (&self)->&str { "proxy" }

    async fn resolve (&self, query: &DetailQuery)->Result<Option<PartialDetail>> {
        let url = self.query_url( query);
        match net::get_checked( &self.client, &url).await {
            Ok(response) => {
                let bytes = response.bytes().await.map_err( NetError::from)?;
                Ok( Some( parse_proxy_response( &bytes)?))
            }
            Err(NetError::NotFoundError(_)) => Ok(None),
            Err(e) => Err(e.into())
        }
    }
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct ProxyRecord {
    #[serde(rename="Registration")]
    registration: Option<String>,
    #[serde(rename="Manufacturer")]
    manufacturer: Option<String>,
    #[serde(rename="ICAOTypeCode")]
    icao_type_code: Option<String>,
    #[serde(rename="Type")]
    type_name: Option<String>,
    #[serde(rename="RegisteredOwners")]
    owners: Option<String>,
}

/// the result might be empty (all fields missing), which the resolver treats as a miss
pub fn parse_proxy_response (bytes: &[u8])->Result<PartialDetail> {
    let rec: ProxyRecord = serde_json::from_slice( bytes)?;
    Ok( PartialDetail {
        registration: non_empty(rec.registration),
        manufacturer: non_empty(rec.manufacturer),
        type_name: non_empty(rec.type_name).or( non_empty(rec.icao_type_code)),
        owner: non_empty(rec.owners),
        ..PartialDetail::default()
    })
}
