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

//! flight data aggregator provider (adsbdb style API). This is the only provider that knows about routes

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use skywatch_common::{geo::GeoPoint, net::{self, NetError}, non_empty};

use crate::errors::Result;
use super::{Airline, Airport, DetailProvider, DetailQuery, PartialDetail, Route};

pub struct AggregatorProvider {
    client: Client,
    base_url: String,
}

impl AggregatorProvider {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        AggregatorProvider { client, base_url }
    }

    /// the aircraft endpoint, refined by callsign if we have one (which is what gets us a route)
    pub fn query_url (&self, query: &DetailQuery)->Result<String> {
        let base = format!("{}/aircraft/{}", self.base_url, query.icao24);
        match query.callsign.as_deref().map(str::trim).filter(|cs| !cs.is_empty()) {
            Some(cs) => Ok( net::url_with_query( &base, &[("callsign", cs)])? ),
            None => Ok(base)
        }
    }
}

#[async_trait]
impl DetailProvider for AggregatorProvider {
    fn name (&self)->&str { "aggregator" }

    async fn resolve (&self, query: &DetailQuery)->Result<Option<PartialDetail>> {
        let url = self.query_url( query)?;
        match net::get_checked( &self.client, &url).await {
            Ok(response) => {
                let bytes = response.bytes().await.map_err( NetError::from)?;
                parse_aggregator_response( &bytes)
            }
            Err(NetError::NotFoundError(_)) => Ok(None),
            Err(e) => Err(e.into())
        }
    }
}

#[derive(Deserialize,Debug)]
struct AggregatorResponse {
    response: Value, // either an object or a plain "unknown aircraft" message
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct AggregatorPayload {
    aircraft: Option<AggregatorAircraft>,
    flightroute: Option<AggregatorRoute>,
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct AggregatorAircraft {
    registration: Option<String>,
    manufacturer: Option<String>,
    #[serde(rename="type")]
    type_name: Option<String>,
    icao_type: Option<String>,
    registered_owner: Option<String>,
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct AggregatorRoute {
    airline: Option<AggregatorAirline>,
    origin: Option<AggregatorAirport>,
    destination: Option<AggregatorAirport>,
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct AggregatorAirline {
    name: Option<String>,
    icao: Option<String>,
    iata: Option<String>,
    country: Option<String>,
}

#[derive(Deserialize,Debug,Default)]
#[serde(default)]
struct AggregatorAirport {
    name: Option<String>,
    iata_code: Option<String>,
    icao_code: Option<String>,
    municipality: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<AggregatorAirport> for Airport {
    fn from (a: AggregatorAirport)->Self {
        let position = match (a.latitude, a.longitude) {
            (Some(lat), Some(lon)) => Some( GeoPoint::from_lat_lon_degrees( lat, lon)),
            _ => None
        };
        Airport {
            name: non_empty(a.name),
            iata: non_empty(a.iata_code),
            icao: non_empty(a.icao_code),
            municipality: non_empty(a.municipality),
            country: non_empty(a.country_name),
            position
        }
    }
}

/// a response that does not contain an object (e.g. `{"response":"unknown aircraft"}`) is a miss
pub fn parse_aggregator_response (bytes: &[u8])->Result<Option<PartialDetail>> {
    let response: AggregatorResponse = serde_json::from_slice( bytes)?;
    if !response.response.is_object() {
        debug!("aggregator miss: {}", response.response);
        return Ok(None)
    }

    let payload: AggregatorPayload = serde_json::from_value( response.response)?;
    let mut partial = PartialDetail::default();

    if let Some(ac) = payload.aircraft {
        partial.registration = non_empty(ac.registration);
        partial.manufacturer = non_empty(ac.manufacturer);
        partial.type_name = non_empty(ac.type_name).or( non_empty(ac.icao_type));
        partial.owner = non_empty(ac.registered_owner);
    }

    if let Some(route) = payload.flightroute {
        if let (Some(origin), Some(destination)) = (route.origin, route.destination) {
            partial.route = Some( Route { origin: origin.into(), destination: destination.into() });
        }
        partial.airline = route.airline.map( |a| Airline {
            name: non_empty(a.name), icao: non_empty(a.icao), iata: non_empty(a.iata), country: non_empty(a.country)
        });
    }

    Ok( Some(partial) )
}
