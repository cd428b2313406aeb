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
use tracing::{debug, warn};
use skywatch_common::{geo::GeoPoint, net};

use crate::{detail::{Airport, Route}, errors::{parse_error, Result}};

/// free text location search. Only used to place route endpoints, nothing else depends on it
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate (&self, query: &str)->Result<Option<GeoPoint>>;
}

/// OpenStreetMap Nominatim compatible search (`{base}/search?q=..&format=json&limit=1`)
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        NominatimGeocoder { client, base_url }
    }

    pub fn query_url (&self, query: &str)->Result<String> {
        let base = format!("{}/search", self.base_url);
        Ok( net::url_with_query( &base, &[("q", query), ("format", "json"), ("limit", "1")])? )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate (&self, query: &str)->Result<Option<GeoPoint>> {
        let url = self.query_url( query)?;
        let response = net::get_checked( &self.client, &url).await?;
        let bytes = response.bytes().await.map_err( net::NetError::from)?;
        parse_search_response( &bytes)
    }
}

#[derive(Deserialize,Debug)]
struct SearchResult {
    lat: String, // nominatim reports coordinates as strings
    lon: String,
}

/// first result of a search response, `None` if there was none
pub fn parse_search_response (bytes: &[u8])->Result<Option<GeoPoint>> {
    let results: Vec<SearchResult> = serde_json::from_slice( bytes)?;
    match results.first() {
        Some(r) => {
            let lat: f64 = r.lat.trim().parse().map_err( |_| parse_error!("invalid latitude '{}'", r.lat))?;
            let lon: f64 = r.lon.trim().parse().map_err( |_| parse_error!("invalid longitude '{}'", r.lon))?;
            Ok( Some( GeoPoint::from_lat_lon_degrees( lat, lon)))
        }
        None => Ok(None)
    }
}

async fn geocode_airport (geocoder: &dyn Geocoder, airport: &mut Airport) {
    if airport.position.is_some() { return }

    if let Some(query) = airport.geocode_query() {
        match geocoder.locate( &query).await {
            Ok(Some(pos)) => {
                debug!("geocoded '{}' to {}", query, pos);
                airport.position = Some(pos);
            }
            Ok(None) => debug!(%query, "no geocoding result"),
            Err(e) => warn!(%query, "geocoding failed: {e}")
        }
    }
}

/// best effort: fill in missing endpoint coordinates. Failures are logged and leave the endpoint without position
pub async fn geocode_route (geocoder: &dyn Geocoder, route: &mut Route) {
    geocode_airport( geocoder, &mut route.origin).await;
    geocode_airport( geocoder, &mut route.destination).await;
}
