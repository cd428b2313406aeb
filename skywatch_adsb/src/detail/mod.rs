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

#![allow(unused)]

//! descriptive details of aircraft (registration, manufacturer, type, owner, route) resolved through an ordered
//! list of unreliable providers.
//!
//! Resolution has two steps. The first one is synchronous and builds a provisional record from what the feed
//! already told us, so that a UI can show something immediately. The second one tries the providers in strict
//! priority order and stops at the first one that returns a usable record (at least registration or type).
//! The winning record is merged into the provisional one field by field, i.e. fields the provider did not know
//! keep their provisional values. If all providers fail the provisional data is kept as is

use std::{fmt, sync::Arc};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize,Deserialize};
use tracing::{debug, info, warn};
use uom::si::{f64::Velocity, velocity::kilometer_per_hour};
use skywatch_common::{angle::Angle360, datetime::EpochMillis, geo::GeoPoint};

use crate::{
    config::ProviderConfig, errors::Result, geocode::{geocode_route, Geocoder, NominatimGeocoder},
    taxonomy::Taxonomy, AircraftPosition, Altitude
};

pub mod aggregator;
pub mod proxy;
pub mod registry;
pub mod offline;

pub use aggregator::AggregatorProvider;
pub use proxy::ProxyRegistryProvider;
pub use registry::PublicRegistryProvider;
pub use offline::OfflineRegistry;

pub const UNKNOWN: &str = "unknown";

/// km/h per Mach at standard sea level conditions
pub const MACH_KMH: f64 = 1234.8;

/// speed is derived once from what the feed reports: Mach takes precedence over ground speed
pub fn derive_speed (mach: Option<f64>, ground_speed: Option<Velocity>)->Option<Velocity> {
    match mach.filter( |m| m.is_finite() && *m > 0.0) {
        Some(mach) => Some( Velocity::new::<kilometer_per_hour>( mach * MACH_KMH)),
        None => ground_speed
    }
}

/* #region data model *************************************************************************************/

#[derive(Debug,Clone,PartialEq,Default,Serialize,Deserialize)]
pub struct Airport {
    pub name: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub municipality: Option<String>,
    pub country: Option<String>,
    pub position: Option<GeoPoint>, // if provider or geocoder knows
}

impl Airport {
    /// free text query we can use to geocode the airport
    pub fn geocode_query (&self)->Option<String> {
        let parts: Vec<&str> = [self.name.as_deref(), self.municipality.as_deref(), self.country.as_deref()]
            .into_iter().flatten().filter( |s| !s.trim().is_empty()).collect();
        if parts.is_empty() { self.iata.as_ref().map( |iata| format!("{iata} airport")) } else { Some( parts.join(", ")) }
    }

    pub fn label (&self)->&str {
        self.iata.as_deref().or( self.icao.as_deref()).or( self.name.as_deref()).unwrap_or(UNKNOWN)
    }
}

#[derive(Debug,Clone,PartialEq,Default,Serialize,Deserialize)]
pub struct Route {
    pub origin: Airport,
    pub destination: Airport,
}

#[derive(Debug,Clone,PartialEq,Default,Serialize,Deserialize)]
pub struct Airline {
    pub name: Option<String>,
    pub icao: Option<String>,
    pub iata: Option<String>,
    pub country: Option<String>,
}

/// what a single provider knows about an aircraft
#[derive(Debug,Clone,PartialEq,Default)]
pub struct PartialDetail {
    pub registration: Option<String>,
    pub manufacturer: Option<String>,
    pub type_name: Option<String>,
    pub owner: Option<String>,
    pub route: Option<Route>,
    pub airline: Option<Airline>,
}

impl PartialDetail {
    /// a provider response only counts as success if it has at least a registration or a type
    pub fn is_usable (&self)->bool {
        let has = |s: &Option<String>| s.as_ref().is_some_and( |s| !s.trim().is_empty());
        has(&self.registration) || has(&self.type_name)
    }
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub enum DetailStatus {
    Loading,
    Resolved { provider: String },
    Unresolved
}

/// the detail record we publish
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct AircraftDetail {
    pub icao24: Arc<str>,
    pub registration: Option<String>,
    pub manufacturer: Option<String>,
    pub type_name: Option<String>,
    pub owner: Option<String>,
    pub callsign: Option<String>,
    pub position: Option<GeoPoint>,
    pub heading: Option<Angle360>,
    pub altitude: Option<Altitude>,
    pub speed: Option<Velocity>,
    pub route: Option<Route>,
    pub airline: Option<Airline>,
    pub image: Option<String>, // reference image of the taxonomy model
    pub status: DetailStatus,
    pub updated: EpochMillis,
}

impl AircraftDetail {
    pub fn registration_or_unknown (&self)->&str { self.registration.as_deref().unwrap_or(UNKNOWN) }
    pub fn manufacturer_or_unknown (&self)->&str { self.manufacturer.as_deref().unwrap_or(UNKNOWN) }
    pub fn type_or_unknown (&self)->&str { self.type_name.as_deref().unwrap_or(UNKNOWN) }
    pub fn owner_or_unknown (&self)->&str { self.owner.as_deref().unwrap_or(UNKNOWN) }

    /// rounded km/h
    pub fn speed_kmh (&self)->Option<i64> {
        self.speed.map( |v| v.get::<kilometer_per_hour>().round() as i64)
    }

    pub fn is_resolved (&self)->bool { matches!( self.status, DetailStatus::Resolved{..}) }

    /// merge provider data. Every field the provider populated replaces ours, fields it left empty are kept,
    /// which means a higher trust value is never downgraded to unknown
    pub fn merge (&mut self, partial: PartialDetail) {
        fn set (field: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value.filter( |v| !v.trim().is_empty()) { *field = Some(v) }
        }

        set( &mut self.registration, partial.registration);
        set( &mut self.manufacturer, partial.manufacturer);
        set( &mut self.type_name, partial.type_name);
        set( &mut self.owner, partial.owner);
        if partial.route.is_some() { self.route = partial.route }
        if partial.airline.is_some() { self.airline = partial.airline }
    }

    /// refresh the live telemetry snapshot (e.g. from the reacquisition tracker)
    pub fn update_telemetry (&mut self, ac: &AircraftPosition) {
        if ac.callsign.is_some() { self.callsign = ac.callsign.clone() }
        self.position = Some(ac.position);
        if let Some(hdg) = ac.heading.effective() { self.heading = Some(hdg) }
        if ac.altitude.is_some() { self.altitude = ac.altitude }
        if let Some(speed) = derive_speed( ac.mach, ac.ground_speed) { self.speed = Some(speed) }
        self.updated = EpochMillis::now();
    }
}

impl fmt::Display for AircraftDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Detail( {}: {} {} {} [{}]", self.icao24, self.registration_or_unknown(),
                self.manufacturer_or_unknown(), self.type_or_unknown(), self.owner_or_unknown())?;
        if let Some(cs) = &self.callsign { write!(f, ", cs: {cs}")?; }
        if let Some(kmh) = self.speed_kmh() { write!(f, ", spd: {kmh}km/h")?; }
        if let Some(route) = &self.route { write!(f, ", route: {} -> {}", route.origin.label(), route.destination.label())?; }
        write!( f, ", {:?})", self.status)
    }
}

/// the cheap inputs we have for a resolution. Speed is derived here once and carried unchanged
#[derive(Debug,Clone,PartialEq)]
pub struct DetailQuery {
    pub icao24: Arc<str>,
    pub registration: Option<String>,
    pub type_code: Option<String>,
    pub type_label: Option<String>,
    pub callsign: Option<String>,
    pub position: GeoPoint,
    pub heading: Option<Angle360>,
    pub altitude: Option<Altitude>,
    pub speed: Option<Velocity>,
}

impl DetailQuery {
    pub fn from_position (ac: &AircraftPosition)->Self {
        DetailQuery {
            icao24: ac.icao24.clone(),
            registration: ac.registration.clone(),
            type_code: ac.type_code.clone(),
            type_label: ac.type_label().map( |s| s.to_string()),
            callsign: ac.callsign.clone(),
            position: ac.position,
            heading: ac.heading.effective(),
            altitude: ac.altitude,
            speed: derive_speed( ac.mach, ac.ground_speed),
        }
    }
}

/* #endregion data model */

/* #region providers **************************************************************************************/

/// a single source of aircraft details. `Ok(None)` is an explicit miss, errors are treated the same way
/// by the resolver (they just get logged differently)
#[async_trait]
pub trait DetailProvider: Send + Sync {
    fn name (&self)->&str;
    async fn resolve (&self, query: &DetailQuery)->Result<Option<PartialDetail>>;
}

pub struct DetailResolver {
    providers: Vec<Box<dyn DetailProvider>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    taxonomy: Option<Arc<Taxonomy>>,
}

impl DetailResolver {
    pub fn new (providers: Vec<Box<dyn DetailProvider>>)->Self {
        DetailResolver { providers, geocoder: None, taxonomy: None }
    }

    pub fn with_geocoder (mut self, geocoder: Arc<dyn Geocoder>)->Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_taxonomy (mut self, taxonomy: Arc<Taxonomy>)->Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// create the provider chain from configuration, in fixed priority order
    pub fn from_config (config: &ProviderConfig, client: &Client)->Result<Self> {
        let mut providers: Vec<Box<dyn DetailProvider>> = Vec::new();

        if let Some(url) = &config.aggregator_url {
            providers.push( Box::new( AggregatorProvider::new( client.clone(), url)));
        }
        if let Some(url) = &config.proxy_url {
            providers.push( Box::new( ProxyRegistryProvider::new( client.clone(), url)));
        }
        if let Some(url) = &config.registry_url {
            providers.push( Box::new( PublicRegistryProvider::new( client.clone(), url)));
        }
        if let Some(path) = &config.offline_registry {
            match OfflineRegistry::from_path( path) {
                Ok(registry) => providers.push( Box::new( registry)),
                Err(e) => warn!(provider = "offline", ?path, "offline registry not available: {e}")
            }
        }
        info!("detail providers: [{}]", providers.iter().map(|p| p.name()).collect::<Vec<_>>().join(","));

        let mut resolver = DetailResolver::new( providers);
        if let Some(url) = &config.geocoder_url {
            resolver = resolver.with_geocoder( Arc::new( NominatimGeocoder::new( client.clone(), url)));
        }
        Ok(resolver)
    }

    pub fn provider_names (&self)->Vec<&str> { self.providers.iter().map( |p| p.name()).collect() }

    /// step 1: the record we can build without waiting for anything
    pub fn provisional (&self, query: &DetailQuery)->AircraftDetail {
        let image = self.taxonomy.as_ref().and_then( |taxonomy| {
            let mut ac = AircraftPosition::new( &query.icao24, query.position);
            ac.type_code = query.type_code.clone();
            ac.description = query.type_label.clone();
            taxonomy.classify( &ac).and_then( |m| m.image.clone())
        });

        AircraftDetail {
            icao24: query.icao24.clone(),
            registration: query.registration.clone(),
            manufacturer: None,
            type_name: query.type_label.clone(),
            owner: None,
            callsign: query.callsign.clone(),
            position: Some(query.position),
            heading: query.heading,
            altitude: query.altitude,
            speed: query.speed,
            route: None,
            airline: None,
            image,
            status: DetailStatus::Loading,
            updated: EpochMillis::now(),
        }
    }

    /// try providers in order, return the first usable record together with the provider name
    pub async fn resolve_partial (&self, query: &DetailQuery)->Option<(String,PartialDetail)> {
        for provider in &self.providers {
            match provider.resolve( query).await {
                Ok(Some(partial)) if partial.is_usable() => {
                    debug!(provider = provider.name(), icao24 = %query.icao24, "resolved");
                    return Some( (provider.name().to_string(), partial) )
                }
                Ok(Some(_)) => debug!(provider = provider.name(), icao24 = %query.icao24, "empty record"),
                Ok(None) => debug!(provider = provider.name(), icao24 = %query.icao24, "no record"),
                Err(e) => warn!(provider = provider.name(), icao24 = %query.icao24, "resolve failed: {e}")
            }
        }
        None
    }

    /// step 2: enrich the provisional record. If no provider succeeds the provisional data is returned unchanged
    /// (only its status is set to `Unresolved`)
    pub async fn enrich (&self, query: &DetailQuery, provisional: AircraftDetail)->AircraftDetail {
        match self.resolve_partial( query).await {
            Some((provider, partial)) => {
                let mut detail = provisional;
                detail.merge( partial);

                if let (Some(geocoder), Some(route)) = (&self.geocoder, detail.route.as_mut()) {
                    geocode_route( geocoder.as_ref(), route).await;
                }

                detail.status = DetailStatus::Resolved{ provider };
                detail.updated = EpochMillis::now();
                detail
            }
            None => {
                info!("no provider could resolve {}, keeping provisional record", query.icao24);
                let mut detail = provisional;
                detail.status = DetailStatus::Unresolved;
                detail
            }
        }
    }

    /// both steps in one go (for callers that don't need the provisional record)
    pub async fn resolve (&self, query: &DetailQuery)->AircraftDetail {
        let provisional = self.provisional( query);
        self.enrich( query, provisional).await
    }
}

/* #endregion providers */
