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

//! live aircraft surveillance client: polls a position feed around a reference point, filters the result by
//! aircraft model, detects newly arrived aircraft, resolves their details through a chain of registry providers,
//! keeps map markers in sync with the moving aircraft set and follows a selected aircraft beyond the original
//! query window

use std::{fmt, sync::Arc};
use serde::{Serialize,Deserialize};
use uom::si::{f64::Velocity, velocity::{knot,kilometer_per_hour}};
use skywatch_common::{angle::Angle360, geo::GeoPoint};

pub mod errors;
pub mod config;
pub mod feed;
pub mod taxonomy;
pub mod novelty;
pub mod detail;
pub mod geocode;
pub mod markers;
pub mod scene;
pub mod tracker;
pub mod location;
pub mod monitor;

/// how the feed received the data for an aircraft. Only direct sources are trustworthy enough to be
/// shown by default, relayed (re-broadcast) sources have to be opted in
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum SourceKind {
    Adsb,
    Mlat,
    ModeS,
    Adsr,
    Tisb,
    Adsc,
    Other,
    Unknown
}

impl SourceKind {
    /// classify the readsb "type" field (e.g. "adsb_icao", "tisb_trackfile", "mlat")
    pub fn from_type (s: &str)->Self {
        let s = s.trim().to_ascii_lowercase();
        if s.starts_with("adsb") { SourceKind::Adsb }
        else if s.starts_with("adsr") { SourceKind::Adsr }
        else if s.starts_with("tisb") { SourceKind::Tisb }
        else if s.starts_with("adsc") { SourceKind::Adsc }
        else if s == "mlat" { SourceKind::Mlat }
        else if s == "mode_s" { SourceKind::ModeS }
        else if s == "other" { SourceKind::Other }
        else { SourceKind::Unknown }
    }

    pub fn is_relayed (&self)->bool {
        matches!( self, SourceKind::Adsr | SourceKind::Tisb)
    }
}

/// barometric altitude as reported by the feed
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub enum Altitude {
    Feet(f64),
    OnGround
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Altitude::Feet(ft) => write!(f, "{:.0}ft", ft),
            Altitude::OnGround => write!(f, "ground")
        }
    }
}

/// the three alternative heading sources in descending priority
#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize,Deserialize)]
pub struct HeadingSources {
    pub primary: Option<f64>,     // track over ground
    pub calculated: Option<f64>,  // track computed by the receiver from position changes
    pub derived: Option<f64>,     // heading derived from the airframe (true heading)
}

impl HeadingSources {
    pub fn effective (&self)->Option<Angle360> {
        self.primary.or(self.calculated).or(self.derived)
            .filter( |h| h.is_finite())
            .map( Angle360::from_degrees)
    }

    /// marker rotation: effective heading or north if we don't have any
    pub fn rotation (&self)->Angle360 {
        self.effective().unwrap_or( Angle360::from_degrees(0.0))
    }
}

/// a single aircraft as reported by one poll cycle of the position feed. These are produced fresh each cycle
/// and never updated in place
#[derive(Debug,Clone,PartialEq)]
pub struct AircraftPosition {
    pub icao24: Arc<str>, // lowercase hex, shared so that we can clone keys without heap allocation
    pub source: SourceKind,
    pub registration: Option<String>,
    pub type_code: Option<String>,
    pub description: Option<String>,
    pub callsign: Option<String>,
    pub position: GeoPoint,
    pub altitude: Option<Altitude>,
    pub ground_speed: Option<Velocity>,
    pub mach: Option<f64>,
    pub heading: HeadingSources,
}

impl AircraftPosition {
    pub fn new (icao24: &str, position: GeoPoint)->Self {
        AircraftPosition {
            icao24: Arc::from( icao24.trim().to_ascii_lowercase().as_str()),
            source: SourceKind::Adsb,
            registration: None,
            type_code: None,
            description: None,
            callsign: None,
            position,
            altitude: None,
            ground_speed: None,
            mach: None,
            heading: HeadingSources::default()
        }
    }

    pub fn has_registration (&self)->bool {
        self.registration.as_ref().is_some_and( |r| !r.trim().is_empty())
    }

    /// what we show as type before we have resolved details: free text description, or type code
    pub fn type_label (&self)->Option<&str> {
        skywatch_common::first_non_empty( &[self.description.as_deref(), self.type_code.as_deref()])
    }
}

impl fmt::Display for AircraftPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Aircraft( icao24: {}", self.icao24)?;
        if let Some(reg) = &self.registration { write!( f, ", reg: {reg}")?; }
        if let Some(cs) = &self.callsign { write!( f, ", cs: \"{cs}\"")?; }
        if let Some(t) = &self.type_code { write!( f, ", type: {t}")?; }
        write!( f, ", pos: {}", self.position)?;
        if let Some(alt) = &self.altitude { write!( f, ", alt: {alt}")?; }
        if let Some(gs) = self.ground_speed { write!( f, ", spd: {:.0}kn", gs.get::<knot>())?; }
        if let Some(hdg) = self.heading.effective() { write!( f, ", hdg: {:.0}", hdg.degrees())?; }
        write!(f, ")")
    }
}
