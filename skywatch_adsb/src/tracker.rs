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

//! follows a selected aircraft beyond the original query window by repeatedly querying a small radius around its
//! last known position (the anchor).
//!
//! ```text
//!               found                       miss (n < max_misses)
//!           ┌───────────┐                 ┌───────────┐
//!           v           │                 v           │
//!  select ─> FOLLOWING ─┴── miss ────────>(count)─────┘
//!               ^                             │ n == max_misses
//!               │ found (Reacquired)          v
//!               └──────────────────────── LOST ── miss (keeps querying at anchor)
//! ```
//! The anchor only moves when the target was found. Route endpoints are set once and never change afterwards,
//! only the midpoint (current position) of the route line follows the target

use std::sync::Arc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uom::si::f64::Velocity;
use skywatch_common::{angle::Angle360, geo::GeoPoint};

use crate::{detail::derive_speed, feed::FeedQuery, AircraftPosition, Altitude};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub enum TrackState {
    Following,
    Lost
}

/// fresh telemetry of the tracked aircraft
#[derive(Debug,Clone,PartialEq)]
pub struct TrackUpdate {
    pub icao24: Arc<str>,
    pub position: GeoPoint,
    pub heading: Option<Angle360>,
    pub altitude: Option<Altitude>,
    pub speed: Option<Velocity>,
}

#[derive(Debug,Clone,PartialEq)]
pub enum TrackEvent {
    Updated(TrackUpdate),
    Missed { icao24: Arc<str>, misses: usize },
    Lost { icao24: Arc<str>, anchor: GeoPoint },
    Reacquired(TrackUpdate),
}

/// origin -> current position -> destination. Endpoints are optional since we might not have a route or
/// could not geocode it
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct RouteLine {
    pub origin: Option<GeoPoint>,
    pub current: GeoPoint,
    pub destination: Option<GeoPoint>,
}

impl RouteLine {
    pub fn points (&self)->Vec<GeoPoint> {
        let mut points = Vec::with_capacity(3);
        if let Some(p) = self.origin { points.push(p) }
        points.push( self.current);
        if let Some(p) = self.destination { points.push(p) }
        points
    }

    pub fn has_endpoints (&self)->bool { self.origin.is_some() || self.destination.is_some() }
}

pub struct ReacquisitionTracker {
    target: Arc<str>,
    anchor: GeoPoint,
    radius_nm: f64,
    max_misses: Option<usize>,
    state: TrackState,
    misses: usize,
    route: RouteLine,
}

impl ReacquisitionTracker {
    pub fn new (target: Arc<str>, anchor: GeoPoint, radius_nm: f64, max_misses: Option<usize>)->Self {
        info!("start tracking {} at {}", target, anchor);
        let route = RouteLine { origin: None, current: anchor, destination: None };
        ReacquisitionTracker { target, anchor, radius_nm, max_misses, state: TrackState::Following, misses: 0, route }
    }

    pub fn target (&self)->&Arc<str> { &self.target }
    pub fn anchor (&self)->GeoPoint { self.anchor }
    pub fn state (&self)->TrackState { self.state }
    pub fn misses (&self)->usize { self.misses }
    pub fn route (&self)->&RouteLine { &self.route }

    /// what the track poller should query next
    pub fn query (&self)->FeedQuery { FeedQuery::new( self.anchor, self.radius_nm) }

    /// process the result of a track poll
    pub fn observe (&mut self, aircraft: &[AircraftPosition])->TrackEvent {
        match aircraft.iter().find( |ac| ac.icao24 == self.target) {
            Some(ac) => {
                self.anchor = ac.position;
                self.route.current = ac.position;
                self.misses = 0;

                let update = TrackUpdate {
                    icao24: self.target.clone(),
                    position: ac.position,
                    heading: ac.heading.effective(),
                    altitude: ac.altitude,
                    speed: derive_speed( ac.mach, ac.ground_speed),
                };

                if self.state == TrackState::Lost {
                    info!("reacquired {} at {}", self.target, ac.position);
                    self.state = TrackState::Following;
                    TrackEvent::Reacquired(update)
                } else {
                    TrackEvent::Updated(update)
                }
            }
            None => {
                self.misses += 1;
                if self.state == TrackState::Following && self.max_misses.is_some_and( |max| self.misses >= max) {
                    warn!(icao24 = %self.target, misses = self.misses, anchor = %self.anchor, "lost tracked aircraft");
                    self.state = TrackState::Lost;
                    TrackEvent::Lost { icao24: self.target.clone(), anchor: self.anchor }
                } else {
                    debug!(icao24 = %self.target, misses = self.misses, anchor = %self.anchor, "tracked aircraft not found");
                    TrackEvent::Missed { icao24: self.target.clone(), misses: self.misses }
                }
            }
        }
    }

    /// set the route endpoints we know. Each one can only be set once
    pub fn set_route_endpoints (&mut self, origin: Option<GeoPoint>, destination: Option<GeoPoint>) {
        if self.route.origin.is_none() { self.route.origin = origin }
        if self.route.destination.is_none() { self.route.destination = destination }
    }
}
