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

//! keeps a persistent collection of map markers in sync with the aircraft of the current cycle.
//!
//! Markers are keyed by ICAO24 address and refer to their visual entity through an opaque handle of the
//! [`MarkerLayer`]. Reconciliation is a pure key set diff: markers of aircraft that are gone get destroyed,
//! existing markers are updated in place (never re-created for a position change) and new aircraft get a
//! marker with a selection handler attached

use std::{collections::{HashMap,HashSet}, fmt, sync::Arc};
use serde::Serialize;
use tracing::debug;
use skywatch_common::{angle::Angle360, geo::{nautical_miles, GeoPoint, GeoRect}};

use crate::{tracker::RouteLine, AircraftPosition};

/// fractions of the reference radius we draw range rings for
pub const RANGE_RING_FRACTIONS: [f64;3] = [1.0/3.0, 2.0/3.0, 1.0];
pub const RING_POINTS: usize = 72;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub enum MarkerVariant {
    Selected,
    Unselected
}

/// everything a layer needs to render a single aircraft marker
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct MarkerState {
    pub position: GeoPoint,
    pub rotation: Angle360,
    pub variant: MarkerVariant,
}

impl MarkerState {
    pub fn for_aircraft (ac: &AircraftPosition, selected: Option<&str>)->Self {
        let variant = if selected == Some(&*ac.icao24) { MarkerVariant::Selected } else { MarkerVariant::Unselected };
        MarkerState { position: ac.position, rotation: ac.heading.rotation(), variant }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct RangeRing {
    pub radius_nm: f64,
    pub points: Vec<GeoPoint>,
}

/// the area around the reference point we show (query bounds and range rings)
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Viewport {
    pub center: GeoPoint,
    pub radius_nm: f64,
    pub bounds: GeoRect,
    pub range_rings: Vec<RangeRing>,
}

impl Viewport {
    pub fn new (center: GeoPoint, radius_nm: f64)->Self {
        let bounds = center.bounds_for_radius( nautical_miles( radius_nm));
        let range_rings = RANGE_RING_FRACTIONS.iter().map( |f| {
            let r = radius_nm * f;
            RangeRing { radius_nm: r, points: center.circle( nautical_miles(r), RING_POINTS) }
        }).collect();

        Viewport { center, radius_nm, bounds, range_rings }
    }

    pub fn has_reference (&self, center: &GeoPoint, radius_nm: f64)->bool {
        self.center == *center && self.radius_nm == radius_nm
    }
}

pub type SelectCallback = Arc<dyn Fn(Arc<str>) + Send + Sync>;

/// what a layer calls when the user clicks on a marker
#[derive(Clone)]
pub struct SelectionHandler {
    pub icao24: Arc<str>,
    callback: SelectCallback,
}

impl SelectionHandler {
    pub fn new (icao24: Arc<str>, callback: SelectCallback)->Self { SelectionHandler { icao24, callback } }

    pub fn select (&self) { (self.callback)( self.icao24.clone()) }
}

impl fmt::Debug for SelectionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "SelectionHandler({})", self.icao24)
    }
}

/// the visual backend (map widget, scene graph, headless test layer)
pub trait MarkerLayer {
    type Handle: Clone + PartialEq + fmt::Debug;

    fn create_marker (&mut self, icao24: &Arc<str>, state: &MarkerState, on_select: SelectionHandler)->Self::Handle;
    fn update_marker (&mut self, handle: &Self::Handle, state: &MarkerState);
    fn destroy_marker (&mut self, handle: Self::Handle);

    fn set_viewport (&mut self, viewport: &Viewport);

    fn draw_route (&mut self, route: &RouteLine);
    fn clear_route (&mut self);
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub total: usize,
}

struct Marker<H> {
    handle: H,
    state: MarkerState,
}

pub struct MarkerReconciler<L: MarkerLayer> {
    layer: L,
    markers: HashMap<Arc<str>,Marker<L::Handle>>,
    on_select: SelectCallback,
    viewport: Option<Viewport>,
}

impl<L: MarkerLayer> MarkerReconciler<L> {
    pub fn new (layer: L, on_select: SelectCallback)->Self {
        MarkerReconciler { layer, markers: HashMap::new(), on_select, viewport: None }
    }

    pub fn reconcile (&mut self, aircraft: &[AircraftPosition], selected: Option<&str>)->ReconcileStats {
        let mut stats = ReconcileStats::default();
        let current: HashSet<&str> = aircraft.iter().map( |ac| &*ac.icao24).collect();

        let gone: Vec<Arc<str>> = self.markers.keys().filter( |k| !current.contains( &***k)).cloned().collect();
        for icao24 in gone {
            if let Some(marker) = self.markers.remove( &icao24) {
                self.layer.destroy_marker( marker.handle);
                stats.removed += 1;
            }
        }

        for ac in aircraft {
            let state = MarkerState::for_aircraft( ac, selected);

            if let Some(marker) = self.markers.get_mut( &ac.icao24) {
                self.layer.update_marker( &marker.handle, &state);
                marker.state = state;
                stats.updated += 1;
            } else {
                let on_select = SelectionHandler::new( ac.icao24.clone(), self.on_select.clone());
                let handle = self.layer.create_marker( &ac.icao24, &state, on_select);
                self.markers.insert( ac.icao24.clone(), Marker { handle, state });
                stats.created += 1;
            }
        }

        stats.total = self.markers.len();
        debug!("markers: {} created, {} updated, {} removed", stats.created, stats.updated, stats.removed);
        stats
    }

    /// rebuild the viewport if the reference point or radius changed. Returns the new viewport if it was rebuilt
    pub fn set_reference (&mut self, center: GeoPoint, radius_nm: f64)->Option<&Viewport> {
        if self.viewport.as_ref().is_some_and( |vp| vp.has_reference( &center, radius_nm)) {
            return None
        }

        let viewport = Viewport::new( center, radius_nm);
        self.layer.set_viewport( &viewport);
        self.viewport = Some(viewport);
        self.viewport.as_ref()
    }

    pub fn viewport (&self)->Option<&Viewport> { self.viewport.as_ref() }

    pub fn handle (&self, icao24: &str)->Option<&L::Handle> { self.markers.get( icao24).map( |m| &m.handle) }
    pub fn state (&self, icao24: &str)->Option<&MarkerState> { self.markers.get( icao24).map( |m| &m.state) }
    pub fn len (&self)->usize { self.markers.len() }
    pub fn is_empty (&self)->bool { self.markers.is_empty() }

    pub fn layer (&self)->&L { &self.layer }
    pub fn layer_mut (&mut self)->&mut L { &mut self.layer }
}
