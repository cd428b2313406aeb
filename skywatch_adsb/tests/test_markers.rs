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

use std::sync::{Arc, Mutex};
use skywatch_common::geo::GeoPoint;
use skywatch_adsb::{markers::*, scene::SceneLayer, AircraftPosition, HeadingSources};

fn ac (icao24: &str, lat: f64, lon: f64)->AircraftPosition {
    AircraftPosition::new( icao24, GeoPoint::from_lat_lon_degrees( lat, lon))
}

fn reconciler ()->(MarkerReconciler<SceneLayer>, Arc<Mutex<Vec<String>>>) {
    let clicks = Arc::new( Mutex::new( Vec::new()));
    let c = clicks.clone();
    let on_select: SelectCallback = Arc::new( move |icao24: Arc<str>| c.lock().unwrap().push( icao24.to_string()));
    (MarkerReconciler::new( SceneLayer::new(), on_select), clicks)
}

#[test]
fn test_reconcile_identity() {
    let (mut mr, _) = reconciler();

    let stats = mr.reconcile( &[ac("a", 34.0, -118.0), ac("b", 34.1, -118.1)], None);
    assert_eq!( stats, ReconcileStats { created: 2, updated: 0, removed: 0, total: 2 });
    let handle_a = *mr.handle("a").unwrap();
    let handle_b = *mr.handle("b").unwrap();

    let stats = mr.reconcile( &[ac("b", 34.2, -118.2), ac("c", 34.3, -118.3)], None);
    assert_eq!( stats, ReconcileStats { created: 1, updated: 1, removed: 1, total: 2 });
    assert_eq!( mr.layer().n_created, 3);
    assert_eq!( mr.layer().n_destroyed, 1);

    assert!( mr.handle("a").is_none());
    assert!( mr.layer().entity( &handle_a).is_none());
    assert_eq!( *mr.handle("b").unwrap(), handle_b); // same instance, moved in place

    let entity = mr.layer().entity( &handle_b).unwrap();
    assert_eq!( entity.n_updates, 1);
    assert!( (entity.state.position.lat_degrees() - 34.2).abs() < 1e-9);

    // c reuses the slot of a but with a new generation
    let handle_c = *mr.handle("c").unwrap();
    assert_ne!( handle_c, handle_a);
    assert_eq!( mr.layer().entity( &handle_c).unwrap().icao24.as_ref(), "c");
    assert_eq!( mr.layer().live_count(), 2);
}

#[test]
fn test_rotation_fallback() {
    let (mut mr, _) = reconciler();

    let mut x = ac("x", 34.0, -118.0);
    x.heading = HeadingSources { primary: None, calculated: Some(270.0), derived: Some(90.0) };
    let y = ac("y", 34.0, -118.0);

    mr.reconcile( &[x, y], None);
    assert_eq!( mr.state("x").unwrap().rotation.degrees(), 270.0);
    assert_eq!( mr.state("y").unwrap().rotation.degrees(), 0.0);
}

#[test]
fn test_variant_and_selection() {
    let (mut mr, clicks) = reconciler();
    let list = [ac("a", 34.0, -118.0), ac("b", 34.1, -118.1)];

    mr.reconcile( &list, Some("b"));
    assert_eq!( mr.state("a").unwrap().variant, MarkerVariant::Unselected);
    assert_eq!( mr.state("b").unwrap().variant, MarkerVariant::Selected);

    mr.reconcile( &list, None);
    assert_eq!( mr.state("b").unwrap().variant, MarkerVariant::Unselected);

    let handle = *mr.handle("a").unwrap();
    assert!( mr.layer().click( &handle));
    assert_eq!( *clicks.lock().unwrap(), vec!["a".to_string()]);
}

#[test]
fn test_viewport_rebuild() {
    let (mut mr, _) = reconciler();
    let center = GeoPoint::from_lat_lon_degrees( 37.6189, -122.375);

    let vp = mr.set_reference( center, 30.0).unwrap();
    assert_eq!( vp.range_rings.len(), 3);
    assert!( (vp.range_rings[0].radius_nm - 10.0).abs() < 1e-9);
    assert!( vp.bounds.contains( &center));
    assert_eq!( mr.layer().n_viewport_builds, 1);

    // aircraft changes never rebuild the viewport
    mr.reconcile( &[ac("a", 37.7, -122.3)], None);
    mr.reconcile( &[ac("b", 37.5, -122.4)], None);
    assert!( mr.set_reference( center, 30.0).is_none());
    assert_eq!( mr.layer().n_viewport_builds, 1);

    assert!( mr.set_reference( center, 20.0).is_some());
    assert!( mr.set_reference( GeoPoint::from_lat_lon_degrees( 34.0, -118.0), 20.0).is_some());
    assert_eq!( mr.layer().n_viewport_builds, 3);
}

#[test]
fn test_scene_snapshot() {
    let (mut mr, _) = reconciler();
    mr.set_reference( GeoPoint::from_lat_lon_degrees( 34.0, -118.0), 10.0);
    mr.reconcile( &[ac("a", 34.0, -118.0)], Some("a"));

    let snapshot = mr.layer().snapshot_json();
    println!("{}", serde_json::to_string_pretty( &snapshot["markers"]).unwrap());
    assert_eq!( snapshot["markers"][0]["icao24"], "a");
    assert_eq!( snapshot["markers"][0]["variant"], "Selected");
    assert_eq!( snapshot["viewport"]["radius_nm"], 10.0);
    assert!( snapshot["route"].is_null());
}
