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

use std::sync::Arc;
use uom::si::{f64::Velocity, velocity::{kilometer_per_hour, knot}};
use skywatch_common::geo::GeoPoint;
use skywatch_adsb::{tracker::*, AircraftPosition, Altitude, HeadingSources};

fn target_at (lat: f64, lon: f64)->AircraftPosition {
    let mut ac = AircraftPosition::new( "abc123", GeoPoint::from_lat_lon_degrees( lat, lon));
    ac.altitude = Some( Altitude::Feet(35000.0));
    ac.ground_speed = Some( Velocity::new::<knot>(450.0));
    ac.heading = HeadingSources { primary: Some(90.0), calculated: None, derived: None };
    ac
}

fn other ()->AircraftPosition { AircraftPosition::new( "ffffff", GeoPoint::from_lat_lon_degrees( 34.0, -118.0)) }

fn tracker (max_misses: Option<usize>)->ReacquisitionTracker {
    ReacquisitionTracker::new( Arc::from("abc123"), GeoPoint::from_lat_lon_degrees( 34.0, -118.0), 10.0, max_misses)
}

#[test]
fn test_follow_updates_anchor() {
    let mut t = tracker( Some(3));
    assert_eq!( t.state(), TrackState::Following);
    assert_eq!( t.query().radius_nm, 10.0);

    match t.observe( &[other(), target_at( 34.0, -117.9)]) {
        TrackEvent::Updated(update) => {
            assert_eq!( update.icao24.as_ref(), "abc123");
            assert_eq!( update.heading.unwrap().degrees(), 90.0);
            assert_eq!( update.altitude, Some( Altitude::Feet(35000.0)));
            assert_eq!( update.speed.unwrap().get::<kilometer_per_hour>().round(), 833.0);
        }
        e => panic!("unexpected event {e:?}")
    }
    assert!( (t.anchor().lon_degrees() + 117.9).abs() < 1e-9);
    assert!( (t.query().center.lon_degrees() + 117.9).abs() < 1e-9);
    assert_eq!( t.route().current, t.anchor());
}

#[test]
fn test_miss_keeps_anchor() {
    let mut t = tracker( None);
    let anchor = t.anchor();

    for i in 1..=20 {
        assert_eq!( t.observe( &[other()]), TrackEvent::Missed { icao24: Arc::from("abc123"), misses: i });
        assert_eq!( t.anchor(), anchor); // retried at the same stale point
    }
    assert_eq!( t.state(), TrackState::Following); // never lost without threshold
}

#[test]
fn test_lost_and_reacquired() {
    let mut t = tracker( Some(2));
    let anchor = t.anchor();

    assert!( matches!( t.observe( &[]), TrackEvent::Missed { misses: 1, .. }));
    assert_eq!( t.observe( &[]), TrackEvent::Lost { icao24: Arc::from("abc123"), anchor });
    assert_eq!( t.state(), TrackState::Lost);

    // lost is only reported once, we keep querying around the anchor
    assert!( matches!( t.observe( &[]), TrackEvent::Missed { misses: 3, .. }));
    assert_eq!( t.query().center, anchor);

    assert!( matches!( t.observe( &[target_at( 34.1, -118.0)]), TrackEvent::Reacquired(_)));
    assert_eq!( t.state(), TrackState::Following);
    assert_eq!( t.misses(), 0);
    assert!( matches!( t.observe( &[target_at( 34.2, -118.0)]), TrackEvent::Updated(_)));
}

#[test]
fn test_route_endpoints_immutable() {
    let mut t = tracker( None);
    let sfo = GeoPoint::from_lat_lon_degrees( 37.619, -122.375);
    let ewr = GeoPoint::from_lat_lon_degrees( 40.6925, -74.1687);

    assert!( !t.route().has_endpoints());
    t.set_route_endpoints( Some(sfo), None);
    t.set_route_endpoints( Some(ewr), Some(ewr));
    assert_eq!( t.route().origin, Some(sfo));
    assert_eq!( t.route().destination, Some(ewr));

    t.observe( &[target_at( 35.0, -110.0)]);
    let points = t.route().points();
    assert_eq!( points.len(), 3);
    assert_eq!( points[0], sfo);
    assert!( (points[1].lat_degrees() - 35.0).abs() < 1e-9);
    assert_eq!( points[2], ewr);
}
