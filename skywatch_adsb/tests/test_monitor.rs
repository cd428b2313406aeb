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

use std::{sync::{Arc, Mutex}, time::Duration};
use async_trait::async_trait;
use tokio::sync::mpsc;
use uom::si::{f64::Velocity, velocity::knot};
use skywatch_common::{datetime::millis, geo::GeoPoint};
use skywatch_adsb::{
    config::{FilterConfig, TrackerConfig},
    detail::{AircraftDetail, Airport, DetailResolver, DetailStatus, OfflineRegistry, Route},
    errors::Result, feed::{FeedQuery, PositionFeed},
    markers::{MarkerVariant, ReconcileStats},
    monitor::*, scene::SceneLayer, taxonomy::{Taxonomy, TaxonomyFilter}, tracker::{TrackEvent, TrackState},
    AircraftPosition
};

fn ac (icao24: &str, reg: Option<&str>, lat: f64, lon: f64)->AircraftPosition {
    let mut ac = AircraftPosition::new( icao24, GeoPoint::from_lat_lon_degrees( lat, lon));
    ac.registration = reg.map( |s| s.to_string());
    ac.type_code = Some("B738".into());
    ac.ground_speed = Some( Velocity::new::<knot>(450.0));
    ac
}

fn reference ()->FeedQuery { FeedQuery::new( GeoPoint::from_lat_lon_degrees( 34.0, -118.0), 25.0) }

fn monitor (resolver: DetailResolver)->Monitor<SceneLayer> {
    let filter = TaxonomyFilter::new( Arc::new( Taxonomy::empty()), &FilterConfig::default());
    Monitor::new( filter, resolver, SceneLayer::new(), reference(), TrackerConfig::default())
}

fn markers (reaction: &Reaction)->Option<ReconcileStats> {
    reaction.events.iter().find_map( |e| if let MonitorEvent::Markers(stats) = e { Some(*stats) } else { None })
}

fn arrivals (reaction: &Reaction)->Vec<String> {
    reaction.events.iter().filter_map( |e| if let MonitorEvent::Arrival(ac) = e { Some(ac.icao24.to_string()) } else { None }).collect()
}

#[test]
fn test_position_cycles() {
    let mut m = monitor( DetailResolver::new( vec![]));

    let r = m.process( MonitorMsg::PositionUpdate( vec![ ac("abc123", Some("N1"), 34.0, -118.0), ac("b", None, 34.1, -118.1)]));
    assert_eq!( arrivals(&r), vec!["abc123"]);
    assert_eq!( markers(&r).unwrap().created, 2);

    // the provisional record is published right away
    let provisional = r.events.iter().find_map( |e| if let MonitorEvent::Detail(d) = e { Some(d.clone()) } else { None }).unwrap();
    assert_eq!( provisional.registration.as_deref(), Some("N1"));
    assert_eq!( provisional.speed_kmh(), Some(833));
    assert_eq!( provisional.status, DetailStatus::Loading);
    assert_eq!( r.enrichment.as_ref().unwrap().query.icao24.as_ref(), "abc123");
    assert!( m.detail("abc123").is_some());

    // two arrivals, only the first one gets resolved
    let r = m.process( MonitorMsg::PositionUpdate( vec![ ac("b", None, 34.1, -118.1), ac("c", Some("N3"), 34.2, -118.2), ac("d", Some("N4"), 34.3, -118.3)]));
    assert_eq!( arrivals(&r), vec!["c", "d"]);
    assert_eq!( r.enrichment.as_ref().unwrap().query.icao24.as_ref(), "c");
    assert_eq!( markers(&r).unwrap(), ReconcileStats { created: 2, updated: 1, removed: 1, total: 3 });
    assert_eq!( m.novelty().seen().len(), 3);

    // transport failures show up as empty cycles
    let r = m.process( MonitorMsg::PositionUpdate( vec![]));
    assert!( r.enrichment.is_none());
    assert_eq!( markers(&r).unwrap().removed, 3);
    assert!( m.novelty().seen().is_empty());
}

#[test]
fn test_filter_before_novelty() {
    let taxonomy = Taxonomy::from_json( r#"{"Boeing":[{"model":"Boeing 737","patterns":["^B73"]}]}"#).unwrap();
    let config = FilterConfig { models: vec!["Boeing 737".into()], include_others: false, include_relayed: false };
    let filter = TaxonomyFilter::new( Arc::new(taxonomy), &config);
    let mut m = Monitor::new( filter, DetailResolver::new( vec![]), SceneLayer::new(), reference(), TrackerConfig::default());

    let mut cessna = ac("c172aa", Some("N5"), 34.0, -118.0);
    cessna.type_code = Some("C172".into());
    let r = m.process( MonitorMsg::PositionUpdate( vec![ cessna.clone(), ac("a", Some("N1"), 34.0, -118.0)]));
    assert_eq!( arrivals(&r), vec!["a"]);
    assert!( !m.novelty().seen().contains("c172aa"));

    // once "others" is selected the cessna is new
    m.process( MonitorMsg::SetSelection { models: vec!["Boeing 737".into()], include_others: true });
    let r = m.process( MonitorMsg::PositionUpdate( vec![ cessna, ac("a", Some("N1"), 34.0, -118.0)]));
    assert_eq!( arrivals(&r), vec!["c172aa"]);
}

#[test]
fn test_select_track_deselect() {
    let mut m = monitor( DetailResolver::new( vec![]));
    let track_rx = m.track_queries();
    m.process( MonitorMsg::PositionUpdate( vec![ ac("abc123", Some("N1"), 34.0, -118.0), ac("b", Some("N2"), 34.1, -118.1)]));

    // unknown aircraft can't be selected
    m.process( MonitorMsg::Select( Arc::from("ffffff")));
    assert!( m.selected().is_none());

    let r = m.process( MonitorMsg::Select( Arc::from("b")));
    assert!( r.enrichment.is_some()); // b was not the spotlighted arrival
    assert_eq!( m.selected().map( |s| s.as_ref()), Some("b"));
    assert_eq!( m.reconciler().state("b").unwrap().variant, MarkerVariant::Selected);
    assert_eq!( m.reconciler().state("abc123").unwrap().variant, MarkerVariant::Unselected);
    assert_eq!( track_rx.borrow().unwrap().radius_nm, 10.0);

    // found: anchor moves and the detail view gets fresh telemetry
    let r = m.process( MonitorMsg::TrackUpdate( vec![ ac("b", Some("N2"), 34.5, -118.5)]));
    assert!( r.events.iter().any( |e| matches!( e, MonitorEvent::Track( TrackEvent::Updated(_)))));
    assert!( (m.detail("b").unwrap().position.unwrap().lat_degrees() - 34.5).abs() < 1e-9);
    assert!( (track_rx.borrow().unwrap().center.lat_degrees() - 34.5).abs() < 1e-9);

    // missed: anchor stays
    m.process( MonitorMsg::TrackUpdate( vec![]));
    assert!( (m.tracker().unwrap().anchor().lat_degrees() - 34.5).abs() < 1e-9);
    assert_eq!( m.tracker().unwrap().state(), TrackState::Following);

    // a late resolution with route draws the route line
    let mut detail = m.detail("b").unwrap().clone();
    detail.status = DetailStatus::Resolved { provider: "aggregator".into() };
    detail.route = Some( Route {
        origin: Airport { iata: Some("LAX".into()), position: Some( GeoPoint::from_lat_lon_degrees( 33.94, -118.41)), ..Airport::default() },
        destination: Airport { iata: Some("SFO".into()), position: Some( GeoPoint::from_lat_lon_degrees( 37.62, -122.38)), ..Airport::default() },
    });
    m.process( MonitorMsg::DetailResolved(detail));
    assert_eq!( m.reconciler().layer().route().unwrap().points().len(), 3);

    m.process( MonitorMsg::Deselect);
    assert!( m.tracker().is_none());
    assert!( track_rx.borrow().is_none());
    assert!( m.reconciler().layer().route().is_none());
    assert_eq!( m.reconciler().state("b").unwrap().variant, MarkerVariant::Unselected);
}

#[test]
fn test_details_bounded_by_present_aircraft() {
    let mut m = monitor( DetailResolver::new( vec![]));

    for i in 0..1000 {
        let icao24 = format!("{:06x}", i);
        m.process( MonitorMsg::PositionUpdate( vec![ ac( &icao24, Some("N1"), 34.0, -118.0)]));
        assert_eq!( m.n_details(), 1);
    }
    m.process( MonitorMsg::PositionUpdate( vec![]));
    assert_eq!( m.n_details(), 0);
    assert_eq!( m.reconciler().len(), 0);

    // the tracked target survives leaving the query window
    m.process( MonitorMsg::PositionUpdate( vec![ ac("abc123", Some("N1"), 34.0, -118.0), ac("b", Some("N2"), 34.1, -118.1)]));
    m.process( MonitorMsg::Select( Arc::from("abc123")));
    m.process( MonitorMsg::PositionUpdate( vec![]));
    assert_eq!( m.n_details(), 1);
    assert!( m.detail("abc123").is_some());

    // late results for aircraft that are gone are dropped
    let mut late = m.detail("abc123").unwrap().clone();
    late.icao24 = Arc::from("b");
    let r = m.process( MonitorMsg::DetailResolved( late));
    assert!( r.events.is_empty());
    assert!( m.detail("b").is_none());

    m.process( MonitorMsg::Deselect);
    m.process( MonitorMsg::PositionUpdate( vec![]));
    assert_eq!( m.n_details(), 0);
}

#[test]
fn test_marker_click_selects() {
    let mut m = monitor( DetailResolver::new( vec![]));
    m.process( MonitorMsg::PositionUpdate( vec![ ac("abc123", Some("N1"), 34.0, -118.0)]));

    let handle = *m.reconciler().handle("abc123").unwrap();
    assert!( m.reconciler().layer().click( &handle)); // queued as a Select message for the run loop
}

#[test]
fn test_reference_change() {
    let mut m = monitor( DetailResolver::new( vec![]));
    let query_rx = m.position_queries();
    assert_eq!( *query_rx.borrow(), Some(reference()));
    assert_eq!( m.reconciler().layer().n_viewport_builds, 1);

    let r = m.process( MonitorMsg::SetReference { center: reference().center, radius_nm: 25.0 });
    assert!( r.events.is_empty());

    let center = GeoPoint::from_lat_lon_degrees( 37.0, -122.0);
    let r = m.process( MonitorMsg::SetReference { center, radius_nm: 40.0 });
    assert!( matches!( r.events.as_slice(), [MonitorEvent::Viewport(vp)] if vp.radius_nm == 40.0));
    assert_eq!( query_rx.borrow().unwrap().center, center);
    assert_eq!( m.reconciler().layer().n_viewport_builds, 2);

    // aircraft updates never rebuild it
    m.process( MonitorMsg::PositionUpdate( vec![ ac("a", Some("N1"), 37.0, -122.0)]));
    assert_eq!( m.reconciler().layer().n_viewport_builds, 2);

    assert!( m.process( MonitorMsg::Terminate).terminate);
}

/// replays a fixed list of cycles, then keeps repeating the last one
struct ReplayFeed {
    cycles: Mutex<Vec<Vec<AircraftPosition>>>,
}

#[async_trait]
impl PositionFeed for ReplayFeed {
    async fn fetch (&self, _query: &FeedQuery)->Result<Vec<AircraftPosition>> {
        let mut cycles = self.cycles.lock().unwrap();
        Ok( if cycles.len() > 1 { cycles.remove(0) } else { cycles.first().cloned().unwrap_or_default() })
    }
}

#[tokio::test]
async fn test_run_loop() {
    let registry = OfflineRegistry::from_json( r#"{ "ABC123": { "reg": "N1", "m": "Boeing", "t": "B738", "ownop": "United" } }"#).unwrap();
    let m = monitor( DetailResolver::new( vec![ Box::new(registry)]));
    let handle = m.handle();

    let feed = Arc::new( ReplayFeed { cycles: Mutex::new( vec![
        vec![ ac("abc123", Some("N1"), 34.0, -118.0)],
        vec![ ac("abc123", Some("N1"), 34.01, -118.01)],
    ])});
    let pollers = spawn_pollers( &m, feed, millis(20), millis(20));

    let (tx, mut rx) = mpsc::channel(64);
    let task = tokio::spawn( m.run(tx));

    let mut resolved: Option<AircraftDetail> = None;
    let _ = tokio::time::timeout( Duration::from_secs(5), async {
        while let Some(event) = rx.recv().await {
            if let MonitorEvent::Detail(detail) = event {
                if detail.is_resolved() {
                    resolved = Some(detail);
                    break
                }
            }
        }
    }).await;
    drop(rx);

    handle.terminate().await.unwrap();
    task.await.unwrap().unwrap();
    for p in pollers { p.await.unwrap(); }

    let detail = resolved.expect("no resolved detail");
    assert_eq!( detail.manufacturer.as_deref(), Some("Boeing"));
    assert_eq!( detail.owner.as_deref(), Some("United"));
    assert_eq!( detail.speed_kmh(), Some(833));
    assert!( handle.is_closed());
}
