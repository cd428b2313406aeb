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
use async_trait::async_trait;
use uom::si::velocity::knot;
use skywatch_common::{geo::GeoPoint, net::NetError};
use skywatch_adsb::{
    errors::{Result, SkywatchError}, feed::*, Altitude, AircraftPosition, SourceKind
};

const FEED: &str = r#"{
  "ac": [
    { "hex": "ABC123", "type": "adsb_icao", "flight": "UAL100  ", "r": "N1", "t": "B738", "desc": "BOEING 737-800",
      "alt_baro": 35000, "gs": 450.0, "track": 270.5, "lat": 34.0, "lon": -118.0 },
    { "hex": "c0ffee", "type": "tisb_trackfile", "alt_baro": "ground", "calc_track": 90, "lat": 34.1, "lon": -118.1 },
    { "hex": "deadbf", "type": "mlat", "r": "", "flight": "   " , "lat": 34.2, "lon": -118.2, "mach": 0.78 },
    { "hex": "nopos1", "type": "adsb_icao", "r": "N2" },
    { "type": "adsb_icao", "lat": 34.3, "lon": -118.3 }
  ],
  "now": 1700000000.0,
  "total": 5
}"#;

#[test]
fn test_parse_feed() {
    let list = parse_feed_response( FEED.as_bytes()).unwrap();
    for ac in &list { println!("{ac}"); }
    assert_eq!( list.len(), 3); // entries without position or identifier are dropped

    let ac = &list[0];
    assert_eq!( ac.icao24.as_ref(), "abc123");
    assert_eq!( ac.source, SourceKind::Adsb);
    assert_eq!( ac.callsign.as_deref(), Some("UAL100"));
    assert_eq!( ac.registration.as_deref(), Some("N1"));
    assert_eq!( ac.type_label(), Some("BOEING 737-800"));
    assert_eq!( ac.altitude, Some(Altitude::Feet(35000.0)));
    assert!( (ac.ground_speed.unwrap().get::<knot>() - 450.0).abs() < 1e-9);
    assert!( (ac.heading.rotation().degrees() - 270.5).abs() < 1e-9);
    assert!( (ac.position.lat_degrees() - 34.0).abs() < 1e-9);

    let ac = &list[1];
    assert_eq!( ac.source, SourceKind::Tisb);
    assert!( ac.source.is_relayed());
    assert_eq!( ac.altitude, Some(Altitude::OnGround));
    assert!( (ac.heading.rotation().degrees() - 90.0).abs() < 1e-9);

    let ac = &list[2];
    assert_eq!( ac.source, SourceKind::Mlat);
    assert!( !ac.has_registration());
    assert_eq!( ac.callsign, None);
    assert_eq!( ac.mach, Some(0.78));
}

#[test]
fn test_parse_feed_edge_cases() {
    assert!( parse_feed_response( br#"{"msg":"No error","now":1}"#).unwrap().is_empty());
    assert!( parse_feed_response( br#"{"aircraft":[]}"#).unwrap().is_empty());
    assert!( parse_feed_response( b"<html>bad gateway</html>").is_err());
}

#[test]
fn test_source_kind() {
    assert_eq!( SourceKind::from_type("adsb_icao_nt"), SourceKind::Adsb);
    assert_eq!( SourceKind::from_type("adsr_icao"), SourceKind::Adsr);
    assert_eq!( SourceKind::from_type("mode_s"), SourceKind::ModeS);
    assert_eq!( SourceKind::from_type("adsc"), SourceKind::Adsc);
    assert_eq!( SourceKind::from_type("whatever"), SourceKind::Unknown);
    assert!( SourceKind::Adsr.is_relayed());
    assert!( !SourceKind::Mlat.is_relayed());
}

#[test]
fn test_query_url() {
    let feed = HttpPositionFeed::new( reqwest::Client::new(), "https://api.example.org/");
    let query = FeedQuery::new( GeoPoint::from_lat_lon_degrees( 37.61893, -122.375), 24.2);
    assert_eq!( feed.query_url(&query), "https://api.example.org/v2/point/37.6189/-122.3750/25");
}

struct FailingFeed(fn()->SkywatchError);

#[async_trait]
impl PositionFeed for FailingFeed {
    async fn fetch (&self, _query: &FeedQuery)->Result<Vec<AircraftPosition>> { Err( (self.0)()) }
}

#[tokio::test]
async fn test_failed_cycle_is_empty() {
    let query = FeedQuery::new( GeoPoint::from_lat_lon_degrees( 34.0, -118.0), 10.0);

    let feed = FailingFeed( || SkywatchError::NetError( NetError::RateLimited("http://x".into())));
    assert!( poll_once( &feed, &query).await.is_empty());

    let feed = FailingFeed( || SkywatchError::NetError( NetError::StatusError( 503, "http://x".into())));
    assert!( poll_once( &feed, &query).await.is_empty());
}
