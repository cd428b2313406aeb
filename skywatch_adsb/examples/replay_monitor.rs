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

//! runs the monitor against a scripted feed (no network) and prints its events.
//! Run with `RUST_LOG=debug cargo run --example replay_monitor` to see the pipeline logs

use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use skywatch_common::{datetime::millis, geo::GeoPoint};
use skywatch_adsb::{
    config::{FilterConfig, TrackerConfig}, detail::{DetailResolver, OfflineRegistry},
    errors::Result, feed::{parse_feed_response, FeedQuery, PositionFeed},
    monitor::{spawn_pollers, Monitor, MonitorEvent}, scene::SceneLayer, taxonomy::{Taxonomy, TaxonomyFilter},
    AircraftPosition
};

const CYCLES: [&str;3] = [
    r#"{"ac":[
        {"hex":"a1b2c3","type":"adsb_icao","flight":"UAL100 ","r":"N12345","t":"B738","alt_baro":35000,"gs":450,"track":270,"lat":37.70,"lon":-122.30},
        {"hex":"c0ffee","type":"tisb_icao","r":"N999","t":"C172","lat":37.60,"lon":-122.40}
    ]}"#,
    r#"{"ac":[
        {"hex":"a1b2c3","type":"adsb_icao","flight":"UAL100 ","r":"N12345","t":"B738","alt_baro":35100,"gs":452,"track":271,"lat":37.70,"lon":-122.35},
        {"hex":"3c6589","type":"adsb_icao","r":"D-AIBD","t":"A319","alt_baro":12000,"mach":0.62,"lat":37.65,"lon":-122.20}
    ]}"#,
    r#"{"ac":[
        {"hex":"3c6589","type":"adsb_icao","r":"D-AIBD","t":"A319","alt_baro":11000,"mach":0.60,"lat":37.66,"lon":-122.25}
    ]}"#
];

/// returns the next scripted cycle on each fetch, an empty list once the script is exhausted
struct ScriptedFeed {
    next: Mutex<usize>,
}

#[async_trait]
impl PositionFeed for ScriptedFeed {
    async fn fetch (&self, _query: &FeedQuery)->Result<Vec<AircraftPosition>> {
        let idx = {
            let mut next = self.next.lock().unwrap();
            let idx = *next;
            *next += 1;
            idx
        };
        match CYCLES.get(idx) {
            Some(json) => parse_feed_response( json.as_bytes()),
            None => Ok(Vec::new())
        }
    }
}

#[tokio::main]
async fn main()->anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let taxonomy = Arc::new( Taxonomy::from_path( "skywatch_adsb/resources/taxonomy.json")?);
    let filter = TaxonomyFilter::new( taxonomy.clone(), &FilterConfig::default());
    let registry = OfflineRegistry::from_path( "skywatch_adsb/resources/offline_registry.json")?;
    let resolver = DetailResolver::new( vec![ Box::new(registry)]).with_taxonomy( taxonomy);

    let reference = FeedQuery::new( GeoPoint::from_lat_lon_degrees( 37.6189, -122.3750), 25.0);
    let monitor = Monitor::new( filter, resolver, SceneLayer::new(), reference, TrackerConfig::default());
    let handle = monitor.handle();
    let feed = Arc::new( ScriptedFeed { next: Mutex::new(0) });
    let pollers = spawn_pollers( &monitor, feed, millis(200), millis(200));

    let (tx, mut rx) = mpsc::channel(64);
    let task = tokio::spawn( monitor.run(tx));

    tokio::spawn( async move {
        tokio::time::sleep( millis(1000)).await;
        let _ = handle.terminate().await;
    });

    while let Some(event) = rx.recv().await {
        match event {
            MonitorEvent::Arrival(ac) => println!("arrival: {ac}"),
            MonitorEvent::Detail(detail) => println!("detail:  {detail}"),
            MonitorEvent::Markers(stats) => println!("markers: {stats:?}"),
            MonitorEvent::Track(event) => println!("track:   {event:?}"),
            MonitorEvent::Viewport(vp) => println!("viewport: {} {}nm", vp.center, vp.radius_nm),
        }
    }

    task.await??;
    for poller in pollers { poller.await?; }
    Ok(())
}
