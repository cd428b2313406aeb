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

use std::{path::PathBuf, sync::Arc};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use skywatch_common::{check_cli, define_cli, net::build_client};
use skywatch_adsb::{
    config::SkywatchConfig, detail::DetailResolver, feed::{FeedQuery, HttpPositionFeed, PositionFeed},
    location::{reference_location, EnvLocation, FixedLocation, LocationProvider},
    monitor::{spawn_pollers, Monitor, MonitorEvent}, scene::SceneLayer, taxonomy::{Taxonomy, TaxonomyFilter},
};
use skywatch_common::geo::GeoPoint;

define_cli! { ARGS [about="live aircraft surveillance client"] =
    config: Option<PathBuf>  [help="pathname of RON config file", long, short],
    lat: Option<f64>         [help="latitude of reference point (degrees)", long, allow_negative_numbers=true],
    lon: Option<f64>         [help="longitude of reference point (degrees)", long, allow_negative_numbers=true],
    radius: Option<f64>      [help="query radius in nautical miles", long],
    model: Vec<String>       [help="aircraft model to show (can be repeated)", long],
    others: bool             [help="include aircraft that do not match any known model", long],
    relayed: bool            [help="include aircraft reported through relayed sources (ADS-R, TIS-B)", long]
}

#[tokio::main]
async fn main()->Result<()> {
    check_cli!(ARGS);
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let mut config = match &ARGS.config {
        Some(path) => SkywatchConfig::load( path)?,
        None => SkywatchConfig::default()
    };
    if !ARGS.model.is_empty() { config.filter.models = ARGS.model.clone(); }
    if ARGS.others { config.filter.include_others = true; }
    if ARGS.relayed { config.filter.include_relayed = true; }
    if let Some(radius) = ARGS.radius { config.reference.radius_nm = radius; }

    let location: Box<dyn LocationProvider> = match (ARGS.lat, ARGS.lon) {
        (Some(lat), Some(lon)) => Box::new( FixedLocation( GeoPoint::from_lat_lon_degrees( lat, lon))),
        _ => Box::new( EnvLocation)
    };
    let center = reference_location( location.as_ref(), config.reference.default_location);

    let taxonomy = match &config.taxonomy {
        Some(path) => Taxonomy::from_path( path)?,
        None => {
            warn!("no taxonomy configured, model selection disabled");
            Taxonomy::empty()
        }
    };
    let filter = TaxonomyFilter::new( Arc::new(taxonomy), &config.filter);

    let client = build_client( config.feed.request_timeout, config.providers.user_agent.as_deref())?;
    let resolver = DetailResolver::from_config( &config.providers, &client)?.with_taxonomy( filter.taxonomy().clone());
    let feed: Arc<dyn PositionFeed> = Arc::new( HttpPositionFeed::new( client.clone(), &config.feed.base_url));

    let reference = FeedQuery::new( center, config.reference.radius_nm);
    let monitor = Monitor::new( filter, resolver, SceneLayer::new(), reference, config.tracker.clone());
    let handle = monitor.handle();
    let pollers = spawn_pollers( &monitor, feed, config.feed.poll_interval, config.tracker.poll_interval);

    let (event_tx, mut event_rx) = mpsc::channel( 64);
    let monitor_task = tokio::spawn( monitor.run( event_tx));

    let terminator = handle.clone();
    tokio::spawn( async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, terminating");
            let _ = terminator.terminate().await;
        }
    });

    while let Some(event) = event_rx.recv().await {
        match event {
            MonitorEvent::Arrival(ac) => println!("new: {ac}"),
            MonitorEvent::Detail(detail) => println!("{detail}"),
            MonitorEvent::Track(event) => println!("track: {event:?}"),
            MonitorEvent::Viewport(vp) => println!("viewport: {} ({} nm)", vp.center, vp.radius_nm),
            MonitorEvent::Markers(_) => {}
        }
    }

    monitor_task.await??;
    for poller in pollers { poller.await?; }
    Ok(())
}
