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

//! the position feed poller. Queries aircraft within a radius around a reference point on a fixed timer.
//! A failed cycle (transport error, rate limit, malformed payload) is reported as an empty list and not retried
//! since the next tick supersedes it

use std::{sync::Arc, time::Duration};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::{sync::{mpsc, watch}, task::JoinHandle, time::{interval, MissedTickBehavior}};
use tracing::{debug, warn};
use uom::si::{f64::Velocity, velocity::knot};
use skywatch_common::{geo::GeoPoint, net::{self, NetError}, non_empty};

use crate::{errors::{Result, SkywatchError}, Altitude, AircraftPosition, HeadingSources, SourceKind};

/// what to query: everything within `radius_nm` around `center`
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct FeedQuery {
    pub center: GeoPoint,
    pub radius_nm: f64,
}

impl FeedQuery {
    pub fn new (center: GeoPoint, radius_nm: f64)->Self { FeedQuery { center, radius_nm } }
}

#[async_trait]
pub trait PositionFeed: Send + Sync {
    async fn fetch (&self, query: &FeedQuery)->Result<Vec<AircraftPosition>>;
}

/* #region http feed ***************************************************************************************/

/// feed for readsb-v2 compatible REST APIs (`/v2/point/{lat}/{lon}/{radius}`)
pub struct HttpPositionFeed {
    client: Client,
    base_url: String,
}

impl HttpPositionFeed {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        HttpPositionFeed { client, base_url }
    }

    pub fn query_url (&self, query: &FeedQuery)->String {
        format!("{}/v2/point/{:.4}/{:.4}/{}", self.base_url,
            query.center.lat_degrees(), query.center.lon_degrees(), query.radius_nm.ceil().max(1.0) as u32)
    }
}

#[async_trait]
impl PositionFeed for HttpPositionFeed {
    async fn fetch (&self, query: &FeedQuery)->Result<Vec<AircraftPosition>> {
        let url = self.query_url( query);
        let response = net::get_checked( &self.client, &url).await?;
        let bytes = response.bytes().await.map_err( NetError::from)?;
        parse_feed_response( &bytes)
    }
}

/* #endregion http feed */

/* #region payload ******************************************************************************************/

#[derive(Deserialize,Debug)]
struct FeedResponse {
    #[serde(alias="aircraft")]
    ac: Option<Vec<FeedAircraft>>,
}

#[derive(Deserialize,Debug)]
#[serde(untagged)]
enum RawAltitude {
    Feet(f64),
    Text(String)
}

#[derive(Deserialize,Debug)]
struct FeedAircraft {
    hex: Option<String>,
    #[serde(rename="type")]
    source: Option<String>,
    flight: Option<String>,
    r: Option<String>,
    t: Option<String>,
    desc: Option<String>,
    alt_baro: Option<RawAltitude>,
    gs: Option<f64>,
    mach: Option<f64>,
    track: Option<f64>,
    calc_track: Option<f64>,
    true_heading: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl FeedAircraft {
    /// entries without identifier or position are useless for us
    fn into_position (self)->Option<AircraftPosition> {
        let hex = non_empty(self.hex)?;
        let (lat,lon) = (self.lat?, self.lon?);

        let mut ac = AircraftPosition::new( &hex, GeoPoint::from_lat_lon_degrees( lat, lon));
        ac.source = self.source.as_deref().map( SourceKind::from_type).unwrap_or(SourceKind::Unknown);
        ac.registration = non_empty(self.r);
        ac.type_code = non_empty(self.t);
        ac.description = non_empty(self.desc);
        ac.callsign = non_empty(self.flight);
        ac.altitude = match self.alt_baro {
            Some(RawAltitude::Feet(ft)) => Some(Altitude::Feet(ft)),
            Some(RawAltitude::Text(s)) if s.eq_ignore_ascii_case("ground") => Some(Altitude::OnGround),
            _ => None
        };
        ac.ground_speed = self.gs.map( |gs| Velocity::new::<knot>(gs));
        ac.mach = self.mach;
        ac.heading = HeadingSources { primary: self.track, calculated: self.calc_track, derived: self.true_heading };
        Some(ac)
    }
}

/// parse a feed payload. A body without aircraft list is a valid empty cycle, a body that is not JSON is an error
pub fn parse_feed_response (bytes: &[u8])->Result<Vec<AircraftPosition>> {
    let response: FeedResponse = serde_json::from_slice( bytes)?;
    let list = response.ac.unwrap_or_default();
    let n_raw = list.len();

    let aircraft: Vec<AircraftPosition> = list.into_iter().filter_map( FeedAircraft::into_position).collect();
    if aircraft.len() < n_raw {
        debug!("dropped {} feed entries without identifier or position", n_raw - aircraft.len());
    }
    Ok(aircraft)
}

/* #endregion payload */

/* #region poller ******************************************************************************************/

/// run one poll cycle. This never fails - errors are logged and turned into an empty list
pub async fn poll_once (feed: &dyn PositionFeed, query: &FeedQuery)->Vec<AircraftPosition> {
    match feed.fetch( query).await {
        Ok(list) => {
            debug!("polled {} aircraft around {} ({} nm)", list.len(), query.center, query.radius_nm);
            list
        }
        Err(SkywatchError::NetError(NetError::RateLimited(url))) => {
            warn!(%url, center = %query.center, "feed rate limited, skipping cycle");
            Vec::new()
        }
        Err(e) => {
            warn!(center = %query.center, radius_nm = query.radius_nm, "feed poll failed, skipping cycle: {e}");
            Vec::new()
        }
    }
}

/// spawn a timer driven poll loop. The query is read from `query_rx` at each tick (`None` pauses polling),
/// results are wrapped into `M` and sent to `tx`. Since fetching happens within the loop a cycle can never
/// overlap with its predecessor. The loop ends when the receiver of `tx` is dropped
pub fn spawn_poller<M> (
    name: &'static str,
    feed: Arc<dyn PositionFeed>,
    mut query_rx: watch::Receiver<Option<FeedQuery>>,
    poll_interval: Duration,
    tx: mpsc::Sender<M>,
    wrap: fn(Vec<AircraftPosition>)->M
)->JoinHandle<()> where M: Send + 'static {
    tokio::spawn( async move {
        let mut ticker = interval( poll_interval);
        ticker.set_missed_tick_behavior( MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if tx.is_closed() { break }

            let query = *query_rx.borrow_and_update();
            if let Some(query) = query {
                let list = poll_once( feed.as_ref(), &query).await;
                if tx.send( wrap(list)).await.is_err() { break }
            }
        }
        debug!("poller '{name}' terminated");
    })
}

/* #endregion poller */
