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

//! the monitor owns all mutable state of the client (seen set, markers, tracker, detail cache) and processes
//! [`MonitorMsg`] messages one at a time, which makes state mutation sequential without any locks.
//!
//! Pollers run as separate tasks and send their results as messages. Detail enrichment runs in spawned tasks
//! that report back with a [`MonitorMsg::DetailResolved`] message, i.e. late results are applied when they
//! arrive (last write wins). Within a position cycle filtering happens before novelty detection, which happens
//! before resolver dispatch

use std::{collections::{HashMap, HashSet}, sync::Arc, time::Duration};
use tokio::{sync::{mpsc, watch}, task::JoinHandle};
use tracing::{debug, info, warn};
use skywatch_common::geo::GeoPoint;

use crate::{
    config::TrackerConfig, detail::{AircraftDetail, DetailQuery, DetailResolver},
    errors::{Result, SkywatchError}, feed::{spawn_poller, FeedQuery, PositionFeed},
    markers::{MarkerLayer, MarkerReconciler, ReconcileStats, SelectCallback, Viewport},
    novelty::{Arrivals, NoveltyDetector}, taxonomy::TaxonomyFilter,
    tracker::{ReacquisitionTracker, TrackEvent}, AircraftPosition
};

pub const MONITOR_QUEUE_LEN: usize = 64;

#[derive(Debug)]
pub enum MonitorMsg {
    PositionUpdate(Vec<AircraftPosition>),
    TrackUpdate(Vec<AircraftPosition>),
    DetailResolved(AircraftDetail),
    Select(Arc<str>),
    Deselect,
    SetReference { center: GeoPoint, radius_nm: f64 },
    SetSelection { models: Vec<String>, include_others: bool },
    Terminate
}

/// what observers (UI, alerting, logging) get to see
#[derive(Debug,Clone)]
pub enum MonitorEvent {
    Arrival(AircraftPosition),
    Detail(AircraftDetail),
    Markers(ReconcileStats),
    Track(TrackEvent),
    Viewport(Viewport),
}

/// a detail resolution that has to run outside of the monitor
#[derive(Debug)]
pub struct Enrichment {
    pub query: DetailQuery,
    pub provisional: AircraftDetail,
}

/// the outcome of processing a single message
#[derive(Debug,Default)]
pub struct Reaction {
    pub events: Vec<MonitorEvent>,
    pub enrichment: Option<Enrichment>,
    pub terminate: bool,
}

/// the cloneable send side of the monitor
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<MonitorMsg>,
}

impl MonitorHandle {
    pub async fn send (&self, msg: MonitorMsg)->Result<()> {
        self.tx.send( msg).await.map_err( |_| SkywatchError::Terminated)
    }

    pub async fn select (&self, icao24: &str)->Result<()> {
        self.send( MonitorMsg::Select( Arc::from( icao24.trim().to_ascii_lowercase().as_str()))).await
    }

    pub async fn deselect (&self)->Result<()> { self.send( MonitorMsg::Deselect).await }

    pub async fn set_reference (&self, center: GeoPoint, radius_nm: f64)->Result<()> {
        self.send( MonitorMsg::SetReference { center, radius_nm }).await
    }

    pub async fn set_selection (&self, models: Vec<String>, include_others: bool)->Result<()> {
        self.send( MonitorMsg::SetSelection { models, include_others }).await
    }

    pub async fn terminate (&self)->Result<()> { self.send( MonitorMsg::Terminate).await }

    pub fn is_closed (&self)->bool { self.tx.is_closed() }
}

pub struct Monitor<L: MarkerLayer> {
    filter: TaxonomyFilter,
    novelty: NoveltyDetector,
    reconciler: MarkerReconciler<L>,
    resolver: Arc<DetailResolver>,
    tracker_config: TrackerConfig,
    tracker: Option<ReacquisitionTracker>,
    selected: Option<Arc<str>>,
    reference: FeedQuery,

    last_filtered: Vec<AircraftPosition>,
    details: HashMap<Arc<str>,AircraftDetail>,

    position_query: watch::Sender<Option<FeedQuery>>,
    track_query: watch::Sender<Option<FeedQuery>>,
    tx: mpsc::Sender<MonitorMsg>,
    rx: mpsc::Receiver<MonitorMsg>,
}

impl<L: MarkerLayer> Monitor<L> {
    pub fn new (filter: TaxonomyFilter, resolver: DetailResolver, layer: L, reference: FeedQuery, tracker_config: TrackerConfig)->Self {
        let (tx, rx) = mpsc::channel( MONITOR_QUEUE_LEN);

        // marker clicks come from the layer, which can't await
        let select_tx = tx.clone();
        let on_select: SelectCallback = Arc::new( move |icao24: Arc<str>| {
            if let Err(e) = select_tx.try_send( MonitorMsg::Select( icao24)) {
                warn!("dropped marker selection: {e}");
            }
        });

        let mut reconciler = MarkerReconciler::new( layer, on_select);
        reconciler.set_reference( reference.center, reference.radius_nm);

        let (position_query, _) = watch::channel( Some(reference));
        let (track_query, _) = watch::channel( None);

        Monitor {
            filter,
            novelty: NoveltyDetector::new(),
            reconciler,
            resolver: Arc::new(resolver),
            tracker_config,
            tracker: None,
            selected: None,
            reference,
            last_filtered: Vec::new(),
            details: HashMap::new(),
            position_query,
            track_query,
            tx,
            rx
        }
    }

    pub fn handle (&self)->MonitorHandle { MonitorHandle { tx: self.tx.clone() } }

    pub fn position_queries (&self)->watch::Receiver<Option<FeedQuery>> { self.position_query.subscribe() }
    pub fn track_queries (&self)->watch::Receiver<Option<FeedQuery>> { self.track_query.subscribe() }

    pub fn reference (&self)->&FeedQuery { &self.reference }
    pub fn selected (&self)->Option<&Arc<str>> { self.selected.as_ref() }
    pub fn tracker (&self)->Option<&ReacquisitionTracker> { self.tracker.as_ref() }
    pub fn novelty (&self)->&NoveltyDetector { &self.novelty }
    pub fn reconciler (&self)->&MarkerReconciler<L> { &self.reconciler }
    pub fn detail (&self, icao24: &str)->Option<&AircraftDetail> { self.details.get( icao24) }
    pub fn n_details (&self)->usize { self.details.len() }
    pub fn last_filtered (&self)->&[AircraftPosition] { &self.last_filtered }

    /// process a single message. This never blocks, anything that requires network access is returned
    /// as [`Enrichment`] that has to be run by the caller
    pub fn process (&mut self, msg: MonitorMsg)->Reaction {
        match msg {
            MonitorMsg::PositionUpdate(raw) => self.process_positions( raw),
            MonitorMsg::TrackUpdate(list) => self.process_track( &list),
            MonitorMsg::DetailResolved(detail) => self.process_detail( detail),
            MonitorMsg::Select(icao24) => self.select( icao24),
            MonitorMsg::Deselect => self.deselect(),
            MonitorMsg::SetReference { center, radius_nm } => self.set_reference( center, radius_nm),
            MonitorMsg::SetSelection { models, include_others } => {
                info!("model selection: {:?} (others: {})", models, include_others);
                self.filter.set_selection( &models, include_others);
                Reaction::default()
            }
            MonitorMsg::Terminate => Reaction { terminate: true, ..Reaction::default() }
        }
    }

    /// one position feed cycle: filter, detect arrivals, provisionally resolve the spotlighted arrival and
    /// reconcile markers
    pub fn process_positions (&mut self, raw: Vec<AircraftPosition>)->Reaction {
        let mut reaction = Reaction::default();

        let filtered = self.filter.filter( raw);
        let arrivals = self.novelty.update( &filtered);

        for ac in &arrivals.aircraft {
            info!("arrival: {}", ac);
            reaction.events.push( MonitorEvent::Arrival( ac.clone()));
        }

        if let Some(ac) = arrivals.spotlight() {
            let enrichment = self.provisional_detail( ac);
            reaction.events.push( MonitorEvent::Detail( enrichment.provisional.clone()));
            reaction.enrichment = Some(enrichment);
        }

        let selected = self.selected.clone();
        let stats = self.reconciler.reconcile( &filtered, selected.as_deref());
        reaction.events.push( MonitorEvent::Markers(stats));

        self.last_filtered = filtered;
        self.prune_details();
        reaction
    }

    /// details are only kept for aircraft of the current cycle and the tracked target
    fn prune_details (&mut self) {
        let present: HashSet<&str> = self.last_filtered.iter().map( |ac| &*ac.icao24).collect();
        let selected = self.selected.as_deref();
        self.details.retain( |id, _| present.contains( &**id) || selected == Some( &**id));
    }

    fn is_relevant (&self, icao24: &str)->bool {
        self.selected.as_deref() == Some(icao24) || self.last_filtered.iter().any( |ac| &*ac.icao24 == icao24)
    }

    fn provisional_detail (&mut self, ac: &AircraftPosition)->Enrichment {
        let query = DetailQuery::from_position( ac);
        let provisional = self.resolver.provisional( &query);
        self.details.insert( ac.icao24.clone(), provisional.clone());
        Enrichment { query, provisional }
    }

    fn process_track (&mut self, list: &[AircraftPosition])->Reaction {
        let mut reaction = Reaction::default();

        if let Some(tracker) = self.tracker.as_mut() {
            let event = tracker.observe( list);

            if let TrackEvent::Updated(_) | TrackEvent::Reacquired(_) = &event {
                if let Some(ac) = list.iter().find( |ac| ac.icao24 == *tracker.target()) {
                    if let Some(detail) = self.details.get_mut( &ac.icao24) {
                        detail.update_telemetry( ac);
                        reaction.events.push( MonitorEvent::Detail( detail.clone()));
                    }
                }
                if tracker.route().has_endpoints() {
                    self.reconciler.layer_mut().draw_route( tracker.route());
                }
            }

            self.track_query.send_replace( Some( tracker.query()));
            reaction.events.push( MonitorEvent::Track(event));
        }

        reaction
    }

    fn process_detail (&mut self, detail: AircraftDetail)->Reaction {
        if !self.is_relevant( &detail.icao24) {
            debug!(icao24 = %detail.icao24, "dropping detail of aircraft that is no longer present");
            return Reaction::default()
        }
        debug!("detail update: {}", detail);

        if let Some(tracker) = self.tracker.as_mut() {
            if *tracker.target() == detail.icao24 {
                if let Some(route) = &detail.route {
                    tracker.set_route_endpoints( route.origin.position, route.destination.position);
                    if tracker.route().has_endpoints() {
                        self.reconciler.layer_mut().draw_route( tracker.route());
                    }
                }
            }
        }

        self.details.insert( detail.icao24.clone(), detail.clone());
        Reaction { events: vec![ MonitorEvent::Detail(detail)], ..Reaction::default() }
    }

    fn select (&mut self, icao24: Arc<str>)->Reaction {
        let mut reaction = Reaction::default();

        let anchor = self.last_filtered.iter().find( |ac| ac.icao24 == icao24).map( |ac| ac.position)
            .or_else( || self.details.get( &icao24).and_then( |d| d.position));
        let Some(anchor) = anchor else {
            warn!(%icao24, "cannot select aircraft without known position");
            return reaction
        };

        self.reconciler.layer_mut().clear_route();
        let mut tracker = ReacquisitionTracker::new( icao24.clone(), anchor, self.tracker_config.radius_nm, self.tracker_config.max_misses);

        match self.details.get( &icao24) {
            Some(detail) => {
                if let Some(route) = &detail.route {
                    tracker.set_route_endpoints( route.origin.position, route.destination.position);
                }
                reaction.events.push( MonitorEvent::Detail( detail.clone()));
            }
            None => {
                // not an arrival we already resolved
                if let Some(ac) = self.last_filtered.iter().find( |ac| ac.icao24 == icao24).cloned() {
                    let enrichment = self.provisional_detail( &ac);
                    reaction.events.push( MonitorEvent::Detail( enrichment.provisional.clone()));
                    reaction.enrichment = Some(enrichment);
                }
            }
        }

        if tracker.route().has_endpoints() {
            self.reconciler.layer_mut().draw_route( tracker.route());
        }
        self.track_query.send_replace( Some( tracker.query()));
        self.tracker = Some(tracker);
        self.selected = Some(icao24);

        let selected = self.selected.clone();
        let stats = self.reconciler.reconcile( &self.last_filtered, selected.as_deref());
        reaction.events.push( MonitorEvent::Markers(stats));
        reaction
    }

    fn deselect (&mut self)->Reaction {
        if let Some(icao24) = self.selected.take() {
            info!("stop tracking {}", icao24);
        }
        self.tracker = None;
        self.track_query.send_replace( None);
        self.reconciler.layer_mut().clear_route();

        let stats = self.reconciler.reconcile( &self.last_filtered, None);
        Reaction { events: vec![ MonitorEvent::Markers(stats)], ..Reaction::default() }
    }

    fn set_reference (&mut self, center: GeoPoint, radius_nm: f64)->Reaction {
        let mut reaction = Reaction::default();

        self.reference = FeedQuery::new( center, radius_nm);
        self.position_query.send_replace( Some(self.reference));

        if let Some(viewport) = self.reconciler.set_reference( center, radius_nm) {
            info!("new reference {} with radius {}nm", center, radius_nm);
            reaction.events.push( MonitorEvent::Viewport( viewport.clone()));
        }
        reaction
    }

    /// the message loop. Runs until it receives a `Terminate` message
    pub async fn run (mut self, events: mpsc::Sender<MonitorEvent>)->Result<()> where L: Send + 'static, L::Handle: Send {
        if let Some(viewport) = self.reconciler.viewport() {
            let _ = events.send( MonitorEvent::Viewport( viewport.clone())).await;
        }

        while let Some(msg) = self.rx.recv().await {
            let reaction = self.process( msg);

            if let Some(Enrichment { query, provisional }) = reaction.enrichment {
                let resolver = self.resolver.clone();
                let tx = self.tx.clone();
                tokio::spawn( async move {
                    let detail = resolver.enrich( &query, provisional).await;
                    if tx.send( MonitorMsg::DetailResolved(detail)).await.is_err() {
                        debug!(icao24 = %query.icao24, "monitor gone before detail was resolved");
                    }
                });
            }

            for event in reaction.events {
                if events.send( event).await.is_err() {
                    debug!("event receiver closed");
                }
            }

            if reaction.terminate {
                break
            }
        }

        self.position_query.send_replace( None);
        self.track_query.send_replace( None);
        info!("monitor terminated");
        Ok(())
    }
}

/// start the position and track pollers for `monitor`. They terminate after the monitor does
pub fn spawn_pollers<L: MarkerLayer> (
    monitor: &Monitor<L>,
    feed: Arc<dyn PositionFeed>,
    poll_interval: Duration,
    track_interval: Duration
)->Vec<JoinHandle<()>> {
    vec![
        spawn_poller( "position", feed.clone(), monitor.position_queries(), poll_interval, monitor.tx.clone(), MonitorMsg::PositionUpdate),
        spawn_poller( "track", feed, monitor.track_queries(), track_interval, monitor.tx.clone(), MonitorMsg::TrackUpdate),
    ]
}
