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

use std::{collections::HashSet, sync::Arc};
use tracing::debug;

use crate::AircraftPosition;

/// identifiers of the previous cycle's filtered list. This is rebuilt wholesale each cycle, never diffed
#[derive(Debug,Default,Clone,PartialEq)]
pub struct SeenSet(HashSet<Arc<str>>);

impl SeenSet {
    pub fn from_aircraft (aircraft: &[AircraftPosition])->Self {
        SeenSet( aircraft.iter().map( |ac| ac.icao24.clone()).collect())
    }

    pub fn contains (&self, icao24: &str)->bool { self.0.contains(icao24) }
    pub fn len (&self)->usize { self.0.len() }
    pub fn is_empty (&self)->bool { self.0.is_empty() }
    pub fn iter (&self)->impl Iterator<Item=&Arc<str>> { self.0.iter() }
}

/// new aircraft of one cycle, in feed order
#[derive(Debug,Default)]
pub struct Arrivals {
    pub aircraft: Vec<AircraftPosition>,
}

impl Arrivals {
    /// the one arrival per cycle we resolve details for. This bounds resolver load to one resolution per tick
    pub fn spotlight (&self)->Option<&AircraftPosition> { self.aircraft.first() }

    pub fn len (&self)->usize { self.aircraft.len() }
    pub fn is_empty (&self)->bool { self.aircraft.is_empty() }
}

#[derive(Debug,Default)]
pub struct NoveltyDetector {
    seen: SeenSet,
}

impl NoveltyDetector {
    pub fn new ()->Self { NoveltyDetector::default() }

    pub fn seen (&self)->&SeenSet { &self.seen }

    /// compute the arrivals of this cycle and replace the seen set with the current identifiers.
    /// Aircraft without registration are never arrivals since we could not resolve anything for them
    pub fn update (&mut self, filtered: &[AircraftPosition])->Arrivals {
        let aircraft: Vec<AircraftPosition> = filtered.iter()
            .filter( |ac| !self.seen.contains( &ac.icao24) && ac.has_registration())
            .cloned()
            .collect();

        self.seen = SeenSet::from_aircraft( filtered);

        if !aircraft.is_empty() {
            debug!("{} arrivals, {} aircraft seen", aircraft.len(), self.seen.len());
        }
        Arrivals { aircraft }
    }
}
