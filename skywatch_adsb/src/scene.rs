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

//! a headless [`MarkerLayer`] that keeps marker entities in a generational arena. Used by the binary when there
//! is no map and by tests to verify entity identity across reconciliation cycles

use std::sync::Arc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{markers::{MarkerLayer, MarkerState, SelectionHandler, Viewport}, tracker::RouteLine};

/// index into the arena plus the generation of the slot when the entity was created. A handle of a destroyed
/// entity never resolves, even if its slot got reused
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize)]
pub struct EntityHandle {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
pub struct Entity {
    pub icao24: Arc<str>,
    pub state: MarkerState,
    pub on_select: SelectionHandler,
    pub n_updates: usize,
}

struct Slot {
    generation: u64,
    entity: Option<Entity>,
}

#[derive(Default)]
pub struct SceneLayer {
    slots: Vec<Slot>,
    free: Vec<usize>,
    viewport: Option<Viewport>,
    route: Option<RouteLine>,

    pub n_created: usize,
    pub n_destroyed: usize,
    pub n_updates: usize,
    pub n_viewport_builds: usize,
}

impl SceneLayer {
    pub fn new ()->Self { SceneLayer::default() }

    pub fn entity (&self, handle: &EntityHandle)->Option<&Entity> {
        self.slots.get( handle.index)
            .filter( |slot| slot.generation == handle.generation)
            .and_then( |slot| slot.entity.as_ref())
    }

    pub fn live_count (&self)->usize { self.slots.iter().filter( |s| s.entity.is_some()).count() }

    pub fn viewport (&self)->Option<&Viewport> { self.viewport.as_ref() }
    pub fn route (&self)->Option<&RouteLine> { self.route.as_ref() }

    /// simulate a user click on the entity. Returns false if the handle is stale
    pub fn click (&self, handle: &EntityHandle)->bool {
        match self.entity( handle) {
            Some(e) => { e.on_select.select(); true }
            None => false
        }
    }

    pub fn snapshot_json (&self)->Value {
        let markers: Vec<Value> = self.slots.iter().filter_map( |s| s.entity.as_ref()).map( |e| json!({
            "icao24": e.icao24.as_ref(),
            "position": e.state.position,
            "rotation": e.state.rotation,
            "variant": e.state.variant,
        })).collect();

        json!({
            "markers": markers,
            "viewport": self.viewport,
            "route": self.route.as_ref().map( |r| r.points()),
        })
    }
}

impl MarkerLayer for SceneLayer {
    type Handle = EntityHandle;

    fn create_marker (&mut self, icao24: &Arc<str>, state: &MarkerState, on_select: SelectionHandler)->EntityHandle {
        let entity = Entity { icao24: icao24.clone(), state: state.clone(), on_select, n_updates: 0 };
        self.n_created += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.generation += 1;
            slot.entity = Some(entity);
            EntityHandle { index, generation: slot.generation }
        } else {
            self.slots.push( Slot { generation: 0, entity: Some(entity) });
            EntityHandle { index: self.slots.len() - 1, generation: 0 }
        }
    }

    fn update_marker (&mut self, handle: &EntityHandle, state: &MarkerState) {
        if let Some(slot) = self.slots.get_mut( handle.index) {
            if slot.generation == handle.generation {
                if let Some(e) = slot.entity.as_mut() {
                    e.state = state.clone();
                    e.n_updates += 1;
                    self.n_updates += 1;
                }
            }
        }
    }

    fn destroy_marker (&mut self, handle: EntityHandle) {
        if let Some(slot) = self.slots.get_mut( handle.index) {
            if slot.generation == handle.generation && slot.entity.take().is_some() {
                self.free.push( handle.index);
                self.n_destroyed += 1;
            }
        }
    }

    fn set_viewport (&mut self, viewport: &Viewport) {
        self.viewport = Some( viewport.clone());
        self.n_viewport_builds += 1;
    }

    fn draw_route (&mut self, route: &RouteLine) {
        self.route = Some( route.clone());
    }

    fn clear_route (&mut self) {
        self.route = None;
    }
}
