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

use std::{path::PathBuf, time::Duration};
use serde::{Serialize,Deserialize};
use skywatch_common::{datetime::{millis,secs}, geo::GeoPoint};

use crate::errors::Result;

/// top level configuration, normally loaded from a RON file with [`skywatch_common::config::load_config`].
/// All sections have defaults so that config files only need to contain what differs
#[derive(Deserialize,Serialize,Debug,Clone,Default)]
#[serde(default)]
pub struct SkywatchConfig {
    pub feed: FeedConfig,
    pub reference: ReferenceConfig,
    pub filter: FilterConfig,
    pub providers: ProviderConfig,
    pub tracker: TrackerConfig,
    pub taxonomy: Option<PathBuf>, // JSON taxonomy document
}

impl SkywatchConfig {
    pub fn load (path: &std::path::Path)->Result<Self> {
        Ok( skywatch_common::config::load_config( path)? )
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,                   // readsb-v2 compatible API root
    pub poll_interval: Duration,            // live view refresh
    pub request_timeout: Option<Duration>,  // None: transport default
}

impl Default for FeedConfig {
    fn default()->Self {
        FeedConfig {
            base_url: "https://api.adsb.lol".to_string(),
            poll_interval: millis(2500),
            request_timeout: Some( secs(10)),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct ReferenceConfig {
    pub default_location: GeoPoint, // used if we can't get the current location
    pub radius_nm: f64,
}

impl Default for ReferenceConfig {
    fn default()->Self {
        ReferenceConfig {
            default_location: GeoPoint::from_lat_lon_degrees( 37.6189, -122.3750),
            radius_nm: 25.0
        }
    }
}

/// model selection. An empty `models` list without `include_others` means no filtering
#[derive(Deserialize,Serialize,Debug,Clone,Default,PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub models: Vec<String>,
    pub include_others: bool,
    pub include_relayed: bool,
}

/// detail providers, tried in this order. Unconfigured providers are skipped
#[derive(Deserialize,Serialize,Debug,Clone,Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub aggregator_url: Option<String>,
    pub proxy_url: Option<String>,
    pub registry_url: Option<String>,
    pub offline_registry: Option<PathBuf>,
    pub geocoder_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct TrackerConfig {
    pub radius_nm: f64,
    pub poll_interval: Duration,
    pub max_misses: Option<usize>, // None: never give up on a target
}

impl Default for TrackerConfig {
    fn default()->Self {
        TrackerConfig {
            radius_nm: 10.0,
            poll_interval: millis(2500),
            max_misses: Some(12)
        }
    }
}
