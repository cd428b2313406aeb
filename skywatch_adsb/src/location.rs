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

use std::env;
use tracing::{info, warn};
use skywatch_common::geo::GeoPoint;

use crate::errors::{Result, SkywatchError};

pub const LAT_VAR: &str = "SKYWATCH_LAT";
pub const LON_VAR: &str = "SKYWATCH_LON";

/// source of the observer location we use as query reference
pub trait LocationProvider {
    fn current_location (&self)->Result<GeoPoint>;
}

pub struct FixedLocation(pub GeoPoint);

impl LocationProvider for FixedLocation {
    fn current_location (&self)->Result<GeoPoint> { Ok(self.0) }
}

/// location from the `SKYWATCH_LAT` / `SKYWATCH_LON` environment variables
pub struct EnvLocation;

impl EnvLocation {
    fn degrees (var: &str, max: f64)->Result<f64> {
        let s = env::var(var).map_err( |_| SkywatchError::LocationUnavailable( format!("{var} not set")))?;
        let deg: f64 = s.trim().parse().map_err( |_| SkywatchError::LocationUnavailable( format!("invalid {var} value '{s}'")))?;
        if deg.is_finite() && deg.abs() <= max {
            Ok(deg)
        } else {
            Err( SkywatchError::LocationUnavailable( format!("{var} out of range: {deg}")))
        }
    }
}

impl LocationProvider for EnvLocation {
    fn current_location (&self)->Result<GeoPoint> {
        let lat = Self::degrees( LAT_VAR, 90.0)?;
        let lon = Self::degrees( LON_VAR, 180.0)?;
        Ok( GeoPoint::from_lat_lon_degrees( lat, lon))
    }
}

/// the reference location, falling back to `default` if the provider can't tell us. This never fails
pub fn reference_location (provider: &dyn LocationProvider, default: GeoPoint)->GeoPoint {
    match provider.current_location() {
        Ok(pos) => {
            info!("using current location {}", pos);
            pos
        }
        Err(e) => {
            warn!("{}, falling back to default location {}", e, default);
            default
        }
    }
}
