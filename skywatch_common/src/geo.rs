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

//! geometry on the WGS84 surface. We use the [geo](https://docs.rs/geo/latest/geo/index.html) crate for the
//! algorithms and wrap its `Point` in a new type that carries value semantics (normalized geodetic degrees) and
//! uom lengths

use std::fmt;
use serde::{Serialize,Deserialize};
use serde::ser::{Serializer,SerializeStruct};
use geo::{Point, Destination, Distance};
use geo::algorithm::line_measures::metric_spaces::Haversine;
use uom::si::f64::Length;
use uom::si::length::{meter,nautical_mile};

use crate::angle::{normalize_180, normalize_90, Angle360};

/* #region GeoPoint ***********************************************************************************************/

/// a wrapper for geo::Point that uses geodetic degrees stored as f64 (x: longitude, y: latitude)
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( normalize_180(lon), normalize_90(lat)))
    }
    pub fn from_lat_lon_degrees (lat: f64, lon: f64) -> Self {
        Self::from_lon_lat_degrees( lon, lat)
    }

    pub fn lon_degrees (&self)->f64 { self.0.x() }
    pub fn lat_degrees (&self)->f64 { self.0.y() }

    /// great circle distance on the mean earth radius sphere
    pub fn haversine_distance (&self, other: &GeoPoint) -> Length {
        Length::new::<meter>( Haversine.distance( self.0, other.0))
    }

    /// point reached when travelling `dist` along the great circle with initial `bearing`
    pub fn destination (&self, bearing: Angle360, dist: Length) -> GeoPoint {
        let p = Haversine.destination( self.0, bearing.degrees(), dist.get::<meter>());
        GeoPoint::from_lon_lat_degrees( p.x(), p.y())
    }

    /// bounding rectangle of the circle with given radius around self
    pub fn bounds_for_radius (&self, radius: Length) -> GeoRect {
        let north = self.destination( Angle360::from_degrees(0.0), radius);
        let east = self.destination( Angle360::from_degrees(90.0), radius);
        let south = self.destination( Angle360::from_degrees(180.0), radius);
        let west = self.destination( Angle360::from_degrees(270.0), radius);

        GeoRect { west: west.lon_degrees(), south: south.lat_degrees(), east: east.lon_degrees(), north: north.lat_degrees() }
    }

    /// polygon approximation of the circle with given radius around self
    pub fn circle (&self, radius: Length, n_points: usize) -> Vec<GeoPoint> {
        let n = n_points.max(3);
        let step = 360.0 / n as f64;
        (0..n).map( |i| self.destination( Angle360::from_degrees( i as f64 * step), radius)).collect()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5}]", self.0.x(),self.0.y())
    }
}

impl Serialize for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoPoint", 2)?;
        state.serialize_field("lon", &self.lon_degrees())?;
        state.serialize_field("lat", &self.lat_degrees())?;
        state.end()
    }
}

// we support alternative input formats for our virtual fields: "lon", "longitude" or "x" for longitude degrees
// and "lat", "latitude" or "y" for latitude degrees
#[derive(Deserialize)]
struct LonLat {
    #[serde(alias="longitude", alias="x")] lon: f64,
    #[serde(alias="latitude", alias="y")] lat: f64,
}

impl From<LonLat> for GeoPoint {
    fn from (ll: LonLat)->Self { GeoPoint::from_lon_lat_degrees( ll.lon, ll.lat) }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
        LonLat::deserialize(deserializer).map( GeoPoint::from)
    }
}

/* #endregion GeoPoint */

/* #region GeoRect ************************************************************************************************/

/// simple west/south/east/north degree rectangle (no anti-meridian handling)
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoRect {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64
}

impl GeoRect {
    pub fn contains (&self, p: &GeoPoint)->bool {
        let lon = p.lon_degrees();
        let lat = p.lat_degrees();
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

/* #endregion GeoRect */

#[inline]
pub fn nautical_miles (nm: f64)->Length { Length::new::<nautical_mile>(nm) }
