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

//! domain independent support for the skywatch crates: geodetic points and angles, time stamps,
//! status checked HTTP/JSON retrieval and RON config loading

pub mod macros;
pub mod angle;
pub mod geo;
pub mod datetime;
pub mod net;
pub mod config;

/// turn empty or whitespace-only strings into `None`, trim everything else
pub fn non_empty (s: Option<String>)->Option<String> {
    s.and_then( |s| {
        let t = s.trim();
        if t.is_empty() { None } else if t.len() == s.len() { Some(s) } else { Some(t.to_string()) }
    })
}

/// the first value of `opts` that is a non-empty string
pub fn first_non_empty<'a> (opts: &[Option<&'a str>])->Option<&'a str> {
    opts.iter().flatten().map(|s| s.trim()).find(|s| !s.is_empty())
}
