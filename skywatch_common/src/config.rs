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

//! RON based configuration loading. Config structs are plain serde types, the lookup is a simple path
//! (there is no embedded resource fallback)

use std::{fs, path::Path};
use serde::de::DeserializeOwned;

use crate::define_error;

define_error!{ pub ConfigError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    RonError(#[from] ron::error::SpannedError) : "config syntax error: {0}",
    NotFound(String) : "config not found: {0}"
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub fn load_config<C,P> (path: P)->Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( ConfigError::NotFound( path.display().to_string()))
    }
    let data = fs::read(path)?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

pub fn load_config_str<C> (src: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::de::from_str( src)? )
}
