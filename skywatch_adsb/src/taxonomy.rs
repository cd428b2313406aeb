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

//! aircraft model taxonomy and the model/source filter that is applied to each raw poll result.
//!
//! The taxonomy is a static JSON document that maps manufacturer names to a list of models, each with a set of
//! (case insensitive) regular expressions that are matched against the type code and the free text description
//! of an aircraft:
//! ```json
//! { "Boeing": [ { "model": "Boeing 737", "patterns": ["^B73[0-9]$", "737"], "image": "b737.png" } ] }
//! ```
//! Invalid patterns are logged and skipped, they never make loading or filtering fail

use std::{collections::{BTreeMap,HashSet}, fs, path::Path, sync::Arc};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{config::FilterConfig, errors::Result, AircraftPosition};

#[derive(Deserialize,Debug)]
struct RawModel {
    #[serde(alias="name")]
    model: String,
    #[serde(default)]
    patterns: Vec<String>,
    image: Option<String>,
}

#[derive(Debug)]
pub struct AircraftModel {
    pub manufacturer: Arc<str>,
    pub name: String,
    pub image: Option<String>,
    patterns: Vec<Regex>,
}

impl AircraftModel {
    /// does any of our patterns match the type code or description of `ac`
    pub fn matches (&self, ac: &AircraftPosition)->bool {
        self.patterns.iter().any( |re| {
            ac.type_code.as_deref().is_some_and( |t| re.is_match(t)) ||
            ac.description.as_deref().is_some_and( |d| re.is_match(d))
        })
    }

    pub fn n_patterns (&self)->usize { self.patterns.len() }
}

/// the static, read-only model reference
#[derive(Debug,Default)]
pub struct Taxonomy {
    models: Vec<AircraftModel>, // in manufacturer, document order
    n_invalid: usize,
}

impl Taxonomy {
    pub fn empty ()->Self { Taxonomy::default() }

    pub fn from_json (src: &str)->Result<Self> {
        let raw: BTreeMap<String,Vec<RawModel>> = serde_json::from_str( src)?;
        let mut models = Vec::new();
        let mut n_invalid = 0;

        for (manufacturer, raw_models) in raw {
            let manufacturer: Arc<str> = Arc::from( manufacturer.as_str());

            for raw_model in raw_models {
                let mut patterns = Vec::with_capacity( raw_model.patterns.len());
                for p in &raw_model.patterns {
                    match RegexBuilder::new(p).case_insensitive(true).build() {
                        Ok(re) => patterns.push(re),
                        Err(e) => {
                            n_invalid += 1;
                            warn!(model = %raw_model.model, pattern = %p, "skipping invalid pattern: {e}");
                        }
                    }
                }
                models.push( AircraftModel { manufacturer: manufacturer.clone(), name: raw_model.model, image: raw_model.image, patterns });
            }
        }

        Ok( Taxonomy { models, n_invalid } )
    }

    pub fn from_path<P: AsRef<Path>> (path: P)->Result<Self> {
        let src = fs::read_to_string( path.as_ref())?;
        let taxonomy = Self::from_json( &src)?;
        info!("loaded taxonomy {:?} with {} models", path.as_ref(), taxonomy.models.len());
        Ok(taxonomy)
    }

    pub fn models (&self)->impl Iterator<Item=&AircraftModel> { self.models.iter() }
    pub fn len (&self)->usize { self.models.len() }
    pub fn is_empty (&self)->bool { self.models.is_empty() }
    pub fn n_invalid_patterns (&self)->usize { self.n_invalid }

    pub fn model (&self, name: &str)->Option<&AircraftModel> {
        self.models.iter().find( |m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn manufacturers (&self)->Vec<&str> {
        let mut list: Vec<&str> = Vec::new();
        for m in &self.models {
            if list.last() != Some(&m.manufacturer.as_ref()) { list.push( m.manufacturer.as_ref()) }
        }
        list
    }

    /// first model matching `ac`, `None` if the aircraft belongs to the "other" bucket
    pub fn classify (&self, ac: &AircraftPosition)->Option<&AircraftModel> {
        self.models.iter().find( |m| m.matches(ac))
    }
}

/// the per-cycle filter: relayed source exclusion first, then model selection
pub struct TaxonomyFilter {
    taxonomy: Arc<Taxonomy>,
    selected: HashSet<String>, // lowercase model names
    include_others: bool,
    include_relayed: bool,
}

impl TaxonomyFilter {
    pub fn new (taxonomy: Arc<Taxonomy>, config: &FilterConfig)->Self {
        let mut filter = TaxonomyFilter { taxonomy, selected: HashSet::new(), include_others: false, include_relayed: config.include_relayed };
        filter.set_selection( &config.models, config.include_others);
        filter
    }

    pub fn set_selection (&mut self, models: &[String], include_others: bool) {
        self.selected.clear();
        for name in models {
            if self.taxonomy.model( name).is_none() {
                warn!("selected model '{name}' is not in taxonomy");
            }
            self.selected.insert( name.to_lowercase());
        }
        self.include_others = include_others;
    }

    pub fn set_include_relayed (&mut self, include_relayed: bool) { self.include_relayed = include_relayed; }

    pub fn taxonomy (&self)->&Arc<Taxonomy> { &self.taxonomy }

    /// nothing selected means everything passes
    pub fn is_pass_through (&self)->bool { self.selected.is_empty() && !self.include_others }

    pub fn accepts (&self, ac: &AircraftPosition)->bool {
        if ac.source.is_relayed() && !self.include_relayed {
            return false
        }
        if self.is_pass_through() {
            return true
        }

        let mut is_known = false;
        for model in self.taxonomy.models() {
            if model.matches(ac) {
                if self.selected.contains( &model.name.to_lowercase()) {
                    return true
                }
                is_known = true;
            }
        }
        !is_known && self.include_others
    }

    pub fn filter (&self, raw: Vec<AircraftPosition>)->Vec<AircraftPosition> {
        let n_raw = raw.len();
        let filtered: Vec<AircraftPosition> = raw.into_iter().filter( |ac| self.accepts(ac)).collect();
        debug!("filter passed {} of {} aircraft", filtered.len(), n_raw);
        filtered
    }
}
