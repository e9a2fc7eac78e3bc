// NetPlan: Multilayer Network Planning Model
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Persistence
//!
//! A plan is stored as JSON. Only the canonical state is written: all elements with their
//! identifiers, their order (which defines the indices), the identifier counter and the forwarding
//! rules. All caches are recomputed when a plan is loaded, and the loaded plan is checked for
//! consistency before it is returned.

use super::cache::Caches;
use super::config::NetPlanConfig;
use super::network::NetPlan;
use crate::Error;

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Serialize a `BTreeMap` with composite keys as a sequence of `(key, value)` pairs, since JSON
/// objects only allow string keys.
pub(crate) mod map_as_pairs {
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::Serializer;
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: serde::Serialize,
        V: serde::Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Ok(Vec::<(K, V)>::deserialize(deserializer)?.into_iter().collect())
    }
}

impl NetPlan {
    /// Serialize the plan into a JSON string.
    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a plan from a JSON string, and attach the given configuration. The caches are
    /// rebuilt and checked.
    pub fn from_json_str(s: &str, config: NetPlanConfig) -> Result<Self, Error> {
        let np: NetPlan = serde_json::from_str(s)?;
        Self::finish_loading(np, config)
    }

    /// Write the plan as JSON to the writer.
    pub fn save_to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a plan from the reader.
    pub fn load_from_reader<R: Read>(reader: R, config: NetPlanConfig) -> Result<Self, Error> {
        let np: NetPlan = serde_json::from_reader(reader)?;
        Self::finish_loading(np, config)
    }

    /// Store the plan in a file, replacing its content.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.save_to_writer(&mut writer)?;
        writer.flush()?;
        info!("Plan stored in {}", path.as_ref().display());
        Ok(())
    }

    /// Load a plan from a file.
    pub fn load_from_file(path: impl AsRef<Path>, config: NetPlanConfig) -> Result<Self, Error> {
        let np = Self::load_from_reader(BufReader::new(File::open(path.as_ref())?), config)?;
        info!("Plan loaded from {}", path.as_ref().display());
        Ok(np)
    }

    fn finish_loading(mut np: NetPlan, config: NetPlanConfig) -> Result<Self, Error> {
        np.config = config;
        np.cache = Caches::rebuild(&np)?;
        np.check_caches_consistency()?;
        debug!(
            "Loaded plan with {} layers, {} nodes and {} SRGs",
            np.layers.len(),
            np.nodes.len(),
            np.srgs.len()
        );
        Ok(np)
    }
}
