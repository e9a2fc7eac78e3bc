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

//! Module containing all error types

use crate::model::NetPlanError;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error propagated from the model
    #[error("Model Error: {0}")]
    NetPlanError(#[from] NetPlanError),
    /// Reading or writing a file failed
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    /// The plan could not be serialized or parsed
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}
