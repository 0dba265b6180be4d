// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::schema::Visibility;

/// Configuration for schema construction and production passes.
///
/// A `Config` is owned by a [`TypeRegistry`](crate::resolver::TypeRegistry)
/// and read by every schema it builds and every `produce()` call started
/// through [`Morphic`](crate::morphic::Morphic).
#[derive(Clone, Debug)]
pub struct Config {
    /// Least restrictive field visibility picked up in default selection mode.
    pub visibility_bound: Visibility,
    /// Maximum container nesting within one production pass.
    pub max_depth: u32,
    /// Maximum number of elements rendered by `Converter::display`.
    pub display_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            visibility_bound: Visibility::Private,
            max_depth: 128,
            display_limit: 100,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn visibility_bound(&self) -> Visibility {
        self.visibility_bound
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn display_limit(&self) -> usize {
        self.display_limit
    }
}
