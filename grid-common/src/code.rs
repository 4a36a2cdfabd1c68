// Copyright 2026 grid Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, hash::Hash};

use bytes::{Buf, BufMut};

use crate::error::Result;

/// Cache key bound.
///
/// Keys are opaque: only identity (hash + equality) is used.
pub trait Key: Send + Sync + 'static + Hash + Eq + Clone + Debug {}
impl<T: Send + Sync + 'static + Hash + Eq + Clone + Debug> Key for T {}

/// Cache value bound.
pub trait Value: Send + Sync + 'static + Debug {}
impl<T: Send + Sync + 'static + Debug> Value for T {}

/// Hash builder bound used to distribute keys over shards and stripes.
pub trait HashBuilder: std::hash::BuildHasher + Send + Sync + 'static {}
impl<T> HashBuilder for T where T: std::hash::BuildHasher + Send + Sync + 'static {}

/// A compact, type-specific binary codec.
///
/// The encoding carries no version tag. Schema evolution is the business of the owner of the encoded value.
pub trait Externalizer: Send + Sync + 'static {
    /// The type this externalizer reads and writes.
    type Target;

    /// Identifier registered for [`Self::Target`] with the replication layer.
    const ID: u32;

    /// Write `target` into `buf`.
    fn write_object(target: &Self::Target, buf: &mut impl BufMut) -> Result<()>;

    /// Read a fresh instance from `buf`, advancing it past the consumed bytes.
    fn read_object(buf: &mut impl Buf) -> Result<Self::Target>;
}
