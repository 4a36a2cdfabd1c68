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


use std::fmt::Debug;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use grid_common::{
    code::Externalizer,
    error::{Error, ErrorKind, Result},
    wire::{get_text, get_varint_u32, put_text, put_varint_u32, text_len, varint_u32_len, MAX_TEXT_LEN},
};
use hashbrown::HashSet;
use itertools::Itertools;
use parking_lot::RwLock;

/// Identifier of [`NameSetExternalizer`] in the replication layer's externalizer registry.
pub const NAME_SET_EXTERNALIZER_ID: u32 = 1304;

/// A thread-safe set of names with a compact binary encoding.
///
/// Every operation takes the instance's own lock and nothing else, so instances never wait on each other. The
/// backing set is never handed out by reference.
///
/// Wire layout: an unsigned varint entry count, then each name as a 2-byte big-endian byte length followed by its
/// UTF-8 bytes. Names longer than 65535 bytes cannot be encoded.
#[derive(Default)]
pub struct ReplicatedNameSet {
    names: RwLock<HashSet<String>>,
}

impl Debug for ReplicatedNameSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names.read().iter()).finish()
    }
}

impl Clone for ReplicatedNameSet {
    fn clone(&self) -> Self {
        Self {
            names: RwLock::new(self.names.read().clone()),
        }
    }
}

impl ReplicatedNameSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from an initial snapshot. Duplicates collapse.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Add `name`. Returns `true` if it was absent.
    pub fn add(&self, name: impl Into<String>) -> bool {
        self.names.write().insert(name.into())
    }

    /// Remove `name`. Returns `true` if it was present.
    pub fn remove(&self, name: &str) -> bool {
        self.names.write().remove(name)
    }

    /// Add `to_add` and remove `to_remove` in one critical section.
    ///
    /// Returns `true` if either step changed the set. Readers observe either the state before both steps or the
    /// state after both, never one without the other. The add runs first, so passing the same name twice leaves
    /// it absent.
    pub fn add_and_remove(&self, to_add: impl Into<String>, to_remove: &str) -> bool {
        let mut names = self.names.write();
        let added = names.insert(to_add.into());
        let removed = names.remove(to_remove);
        added || removed
    }

    /// Point-in-time membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }

    /// Copy of the current membership. The order carries no meaning.
    pub fn snapshot(&self) -> Vec<String> {
        self.names.read().iter().cloned().collect_vec()
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Whether the set has no names.
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    /// Size of [`ReplicatedNameSet::encode`]'s output for the current membership.
    pub fn encoded_len(&self) -> usize {
        let names = self.names.read();
        varint_u32_len(names.len() as u32) + names.iter().map(|name| text_len(name)).sum::<usize>()
    }

    /// Write the set into `buf`.
    ///
    /// The read lock is held for the whole write-out, so the bytes always describe one consistent state. On
    /// error nothing has been written.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        let names = self.names.read();

        let count = u32::try_from(names.len())
            .map_err(|e| Error::new(ErrorKind::Encode, "too many names").with_source(e))?;
        if let Some(name) = names.iter().find(|name| name.len() > MAX_TEXT_LEN) {
            return Err(Error::new(ErrorKind::Encode, "name is too long for its length prefix")
                .with_context("len", name.len())
                .with_context("max", MAX_TEXT_LEN));
        }

        put_varint_u32(buf, count);
        for name in names.iter() {
            put_text(buf, name)?;
        }
        Ok(())
    }

    /// Read a fresh set from `buf`, advancing it past the consumed bytes.
    ///
    /// Duplicate names in the input collapse. Nothing existing is touched on error.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let count = get_varint_u32(buf).inspect_err(|e| tracing::warn!("[name set]: bad entry count: {e}"))?;

        // Every entry carries at least its 2-byte length, which bounds a bogus count.
        let mut names = HashSet::with_capacity((count as usize).min(buf.remaining() / 2));
        for index in 0..count {
            let name = get_text(buf).map_err(|e| {
                tracing::warn!("[name set]: bad entry {index} of {count}: {e}");
                e.with_context("entry", index).with_context("count", count)
            })?;
            names.insert(name);
        }

        tracing::trace!("[name set]: decoded {} names", names.len());
        Ok(Self {
            names: RwLock::new(names),
        })
    }

    /// Encode the set into a standalone buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a set from a buffer that holds exactly one encoded set.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let set = Self::decode(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(Error::new(ErrorKind::Decode, "trailing bytes after name set").with_context("len", bytes.len()));
        }
        Ok(set)
    }
}

impl<S> FromIterator<S> for ReplicatedNameSet
where
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_names(iter)
    }
}

/// [`Externalizer`] of [`ReplicatedNameSet`].
#[derive(Debug)]
pub struct NameSetExternalizer;

impl Externalizer for NameSetExternalizer {
    type Target = ReplicatedNameSet;

    const ID: u32 = NAME_SET_EXTERNALIZER_ID;

    fn write_object(target: &Self::Target, buf: &mut impl BufMut) -> Result<()> {
        target.encode(buf)
    }

    fn read_object(buf: &mut impl Buf) -> Result<Self::Target> {
        ReplicatedNameSet::decode(buf)
    }
}
