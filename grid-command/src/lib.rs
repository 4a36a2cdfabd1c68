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

//! Transactional lock-control commands for grid.
//!
//! A [`LockRequest`] describes "acquire or release locks on these keys" within a transaction boundary. It is
//! dispatched through a [`Visitor`] into whatever component currently coordinates locking, so new handlers can be
//! added without touching the command. [`LockTable`] is the in-process coordinator.

mod command;
mod context;
mod lock_request;
mod lock_table;
mod tx;

mod prelude;
pub use prelude::*;
