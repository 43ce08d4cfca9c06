// Copyright 2025 Fernando Borretti
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

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::pins::PinRegistry;
use crate::progress::ProgressStore;

/// Shared state for the API server. The stores serialize their own writes,
/// so handlers hold no locks of their own.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<Catalog>,
    pub progress: ProgressStore,
    pub pins: PinRegistry,
}
