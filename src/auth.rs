// Copyright (c) 2025 ADBC Drivers Contributors
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

//! Authentication for the InvenTree REST API.
//!
//! Every API request carries `Authorization: Token <value>`. The token is
//! either configured up front or obtained once per connection by exchanging
//! a username and password (HTTP basic auth against `/api/user/token`).

use crate::error::{Error, Result};
use std::fmt;
use std::sync::OnceLock;

/// Produces the `Authorization` header value for API requests.
pub trait AuthProvider: Send + Sync + fmt::Debug {
    fn get_auth_header(&self) -> Result<String>;
}

/// API token that may be populated after construction.
///
/// Set at most once; later attempts are ignored.
#[derive(Default)]
pub struct ApiToken {
    token: OnceLock<String>,
}

impl ApiToken {
    /// Creates a token holder that already knows its value.
    pub fn new(token: impl Into<String>) -> Self {
        let holder = Self::default();
        let _ = holder.token.set(token.into());
        holder
    }

    /// Creates an empty holder, to be filled by [`ApiToken::set`].
    pub fn pending() -> Self {
        Self::default()
    }

    /// Stores the token. Returns `false` if one was already present.
    pub fn set(&self, token: impl Into<String>) -> bool {
        self.token.set(token.into()).is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.token.get().is_some()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("token", &if self.is_set() { "<set>" } else { "<not set>" })
            .finish()
    }
}

impl AuthProvider for ApiToken {
    fn get_auth_header(&self) -> Result<String> {
        match self.token.get() {
            Some(token) => Ok(format!("Token {}", token)),
            None => Err(Error::authentication().message("No API token available")),
        }
    }
}
