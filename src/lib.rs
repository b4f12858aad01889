//! OpenID 2.0 relying-party strategy: route each request to the initiate or complete phase,
//! normalize provider profiles, and plug in your own association stores on any HTTP stack.
//!
//! The protocol engine (discovery, association, signature checks) stays behind the
//! [`relying_party::RelyingParty`] trait; this crate decides what to ask it and turns every
//! answer into one [`strategy::AuthenticationOutcome`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod obs;
pub mod profile;
pub mod relying_party;
pub mod request;
pub mod store;
pub mod strategy;
pub mod validator;

pub use config::StrategyConfig;
pub use request::AuthRequest;
pub use strategy::{AuthenticationActions, AuthenticationOutcome, FailureInfo, Strategy};
pub use validator::{Validator, Verdict};

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{BoxError, Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
