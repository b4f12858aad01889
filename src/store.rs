//! Association store hooks and the default in-memory store.
//!
//! The relying party persists two kinds of state between the initiate request and the
//! provider callback: negotiated [`Association`]s and per-identifier
//! [`DiscoveredInformation`]. Both requests may land on different processes, so hosts can
//! register their own loaders and savers on [`StoreHooks`]. Every operation without a
//! registered hook falls through to the injected default [`OpenIdStore`] ([`MemoryStore`]
//! unless replaced).

pub mod memory;

pub use memory::MemoryStore;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

type AssociationLoader =
	Arc<dyn Fn(String) -> StoreFuture<'static, Option<Association>> + Send + Sync>;
type AssociationSaver = Arc<dyn Fn(String, Association) -> StoreFuture<'static, ()> + Send + Sync>;
type DiscoveryLoader =
	Arc<dyn Fn(String) -> StoreFuture<'static, Option<DiscoveredInformation>> + Send + Sync>;
type DiscoverySaver =
	Arc<dyn Fn(String, DiscoveredInformation) -> StoreFuture<'static, ()> + Send + Sync>;

/// Storage contract used by the relying party for cross-request state.
pub trait OpenIdStore
where
	Self: Send + Sync,
{
	/// Fetches the association stored under `handle`, if present and live.
	fn load_association<'a>(&'a self, handle: &'a str) -> StoreFuture<'a, Option<Association>>;

	/// Persists or replaces the association stored under `handle`.
	fn save_association<'a>(
		&'a self,
		handle: &'a str,
		association: Association,
	) -> StoreFuture<'a, ()>;

	/// Fetches discovery results cached for the claimed identifier `key`.
	fn load_discovered_info<'a>(
		&'a self,
		key: &'a str,
	) -> StoreFuture<'a, Option<DiscoveredInformation>>;

	/// Caches discovery results for the claimed identifier `key`.
	fn save_discovered_info<'a>(
		&'a self,
		key: &'a str,
		info: DiscoveredInformation,
	) -> StoreFuture<'a, ()>;
}

/// Host-registered overrides layered over a default [`OpenIdStore`].
///
/// Hooks are pure pass-through: no caching or validation happens here, so durability and
/// concurrency are entirely up to the registered functions.
#[derive(Clone)]
pub struct StoreHooks {
	fallback: Arc<dyn OpenIdStore>,
	association_loader: Option<AssociationLoader>,
	association_saver: Option<AssociationSaver>,
	discovery_loader: Option<DiscoveryLoader>,
	discovery_saver: Option<DiscoverySaver>,
}
impl StoreHooks {
	/// Creates hooks that fall back to the provided store for unregistered operations.
	pub fn new(fallback: Arc<dyn OpenIdStore>) -> Self {
		Self {
			fallback,
			association_loader: None,
			association_saver: None,
			discovery_loader: None,
			discovery_saver: None,
		}
	}

	/// Replaces the store used for operations without a registered hook.
	pub fn set_fallback(&mut self, fallback: Arc<dyn OpenIdStore>) -> &mut Self {
		self.fallback = fallback;

		self
	}

	/// Replaces association lookups.
	pub fn set_association_loader<F, Fut>(&mut self, loader: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Option<Association>, StoreError>>,
	{
		self.association_loader =
			Some(Arc::new(move |handle| -> StoreFuture<'static, Option<Association>> {
				Box::pin(loader(handle))
			}));

		self
	}

	/// Replaces association persistence.
	pub fn set_association_saver<F, Fut>(&mut self, saver: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String, Association) -> Fut,
		Fut: 'static + Send + Future<Output = Result<(), StoreError>>,
	{
		self.association_saver =
			Some(Arc::new(move |handle, association| -> StoreFuture<'static, ()> {
				Box::pin(saver(handle, association))
			}));

		self
	}

	/// Replaces discovered-information lookups.
	pub fn set_discovered_info_loader<F, Fut>(&mut self, loader: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Option<DiscoveredInformation>, StoreError>>,
	{
		self.discovery_loader = Some(Arc::new(
			move |key| -> StoreFuture<'static, Option<DiscoveredInformation>> {
				Box::pin(loader(key))
			},
		));

		self
	}

	/// Alias of [`StoreHooks::set_discovered_info_loader`].
	pub fn set_discovered_information_loader<F, Fut>(&mut self, loader: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Option<DiscoveredInformation>, StoreError>>,
	{
		self.set_discovered_info_loader(loader)
	}

	/// Replaces discovered-information persistence.
	pub fn set_discovered_info_saver<F, Fut>(&mut self, saver: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String, DiscoveredInformation) -> Fut,
		Fut: 'static + Send + Future<Output = Result<(), StoreError>>,
	{
		self.discovery_saver = Some(Arc::new(move |key, info| -> StoreFuture<'static, ()> {
			Box::pin(saver(key, info))
		}));

		self
	}

	/// Alias of [`StoreHooks::set_discovered_info_saver`].
	pub fn set_discovered_information_saver<F, Fut>(&mut self, saver: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(String, DiscoveredInformation) -> Fut,
		Fut: 'static + Send + Future<Output = Result<(), StoreError>>,
	{
		self.set_discovered_info_saver(saver)
	}
}
impl Default for StoreHooks {
	fn default() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}
}
impl Debug for StoreHooks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoreHooks")
			.field("association_loader_set", &self.association_loader.is_some())
			.field("association_saver_set", &self.association_saver.is_some())
			.field("discovery_loader_set", &self.discovery_loader.is_some())
			.field("discovery_saver_set", &self.discovery_saver.is_some())
			.finish()
	}
}
impl OpenIdStore for StoreHooks {
	fn load_association<'a>(&'a self, handle: &'a str) -> StoreFuture<'a, Option<Association>> {
		match &self.association_loader {
			Some(loader) => loader(handle.to_owned()),
			None => self.fallback.load_association(handle),
		}
	}

	fn save_association<'a>(
		&'a self,
		handle: &'a str,
		association: Association,
	) -> StoreFuture<'a, ()> {
		match &self.association_saver {
			Some(saver) => saver(handle.to_owned(), association),
			None => self.fallback.save_association(handle, association),
		}
	}

	fn load_discovered_info<'a>(
		&'a self,
		key: &'a str,
	) -> StoreFuture<'a, Option<DiscoveredInformation>> {
		match &self.discovery_loader {
			Some(loader) => loader(key.to_owned()),
			None => self.fallback.load_discovered_info(key),
		}
	}

	fn save_discovered_info<'a>(
		&'a self,
		key: &'a str,
		info: DiscoveredInformation,
	) -> StoreFuture<'a, ()> {
		match &self.discovery_saver {
			Some(saver) => saver(key.to_owned(), info),
			None => self.fallback.save_discovered_info(key, info),
		}
	}
}

/// MAC algorithm negotiated for an association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
	/// `HMAC-SHA1`.
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `HMAC-SHA256`.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
}
impl HashAlgorithm {
	/// Returns the OpenID wire name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HashAlgorithm::HmacSha1 => "HMAC-SHA1",
			HashAlgorithm::HmacSha256 => "HMAC-SHA256",
		}
	}
}
impl Display for HashAlgorithm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Shared secret negotiated between the relying party and a provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
	/// Provider endpoint the association belongs to.
	pub provider: String,
	/// MAC algorithm.
	pub hash_algorithm: HashAlgorithm,
	/// Association handle.
	pub handle: String,
	/// Base64-encoded MAC key.
	pub secret: String,
	/// Lifetime granted by the provider.
	pub expires_in_seconds: u64,
}
impl Association {
	/// Decodes the base64 MAC key.
	pub fn secret_bytes(&self) -> Result<Vec<u8>, StoreError> {
		STANDARD.decode(&self.secret).map_err(|e| StoreError::InvalidSecret {
			message: format!("Association `{}` has a malformed secret: {e}", self.handle),
		})
	}

	/// Returns the instant the association expires when it was saved at `saved_at`.
	pub fn expires_at(&self, saved_at: OffsetDateTime) -> OffsetDateTime {
		let lifetime = i64::try_from(self.expires_in_seconds).unwrap_or(i64::MAX);

		saved_at.saturating_add(Duration::seconds(lifetime))
	}
}
impl Debug for Association {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Association")
			.field("provider", &self.provider)
			.field("hash_algorithm", &self.hash_algorithm)
			.field("handle", &self.handle)
			.field("secret", &"<redacted>")
			.field("expires_in_seconds", &self.expires_in_seconds)
			.finish()
	}
}

/// Cached discovery result for one claimed identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredInformation {
	/// Provider endpoint URL.
	pub endpoint: Url,
	/// Protocol version namespace advertised by the provider.
	pub version: String,
	/// Provider-local identifier, when it differs from the claimed identifier.
	pub local_identifier: Option<String>,
	/// Claimed identifier the discovery ran for.
	pub claimed_identifier: Option<String>,
}

/// Error type produced by [`OpenIdStore`] implementations and hooks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Stored association secret is not valid base64.
	#[error("Invalid secret: {message}.")]
	InvalidSecret {
		/// Human-readable error payload.
		message: String,
	},
}
