//! Thread-safe in-memory [`OpenIdStore`] used when no hooks are registered.
//!
//! State lives in-process, so it does not survive restarts and is not shared across
//! instances. Register [`StoreHooks`](crate::store::StoreHooks) loaders and savers for
//! multi-process deployments.

// self
use crate::{
	_prelude::*,
	store::{Association, DiscoveredInformation, OpenIdStore, StoreFuture},
};

type AssociationMap = Arc<RwLock<HashMap<String, (Association, OffsetDateTime)>>>;
type DiscoveryMap = Arc<RwLock<HashMap<String, DiscoveredInformation>>>;

/// Thread-safe storage backend that keeps associations and discovery results in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	associations: AssociationMap,
	discovered: DiscoveryMap,
}
impl MemoryStore {
	/// Number of associations currently held, including expired ones not yet evicted.
	pub fn association_count(&self) -> usize {
		self.associations.read().len()
	}

	fn save_association_now(
		map: AssociationMap,
		handle: String,
		association: Association,
		now: OffsetDateTime,
	) {
		map.write().insert(handle, (association, now));
	}

	fn load_association_now(
		map: AssociationMap,
		handle: &str,
		now: OffsetDateTime,
	) -> Option<Association> {
		let mut guard = map.write();
		let live = match guard.get(handle) {
			Some((association, saved_at)) => association.expires_at(*saved_at) > now,
			None => return None,
		};

		if live {
			guard.get(handle).map(|(association, _)| association.clone())
		} else {
			guard.remove(handle);

			None
		}
	}
}
impl OpenIdStore for MemoryStore {
	fn load_association<'a>(&'a self, handle: &'a str) -> StoreFuture<'a, Option<Association>> {
		let map = self.associations.clone();

		Box::pin(async move {
			Ok(Self::load_association_now(map, handle, OffsetDateTime::now_utc()))
		})
	}

	fn save_association<'a>(
		&'a self,
		handle: &'a str,
		association: Association,
	) -> StoreFuture<'a, ()> {
		let map = self.associations.clone();
		let handle = handle.to_owned();

		Box::pin(async move {
			Self::save_association_now(map, handle, association, OffsetDateTime::now_utc());

			Ok(())
		})
	}

	fn load_discovered_info<'a>(
		&'a self,
		key: &'a str,
	) -> StoreFuture<'a, Option<DiscoveredInformation>> {
		let map = self.discovered.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn save_discovered_info<'a>(
		&'a self,
		key: &'a str,
		info: DiscoveredInformation,
	) -> StoreFuture<'a, ()> {
		let map = self.discovered.clone();
		let key = key.to_owned();

		Box::pin(async move {
			map.write().insert(key, info);

			Ok(())
		})
	}
}
