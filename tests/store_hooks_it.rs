mod support;

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use parking_lot::Mutex;
// self
use openid_strategy::{
	Strategy, StrategyConfig, Validator, Verdict,
	store::{Association, HashAlgorithm, MemoryStore, OpenIdStore, StoreError, StoreHooks},
};
use support::{MockRelyingParty, url};

type SharedAssociations = Arc<Mutex<HashMap<String, Association>>>;

fn association(handle: &str) -> Association {
	Association {
		provider: "https://op.example.com/server".into(),
		hash_algorithm: HashAlgorithm::HmacSha256,
		handle: handle.into(),
		secret: "c2hhcmVkLXNlY3JldA==".into(),
		expires_in_seconds: 1_209_600,
	}
}

/// Builds one strategy "instance" whose association hooks write to `backend`.
fn instance(backend: &SharedAssociations) -> (Strategy<String>, StoreHooks) {
	let engine = MockRelyingParty::new();
	let journal = engine.journal();
	let loader_backend = backend.clone();
	let saver_backend = backend.clone();
	let config = StrategyConfig::builder(url("https://www.example.com/auth/openid/return"))
		.build()
		.expect("Config fixture should build.");
	let strategy = Strategy::builder(config)
		.validator(Validator::identifier(|id| async move { Ok(Verdict::accept(id)) }))
		.relying_party(engine)
		.configure_stores(move |hooks| {
			hooks
				.set_association_loader(move |handle| {
					let found = loader_backend.lock().get(&handle).cloned();

					async move { Ok(found) }
				})
				.set_association_saver(move |handle, association| {
					saver_backend.lock().insert(handle, association);

					async { Ok(()) }
				});
		})
		.build()
		.expect("Strategy with hooks should build.");

	(strategy, journal.setup().stores)
}

#[tokio::test]
async fn associations_survive_across_instances_through_hooks() -> color_eyre::Result<()> {
	let backend = SharedAssociations::default();
	let (_initiating, initiating_stores) = instance(&backend);
	let (_completing, completing_stores) = instance(&backend);

	initiating_stores.save_association("handle-1", association("handle-1")).await?;

	let loaded = completing_stores.load_association("handle-1").await?;

	assert_eq!(loaded, Some(association("handle-1")));
	assert_eq!(backend.lock().len(), 1);

	Ok(())
}

#[tokio::test]
async fn unregistered_discovery_hooks_use_the_injected_default() -> color_eyre::Result<()> {
	let backend = SharedAssociations::default();
	let (_strategy, stores) = instance(&backend);
	let info = openid_strategy::store::DiscoveredInformation {
		endpoint: url("https://op.example.com/server"),
		version: "http://specs.openid.net/auth/2.0/signon".into(),
		local_identifier: None,
		claimed_identifier: Some("http://example.com/u".into()),
	};

	stores.save_discovered_info("http://example.com/u", info.clone()).await?;

	assert_eq!(stores.load_discovered_info("http://example.com/u").await?, Some(info));

	Ok(())
}

#[tokio::test]
async fn default_store_can_be_replaced_without_dropping_hooks() -> color_eyre::Result<()> {
	let fallback = Arc::new(MemoryStore::default());
	let engine = MockRelyingParty::new();
	let journal = engine.journal();
	let config = StrategyConfig::builder(url("https://www.example.com/auth/openid/return"))
		.stateless(true)
		.build()?;
	let _strategy = Strategy::builder(config)
		.validator(Validator::identifier(|id| async move { Ok(Verdict::accept(id)) }))
		.relying_party(engine)
		.configure_stores(|hooks| {
			hooks.set_discovered_information_loader(|_| async {
				Err(StoreError::Backend { message: "discovery cache offline".into() })
			});
		})
		.default_store(fallback.clone())
		.build()?;
	let stores = journal.setup().stores;

	stores.save_association("handle-2", association("handle-2")).await?;

	assert_eq!(fallback.association_count(), 1);
	assert_eq!(
		stores.load_discovered_info("http://example.com/u").await,
		Err(StoreError::Backend { message: "discovery cache offline".into() })
	);

	Ok(())
}
