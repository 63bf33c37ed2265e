use modshare_client::{
    ClientConfig, ClientError, MemoryBackend, ModshareClient, NewMod, QueryKey, QueryStatus,
    RemoteError, Session, StoryModeFields,
};
use modshare_core::{generate_unlisted_id, ModFile, Principal, UnlistedId, UserProfile};
use std::sync::Arc;

fn client_for(backend: &MemoryBackend, name: &str) -> ModshareClient {
    let identity = Principal::new(name);
    let view = backend.as_caller(identity.clone());
    let session = Arc::new(Session::connected(identity, Arc::new(view)));
    ModshareClient::new(session, ClientConfig::default())
}

fn torch_fix(unlisted_id: UnlistedId) -> NewMod {
    NewMod {
        id: "minecraft-1700000000000".into(),
        title: "Torch Fix".into(),
        description: "Fixes torch placement".into(),
        prompt: "Fix the bug".into(),
        version: "1.0.0".into(),
        game_name: "Minecraft".into(),
        files: vec![ModFile::new("fix.json", "application/json", vec![b'{'; 512])],
        unlisted_id,
    }
}

#[tokio::test]
async fn visitors_lose_access_when_creator_disables() {
    let backend = MemoryBackend::new();
    let alice = client_for(&backend, "alice");
    let bob = client_for(&backend, "bob");
    let token = generate_unlisted_id();

    alice.create_mod(torch_fix(token.clone())).await.unwrap();

    let seen = bob.mod_by_unlisted_id(token.as_str()).await.unwrap();
    assert_eq!(seen.title, "Torch Fix");
    assert_eq!(seen.files[0].size(), 512);

    let denied = bob
        .set_mod_enabled_state("minecraft-1700000000000", false)
        .await
        .unwrap_err();
    assert!(denied.is_unauthorized());

    alice
        .set_mod_enabled_state("minecraft-1700000000000", false)
        .await
        .unwrap();

    // bob's cache still holds the old lookup until it is refreshed
    bob.invalidate(&modshare_client::KeyPattern::prefix(["mod", "unlisted"]))
        .await;
    assert_eq!(
        bob.mod_by_unlisted_id(token.as_str()).await,
        Err(ClientError::ModUnavailable)
    );
}

#[tokio::test]
async fn creator_listing_refreshes_after_create() {
    let backend = MemoryBackend::new();
    let alice = client_for(&backend, "alice");
    let me = alice.identity().unwrap();

    assert!(alice.mods_for_creator(&me).await.unwrap().is_empty());
    alice.create_mod(torch_fix(generate_unlisted_id())).await.unwrap();

    assert_eq!(alice.mods_for_creator(&me).await.unwrap().len(), 1);
}

#[tokio::test]
async fn profile_roundtrip_through_cache() {
    let backend = MemoryBackend::new();
    let alice = client_for(&backend, "alice");

    assert_eq!(alice.caller_user_profile().await, Ok(None));
    assert_eq!(
        alice.status(&QueryKey::CurrentUserProfile),
        QueryStatus::Ready
    );

    alice
        .save_caller_user_profile(UserProfile::new("Alice"))
        .await
        .unwrap();
    assert_eq!(alice.status(&QueryKey::CurrentUserProfile), QueryStatus::Idle);
    assert_eq!(
        alice.caller_user_profile().await,
        Ok(Some(UserProfile::new("Alice")))
    );
}

#[tokio::test]
async fn transient_failure_then_success_is_retried() {
    let backend = MemoryBackend::new();
    let alice = client_for(&backend, "alice");
    backend.fail_next(RemoteError::Transport("reset".into()));

    assert!(alice.story_modes().await.unwrap().is_empty());
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn story_updates_invalidate_detail_and_list() {
    let backend = MemoryBackend::new();
    let alice = client_for(&backend, "alice");
    let fields = StoryModeFields {
        title: "The Long Night".into(),
        description: "Survive until dawn".into(),
        character_description: String::new(),
        interaction_capabilities: String::new(),
        chapters: Vec::new(),
    };

    alice
        .create_story_mode("story-1".into(), fields.clone(), generate_unlisted_id())
        .await
        .unwrap();
    assert_eq!(alice.story_modes().await.unwrap().len(), 1);
    let loaded = alice.story_mode("story-1").await.unwrap().unwrap();
    assert_eq!(loaded.title, "The Long Night");

    let renamed = StoryModeFields {
        title: "The Longest Night".into(),
        ..fields
    };
    alice.update_story_mode("story-1", renamed).await.unwrap();

    assert_eq!(
        alice.story_mode("story-1").await.unwrap().unwrap().title,
        "The Longest Night"
    );
    assert_eq!(alice.story_modes().await.unwrap()[0].title, "The Longest Night");
}
