use modshare_core::{parse_share_url, ShareKind};
use modshare_flows::{
    AdGateError, ManageError, ModFileManager, ShowcaseCreator, ShowcaseError, StoryEditor,
    StoryError, StoryPlayer,
};
use modshare_test_utils::{torch_fix_request, TestWorld, TEST_ORIGIN};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn creator_edits_files_and_disables_share_link() {
    let world = TestWorld::new();
    let alice = world.client("alice");
    let bob = world.client("bob");
    alice.create_mod(torch_fix_request("minecraft-1")).await.unwrap();

    let mut manager = ModFileManager::load(&alice, "minecraft-1").await.unwrap();
    assert!(manager.is_enabled());
    assert!(!manager.save(&alice).await.unwrap());

    manager.files_mut().add_text_file("install.txt", "drop it in").unwrap();
    assert!(manager.is_dirty());
    assert!(manager.save(&alice).await.unwrap());
    assert!(!manager.is_dirty());

    let reloaded = ModFileManager::load(&bob, "minecraft-1").await.unwrap();
    assert_eq!(reloaded.files().len(), 2);

    let mut intruder = reloaded;
    assert_eq!(
        intruder.set_enabled(&bob, false).await,
        Err(ManageError::PermissionDenied)
    );

    assert_eq!(
        manager.set_enabled(&alice, false).await,
        Ok("Mod disabled successfully")
    );
    assert_eq!(
        manager.status_text(),
        "Your mod is currently disabled and cannot be accessed via the share link"
    );
    assert!(!alice.mod_enabled_state("minecraft-1").await.unwrap());
}

#[tokio::test]
async fn emptied_file_list_is_not_saved() {
    let world = TestWorld::new();
    let alice = world.client("alice");
    alice.create_mod(torch_fix_request("minecraft-1")).await.unwrap();

    let mut manager = ModFileManager::load(&alice, "minecraft-1").await.unwrap();
    manager.files_mut().remove_file(0);
    assert_eq!(
        manager.save(&alice).await.unwrap_err().to_string(),
        "At least one file is required"
    );
    assert_eq!(alice.mod_by_id("minecraft-1").await.unwrap().files.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn story_saved_behind_ad_gate_then_played() {
    let world = TestWorld::new();
    let alice = world.client("alice");

    let mut editor = StoryEditor::new();
    assert_eq!(
        editor.save(&alice).await.unwrap_err().to_string(),
        "Title and description are required"
    );

    editor.set_title("The Long Night");
    editor.set_description("Survive until dawn");
    editor.add_scene(0).unwrap();
    editor.scene_mut(0, 0).unwrap().voice_over = "Hold the line".into();
    editor.add_chapter();
    editor.add_scene(1).unwrap();

    let mut gate = editor.save(&alice).await.unwrap();
    assert_eq!(gate.dismiss(), Err(AdGateError::StillCounting { remaining: 3 }));
    assert!(gate.wait().await);
    let story_id = gate.dismiss().unwrap();
    assert!(story_id.starts_with("story-"));
    assert_eq!(editor.story_id(), Some(story_id.as_str()));

    editor.set_title("The Longest Night");
    editor.save(&alice).await.unwrap();
    assert_eq!(alice.story_modes().await.unwrap().len(), 1);

    let mut player = StoryPlayer::load(&alice, &story_id).await.unwrap();
    assert_eq!(player.story().title, "The Longest Night");
    assert_eq!(player.dialogue_text().as_deref(), Some("\"Hold the line\""));
    assert!(player.next());
    assert_eq!(player.chapter_label(), "Chapter 2 of 2");
    assert!(!player.next());
}

#[tokio::test]
async fn unknown_story_is_not_found() {
    let world = TestWorld::new();
    let alice = world.client("alice");
    assert_eq!(
        StoryPlayer::load(&alice, "story-404").await.unwrap_err(),
        StoryError::NotFound
    );
}

#[tokio::test(start_paused = true)]
async fn showcase_link_released_after_ad() {
    let world = TestWorld::new();
    let alice = world.client("alice");

    let mut creator = ShowcaseCreator::load(&alice).await.unwrap();
    assert!(!creator.is_update());
    creator.title = "Hero".into();
    creator.character_name = "Steve".into();
    creator.description = "Builds things".into();

    assert_eq!(
        creator.publish(&alice).await.unwrap_err(),
        ShowcaseError::MissingMedia
    );

    creator.select_media("image/png", vec![0u8; 200 * 1024]).unwrap();
    let mut gate = creator.publish(&alice).await.unwrap();
    assert_eq!(creator.upload_progress(), 100);
    assert!(creator.share_url().is_none());

    assert!(creator.complete(&mut gate).is_err());
    gate.wait().await;
    assert_eq!(creator.complete(&mut gate), Ok("Character published successfully"));

    let url = creator.share_url().unwrap().to_string();
    assert!(url.starts_with(&format!("{TEST_ORIGIN}/#/character/")));
    let (kind, token) = parse_share_url(&url).unwrap();
    assert_eq!(kind, ShareKind::Character);

    let bob = world.client("bob");
    let showcase = bob
        .character_showcase_by_unlisted_id(token.as_str())
        .await
        .unwrap();
    assert_eq!(showcase.author, "Anonymous");
    assert!(showcase.photo.is_some());

    let again = ShowcaseCreator::load(&alice).await.unwrap();
    assert!(again.is_update());
}
