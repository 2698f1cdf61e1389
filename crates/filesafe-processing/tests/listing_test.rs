mod helpers;

use helpers::{identity, setup, test_config};

use filesafe_core::models::FileDraft;
use filesafe_core::FileIndex;
use filesafe_processing::ListingService;
use uuid::Uuid;

fn lister(env: &helpers::TestEnv) -> ListingService {
    ListingService::new(
        env.files.clone(),
        env.config.base_url.clone(),
        env.config.page_size,
    )
}

async fn insert_record(
    env: &helpers::TestEnv,
    name: &str,
    owner_id: Option<Uuid>,
    album_id: Option<Uuid>,
    created_at: i64,
) {
    env.files
        .insert_batch(vec![FileDraft {
            name: name.to_string(),
            original_name: format!("original-{name}"),
            mime_type: "application/octet-stream".to_string(),
            size_bytes: 1,
            content_fingerprint: format!("fp-{name}"),
            source_ip: "127.0.0.1".to_string(),
            owner_id,
            album_id,
            created_at,
        }])
        .await
        .unwrap();
}

#[tokio::test]
async fn owners_see_only_their_files_newest_first() {
    let env = setup(test_config(), None).await;
    let alice = identity("alice", false);
    let bob = identity("bob", false);

    insert_record(&env, "old.txt", Some(alice.id), None, 100).await;
    insert_record(&env, "new.txt", Some(alice.id), None, 200).await;
    insert_record(&env, "other.txt", Some(bob.id), None, 300).await;
    insert_record(&env, "anon.txt", None, None, 400).await;

    let rows = lister(&env).list(&alice, None, 0).await.unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["new.txt", "old.txt"]);
    assert!(rows.iter().all(|r| r.uploader.is_none()));
}

#[tokio::test]
async fn admin_sees_everything_with_display_names() {
    let env = setup(test_config(), None).await;
    let alice = identity("alice", false);
    let admin = identity("root", true);
    env.files.add_user(alice.id, "alice");

    insert_record(&env, "a.txt", Some(alice.id), None, 100).await;
    insert_record(&env, "anon.txt", None, None, 200).await;

    let rows = lister(&env).list(&admin, None, 0).await.unwrap();
    assert_eq!(rows.len(), 2);

    let anon = rows.iter().find(|r| r.name == "anon.txt").unwrap();
    assert!(anon.uploader.is_none());
    let owned = rows.iter().find(|r| r.name == "a.txt").unwrap();
    assert_eq!(owned.uploader.as_deref(), Some("alice"));
}

#[tokio::test]
async fn album_filter_restricts_rows() {
    let env = setup(test_config(), None).await;
    let alice = identity("alice", false);
    let album = env.albums.add_album(alice.id);

    insert_record(&env, "in.txt", Some(alice.id), Some(album), 100).await;
    insert_record(&env, "out.txt", Some(alice.id), None, 200).await;

    let rows = lister(&env).list(&alice, Some(album), 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "in.txt");
}

#[tokio::test]
async fn pages_are_bounded_by_page_size() {
    let mut config = test_config();
    config.page_size = 3;
    let env = setup(config, None).await;
    let alice = identity("alice", false);

    for i in 0..7i64 {
        insert_record(&env, &format!("f{i}.txt"), Some(alice.id), None, i).await;
    }

    let lister = ListingService::new(env.files.clone(), env.config.base_url.clone(), 3);
    let page0 = lister.list(&alice, None, 0).await.unwrap();
    let page1 = lister.list(&alice, None, 1).await.unwrap();
    let page2 = lister.list(&alice, None, 2).await.unwrap();

    assert_eq!(page0.len(), 3);
    assert_eq!(page1.len(), 3);
    assert_eq!(page2.len(), 1);
    assert_eq!(page0[0].name, "f6.txt");
    assert_eq!(page2[0].name, "f0.txt");
}

#[tokio::test]
async fn media_rows_carry_thumb_urls() {
    let env = setup(test_config(), None).await;
    let alice = identity("alice", false);

    insert_record(&env, "abc123.jpg", Some(alice.id), None, 100).await;
    insert_record(&env, "def456.txt", Some(alice.id), None, 200).await;

    let rows = lister(&env).list(&alice, None, 0).await.unwrap();

    let media = rows.iter().find(|r| r.name == "abc123.jpg").unwrap();
    let thumb = media.thumb.as_ref().unwrap();
    assert!(thumb.ends_with("/thumbs/abc123.png"));
    assert!(media.url.ends_with("/abc123.jpg"));

    let plain = rows.iter().find(|r| r.name == "def456.txt").unwrap();
    assert!(plain.thumb.is_none());
}
