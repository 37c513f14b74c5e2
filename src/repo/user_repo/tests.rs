use super::*;
use crate::models::Visibility;
use crate::repo::{count_posts, create_post, PostFilter};
use crate::test_utils::{setup_test_db, TEST_PASSWORD};
use crate::models::NewPost;

#[test]
fn test_create_and_get_user() {
    let pool = setup_test_db();

    let user = create_user(&pool, "alice", "alice@example.com", TEST_PASSWORD).unwrap();
    assert_eq!(user.get_username(), "alice");
    assert_ne!(user.get_password_hash(), TEST_PASSWORD);

    let by_id = get_user(&pool, user.get_id()).unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_name = get_user_by_username(&pool, "alice").unwrap().unwrap();
    assert_eq!(by_name.get_id(), user.get_id());
}

#[test]
fn test_duplicate_username_fails() {
    let pool = setup_test_db();
    create_user(&pool, "alice", "", TEST_PASSWORD).unwrap();
    let result = create_user(&pool, "alice", "", TEST_PASSWORD);
    let err = result.unwrap_err();
    assert!(is_unique_violation(&err), "unexpected error: {err:#}");
}

#[test]
fn test_other_errors_are_not_unique_violations() {
    assert!(!is_unique_violation(&anyhow::anyhow!("something else")));
    assert!(!is_unique_violation(&anyhow::Error::from(diesel::result::Error::NotFound)));
}

#[test]
fn test_authenticate() {
    let pool = setup_test_db();
    create_user(&pool, "alice", "", TEST_PASSWORD).unwrap();

    assert!(authenticate(&pool, "alice", TEST_PASSWORD).unwrap().is_some());
    assert!(authenticate(&pool, "alice", "wrong password").unwrap().is_none());
    assert!(authenticate(&pool, "nobody", TEST_PASSWORD).unwrap().is_none());
}

#[test]
fn test_list_and_count_users() {
    let pool = setup_test_db();
    create_user(&pool, "zed", "", TEST_PASSWORD).unwrap();
    create_user(&pool, "amy", "", TEST_PASSWORD).unwrap();

    let names: Vec<_> = list_users(&pool).unwrap().iter().map(|u| u.get_username()).collect();
    assert_eq!(names, vec!["amy", "zed"]);
    assert_eq!(count_users(&pool).unwrap(), 2);
}

#[test]
fn test_delete_user_cascades_to_posts() {
    let pool = setup_test_db();
    let user = create_user(&pool, "alice", "", TEST_PASSWORD).unwrap();
    create_post(
        &pool,
        NewPost::new(user.get_id(), Visibility::Public, "t".to_string(), "c".to_string(), None),
        &["rust".to_string()],
    )
    .unwrap();

    assert!(delete_user(&pool, user.get_id()).unwrap());
    assert!(get_user(&pool, user.get_id()).unwrap().is_none());
    assert_eq!(count_posts(&pool, &PostFilter::public()).unwrap(), 0);
    assert!(!delete_user(&pool, user.get_id()).unwrap());
}
