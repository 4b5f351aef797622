use warbler_db::models::NewUser;
use warbler_db::{Database, DbError};

struct Fixture {
    db: Database,
    id1: i64,
    id2: i64,
}

fn setup() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let u = db
        .insert_user(NewUser {
            id: Some(999),
            email: "test@test.com".into(),
            username: "testuser".into(),
            password: "HASHED_PASSWORD".into(),
            image_url: None,
        })
        .unwrap();
    let x = db
        .insert_user(NewUser {
            id: Some(1000),
            email: "test2@test.com".into(),
            username: "testuser2".into(),
            password: "HASHED_PASSWORD".into(),
            image_url: None,
        })
        .unwrap();
    Fixture { db, id1: u.id, id2: x.id }
}

#[test]
fn user_model_basics() {
    let f = setup();

    for id in [f.id1, f.id2] {
        let stats = f.db.user_stats(id).unwrap();
        assert_eq!(stats.messages, 0);
        assert_eq!(stats.followers, 0);
    }

    let user1 = f.db.get_user(f.id1).unwrap().unwrap();
    let user2 = f.db.get_user(f.id2).unwrap().unwrap();
    assert!(user1.to_string().contains("testuser, test@test.com>"));
    assert!(user2.to_string().contains("testuser2, test2@test.com>"));
    assert_eq!(user1.to_string(), "<User #999: testuser, test@test.com>");
    assert_eq!(user1.image_url, "/static/images/default-pic.png");
}

#[test]
fn follow_is_directed() {
    let f = setup();
    f.db.follow(f.id1, f.id2).unwrap();

    assert!(f.db.is_following(f.id1, f.id2).unwrap());
    assert!(!f.db.is_following(f.id2, f.id1).unwrap());
    assert!(f.db.is_followed_by(f.id2, f.id1).unwrap());
    assert!(!f.db.is_followed_by(f.id1, f.id2).unwrap());

    let following: Vec<i64> = f.db.following(f.id1).unwrap().iter().map(|u| u.id).collect();
    let followers: Vec<i64> = f.db.followers(f.id2).unwrap().iter().map(|u| u.id).collect();
    assert_eq!(following, vec![f.id2]);
    assert_eq!(followers, vec![f.id1]);
}

#[test]
fn follow_twice_then_unfollow() {
    let f = setup();
    f.db.follow(f.id1, f.id2).unwrap();
    f.db.follow(f.id1, f.id2).unwrap();
    assert_eq!(f.db.user_stats(f.id2).unwrap().followers, 1);

    assert!(f.db.unfollow(f.id1, f.id2).unwrap());
    assert!(!f.db.unfollow(f.id1, f.id2).unwrap());
    assert!(!f.db.is_following(f.id1, f.id2).unwrap());
}

#[test]
fn signup_hashes_password() {
    let f = setup();
    let z = f
        .db
        .signup("testuser3", "test3@test.com", "HASHED_PASSWORD", None)
        .unwrap();

    let stats = f.db.user_stats(z.id).unwrap();
    assert_eq!(stats.messages, 0);
    assert_eq!(stats.followers, 0);
    assert!(z.to_string().contains("testuser3, test3@test.com>"));
    assert!(z.id > 0);
    assert!(z.password.starts_with("$argon2id$"));
    assert_ne!(z.password, "HASHED_PASSWORD");
}

#[test]
fn duplicate_username_and_email_is_integrity_error() {
    let f = setup();
    f.db.signup("testuser3", "test3@test.com", "HASHED_PASSWORD", None)
        .unwrap();

    let err = f
        .db
        .signup("testuser3", "test3@test.com", "HASHED_PASSWORD", None)
        .unwrap_err();
    assert!(err.is_integrity(), "unexpected error: {err:?}");

    let err = f
        .db
        .signup("someone-else", "test3@test.com", "HASHED_PASSWORD", None)
        .unwrap_err();
    assert!(err.is_integrity(), "duplicate email should fail: {err:?}");
}

#[test]
fn empty_username_is_integrity_error() {
    let f = setup();
    let err = f
        .db
        .insert_user(NewUser {
            id: Some(3100),
            email: "test@test9.com".into(),
            username: String::new(),
            password: "password".into(),
            image_url: None,
        })
        .unwrap_err();
    assert!(err.is_integrity());
}

#[test]
fn signup_rejects_bad_email_and_empty_password() {
    let f = setup();
    let err = f.db.signup("testuser9", "asdf", "password", None).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    let err = f
        .db
        .signup("testuser99", "testing@testing.com", "", None)
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    assert!(f.db.get_user_by_username("testuser9").unwrap().is_none());
    assert!(f.db.get_user_by_username("testuser99").unwrap().is_none());
}

#[test]
fn valid_authentication() {
    let f = setup();
    f.db.signup("testuserm", "testm@test.com", "cottoncandy", None)
        .unwrap();

    let user = f.db.authenticate("testuserm", "cottoncandy").unwrap();
    assert!(user.is_some());
    assert_eq!(user.unwrap().username, "testuserm");
}

#[test]
fn unknown_username_does_not_authenticate() {
    let f = setup();
    assert!(f.db.authenticate("yomama", "hello123").unwrap().is_none());
}

#[test]
fn wrong_password_does_not_authenticate() {
    let f = setup();
    f.db.signup("testdude", "testdude@test.com", "testingdude", None)
        .unwrap();

    assert!(f.db.authenticate("testdude", "dkl;sajflk;daj;lj").unwrap().is_none());
    assert!(f.db.authenticate("testdude", "testingdude").unwrap().is_some());
    // fixture rows store a non-hash and can never log in
    assert!(f.db.authenticate("testuser", "HASHED_PASSWORD").unwrap().is_none());
}

#[test]
fn search_matches_substring() {
    let f = setup();
    let all = f.db.search_users(None).unwrap();
    assert_eq!(all.len(), 2);

    let hits = f.db.search_users(Some("user2")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, f.id2);

    assert!(f.db.search_users(Some("nobody")).unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let f = setup();
    for (i, name) in ["alice", "bob_x", "bobax"].into_iter().enumerate() {
        f.db.insert_user(NewUser {
            id: None,
            email: format!("s{i}@test.com"),
            username: name.into(),
            password: "HASHED_PASSWORD".into(),
            image_url: None,
        })
        .unwrap();
    }

    let names = |q: &str| -> Vec<String> {
        f.db.search_users(Some(q))
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect()
    };
    assert_eq!(names("b_x"), ["bob_x"]);
    assert!(names("%").is_empty());
    assert_eq!(names("BOB"), ["bob_x", "bobax"]);
}

#[test]
fn deleting_user_cascades() {
    let f = setup();
    let msg = f.db.insert_message(f.id1, "bye").unwrap();
    let other = f.db.insert_message(f.id2, "still here").unwrap();
    f.db.follow(f.id1, f.id2).unwrap();
    f.db.follow(f.id2, f.id1).unwrap();
    f.db.add_like(f.id2, msg.id).unwrap();
    f.db.add_like(f.id1, other.id).unwrap();

    assert!(f.db.delete_user(f.id1).unwrap());

    assert!(f.db.get_message(msg.id).unwrap().is_none());
    assert!(f.db.get_message(other.id).unwrap().is_some());
    let stats = f.db.user_stats(f.id2).unwrap();
    assert_eq!(stats.followers, 0);
    assert_eq!(stats.following, 0);
    assert_eq!(stats.likes, 0);
    assert_eq!(stats.messages, 1);
}
