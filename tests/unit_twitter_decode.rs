// Unit tests for decoding Twitter API v2 responses.
//
// Uses response bodies shaped like the live API's: live accounts, the
// HTTP-200 `errors` array for missing and suspended accounts, RFC 7807
// problem bodies, and timelines. No network access.

use tweetsentry::twitter::posts::{decode_timeline, PostId};
use tweetsentry::twitter::traits::UserLookupResult;
use tweetsentry::twitter::users::{decode_lookup, normalize_handle};

// ============================================================
// User lookup
// ============================================================

#[test]
fn live_account_with_all_fields() {
    let body = r#"{"data": {
        "id": "2244994945",
        "name": "Developers",
        "username": "XDevelopers",
        "protected": false,
        "verified": true,
        "possibly_sensitive": false,
        "public_metrics": {
            "followers_count": 570000,
            "following_count": 2000,
            "tweet_count": 4000,
            "listed_count": 1800
        }
    }}"#;

    match decode_lookup(200, body) {
        UserLookupResult::Found(user) => {
            assert_eq!(user.id, "2244994945");
            assert_eq!(user.username, "XDevelopers");
            assert!(user.verified);
            assert!(!user.protected);
            assert!(user.withheld_in.is_empty());
            assert_eq!(user.metrics.followers_count, 570000);
            assert_eq!(user.metrics.tweet_count, 4000);
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn withheld_country_codes_are_kept() {
    let body = r#"{"data": {"id": "1", "username": "x", "name": "x",
        "withheld": {"country_codes": ["DE", "FR"], "scope": "user"}}}"#;
    match decode_lookup(200, body) {
        UserLookupResult::Found(user) => {
            assert!(user.withheld);
            assert_eq!(user.withheld_in, vec!["DE", "FR"]);
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn null_optional_fields_decode_as_defaults() {
    let body = r#"{"data": {"id": "42", "username": "x", "name": null,
        "protected": null, "verified": null, "possibly_sensitive": null,
        "withheld": {"country_codes": null},
        "public_metrics": {"followers_count": null, "tweet_count": 3}}}"#;

    match decode_lookup(200, body) {
        UserLookupResult::Found(user) => {
            assert_eq!(user.name, "");
            assert!(!user.protected);
            assert!(!user.verified);
            assert!(!user.possibly_sensitive);
            // The object is present, so the account is still withheld
            assert!(user.withheld);
            assert!(user.withheld_in.is_empty());
            assert_eq!(user.metrics.followers_count, 0);
            assert_eq!(user.metrics.tweet_count, 3);
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn null_problem_fields_still_classify_as_not_found() {
    let body = r#"{"errors": [{"title": "Not Found Error", "detail": null,
        "type": "https://api.twitter.com/2/problems/resource-not-found"}]}"#;
    assert!(matches!(
        decode_lookup(200, body),
        UserLookupResult::NotFound(_)
    ));
}

#[test]
fn missing_account_is_not_found() {
    let body = r#"{"errors": [{
        "value": "ghost",
        "detail": "Could not find user with username: [ghost].",
        "title": "Not Found Error",
        "resource_type": "user",
        "parameter": "username",
        "resource_id": "ghost",
        "type": "https://api.twitter.com/2/problems/resource-not-found"
    }]}"#;

    match decode_lookup(200, body) {
        UserLookupResult::NotFound(problem) => {
            assert!(!problem.mentions_suspension());
            assert_eq!(problem.title, "Not Found Error");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn suspended_account_is_not_found_with_suspension() {
    // The live API titles this "Forbidden" but uses the not-found problem type.
    let body = r#"{"errors": [{
        "value": "toponlysearch",
        "detail": "User has been suspended: [toponlysearch].",
        "title": "Forbidden",
        "resource_type": "user",
        "parameter": "username",
        "resource_id": "toponlysearch",
        "type": "https://api.twitter.com/2/problems/resource-not-found"
    }]}"#;

    match decode_lookup(200, body) {
        UserLookupResult::NotFound(problem) => assert!(problem.mentions_suspension()),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn unauthorized_problem_body_is_rejected() {
    let body = r#"{"title": "Unauthorized", "type": "about:blank", "status": 401, "detail": "Unauthorized"}"#;
    match decode_lookup(401, body) {
        UserLookupResult::Rejected(problem) => {
            assert_eq!(problem.title, "Unauthorized");
            assert_eq!(problem.to_string(), "Unauthorized: Unauthorized");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn unrelated_error_entry_is_rejected() {
    let body = r#"{"errors": [{"title": "Invalid Request", "detail": "The `username` query parameter value [a b] does not match ^[A-Za-z0-9_]{1,15}$", "type": "https://api.twitter.com/2/problems/invalid-request"}]}"#;
    assert!(matches!(
        decode_lookup(400, body),
        UserLookupResult::Rejected(_)
    ));
}

#[test]
fn malformed_body_is_unreachable() {
    assert!(matches!(
        decode_lookup(200, "<html>gateway</html>"),
        UserLookupResult::Unreachable(_)
    ));
}

#[test]
fn server_error_is_unreachable_even_with_errors_body() {
    let body = r#"{"errors": [{"title": "Not Found Error", "detail": "x"}]}"#;
    assert!(matches!(
        decode_lookup(502, body),
        UserLookupResult::Unreachable(_)
    ));
}

// ============================================================
// Timeline
// ============================================================

#[test]
fn timeline_keeps_newest_first_order_and_fields() {
    let body = r#"{
        "data": [
            {"id": "1800000000000000002", "text": "second",
             "created_at": "2024-07-01T12:30:00.000Z",
             "possibly_sensitive": true,
             "public_metrics": {"retweet_count": 3, "reply_count": 2, "like_count": 10, "quote_count": 1}},
            {"id": "1800000000000000001", "text": "first",
             "created_at": "2024-07-01T12:00:00.000Z",
             "possibly_sensitive": false,
             "public_metrics": {"retweet_count": 0, "reply_count": 0, "like_count": 1, "quote_count": 0}}
        ],
        "meta": {"result_count": 2, "newest_id": "1800000000000000002", "oldest_id": "1800000000000000001"}
    }"#;

    let posts = decode_timeline(200, body).unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, PostId::new("1800000000000000002"));
    assert_eq!(posts[0].text, "second");
    assert!(posts[0].sensitive);
    assert_eq!(posts[0].metrics.likes, 10);
    assert_eq!(posts[0].metrics.retweets, 3);
    assert_eq!(posts[0].metrics.replies, 2);
    assert_eq!(
        posts[0].created_at.map(|t| t.to_rfc3339()),
        Some("2024-07-01T12:30:00+00:00".to_string())
    );
    assert_eq!(posts[1].id.as_str(), "1800000000000000001");
}

#[test]
fn timeline_errors_without_data_fail() {
    let body = r#"{"errors": [{"title": "Authorization Error", "detail": "Sorry, you are not authorized to see the user with id: [42].", "type": "https://api.twitter.com/2/problems/not-authorized-for-resource"}]}"#;
    let err = decode_timeline(200, body).unwrap_err();
    assert!(err.to_string().contains("Authorization Error"));
}

#[test]
fn timeline_non_success_status_fails() {
    assert!(decode_timeline(503, "upstream unavailable").is_err());
}

#[test]
fn timeline_malformed_body_fails() {
    assert!(decode_timeline(200, "not json").is_err());
}

// ============================================================
// Handle input
// ============================================================

#[test]
fn handle_strips_at_and_whitespace() {
    assert_eq!(normalize_handle("  @jack \n").unwrap(), "jack");
    assert_eq!(normalize_handle("under_score_99").unwrap(), "under_score_99");
}

#[test]
fn handle_rejects_empty_and_bad_characters() {
    assert!(normalize_handle("").is_err());
    assert!(normalize_handle("   ").is_err());
    assert!(normalize_handle("bad-handle").is_err());
    assert!(normalize_handle("@@double").is_err());
}
