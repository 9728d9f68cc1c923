use jiff::Timestamp;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio_stream::StreamExt;
use twitcasting::twitcasting_api::{
    ApiRequest, Entity, Lang, LiveSearch, Parsed, RetryPolicy, Session, Sns, SupporterSort,
    ThumbnailPosition, ThumbnailSize, WebHookEvent,
};
use twitcasting::{Authorization, ClientConfig, Error, TwitCastingClient};
use wiremock::matchers::{
    body_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        backoff_factor: Duration::from_millis(1),
        ..RetryPolicy::default()
    }
}

fn client(server: &MockServer) -> TwitCastingClient {
    client_with_retry(server, fast_retry())
}

fn client_with_retry(server: &MockServer, retry: RetryPolicy) -> TwitCastingClient {
    let config = ClientConfig::builder()
        .authorization(Authorization::bearer("tok"))
        .base_url(server.uri())
        .retry(retry)
        .build()
        .unwrap();
    TwitCastingClient::new(config).unwrap()
}

fn user_json(id: &str, screen_id: &str) -> Value {
    json!({
        "id": id,
        "screen_id": screen_id,
        "name": "ﾀﾏｺﾞ",
        "image": "http://202-234-44-53.moi.st/image3s/pbs.twimg.com/profile_images/741197539233845250/4K0dUQdu_normal.jpg",
        "profile": "Twitter: @tamago324_",
        "level": 24,
        "last_movie_id": "189037369",
        "is_live": false,
        "supporter_count": 0,
        "supporting_count": 0,
        "created": 1408883011
    })
}

fn movie_json(id: &str, user_id: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "title": "ライブ #189037369",
        "subtitle": "ライブ配信中！",
        "last_owner_comment": null,
        "category": "girls_jcjk_jp",
        "link": format!("http://twitcasting.tv/twitcasting_jp/movie/{id}"),
        "is_live": true,
        "is_recorded": false,
        "comment_count": 2124,
        "large_thumbnail": "http://202-230-12-92.twitcasting.tv/image3/image.twitcasting.tv/image55_1/39/7b/0b447b39-1.jpg",
        "small_thumbnail": "http://202-230-12-92.twitcasting.tv/image3/image.twitcasting.tv/image55_1/39/7b/0b447b39-1-s.jpg",
        "country": "jp",
        "duration": 1186,
        "created": 1438500282,
        "is_collabo": false,
        "is_protected": false,
        "max_view_count": 1675,
        "current_view_count": 20848,
        "total_view_count": 20848,
        "hls_url": "https://twitcasting.tv/twitcasting_jp/metastream.m3u8/?video=1"
    })
}

fn comment_json(id: &str, message: &str) -> Value {
    json!({
        "id": id,
        "message": message,
        "from_user": user_json("2880417757", "twitcasting_pr"),
        "created": 1479579471
    })
}

#[tokio::test]
async fn user_fixture() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .and(header("x-api-version", "2.0"))
        .and(header("accept", "application/json"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json("2756718188", "tamago324_pad"),
            "supporter_count": 10,
            "supporting_count": 24
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).get_user_info("tamago324_pad").await.unwrap();
    assert_eq!(user.id, "2756718188");
    assert_eq!(user.screen_id, "tamago324_pad");
    assert_eq!(user.created, Timestamp::from_second(1408883011).unwrap());
    assert_eq!(user.level, 24);
    assert_eq!(user.last_movie_id.as_deref(), Some("189037369"));
    // unmodeled fields are kept
    assert_eq!(user.extra["supporter_count"], json!(0));
    assert_eq!(user.raw()["created"], json!(1408883011));
}

#[tokio::test]
async fn error_object_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not Found"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/casma_jp/movies"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 1001,
                "message": "Validation error",
                "details": {"offset": ["offset must be at least 0"]}
            }
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.get_user_info("nobody").await.unwrap_err();
    let api = err.as_api().unwrap();
    assert_eq!(api.status.map(|s| s.as_u16()), Some(404));
    assert_eq!(api.code, 404);
    assert_eq!(api.message, "Not Found");
    assert_eq!(api.details, None);
    assert!(api.is_protocol_error());
    assert!(api.url.ends_with("/users/nobody"));

    let err = client.get_movies_by_user("casma_jp", 0, 20).await.unwrap_err();
    let api = err.as_api().unwrap();
    assert_eq!(api.code, 1001);
    assert_eq!(
        api.details,
        Some(json!({"offset": ["offset must be at least 0"]}))
    );
    assert!(err.to_string().starts_with("http status: 400, code: 1001 "));
}

#[tokio::test]
async fn error_without_error_object_uses_sentinel_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/html"))
        .respond_with(ResponseTemplate::new(403).set_body_raw("<html>nope</html>", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/empty"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/other"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad"})))
        .mount(&server)
        .await;

    let client = client(&server);
    for (user, status) in [("html", 403), ("empty", 401), ("other", 400)] {
        let err = client.get_user_info(user).await.unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.code, -1, "{user}");
        assert_eq!(api.status.map(|s| s.as_u16()), Some(status));
        assert!(!api.is_protocol_error());
    }
}

#[tokio::test]
async fn thumbnail_is_returned_as_bytes() {
    let png: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/twitcasting_jp/live/thumbnail"))
        .and(query_param("size", "large"))
        .and(query_param("position", "beginning"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png, "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let image = client(&server)
        .get_live_thumbnail_image(
            "twitcasting_jp",
            ThumbnailSize::Large,
            ThumbnailPosition::Beginning,
        )
        .await
        .unwrap();
    assert_eq!(image.file_ext, "png");
    assert_eq!(&image.bytes[..], png);
}

#[tokio::test]
async fn empty_and_null_bodies_are_no_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/null"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(
        client.call(ApiRequest::get("/null"), Some("user"), false).await.unwrap(),
        None
    );
    assert_eq!(
        client.call(ApiRequest::get("/empty"), None, false).await.unwrap(),
        None
    );
    // a method that promises an entity treats it as a malformed payload
    assert!(matches!(
        client.get_user_info("ghost").await,
        Err(Error::Payload { .. })
    ));
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": user_json("2756718188", "tamago324_pad")})),
        )
        .mount(&server)
        .await;

    let user = client(&server).get_user_info("tamago324_pad").await.unwrap();
    assert_eq!(user.screen_id, "tamago324_pad");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server).get_categories(Lang::Ja).await.unwrap_err();
    let api = err.as_api().unwrap();
    assert_eq!(api.status.map(|s| s.as_u16()), Some(502));
    assert_eq!(api.code, -1);
}

#[tokio::test]
async fn non_transient_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).get_categories(Lang::Ja).await.is_err());
}

#[tokio::test]
async fn posts_are_not_retried_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/movies/189037369/comments"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .post_comment("189037369", "moi!", Sns::None)
        .await
        .unwrap_err();
    assert_eq!(err.as_api().unwrap().status.map(|s| s.as_u16()), Some(500));
}

#[tokio::test]
async fn posts_are_retried_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/movies/189037369/comments"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        retry_non_idempotent: true,
        ..fast_retry()
    };
    assert!(
        client_with_retry(&server, retry)
            .post_comment("189037369", "moi!", Sns::None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn post_comment_sends_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/movies/189037369/comments"))
        .and(body_json(json!({"comment": "モイ！", "sns": "reply"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "movie_id": "189037369",
            "all_count": 2125,
            "comment": comment_json("7134775954", "モイ！")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posted = client(&server)
        .post_comment("189037369", "モイ！", Sns::Reply)
        .await
        .unwrap();
    assert_eq!(posted.movie_id, "189037369");
    assert_eq!(posted.all_count, 2125);
    assert_eq!(posted.comment.id, 7134775954);
    assert_eq!(posted.comment.message, "モイ！");
    assert_eq!(posted.comment.from_user.screen_id, "twitcasting_pr");
}

#[tokio::test]
async fn categories_parse_nested_sub_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [{
                "id": "_system_hot",
                "name": "Hot",
                "sub_categories": [
                    {"id": "girls_jcjk_jp", "name": "Girls", "count": 89},
                    null,
                    {"id": "boys_jcjk_jp", "name": "Boys", "count": 47}
                ]
            }]
        })))
        .mount(&server)
        .await;

    let categories = client(&server).get_categories(Lang::En).await.unwrap();
    assert_eq!(categories.len(), 1);
    let subs = &categories[0].sub_categories;
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].id, "girls_jcjk_jp");
    assert_eq!(subs[0].count, 89);
    assert_eq!(subs[1].name, "Boys");
}

#[tokio::test]
async fn current_live_and_follow_up_comments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/twitcasting_jp/current_live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie": movie_json("189037369", "182224938"),
            "broadcaster": user_json("182224938", "twitcasting_jp"),
            "tags": ["人気", "コンティニュー中"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/189037369/comments"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .and(query_param("slice_id", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_id": "189037369",
            "all_count": 2124,
            "comments": [comment_json("7134775954", "モイ！")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let live = client.get_current_live("twitcasting_jp").await.unwrap();
    assert_eq!(live.movie.id, "189037369");
    assert_eq!(live.movie.created, Timestamp::from_second(1438500282).unwrap());
    assert_eq!(live.broadcaster.screen_id, "twitcasting_jp");
    assert_eq!(live.tags, vec!["人気", "コンティニュー中"]);

    let comments = live.movie.comments(0, 10, Some(500)).await.unwrap();
    assert_eq!(comments.all_count, 2124);
    assert_eq!(comments.comments[0].id, 7134775954);
}

#[tokio::test]
async fn follow_up_fails_once_client_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": user_json("2756718188", "tamago324_pad")})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let user = client.get_user_info("tamago324_pad").await.unwrap();
    assert!(user.api().client().is_ok());
    drop(client);
    assert!(matches!(
        user.movies(0, 20).await,
        Err(Error::ClientDropped)
    ));
}

#[tokio::test]
async fn comments_stream_walks_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/189037369/comments"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_id": "189037369",
            "all_count": 3,
            "comments": [comment_json("3", "c"), comment_json("2", "b")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/189037369/comments"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_id": "189037369",
            "all_count": 3,
            "comments": [comment_json("1", "a")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let comments: Vec<_> = client
        .comments_stream("189037369")
        .collect::<Result<Vec<_>, _>>()
        .await
        .unwrap();
    let ids: Vec<u64> = comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn movies_stream_from_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/182224938/movies"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "movies": [movie_json("189037369", "182224938")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/twitcasting_jp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": user_json("182224938", "twitcasting_jp")})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let user = client.get_user_info("twitcasting_jp").await.unwrap();
    let movies: Vec<_> = user
        .all_movies()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .await
        .unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "ライブ #189037369");
}

#[tokio::test]
async fn supporter_list_and_support() {
    let server = MockServer::start().await;
    let mut supporter = user_json("2880417757", "twitcasting_pr");
    supporter["point"] = json!(10);
    supporter["total_point"] = json!(20);
    Mock::given(method("GET"))
        .and(path("/users/twitcasting_jp/supporters"))
        .and(query_param("sort", "new"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "supporters": [supporter]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/support"))
        .and(body_json(json!({"target_user_ids": ["casma_jp", "twitcasting_pr"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"added_count": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let list = client
        .get_supporter_list("twitcasting_jp", 0, 20, SupporterSort::New)
        .await
        .unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.users[0].point, 10);
    assert_eq!(list.users[0].total_point, 20);
    assert_eq!(list.users[0].screen_id, "twitcasting_pr");

    let added = client
        .support_user(&["casma_jp", "twitcasting_pr"])
        .await
        .unwrap();
    assert_eq!(added, 2);
}

#[tokio::test]
async fn search_live_movies_by_words() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/lives"))
        .and(query_param("type", "word"))
        .and(query_param("context", "ゲーム 雑談"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movies": [{
                "movie": movie_json("189037369", "182224938"),
                "broadcaster": user_json("182224938", "twitcasting_jp"),
                "tags": ["ゲーム"]
            }]
        })))
        .mount(&server)
        .await;

    let search = LiveSearch::Word(vec!["ゲーム".to_string(), "雑談".to_string()]);
    let found = client(&server)
        .search_live_movies(&search, 10, Lang::Ja)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].broadcaster.screen_id, "twitcasting_jp");
    assert_eq!(found[0].tags, vec!["ゲーム"]);
}

#[tokio::test]
async fn webhooks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .and(query_param("user_id", "7134775954"))
        .and(query_param_is_missing("limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "all_count": 2,
            "webhooks": [
                {"user_id": "7134775954", "event": "livestart"},
                {"user_id": "7134775954", "event": "liveend"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks"))
        .and(query_param("user_id", "7134775954"))
        .and(query_param("events[]", "livestart"))
        .and(query_param("events[]", "liveend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "7134775954",
            "removed_events": ["livestart", "liveend"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let list = client
        .get_webhook_list(50, 0, Some("7134775954"))
        .await
        .unwrap();
    assert_eq!(list.all_count, 2);
    assert_eq!(list.webhooks[1].event, "liveend");

    let removed = client
        .remove_webhook("7134775954", &[WebHookEvent::LiveStart, WebHookEvent::LiveEnd])
        .await
        .unwrap();
    assert_eq!(removed.removed_events, vec!["livestart", "liveend"]);
}

#[tokio::test]
async fn generic_call_parses_by_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verify_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "app": {"client_id": "182224938.d37f58350925d568e2db24719fe86f12", "name": "サンプルアプリケーション", "owner_user_id": "182224938"},
            "user": user_json("182224938", "twitcasting_jp")
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let parsed = client
        .call(ApiRequest::get("/verify_credentials"), Some("credentials"), false)
        .await
        .unwrap();
    let Some(Parsed::One(Entity::Credentials(credentials))) = parsed else {
        panic!("expected credentials");
    };
    assert_eq!(credentials.app.owner_user_id, "182224938");
    assert_eq!(credentials.user.screen_id, "twitcasting_jp");

    let raw = client
        .call(ApiRequest::get("/verify_credentials"), None, false)
        .await
        .unwrap();
    assert!(matches!(raw, Some(Parsed::Raw(Value::Object(_)))));
}

fn user_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"user": user_json("2756718188", "tamago324_pad")}))
}

#[tokio::test]
async fn provided_client_only_asks_for_gzip_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .and(header("accept-encoding", "identity"))
        .respond_with(user_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(user_response())
        .expect(1)
        .mount(&server)
        .await;

    for accept_encoding in [false, true] {
        let config = ClientConfig::builder()
            .base_url(server.uri())
            .session(Session::Provided(reqwest::Client::new()))
            .accept_encoding(accept_encoding)
            .build()
            .unwrap();
        let user = TwitCastingClient::new(config)
            .unwrap()
            .get_user_info("tamago324_pad")
            .await
            .unwrap();
        assert_eq!(user.screen_id, "tamago324_pad");
    }
}

#[tokio::test]
async fn connection_failures_are_retried() {
    // grab a free port and close it again, so connections to it are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}"))
        .retry(RetryPolicy {
            backoff_factor: Duration::from_millis(100),
            ..RetryPolicy::default()
        })
        .build()
        .unwrap();
    let client = TwitCastingClient::new(config).unwrap();

    let started = Instant::now();
    let err = client.get_user_info("tamago324_pad").await.unwrap_err();
    // two retries: 100ms, then 200ms
    assert!(started.elapsed() >= Duration::from_millis(300));
    let api = err.as_api().unwrap();
    assert_eq!(api.code, -1);
    assert_eq!(api.status, None);
}

#[tokio::test]
async fn timeout_bounds_each_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .respond_with(user_response().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .retry(fast_retry())
        .build()
        .unwrap();
    let client = TwitCastingClient::new(config).unwrap();

    let started = Instant::now();
    let err = client.get_user_info("tamago324_pad").await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    let api = err.as_api().unwrap();
    assert_eq!(api.code, -1);
    assert_eq!(api.status, None);
}

#[tokio::test]
async fn per_request_sessions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/tamago324_pad"))
        .respond_with(user_response())
        .expect(2)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .session(Session::PerRequest)
        .build()
        .unwrap();
    let client = TwitCastingClient::new(config).unwrap();
    for _ in 0..2 {
        let user = client.get_user_info("tamago324_pad").await.unwrap();
        assert_eq!(user.id, "2756718188");
    }
}
