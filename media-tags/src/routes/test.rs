use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt as _;
use tracing::level_filters::LevelFilter;
use uuid::Uuid;

use crate::config::{Config, LogLevel};
use crate::database::{connect_in_memory, Database};

const BOUNDARY: &str = "media-tags-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

struct TestApp {
	router: Router,
	database: Database,
	storage: tempfile::TempDir,
}

async fn test_app() -> TestApp {
	let storage = tempfile::tempdir().expect("creating storage directory");
	let config = Config {
		address: ([127, 0, 0, 1], 0).into(),
		log_level: LogLevel {
			internal: LevelFilter::OFF,
			external: LevelFilter::OFF,
		},
		database_url: "sqlite::memory:".to_owned(),
		max_connections: 1,
		file_storage: storage.path().to_owned(),
		file_url_prefix: "/files/".to_owned(),
	};
	let database = connect_in_memory().await;
	let router = super::app(database.clone(), Arc::new(config));
	TestApp {
		router,
		database,
		storage,
	}
}

impl TestApp {
	async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
		let response = self
			.router
			.clone()
			.oneshot(request)
			.await
			.expect("routing request");
		let status = response.status();
		let bytes = hyper::body::to_bytes(response.into_body())
			.await
			.expect("reading body");
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).expect("JSON body")
		};
		(status, body)
	}

	async fn get(&self, uri: &str) -> (StatusCode, Value) {
		let request = Request::builder()
			.uri(uri)
			.body(Body::empty())
			.expect("building request");
		self.send(request).await
	}

	async fn create_tag(&self, name: &str) -> Uuid {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/tags")
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(json!({ "name": name }).to_string()))
			.expect("building request");
		let (status, body) = self.send(request).await;
		assert_eq!(status, StatusCode::CREATED, "{body}");
		body["id"]
			.as_str()
			.and_then(|id| id.parse().ok())
			.expect("tag ID")
	}

	async fn upload(&self, parts: &[Part<'_>]) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/media")
			.header(
				header::CONTENT_TYPE,
				format!("multipart/form-data; boundary={BOUNDARY}"),
			)
			.body(Body::from(multipart_body(parts)))
			.expect("building request");
		self.send(request).await
	}

	fn stored_files(&self) -> Vec<String> {
		std::fs::read_dir(self.storage.path())
			.expect("listing storage")
			.map(|entry| {
				entry
					.expect("reading storage entry")
					.file_name()
					.to_string_lossy()
					.into_owned()
			})
			.collect()
	}
}

enum Part<'a> {
	Text(&'a str, &'a str),
	File {
		content_type: &'a str,
		content: &'a [u8],
	},
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
	let mut body = Vec::new();
	for part in parts {
		body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
		match part {
			Part::Text(name, value) => {
				body.extend_from_slice(
					format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
						.as_bytes(),
				);
			}
			Part::File {
				content_type,
				content,
			} => {
				body.extend_from_slice(
					format!("Content-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n")
						.as_bytes(),
				);
				body.extend_from_slice(content);
			}
		}
		body.extend_from_slice(b"\r\n");
	}
	body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
	body
}

fn png() -> Part<'static> {
	Part::File {
		content_type: "image/png",
		content: PNG,
	}
}

#[tokio::test]
async fn tags_are_created_listed_and_fetched() {
	let app = test_app().await;
	let first = app.create_tag("holiday").await;
	let second = app.create_tag("work").await;

	let (status, body) = app.get("/tags").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		body,
		json!([
			{ "id": first, "name": "holiday" },
			{ "id": second, "name": "work" },
		])
	);

	let (status, body) = app.get(&format!("/tags/{second}")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "id": second, "name": "work" }));
}

#[tokio::test]
async fn unknown_tag_is_not_found() {
	let app = test_app().await;
	let id = Uuid::new_v4();

	let (status, body) = app.get(&format!("/tags/{id}")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], format!("record with ID {{{id}}} not found"));
}

#[tokio::test]
async fn malformed_tag_id_is_a_bad_request() {
	let app = test_app().await;

	let (status, body) = app.get("/tags/nope").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "invalid value supplied {nope}, expected a UUID");
}

#[tokio::test]
async fn tag_creation_requires_a_name() {
	let app = test_app().await;

	for payload in ["{}", r#"{"name": "  "}"#] {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/tags")
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(payload))
			.expect("building request");
		let (status, body) = app.send(request).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
		assert_eq!(body["error"], "required value name missing");
	}
}

#[tokio::test]
async fn malformed_tag_body_is_a_bad_request() {
	let app = test_app().await;
	let request = Request::builder()
		.method(Method::POST)
		.uri("/tags")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from("{\"name\": "))
		.expect("building request");

	let (status, body) = app.send(request).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"].is_string());
}

#[tokio::test]
async fn deleted_tag_is_gone() {
	let app = test_app().await;
	let id = app.create_tag("temporary").await;

	let request = Request::builder()
		.method(Method::DELETE)
		.uri(format!("/tags/{id}"))
		.body(Body::empty())
		.expect("building request");
	let (status, _) = app.send(request).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = app.get(&format!("/tags/{id}")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
	let app = test_app().await;

	let (status, body) = app.get("/nowhere").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert!(body["error"].is_string());
}

#[tokio::test]
async fn media_upload_stores_file_and_tags() {
	let app = test_app().await;
	let first = app.create_tag("TestTag1").await;
	let second = app.create_tag("TestTag2").await;

	let tags = format!("{first},{second}");
	let (status, body) = app
		.upload(&[png(), Part::Text("name", "beach"), Part::Text("tags", &tags)])
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");

	let id = body["id"].as_str().expect("media ID");
	assert_eq!(body["name"], "beach");
	assert_eq!(body["tags"], json!(["TestTag1", "TestTag2"]));
	assert_eq!(body["fileUrl"], format!("/files/{id}.png"));

	let stored = std::fs::read(app.storage.path().join(format!("{id}.png"))).expect("stored file");
	assert_eq!(stored, PNG);
	assert_eq!(app.stored_files(), [format!("{id}.png")]);

	let (status, fetched) = app.get(&format!("/media/{id}")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(fetched, body);
}

#[tokio::test]
async fn media_upload_accepts_repeated_tag_fields() {
	let app = test_app().await;
	let first = app.create_tag("a").await;
	let second = app.create_tag("b").await;

	let (first, second) = (first.to_string(), second.to_string());
	let (status, body) = app
		.upload(&[
			Part::Text("tags[]", &first),
			Part::Text("tags[]", &second),
			png(),
		])
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn media_upload_rejects_non_images() {
	let app = test_app().await;

	let (status, body) = app
		.upload(&[
			Part::Text("name", "notes"),
			Part::File {
				content_type: "text/plain",
				content: b"hello",
			},
		])
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(
		body["error"],
		"invalid file type for uploaded file, expected image"
	);
	assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn media_upload_requires_a_file() {
	let app = test_app().await;

	let (status, body) = app.upload(&[Part::Text("name", "nothing")]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "required value file missing");

	let request = Request::builder()
		.method(Method::POST)
		.uri("/media")
		.body(Body::empty())
		.expect("building request");
	let (status, body) = app.send(request).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "required value file missing");
}

#[tokio::test]
async fn media_upload_rejects_unknown_tags() {
	let app = test_app().await;
	let known = app.create_tag("known").await;
	let unknown = Uuid::new_v4();

	let tags = format!("{known},{unknown}");
	let (status, body) = app.upload(&[png(), Part::Text("tags", &tags)]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(
		body["error"],
		format!("tags with the following IDs could not be found: {unknown}")
	);
	assert!(app.stored_files().is_empty());

	let (_, listed) = app.get("/media").await;
	assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn stored_file_extension_comes_from_known_subtypes() {
	let app = test_app().await;

	let (status, body) = app
		.upload(&[Part::File {
			content_type: "image/svg+xml",
			content: b"<svg/>",
		}])
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	let id = body["id"].as_str().expect("media ID");
	assert_eq!(body["fileUrl"], format!("/files/{id}.svg"));
	assert_eq!(app.stored_files(), [format!("{id}.svg")]);
}

#[tokio::test]
async fn failed_media_insert_removes_the_stored_file() {
	let app = test_app().await;
	sqlx::query("DROP TABLE media")
		.execute(&app.database)
		.await
		.expect("dropping media table");

	let (status, body) = app.upload(&[png(), Part::Text("name", "lost")]).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, json!({ "error": "internal server error" }));
	assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn media_upload_rejects_malformed_tag_ids() {
	let app = test_app().await;

	let (status, body) = app.upload(&[png(), Part::Text("tags", "bogus")]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "invalid value supplied {bogus}, expected a UUID");
	assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn media_list_filters_by_tag_name() {
	let app = test_app().await;
	let first = app.create_tag("TestTag1").await;
	let second = app.create_tag("TestTag2").await;

	let both = format!("{first},{second}");
	let uploads = [
		("testMedia1", first.to_string()),
		("testMedia2", both),
		("untagged", String::new()),
	];
	for (name, tags) in &uploads {
		let (status, body) = app
			.upload(&[png(), Part::Text("name", name), Part::Text("tags", tags)])
			.await;
		assert_eq!(status, StatusCode::CREATED, "{body}");
	}

	let names = |body: Value| -> Vec<String> {
		body.as_array()
			.expect("media list")
			.iter()
			.map(|media| media["name"].as_str().expect("media name").to_owned())
			.collect()
	};

	let cases: [(&str, &[&str]); 5] = [
		("/media", &["testMedia1", "testMedia2", "untagged"]),
		("/media?tag=", &["testMedia1", "testMedia2", "untagged"]),
		("/media?tag=TestTag1", &["testMedia1", "testMedia2"]),
		("/media?tag=TestTag2", &["testMedia2"]),
		("/media?tag=nonExistentTag", &[]),
	];
	for (uri, expected) in cases {
		let (status, body) = app.get(uri).await;
		assert_eq!(status, StatusCode::OK, "{uri}");
		assert_eq!(names(body), expected, "{uri}");
	}
}

#[tokio::test]
async fn media_lookup_errors() {
	let app = test_app().await;
	let id = Uuid::new_v4();

	let (status, body) = app.get(&format!("/media/{id}")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], format!("record with ID {{{id}}} not found"));

	let (status, body) = app.get("/media/123").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "invalid value supplied {123}, expected a UUID");
}
