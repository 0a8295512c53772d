use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use supplyhub_infra::InfraConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, bound to an ephemeral port.
        let ops = supplyhub_api::app::build_operations(&InfraConfig::default())
            .await
            .expect("failed to build operations");
        let app = supplyhub_api::app::build_app(ops);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn supplier_body(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "username": "paprika1",
        "manager": { "name": "Peter", "email": "peter@acme.de", "salary": 4200 },
        "deliveries": [ { "article": "Gold" }, { "article": "Silver" } ]
    })
}

/// POST a supplier and return its location and ETag.
async fn create(client: &reqwest::Client, server: &TestServer, body: &Value) -> (String, String) {
    let res = client
        .post(server.url("/suppliers"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let location = res.headers()[header::LOCATION].to_str().unwrap().to_string();
    let etag = res.headers()[header::ETAG].to_str().unwrap().to_string();
    let created: Value = res.json().await.unwrap();
    assert_eq!(location, format!("/suppliers/{}", created["id"].as_str().unwrap()));
    (location, etag)
}

fn problem_type(body: &Value) -> &str {
    body["type"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_read_with_etag() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (location, etag) = create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
    assert_eq!(etag, "\"0\"");

    let res = client.get(server.url(&location)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::ETAG], "\"0\"");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Paprika");
    assert_eq!(body["version"], 0);
    assert_eq!(body["manager"]["name"], "Peter");
    assert_eq!(body["deliveries"][1]["article"], "Silver");

    let res = client
        .get(server.url(&location))
        .header(header::IF_NONE_MATCH, "\"0\"")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/suppliers/0191a5d2-0000-7000-8000-000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(problem_type(&body), "/problem/notFound");

    let res = client.get(server.url("/suppliers/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_by_criteria() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
    create(&client, &server, &supplier_body("Pfeffer", "info@pfeffer.de")).await;

    let res = client.get(server.url("/suppliers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let res = client
        .get(server.url("/suppliers?name=PAP"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Paprika");

    let res = client
        .get(server.url("/suppliers?name=p&email=info@pf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"][0]["name"], "Pfeffer");

    for query in ["name=zzz", "color=red", "name=a&name=b"] {
        let res = client
            .get(server.url(&format!("/suppliers?{query}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "query {query}");
    }
}

#[tokio::test]
async fn names_by_prefix() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
    create(&client, &server, &supplier_body("Papaya", "info@papaya.de")).await;
    create(&client, &server, &supplier_body("Papaya", "sales@papaya.de")).await;

    let res = client
        .get(server.url("/suppliers/names/pa"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let names: Vec<String> = res.json().await.unwrap();
    assert_eq!(names, ["Papaya", "Paprika"]);

    let res = client
        .get(server.url("/suppliers/names/x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_bad_bodies_and_invalid_suppliers() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/suppliers"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(problem_type(&body), "/problem/badRequest");

    let mut invalid = supplier_body("paprika", "not-an-email");
    invalid["manager"]["salary"] = json!(-5);
    let res = client
        .post(server.url("/suppliers"))
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
    let res = client
        .post(server.url("/suppliers"))
        .json(&supplier_body("Wurst", "info@paprika.de"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("info@paprika.de"));
}

#[tokio::test]
async fn update_follows_the_if_match_protocol() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (location, etag) = create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
    let changed = supplier_body("Pfeffer", "info@pfeffer.de");

    let res = client
        .put(server.url(&location))
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_REQUIRED);

    let res = client
        .put(server.url(&location))
        .header(header::IF_MATCH, "0")
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    let res = client
        .put(server.url(&location))
        .header(header::IF_MATCH, &etag)
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()[header::ETAG], "\"1\"");

    // the old tag is stale now
    let res = client
        .put(server.url(&location))
        .header(header::IF_MATCH, &etag)
        .json(&supplier_body("Wurst", "info@wurst.de"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    let res = client
        .put(server.url(&location))
        .header(header::IF_MATCH, "\"1\"")
        .json(&supplier_body("wurst", "info@wurst.de"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client.get(server.url(&location)).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Pfeffer");
    assert_eq!(body["email"], "info@pfeffer.de");
    assert_eq!(body["version"], 1);
    // update never touches the manager or deliveries
    assert_eq!(body["deliveries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn update_of_unknown_supplier_is_not_found() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/suppliers/0191a5d2-0000-7000-8000-000000000000"))
        .header(header::IF_MATCH, "\"0\"")
        .json(&supplier_body("Paprika", "info@paprika.de"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (location, _) = create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;

    for _ in 0..2 {
        let res = client.delete(server.url(&location)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
    let res = client.delete(server.url("/suppliers/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(server.url(&location)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // the email is free again
    create(&client, &server, &supplier_body("Paprika", "info@paprika.de")).await;
}
