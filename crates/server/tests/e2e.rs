use std::net::SocketAddr;

use configs::{AppConfig, StorageConfig};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    data_file: std::path::PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // isolated data file per test run
    let data_file = std::env::temp_dir()
        .join(format!("prizes-e2e-{}", Uuid::new_v4()))
        .join("prizes.json");
    let cfg = AppConfig {
        storage: StorageConfig { data_file: data_file.to_string_lossy().into_owned(), ..Default::default() },
        ..Default::default()
    };
    let app = server::startup::build_app(&cfg).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_file })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "file");
    Ok(())
}

#[tokio::test]
async fn e2e_prize_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let prizes = format!("{}/api/prizes", app.base_url);

    // create
    let res = c.post(&prizes)
        .json(&json!({"name": "Mug", "description": "Ceramic mug", "requiredStamps": 5}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["isRedeemed"], false);
    assert_eq!(created["image"], models::PLACEHOLDER_IMAGE);
    let id = created["id"].as_str().expect("generated id").to_string();
    assert!(Uuid::parse_str(&id).is_ok());
    let item = format!("{}/{}", prizes, id);

    // read back equals create response
    let res = c.get(&item).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    // redeem
    let res = c.patch(&item).json(&json!({"isRedeemed": true})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["isRedeemed"], true);
    assert!(updated["updatedAt"].as_str() > created["updatedAt"].as_str());

    // listed
    let list = c.get(&prizes).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(list, vec![updated.clone()]);

    // delete
    let res = c.delete(&item).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"message": "Prize deleted successfully"}));

    // gone
    let res = c.get(&item).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Prize not found"}));
    let res = c.delete(&item).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_create_rejects_out_of_range_stamps() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for stamps in [0, 101] {
        let res = c.post(format!("{}/api/prizes", app.base_url))
            .json(&json!({"name": "Mug", "description": "Ceramic mug", "requiredStamps": stamps}))
            .send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
        let body = res.json::<Value>().await?;
        assert!(body["error"].is_string());
    }
    let list = c.get(format!("{}/api/prizes", app.base_url)).send().await?.json::<Vec<Value>>().await?;
    assert!(list.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_blob_is_single_json_array_on_disk() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for name in ["Mug", "Kite"] {
        let res = c.post(format!("{}/api/prizes", app.base_url))
            .json(&json!({"name": name, "description": "x", "requiredStamps": 3, "image": "https://img.example/p.png"}))
            .send().await?;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
    }
    let raw = tokio::fs::read_to_string(&app.data_file).await?;
    let blob: Vec<Value> = serde_json::from_str(&raw)?;
    assert_eq!(blob.len(), 2);
    assert_eq!(blob[1]["name"], "Kite");
    assert_eq!(blob[0]["image"], "https://img.example/p.png");
    let _ = tokio::fs::remove_dir_all(app.data_file.parent().unwrap()).await;
    Ok(())
}
