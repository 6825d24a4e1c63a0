use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use shared::domain::Pubkey;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use tokio::net::TcpListener;

use crate::{
    rpc::SolanaRpc,
    transport::{ChainTransport, TransportError},
};

#[derive(Clone, Default)]
struct MockCluster {
    calls: Arc<Mutex<Vec<Value>>>,
    account: Arc<Mutex<Option<Value>>>,
    fail_with: Arc<Mutex<Option<(i64, String)>>>,
}

fn blockhash() -> Hash {
    Hash::new_from_array([3u8; 32])
}

async fn handle(State(cluster): State<MockCluster>, Json(request): Json<Value>) -> Json<Value> {
    cluster.calls.lock().expect("calls").push(request.clone());
    let id = request["id"].clone();

    if let Some((code, message)) = cluster.fail_with.lock().expect("fail").clone() {
        return Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}}));
    }

    let result = match request["method"].as_str().unwrap_or_default() {
        "getAccountInfo" => {
            json!({"context": {"slot": 1}, "value": cluster.account.lock().expect("account").clone()})
        }
        "getLatestBlockhash" => json!({
            "context": {"slot": 1},
            "value": {"blockhash": blockhash().to_string(), "lastValidBlockHeight": 100}
        }),
        "getVersion" => json!({"solana-core": "3.0.0", "feature-set": 0}),
        other => panic!("unexpected rpc method {other}"),
    };
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

async fn spawn_cluster(cluster: MockCluster) -> String {
    let app = Router::new().route("/", post(handle)).with_state(cluster);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn get_account_decodes_payload_and_owner_at_processed() {
    let cluster = MockCluster::default();
    let owner = Pubkey::new_from_array([5u8; 32]);
    *cluster.account.lock().expect("account") = Some(json!({
        "data": [STANDARD.encode([1u8, 2, 3]), "base64"],
        "owner": owner.to_string(),
        "lamports": 42,
        "executable": false,
        "rentEpoch": 0,
        "space": 3
    }));
    let url = spawn_cluster(cluster.clone()).await;

    let client = SolanaRpc::new(url, CommitmentConfig::processed());
    let account = client
        .get_account(&Pubkey::new_from_array([1u8; 32]))
        .await
        .expect("rpc ok")
        .expect("account exists");

    assert_eq!(account.data, vec![1, 2, 3]);
    assert_eq!(account.owner, owner);
    assert_eq!(account.lamports, 42);

    let calls = cluster.calls.lock().expect("calls");
    let lookup = calls
        .iter()
        .find(|call| call["method"] == "getAccountInfo")
        .expect("getAccountInfo sent");
    assert_eq!(lookup["params"][0], Pubkey::new_from_array([1u8; 32]).to_string());
    assert_eq!(lookup["params"][1]["commitment"], "processed");
}

#[tokio::test]
async fn missing_account_is_none_not_an_error() {
    let cluster = MockCluster::default();
    let url = spawn_cluster(cluster).await;

    let client = SolanaRpc::new(url, CommitmentConfig::processed());
    let account = client
        .get_account(&Pubkey::new_from_array([1u8; 32]))
        .await
        .expect("rpc ok");
    assert!(account.is_none());
}

#[tokio::test]
async fn latest_blockhash_is_parsed() {
    let cluster = MockCluster::default();
    let url = spawn_cluster(cluster).await;

    let client = SolanaRpc::new(url, CommitmentConfig::processed());
    assert_eq!(client.latest_blockhash().await.expect("blockhash"), blockhash());
    assert_eq!(client.commitment(), CommitmentConfig::processed());
}

#[tokio::test]
async fn rpc_error_object_is_surfaced_with_its_code() {
    let cluster = MockCluster::default();
    *cluster.fail_with.lock().expect("fail") = Some((-32005, "node is behind".to_string()));
    let url = spawn_cluster(cluster).await;

    let client = SolanaRpc::new(url, CommitmentConfig::processed());
    let err = client
        .get_account(&Pubkey::new_from_array([1u8; 32]))
        .await
        .expect_err("rpc error");
    match err {
        TransportError::Rpc { code, message } => {
            assert_eq!(code, -32005);
            assert!(message.contains("node is behind"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_cluster_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = SolanaRpc::new(format!("http://{addr}/"), CommitmentConfig::processed());
    let err = client.latest_blockhash().await.expect_err("connection refused");
    assert!(matches!(err, TransportError::Unavailable(_)), "{err:?}");
    assert!(err.to_string().starts_with("cluster unavailable"));
}
