use std::sync::Arc;

use tarpc::context;
use tokio::sync::watch;

use post_directory::rpc::{connect, serve_tcp};
use post_directory::store::memory::MemoryPostStore;
use post_directory::*;

async fn start(store: Arc<MemoryPostStore>) -> (PostServiceClient, watch::Sender<bool>) {
    let (stop_tx, stop_rx) = watch::channel(false);
    let (addr, serving) = serve_tcp(("127.0.0.1", 0), PostServer::new(store), stop_rx)
        .await
        .unwrap();
    tokio::spawn(serving);
    let client = connect(addr).await.unwrap();
    (client, stop_tx)
}

#[tokio::test]
async fn large_listing_arrives_in_full() {
    let store = Arc::new(MemoryPostStore::new());
    let body = "x".repeat(100 * 1024);
    for i in 0..100 {
        store.insert(&format!("u{i}"), "t", &body);
    }
    let (client, _stop) = start(store).await;

    let posts = client
        .get_posts(context::current(), GetPostsRequest {})
        .await
        .unwrap()
        .unwrap();
    assert_eq!(posts.len(), 100);
    assert!(posts.iter().all(|p| p.body.len() == body.len()));
}

#[tokio::test]
async fn read_and_delete_over_tcp() {
    let store = Arc::new(MemoryPostStore::new());
    let a = store.insert("u1", "t", "b");
    let id = a.id.to_hex();
    let (client, _stop) = start(store).await;

    let post = client
        .read_post(context::current(), ReadPostRequest { post_id: id.clone() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post, Post::from(a));

    let resp = client
        .delete_post(context::current(), DeletePostRequest { post_id: id.clone() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resp.post_id, id);
}

#[tokio::test]
async fn shutdown_closes_open_channels() {
    let store = Arc::new(MemoryPostStore::new());
    let a = store.insert("u1", "t", "b");
    let (client, stop) = start(store).await;

    let req = ReadPostRequest { post_id: a.id.to_hex() };
    client.read_post(context::current(), req.clone()).await.unwrap().unwrap();

    stop.send(true).unwrap();
    assert!(client.read_post(context::current(), req).await.is_err());
}
