use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::{FutureExt, TryStreamExt};
use futures_util::StreamExt;
use tarpc::serde_transport::tcp;
use tarpc::server::{BaseChannel, Channel};
use tarpc::tokio_serde::formats::Json;
use tarpc::{client, context};
use tokio::net::ToSocketAddrs;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::directory::PostDirectory;
use crate::error::RpcStatus;
use crate::shared_types::*;
use crate::store::PostStore;

/// tarpc front end of a [`PostDirectory`]. Cheap to clone, one clone per
/// channel.
pub struct PostServer<S> {
    directory: PostDirectory<S>,
}

impl<S> Clone for PostServer<S> {
    fn clone(&self) -> Self {
        Self { directory: self.directory.clone() }
    }
}

impl<S: PostStore> PostServer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { directory: PostDirectory::new(store) }
    }
}

impl<S: PostStore> PostService for PostServer<S> {
    // Need to define the future types for tarpc
    type GetPostsFut = BoxFuture<'static, Result<Vec<Post>, RpcStatus>>;
    type ReadPostFut = BoxFuture<'static, Result<Post, RpcStatus>>;
    type UpdatePostFut = BoxFuture<'static, Result<Post, RpcStatus>>;
    type DeletePostFut = BoxFuture<'static, Result<DeletePostResponse, RpcStatus>>;

    // Calls are unary, so the stream is drained here; its first error fails
    // the whole call and nothing already read is sent.
    fn get_posts(self, _: context::Context, _: GetPostsRequest) -> Self::GetPostsFut {
        let posts = self.directory.stream_all();
        async move { posts.try_collect::<Vec<Post>>().await.map_err(RpcStatus::from) }.boxed()
    }

    fn read_post(self, _: context::Context, req: ReadPostRequest) -> Self::ReadPostFut {
        async move {
            self.directory
                .read_one(&req.post_id)
                .await
                .map_err(RpcStatus::from)
        }
        .boxed()
    }

    fn update_post(self, _: context::Context, req: UpdatePostRequest) -> Self::UpdatePostFut {
        async move {
            let Post { id, owner_id, title, body } = req.post;
            self.directory
                .update_post(&id, owner_id, title, body)
                .await
                .map_err(RpcStatus::from)
        }
        .boxed()
    }

    fn delete_post(self, _: context::Context, req: DeletePostRequest) -> Self::DeletePostFut {
        async move {
            let post_id = self
                .directory
                .delete_post(&req.post_id)
                .await
                .map_err(RpcStatus::from)?;
            Ok(DeletePostResponse { post_id })
        }
        .boxed()
    }
}

/// Bind the JSON-over-TCP listener and return its local address with the
/// accept loop.
///
/// Every channel runs on its own task until the client goes away or
/// `shutdown` changes; on shutdown the in-flight calls are dropped, which
/// releases any open store cursor.
pub async fn serve_tcp<S: PostStore>(
    addr: impl ToSocketAddrs,
    server: PostServer<S>,
    shutdown: watch::Receiver<bool>,
) -> io::Result<(SocketAddr, impl Future<Output = ()>)> {
    let mut listener = tcp::listen(addr, Json::default).await?;
    // A listing is one response frame.
    listener.config_mut().max_frame_length(usize::MAX);
    let local_addr = listener.local_addr();

    let serving = listener
        // Ignore accept errors.
        .filter_map(|r| {
            if let Err(err) = &r {
                warn!(error = %err, "accept failed");
            }
            future::ready(r.ok())
        })
        .map(BaseChannel::with_defaults)
        .for_each(move |channel| {
            let peer = channel.transport().peer_addr().ok();
            info!(?peer, "client connected");
            let fut = channel.execute(server.clone().serve());
            let mut stop = shutdown.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = fut => info!(?peer, "client disconnected"),
                    _ = stop.changed() => info!(?peer, "closing channel for shutdown"),
                }
            });
            future::ready(())
        });
    Ok((local_addr, serving))
}

/// Open a client over JSON-over-TCP with the same frame limit as the server.
pub async fn connect(addr: impl ToSocketAddrs + Send + 'static) -> io::Result<PostServiceClient> {
    let mut transport = tcp::connect(addr, Json::default);
    transport.config_mut().max_frame_length(usize::MAX);
    let transport = transport.await?;
    Ok(PostServiceClient::new(client::Config::default(), transport).spawn())
}
