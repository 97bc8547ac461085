//! Network actor - runs catalog jobs in the Tokio runtime

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::constants::TIMELINE_SCAN_LIMIT;
use crate::error::ApiResult;
use crate::messages::network::{FetchError, HomeSource};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::MangaWithChapters;
use crate::network::cancel::{cancel_pair, CancelHandle, CancelToken};
use crate::network::client::MangaClient;
use crate::network::feeds;

/// Network actor that turns commands into jobs, one task per request id
pub struct NetworkActor {
    client: Arc<MangaClient>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, CancelHandle>,
}

/// Cancelled jobs report through `Cancelled`, not through their result channel.
fn into_response<T>(
    result: ApiResult<T>,
    wrap: impl FnOnce(Result<T, FetchError>) -> NetworkResponse,
) -> Option<NetworkResponse> {
    match result {
        Err(e) if e.is_cancelled() => None,
        other => Some(wrap(other.map_err(FetchError::from))),
    }
}

async fn run_listing(
    client: &MangaClient,
    source: HomeSource,
    limit: u32,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    match source {
        HomeSource::Latest => feeds::latest_updates(client, limit, cancel).await,
        HomeSource::Timeline => {
            feeds::recent_timeline(client, TIMELINE_SCAN_LIMIT, limit as usize, cancel).await
        }
        HomeSource::Popular => feeds::popular(client, limit, cancel).await,
        HomeSource::Search(title) => feeds::search_titles(client, &title, cancel).await,
    }
}

impl NetworkActor {
    pub fn new(client: Arc<MangaClient>, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Registers a cancel handle for `id` and spawns `job` with its token.
    fn spawn<F, Fut>(&mut self, id: u64, job: F)
    where
        F: FnOnce(Arc<MangaClient>, CancelToken) -> Fut,
        Fut: std::future::Future<Output = Option<NetworkResponse>> + Send + 'static,
    {
        let (handle, token) = cancel_pair();
        self.cancel_handles.insert(id, handle);

        let response_tx = self.response_tx.clone();
        let fut = job(Arc::clone(&self.client), token);
        self.active_requests.spawn(async move {
            if let Some(response) = fut.await {
                let _ = response_tx.send(response);
            }
            id
        });
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::LoadListing { id, source, limit }) => {
                            tracing::info!(id, source = %source.label(), limit, "Loading listing");
                            self.spawn(id, move |client, cancel| async move {
                                let result = run_listing(&client, source, limit, &cancel).await;
                                into_response(result, |result| NetworkResponse::Listing { id, result })
                            });
                        }

                        Some(NetworkCommand::LoadManga { id, manga_id }) => {
                            tracing::info!(id, %manga_id, "Loading manga");
                            self.spawn(id, move |client, cancel| async move {
                                let result = feeds::manga_details(&client, &manga_id, &cancel).await;
                                into_response(result, |result| NetworkResponse::Manga { id, result })
                            });
                        }

                        Some(NetworkCommand::LoadChapter { id, chapter_id, manga_id }) => {
                            tracing::info!(id, %chapter_id, "Loading chapter");
                            self.spawn(id, move |client, cancel| async move {
                                let result = feeds::chapter_view(
                                    &client,
                                    &chapter_id,
                                    manga_id.as_deref(),
                                    &cancel,
                                ).await;
                                into_response(result, |result| NetworkResponse::Chapter { id, result })
                            });
                        }

                        Some(NetworkCommand::ProbePage { id, url }) => {
                            self.spawn(id, move |client, cancel| async move {
                                match client.probe_image(&url, &cancel).await {
                                    Err(e) if e.is_cancelled() => None,
                                    Err(e) => {
                                        tracing::warn!(id, %url, error = %e, "Page image unavailable");
                                        Some(NetworkResponse::PageProbe { id, ok: false })
                                    }
                                    Ok(()) => Some(NetworkResponse::PageProbe { id, ok: true }),
                                }
                            });
                        }

                        Some(NetworkCommand::Cancel(id)) => {
                            if let Some(handle) = self.cancel_handles.remove(&id) {
                                tracing::debug!(id, "Cancelling request");
                                handle.cancel();
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) => {
                            // Cancel all active requests
                            for (_, handle) in self.cancel_handles.drain() {
                                handle.cancel();
                            }
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Ok(id) = result {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }
    }
}
