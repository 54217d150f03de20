use crate::config::ScraperConfig;
use crate::error::Result;
use crate::results::{Download, DownloadOutcome};
use crate::utils::{filename_from_url, split_extension};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Write buffer size for streamed image bodies
const CHUNK_SIZE: usize = 8192;

/// Downloads image references into a destination directory.
///
/// Every reference yields exactly one [`Download`]; HTTP and transport
/// failures are recorded in its outcome and never stop the batch.
pub struct RetrievalPipeline {
    client: Client,
    destination: PathBuf,
    default_extension: String,
    max_concurrency: usize,
}

impl RetrievalPipeline {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.request_timeout());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            client: builder.build()?,
            destination: config.destination_dir.clone(),
            default_extension: config.default_extension.trim_start_matches('.').to_string(),
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Fetches every reference once and writes successful bodies to disk.
    ///
    /// The destination directory is created first. Repeated URLs in
    /// `references` are skipped. With `max_concurrency > 1` downloads overlap
    /// and the returned order follows completion, not input.
    pub async fn retrieve<I>(&self, references: I) -> Result<Vec<Download>>
    where
        I: IntoIterator<Item = String>,
    {
        tokio::fs::create_dir_all(&self.destination).await?;

        let namer = FileNamer::new(&self.destination, &self.default_extension);
        let mut seen = HashSet::new();

        // Dispatch is sequential, so the seen check holds under concurrent fetches
        let pending = references.into_iter().filter(move |url| {
            if seen.insert(url.clone()) {
                true
            } else {
                ::log::trace!("Skipping already dispatched: {}", url);
                false
            }
        });

        let downloads = stream::iter(pending)
            .map(|url| {
                let namer = &namer;
                async move {
                    let outcome = self.fetch(&url, namer).await;
                    match &outcome {
                        DownloadOutcome::Success(path) => {
                            ::log::info!("Downloaded {} -> {}", url, path.display())
                        }
                        failure => ::log::warn!("Failed {}: {}", url, failure),
                    }
                    Download::new(url, outcome)
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(downloads)
    }

    async fn fetch(&self, url: &str, namer: &FileNamer) -> DownloadOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return DownloadOutcome::TransportError(describe_error(&e)),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return DownloadOutcome::HttpFailure(status.as_u16());
        }

        let path = namer.claim(url).await;
        match write_body(response, &path).await {
            Ok(()) => DownloadOutcome::Success(path),
            Err(reason) => {
                // Don't leave a truncated image behind
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    ::log::debug!("Could not remove partial {}: {}", path.display(), e);
                }
                DownloadOutcome::TransportError(reason)
            }
        }
    }
}

/// Streams the response body into `path` chunk by chunk
async fn write_body(mut response: Response, path: &Path) -> std::result::Result<(), String> {
    let file = File::create(path)
        .await
        .map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    while let Some(chunk) = response.chunk().await.map_err(|e| describe_error(&e))? {
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
    }

    writer
        .flush()
        .await
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timeout: {}", error)
    } else if error.is_connect() {
        format!("connection error: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("body error: {}", error)
    } else {
        format!("request error: {}", error)
    }
}

/// Hands out distinct file names within one run.
///
/// Names taken from the URL get a `_2`, `_3`... suffix on collision.
/// Synthesized `image_<n>` names use their own counter, independent of how
/// many URLs have been seen.
struct FileNamer {
    dir: PathBuf,
    default_extension: String,
    state: Mutex<NameState>,
}

#[derive(Default)]
struct NameState {
    // Lowercased, so case-insensitive filesystems don't merge files
    taken: HashSet<String>,
    synthesized: usize,
}

impl FileNamer {
    fn new(dir: &Path, default_extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            default_extension: default_extension.to_string(),
            state: Mutex::new(NameState::default()),
        }
    }

    async fn claim(&self, url: &str) -> PathBuf {
        let mut state = self.state.lock().await;

        let name = match filename_from_url(url) {
            Some(name) => state.unique_variant(&name),
            None => loop {
                state.synthesized += 1;
                let candidate = format!("image_{}.{}", state.synthesized, self.default_extension);
                if !state.is_taken(&candidate) {
                    break candidate;
                }
            },
        };

        state.taken.insert(name.to_lowercase());
        self.dir.join(name)
    }
}

impl NameState {
    fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    fn unique_variant(&self, name: &str) -> String {
        if !self.is_taken(name) {
            return name.to_string();
        }

        let (stem, extension) = split_extension(name);
        let mut n = 2;
        loop {
            let candidate = match extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
