use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::LoadFailure;

/// Asset reader trait.
/// Supports asynchronous reads from local files and network sources.
pub trait AssetReader: Send + Sync {
    /// Reads the raw bytes behind a logical asset path.
    fn read_bytes(
        &self,
        uri: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, LoadFailure>> + Send;
}

impl<R: AssetReader> AssetReader for Arc<R> {
    fn read_bytes(
        &self,
        uri: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, LoadFailure>> + Send {
        (**self).read_bytes(uri)
    }
}

/// Local file reader.
///
/// Logical paths such as `/models/cabinet.glb` are served from the root
/// directory, mirroring how a web bundle resolves them against its origin.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[must_use]
    pub fn resolve(&self, uri: &str) -> PathBuf {
        self.root_path.join(uri.trim_start_matches('/'))
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, LoadFailure> {
        let path = self.resolve(uri);
        let data = tokio::fs::read(&path).await?;
        Ok(data)
    }
}

/// HTTP network reader (conditional compilation).
#[cfg(feature = "http")]
pub struct HttpAssetReader {
    root_url: url::Url,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    pub fn new(url_str: &str) -> Result<Self, LoadFailure> {
        let url = url::Url::parse(url_str).map_err(|e| LoadFailure::Network(e.to_string()))?;
        let root_url = if url.path().ends_with('/') {
            url
        } else {
            let mut u = url.clone();
            if let Ok(mut segments) = u.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
            u
        };
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, LoadFailure> {
        // Logical paths are origin-relative, so strip the leading slash and
        // keep the root URL's directory.
        let url = self
            .root_url
            .join(uri.trim_start_matches('/'))
            .map_err(|e| LoadFailure::Network(e.to_string()))?;
        let request = ehttp::Request::get(url.as_str());
        let response = ehttp::fetch_async(request)
            .await
            .map_err(LoadFailure::Network)?;
        if !response.ok {
            return Err(LoadFailure::Http {
                status: response.status,
            });
        }
        Ok(response.bytes)
    }
}

/// Reader chosen from a source string.
/// An enum instead of a trait object keeps `AssetReader` statically dispatched.
#[derive(Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    #[cfg(feature = "http")]
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Creates a reader for a directory path or an `http(s)://` base URL.
    pub fn from_source(source: &str) -> Result<Self, LoadFailure> {
        if is_remote(source) {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Arc::new(HttpAssetReader::new(source)?)))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(LoadFailure::FeatureNotEnabled(
                    "HTTP feature is not enabled. Enable it with `features = [\"http\"]`"
                        .to_string(),
                ))
            }
        } else {
            Ok(Self::File(Arc::new(FileAssetReader::new(source))))
        }
    }
}

impl AssetReader for AssetReaderVariant {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, LoadFailure> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolves `relative` against the directory of `base`.
///
/// Used for glTF external buffers and images, which are addressed relative
/// to the model file.
#[must_use]
pub fn sibling_uri(base: &str, relative: &str) -> String {
    if relative.starts_with('/') || is_remote(relative) {
        return relative.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], relative),
        None => relative.to_string(),
    }
}
