use std::{
    fs, io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::annotation::{AnnotateError, AnnotationRequest, AnnotationTree, Annotator};

/// Stores annotation results on disk, keyed by the request content.
///
/// Identical requests are answered from the cache without calling the inner
/// annotator. A cache that cannot be read or written is skipped with a
/// warning; it never fails an annotation.
#[derive(Debug)]
pub struct CachingAnnotator<A> {
    inner: A,
    directory: PathBuf,
}

impl<A: Annotator> CachingAnnotator<A> {
    /// Wraps `inner`, caching results in `directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(inner: A, directory: impl Into<PathBuf>) -> io::Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { inner, directory })
    }

    /// The cache directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry(&self, request: &AnnotationRequest) -> PathBuf {
        let hash = Sha256::digest(request.to_xml().as_bytes());
        self.directory.join(format!("{hash:x}.json"))
    }
}

impl<A: Annotator> Annotator for CachingAnnotator<A> {
    #[instrument(level = "debug", skip_all)]
    fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
        let path = self.entry(request);

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(tree) => {
                    debug!(path = %path.display(), "annotation cache hit");
                    return Ok(tree);
                }
                Err(error) => warn!(path = %path.display(), %error, "ignoring corrupt cache entry"),
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(path = %path.display(), %error, "failed to read cache entry"),
        }

        let tree = self.inner.annotate(request)?;

        match serde_json::to_string(&tree) {
            Ok(content) => {
                if let Err(error) = fs::write(&path, content) {
                    warn!(path = %path.display(), %error, "failed to write cache entry");
                }
            }
            Err(error) => warn!(%error, "failed to serialize annotation"),
        }

        Ok(tree)
    }
}
