use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec;
use crate::{Chunk, DistanceMetric, Docstore, FlatIndex, IndexError, INDEX_SCHEMA_VERSION};

/// Where a persisted index lives: `<dir>/<name>.index` and `<dir>/<name>.docstore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexLocation {
    pub dir: PathBuf,
    pub name: String,
}

impl IndexLocation {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(format!("{}.index", self.name))
    }

    pub fn docstore_path(&self) -> PathBuf {
        self.dir.join(format!("{}.docstore", self.name))
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    schema_version: u16,
    generation: Uuid,
    metric: DistanceMetric,
    dimension: usize,
    ids: Vec<String>,
    vectors: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct DocstoreArtifact {
    schema_version: u16,
    generation: Uuid,
    embedding_model: String,
    docstore: Docstore,
}

/// A flat index paired with its docstore. Immutable once built or loaded.
#[derive(Debug, Clone)]
pub struct VectorStore {
    index: FlatIndex,
    /// Position in `index` -> chunk id.
    ids: Vec<String>,
    docstore: Docstore,
    embedding_model: String,
    generation: Uuid,
}

impl VectorStore {
    pub fn new(dimension: usize, embedding_model: impl Into<String>) -> Result<Self, IndexError> {
        Ok(Self {
            index: FlatIndex::new(dimension, DistanceMetric::Euclidean)?,
            ids: Vec::new(),
            docstore: Docstore::new(),
            embedding_model: embedding_model.into(),
            generation: Uuid::new_v4(),
        })
    }

    /// Add a chunk and its vector. Ids must be unique.
    pub fn insert(&mut self, chunk: Chunk, vector: &[f32]) -> Result<(), IndexError> {
        if self.docstore.contains(&chunk.id) {
            return Err(IndexError::DuplicateId(chunk.id));
        }
        self.index.add(vector)?;
        self.docstore.insert(chunk.id.clone(), chunk.text);
        self.ids.push(chunk.id);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.docstore.get(id)
    }

    /// Chunks in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.ids.iter().map(|id| Chunk {
            id: id.clone(),
            text: self.docstore.get(id).unwrap_or_default().to_string(),
        })
    }

    /// The `k` nearest chunks to `query`, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let hits = self.index.search(query, k)?;
        hits.into_iter()
            .map(|(pos, distance)| -> Result<SearchHit, IndexError> {
                let id = &self.ids[pos];
                let text = self.docstore.get(id).ok_or_else(|| {
                    IndexError::Corrupt(format!("chunk {id} missing from docstore"))
                })?;
                Ok(SearchHit {
                    id: id.clone(),
                    text: text.to_string(),
                    distance,
                })
            })
            .collect()
    }

    /// Log a warning when the index was built with a different embedding model.
    pub fn warn_on_model_mismatch(&self, serving_model: &str) -> bool {
        let mismatch = self.embedding_model != serving_model;
        if mismatch {
            warn!(
                "index was built with embedding model `{}` but is served with `{serving_model}`; results may be meaningless",
                self.embedding_model
            );
        }
        mismatch
    }

    /// Write both artifacts atomically, replacing any previous pair.
    ///
    /// Artifacts are written and fsynced inside a staging directory in `loc.dir`,
    /// then renamed over the final paths. Both carry the same generation id so a
    /// crash between the two renames is detected by [`VectorStore::load`].
    pub fn save(&self, loc: &IndexLocation) -> Result<(), IndexError> {
        fs::create_dir_all(&loc.dir).map_err(|e| IndexError::io(&loc.dir, e))?;

        let index_bytes = codec::encode(&IndexArtifact {
            schema_version: INDEX_SCHEMA_VERSION,
            generation: self.generation,
            metric: self.index.metric(),
            dimension: self.index.dimension(),
            ids: self.ids.clone(),
            vectors: self.index.raw().to_vec(),
        })?;
        let docstore_bytes = codec::encode(&DocstoreArtifact {
            schema_version: INDEX_SCHEMA_VERSION,
            generation: self.generation,
            embedding_model: self.embedding_model.clone(),
            docstore: self.docstore.clone(),
        })?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&loc.dir)
            .map_err(|e| IndexError::io(&loc.dir, e))?;
        let staged_index = staging.path().join("index");
        let staged_docstore = staging.path().join("docstore");
        write_synced(&staged_index, &index_bytes)?;
        write_synced(&staged_docstore, &docstore_bytes)?;

        let index_path = loc.index_path();
        let docstore_path = loc.docstore_path();
        fs::rename(&staged_index, &index_path).map_err(|e| IndexError::io(&index_path, e))?;
        fs::rename(&staged_docstore, &docstore_path)
            .map_err(|e| IndexError::io(&docstore_path, e))?;
        sync_dir(&loc.dir);
        staging.close().map_err(|e| IndexError::io(&loc.dir, e))?;

        info!(
            "index saved: dir={} name={} chunks={} dim={} generation={}",
            loc.dir.display(),
            loc.name,
            self.len(),
            self.dimension(),
            self.generation
        );
        Ok(())
    }

    /// Load a pair written by [`VectorStore::save`].
    pub fn load(loc: &IndexLocation) -> Result<Self, IndexError> {
        let index_bytes = read_artifact(&loc.index_path())?;
        let docstore_bytes = read_artifact(&loc.docstore_path())?;

        let index: IndexArtifact = codec::decode(&index_bytes)?;
        let docs: DocstoreArtifact = codec::decode(&docstore_bytes)?;

        for version in [index.schema_version, docs.schema_version] {
            if version != INDEX_SCHEMA_VERSION {
                return Err(IndexError::Corrupt(format!(
                    "unsupported schema version {version} (expected {INDEX_SCHEMA_VERSION})"
                )));
            }
        }
        if index.generation != docs.generation {
            return Err(IndexError::Corrupt(format!(
                "index generation {} does not match docstore generation {}",
                index.generation, docs.generation
            )));
        }
        let flat = FlatIndex::from_raw(index.dimension, index.metric, index.vectors)?;
        if flat.len() != index.ids.len() || docs.docstore.len() != index.ids.len() {
            return Err(IndexError::Corrupt(format!(
                "{} vectors, {} ids, {} documents",
                flat.len(),
                index.ids.len(),
                docs.docstore.len()
            )));
        }
        if let Some(missing) = index.ids.iter().find(|id| !docs.docstore.contains(id)) {
            return Err(IndexError::Corrupt(format!(
                "chunk {missing} missing from docstore"
            )));
        }

        debug!(
            "index loaded: dir={} name={} chunks={} dim={}",
            loc.dir.display(),
            loc.name,
            index.ids.len(),
            flat.dimension()
        );
        Ok(Self {
            index: flat,
            ids: index.ids,
            docstore: docs.docstore,
            embedding_model: docs.embedding_model,
            generation: index.generation,
        })
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, IndexError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(IndexError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(IndexError::io(path, e)),
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let mut file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    file.write_all(bytes).map_err(|e| IndexError::io(path, e))?;
    file.sync_all().map_err(|e| IndexError::io(path, e))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!("directory fsync failed for {}: {e}", dir.display());
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
