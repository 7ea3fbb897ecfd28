use std::fs;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{Document, KnowledgeBase};
use crate::index::format::{ByteReader, HEADER_LEN, read_header, write_header};
use crate::index::{IndexError, VectorIndex};

const KNOWLEDGE_MAGIC: &[u8; 4] = b"MRAG";
pub const KNOWLEDGE_FORMAT_VERSION: u16 = 1;
const CHECKSUM_LEN: usize = 32;

impl KnowledgeBase {
    /// Header, vector section, length-prefixed JSON documents and a sha256
    /// trailer over everything before it.
    pub fn to_bytes(&self) -> Result<Vec<u8>, IndexError> {
        let documents = serde_json::to_vec(&self.documents).map_err(|err| {
            IndexError::CorruptIndex(format!("failed to encode documents: {err}"))
        })?;

        let mut out = Vec::<u8>::new();
        write_header(&mut out, KNOWLEDGE_MAGIC, KNOWLEDGE_FORMAT_VERSION);
        self.index.write_body(&mut out);
        out.extend_from_slice(&(documents.len() as u64).to_le_bytes());
        out.extend_from_slice(&documents);

        let checksum = Sha256::digest(&out);
        out.extend_from_slice(&checksum);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        let mut header = ByteReader::new(bytes);
        read_header(&mut header, KNOWLEDGE_MAGIC, KNOWLEDGE_FORMAT_VERSION)?;

        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(IndexError::CorruptIndex(
                "payload is too short for a checksum".to_string(),
            ));
        }
        let (payload, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if Sha256::digest(payload).as_slice() != trailer {
            return Err(IndexError::CorruptIndex("checksum mismatch".to_string()));
        }

        let mut reader = ByteReader::new(&payload[HEADER_LEN..]);
        let index = VectorIndex::read_body(&mut reader)?;
        let documents_len = reader.read_len("document section length")?;
        let raw_documents = reader.take(documents_len)?;
        reader.finish()?;

        let documents: Vec<Document> = serde_json::from_slice(raw_documents)
            .map_err(|err| IndexError::CorruptIndex(format!("invalid document section: {err}")))?;

        Self::from_parts(index, documents).map_err(|err| match err {
            IndexError::RowCountMismatch { vectors, documents } => IndexError::CorruptIndex(
                format!("{vectors} vectors stored for {documents} documents"),
            ),
            other => other,
        })
    }

    /// Writes to a uniquely named sibling temp file and renames it over
    /// `path`, so a reader of `path` sees either the previous file or the
    /// complete new one.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let bytes = self.to_bytes()?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        // dropped (and removed) on any early return
        let mut staging = NamedTempFile::new_in(parent)?;
        staging.write_all(&bytes)?;
        staging.as_file().sync_all()?;
        staging.persist(path).map_err(|err| err.error)?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            rows = self.len(),
            "knowledge index saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let bytes = fs::read(path)?;
        let knowledge = Self::from_bytes(&bytes)?;
        debug!(
            path = %path.display(),
            rows = knowledge.len(),
            dimensions = knowledge.index.dimensions(),
            "knowledge index loaded"
        );
        Ok(knowledge)
    }
}
