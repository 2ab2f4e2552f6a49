// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Export documents
//!
//! A single document holding every captured session, or one file per host.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, Result};
use crate::session::{SessionRecord, SessionSnapshot};

/// Export format version
pub const EXPORT_VERSION: &str = "1.0";

/// Exported sessions with format metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub data: SessionSnapshot,
}

impl ExportDocument {
    /// Wrap a snapshot taken at `timestamp`
    pub fn new(data: SessionSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            timestamp,
            data,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write one `<host>.json` per session into `dir`
    ///
    /// Hosts are mapped to file names with `.` and `:` replaced by `_`.
    /// Returns the written paths in host order.
    pub fn write_split(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .persistence_context(&format!("creating {}", dir.display()))?;

        let mut written = Vec::with_capacity(self.data.len());
        for (host, record) in self.data.iter() {
            let path = dir.join(format!("{}.json", host.file_stem()));
            let body = serde_json::to_string_pretty(&HostExport {
                version: &self.version,
                timestamp: self.timestamp,
                host: host.as_str(),
                session: record,
            })?;
            std::fs::write(&path, body)
                .persistence_context(&format!("writing {}", path.display()))?;
            tracing::debug!(host = %host, path = %path.display(), "Session exported");
            written.push(path);
        }

        Ok(written)
    }
}

#[derive(Serialize)]
struct HostExport<'a> {
    version: &'a str,
    timestamp: DateTime<Utc>,
    host: &'a str,
    session: &'a SessionRecord,
}
