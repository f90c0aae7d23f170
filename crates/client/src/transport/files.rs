//! File endpoint transport.
//!
//! Wraps the backend's file endpoints: multipart upload, paged listing,
//! streaming download with a save-as into the download directory, delete,
//! and the name existence check.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use api::models::{FileInfo, FileInfoPage};
use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::backend::{Backend, TransportError, TransportResult};

/// Transport for the `/file/*` endpoints.
#[derive(Debug, Clone)]
pub struct FileTransport {
    backend: Arc<Backend>,
    download_dir: PathBuf,
}

impl FileTransport {
    /// Creates a file transport saving downloads into `download_dir`.
    pub fn new(backend: Arc<Backend>, download_dir: PathBuf) -> Self {
        Self {
            backend,
            download_dir,
        }
    }

    /// Uploads one local file as a multipart form.
    ///
    /// The file content goes under the `file` part; `overwrite` adds the
    /// `shouldUpdate` part so the backend replaces an existing name instead
    /// of rejecting it. Returns the stored record.
    pub async fn upload(&self, path: &Path, overwrite: bool) -> TransportResult<FileInfo> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;

        // Read before building the request so a bad path never hits the
        // network.
        let contents = tokio::fs::read(path).await?;
        let size = contents.len();

        let mut form = Form::new().part("file", Part::bytes(contents).file_name(name.clone()));
        if overwrite {
            form = form.text("shouldUpdate", "true");
        }

        debug!(file = %name, size, overwrite, "uploading file");
        let response = self
            .backend
            .request(Method::POST, "file/upload")?
            .multipart(form)
            .send()
            .await?;
        let response = Backend::check(response, "file/upload")?;

        let stored: FileInfo = response.json().await?;
        info!(id = stored.id, file = %stored.name, "upload stored");
        Ok(stored)
    }

    /// Fetches one page of the stored file list.
    pub async fn list(
        &self,
        sort_by: &str,
        page: u32,
        size: u32,
        ascending: bool,
    ) -> TransportResult<FileInfoPage> {
        let response = self
            .backend
            .request(Method::GET, "file/all")?
            .query(&[("sortBy", sort_by)])
            .query(&[("page", page), ("size", size)])
            .query(&[("asc", ascending)])
            .send()
            .await?;
        let response = Backend::check(response, "file/all")?;

        Ok(response.json().await?)
    }

    /// Downloads a file by id into the download directory.
    ///
    /// The destination name comes from the response's Content-Disposition
    /// header. The body is streamed to a `.part` file and renamed into
    /// place once complete. Returns the saved path.
    pub async fn download(&self, id: i64) -> TransportResult<PathBuf> {
        let response = self
            .backend
            .request(Method::GET, "file/one")?
            .query(&[("id", id)])
            .send()
            .await?;
        let response = Backend::check(response, "file/one")?;

        let name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .ok_or(TransportError::MissingFileName)?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let dest = self.download_dir.join(&name);
        let part_path = self.download_dir.join(format!("{name}.part"));

        let mut file = tokio::fs::File::create(&part_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&part_path, &dest).await?;
        info!(id, dest = %dest.display(), "download saved");
        Ok(dest)
    }

    /// Deletes a file by id.
    ///
    /// Succeeds only when the backend confirms; callers must not remove the
    /// record from any displayed list before this returns `Ok`.
    pub async fn delete(&self, id: i64) -> TransportResult<()> {
        let response = self
            .backend
            .request(Method::DELETE, "file/delete/one")?
            .query(&[("id", id)])
            .send()
            .await?;
        Backend::check(response, "file/delete/one")?;

        info!(id, "file deleted");
        Ok(())
    }

    /// Asks whether a file name is already stored.
    pub async fn exists(&self, name: &str) -> TransportResult<bool> {
        let response = self
            .backend
            .request(Method::GET, "file/check")?
            .query(&[("filename", name)])
            .send()
            .await?;
        let response = Backend::check(response, "file/check")?;

        Ok(response.json().await?)
    }
}

/// Extracts the `filename=` parameter from a Content-Disposition value.
///
/// Accepts quoted and unquoted forms; the name is reduced to its final
/// path component so a hostile header cannot escape the download
/// directory.
fn filename_from_content_disposition(value: &str) -> Option<String> {
    let start = value.find("filename=")? + "filename=".len();
    let raw = value[start..].split(';').next()?.trim();
    let unquoted = raw.trim_matches('"').trim();

    let name = unquoted
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(unquoted)
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
