// mysite/src/services/uploads.rs

//! File storage under the media root for multipart uploads.

use crate::errors::{AppError, Result};
use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

/// Largest accepted upload in bytes (1 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 1_048_576;

#[derive(Debug, Clone)]
pub struct StoredFile {
  /// Path relative to the media root, with `/` separators.
  pub name: String,
  pub path: PathBuf,
  pub size: u64,
}

/// A multipart file field held in memory, at most `MAX_UPLOAD_BYTES` long.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub filename: String,
  pub data: Vec<u8>,
}

/// Upload names containing `virus` are refused before anything is stored.
pub fn is_suspicious_name(filename: &str) -> bool {
  filename.contains("virus")
}

/// Keeps the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
  let base = Path::new(filename)
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or_default();
  let cleaned: String = base
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
    .collect();
  let cleaned = cleaned.trim_start_matches('.').to_string();
  if cleaned.is_empty() {
    "upload".to_string()
  } else {
    cleaned
  }
}

fn with_suffix(filename: &str, suffix: &str) -> String {
  match filename.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
    _ => format!("{}_{}", filename, suffix),
  }
}

/// Picks a free name in `dir`, adding a random suffix on collision.
async fn available_name(dir: &Path, filename: &str) -> Result<String> {
  let mut candidate = filename.to_string();
  while fs::try_exists(dir.join(&candidate)).await? {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    candidate = with_suffix(filename, &suffix[..7]);
  }
  Ok(candidate)
}

fn malformed(e: impl fmt::Display) -> AppError {
  AppError::Validation(format!("Malformed multipart body: {}", e))
}

fn too_large(size: u64) -> AppError {
  AppError::Validation(format!(
    "File is too large: {} bytes, the limit is {} bytes.",
    size, MAX_UPLOAD_BYTES
  ))
}

async fn drain(field: &mut Field) -> Result<()> {
  while field.try_next().await.map_err(malformed)?.is_some() {}
  Ok(())
}

/// Advances to the file field named `field_name`. Other fields are skipped
/// without being kept.
async fn next_file_field(payload: &mut Multipart, field_name: &str) -> Result<(Field, String)> {
  while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
    let filename = field
      .content_disposition()
      .and_then(|cd| cd.get_filename())
      .map(str::to_string);
    match filename {
      Some(filename) if field.name() == Some(field_name) => return Ok((field, filename)),
      _ => drain(&mut field).await?,
    }
  }
  Err(AppError::Validation(format!("No file was submitted in '{}'.", field_name)))
}

/// Writes the field to `file` until it ends or the limit has been passed.
async fn copy_limited(field: &mut Field, file: &mut fs::File) -> Result<()> {
  let mut written: u64 = 0;
  while written <= MAX_UPLOAD_BYTES {
    let Some(chunk) = field.try_next().await.map_err(malformed)? else {
      break;
    };
    file.write_all(&chunk).await?;
    written += chunk.len() as u64;
  }
  file.flush().await?;
  Ok(())
}

/// Streams the `field_name` file into `media_root/subdir`, then enforces the
/// size limit on the stored copy: an oversized file is deleted again and the
/// upload rejected. Writing stops one chunk past the limit.
#[instrument(name = "uploads::store_field", skip(payload, media_root), err(Display))]
pub async fn store_field(
  mut payload: Multipart,
  field_name: &str,
  media_root: &Path,
  subdir: &str,
) -> Result<StoredFile> {
  let (mut field, filename) = next_file_field(&mut payload, field_name).await?;
  if is_suspicious_name(&filename) {
    warn!(filename = %filename, "Rejected suspicious upload name.");
    return Err(AppError::Validation("File should not contain virus".to_string()));
  }

  let dir = if subdir.is_empty() { media_root.to_path_buf() } else { media_root.join(subdir) };
  fs::create_dir_all(&dir).await?;
  let name = available_name(&dir, &sanitize_filename(&filename)).await?;
  let path = dir.join(&name);

  let mut file = fs::File::create(&path).await?;
  if let Err(e) = copy_limited(&mut field, &mut file).await {
    drop(file);
    fs::remove_file(&path).await?;
    return Err(e);
  }
  drop(file);

  let size = fs::metadata(&path).await?.len();
  let relative = if subdir.is_empty() { name } else { format!("{}/{}", subdir, name) };
  if size > MAX_UPLOAD_BYTES {
    fs::remove_file(&path).await?;
    warn!(file = %relative, size, "Stored file exceeded the size limit and was deleted.");
    return Err(too_large(size));
  }
  info!(file = %relative, size, "File stored.");
  Ok(StoredFile { name: relative, path, size })
}

/// Reads the `field_name` file into memory, refusing it as soon as it grows
/// past `MAX_UPLOAD_BYTES`.
pub async fn read_file(mut payload: Multipart, field_name: &str) -> Result<UploadedFile> {
  let (mut field, filename) = next_file_field(&mut payload, field_name).await?;
  let mut data = Vec::new();
  while let Some(chunk) = field.try_next().await.map_err(malformed)? {
    let size = (data.len() + chunk.len()) as u64;
    if size > MAX_UPLOAD_BYTES {
      warn!(filename = %filename, "In-memory upload exceeded the size limit.");
      return Err(too_large(size));
    }
    data.extend_from_slice(&chunk);
  }
  Ok(UploadedFile { filename, data })
}
