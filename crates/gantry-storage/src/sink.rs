//! Atomic local sink for downloads.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use gantry_transfer::TransferError;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Stream of bytes flowing from a remote source into the local sink.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransferError>> + Send>>;

fn local_io(path: &Path, err: std::io::Error) -> TransferError {
  TransferError::LocalIo {
    path: path.display().to_string(),
    message: err.to_string(),
  }
}

fn part_path(dest: &Path) -> PathBuf {
  let file_name = dest
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  dest.with_file_name(format!(
    ".{}.{}.part",
    file_name,
    uuid::Uuid::new_v4().simple()
  ))
}

/// Removes the part file on drop unless `keep` was called after the rename.
/// Drop-based cleanup covers error returns and a transfer future dropped
/// mid-write (cancellation) alike.
struct PartGuard {
  path: Option<PathBuf>,
}

impl PartGuard {
  fn new(path: PathBuf) -> Self {
    Self { path: Some(path) }
  }

  fn keep(mut self) {
    self.path = None;
  }
}

impl Drop for PartGuard {
  fn drop(&mut self) {
    if let Some(path) = self.path.take() {
      let _ = std::fs::remove_file(path);
    }
  }
}

/// Write `stream` to `dest` atomically: the data lands in a uniquely named
/// `.part` file in the destination directory and is renamed into place only
/// after the stream ends cleanly. On any failure, including the future
/// being dropped mid-transfer, the part file is removed best-effort and
/// `dest` is untouched. Intermediate directories are created.
pub async fn write_atomic(dest: &Path, mut stream: ByteStream) -> Result<(), TransferError> {
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent)
      .await
      .map_err(|e| local_io(parent, e))?;
  }

  let part = part_path(dest);
  let guard = PartGuard::new(part.clone());

  write_part(&part, &mut stream, dest).await?;
  fs::rename(&part, dest).await.map_err(|e| local_io(dest, e))?;
  guard.keep();
  Ok(())
}

async fn write_part(
  part: &Path,
  stream: &mut ByteStream,
  dest: &Path,
) -> Result<(), TransferError> {
  let mut file = File::create(part).await.map_err(|e| local_io(dest, e))?;

  while let Some(chunk) = stream.next().await {
    let bytes = chunk?;
    file
      .write_all(&bytes)
      .await
      .map_err(|e| local_io(dest, e))?;
  }

  file.flush().await.map_err(|e| local_io(dest, e))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use futures::stream;

  use super::*;

  fn ok_stream(chunks: Vec<&'static [u8]>) -> ByteStream {
    Box::pin(stream::iter(
      chunks
        .into_iter()
        .map(|c| Ok(Bytes::from_static(c)))
        .collect::<Vec<_>>(),
    ))
  }

  #[tokio::test]
  async fn writes_whole_stream_and_renames_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/out.bin");

    write_atomic(&dest, ok_stream(vec![b"hello ", b"world"]))
      .await
      .unwrap();

    assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"hello world");
  }

  #[tokio::test]
  async fn mid_stream_failure_leaves_no_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let failing: ByteStream = Box::pin(stream::iter(vec![
      Ok(Bytes::from_static(b"partial")),
      Err(TransferError::Transport {
        strategy: "test".to_string(),
        message: "truncated read".to_string(),
      }),
    ]));

    let err = write_atomic(&dest, failing).await.unwrap_err();
    assert!(matches!(err, TransferError::Transport { .. }));

    // Neither the final name nor any part file may remain.
    assert!(!dest.exists());
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn dropped_mid_write_leaves_no_part_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    // One chunk arrives, then the source stalls; dropping the write future
    // models a cancelled transfer.
    let stalled: ByteStream = Box::pin(
      stream::iter(vec![Ok(Bytes::from_static(b"partial"))]).chain(stream::pending()),
    );

    tokio::select! {
      _ = write_atomic(&dest, stalled) => panic!("stalled stream must not complete"),
      _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
    }

    assert!(!dest.exists());
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
  }
}
