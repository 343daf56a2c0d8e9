//! Scheme-qualified remote addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// Recognized locator schemes. The scheme determines which storage strategy
/// variant may bind to a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
  /// Local filesystem path, `file://` or bare (no scheme).
  File,
  /// Amazon S3 style object store, `s3://bucket/key`.
  S3,
  /// Google Cloud Storage, `gs://bucket/key`.
  Gcs,
  /// Azure Blob Storage, `azblob://container/key`.
  Azblob,
  /// Plain HTTP endpoint, download oriented.
  Http,
  /// HTTPS endpoint, download oriented.
  Https,
  /// Remote host reachable over an SSH channel, `sftp://host/path`.
  Sftp,
}

impl Scheme {
  /// The scheme token as it appears on the wire, e.g. `"gs"` for
  /// [`Scheme::Gcs`]. Inverse of the parse mapping.
  pub fn as_str(self) -> &'static str {
    match self {
      Scheme::File => "file",
      Scheme::S3 => "s3",
      Scheme::Gcs => "gs",
      Scheme::Azblob => "azblob",
      Scheme::Http => "http",
      Scheme::Https => "https",
      Scheme::Sftp => "sftp",
    }
  }

  fn from_str(scheme: &str) -> Option<Scheme> {
    match scheme {
      "file" => Some(Scheme::File),
      "s3" => Some(Scheme::S3),
      "gs" => Some(Scheme::Gcs),
      "azblob" => Some(Scheme::Azblob),
      "http" => Some(Scheme::Http),
      "https" => Some(Scheme::Https),
      "sftp" => Some(Scheme::Sftp),
      _ => None,
    }
  }
}

/// A scheme-qualified address of a remote file or object,
/// e.g. `s3://bucket/key`. Local filesystem paths carry no scheme and parse
/// as [`Scheme::File`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
  raw: String,
  scheme: Scheme,
}

impl Locator {
  /// Parse a locator string. An unrecognized scheme is a construction-time
  /// error, not a transfer-time one.
  pub fn parse(raw: impl Into<String>) -> Result<Self, TransferError> {
    let raw = raw.into();
    let scheme = match raw.split_once("://") {
      Some((scheme, _)) => {
        Scheme::from_str(scheme).ok_or_else(|| TransferError::SchemeMismatch {
          scheme: scheme.to_string(),
          locator: raw.clone(),
        })?
      }
      None => Scheme::File,
    };
    Ok(Self { raw, scheme })
  }

  pub fn scheme(&self) -> Scheme {
    self.scheme
  }

  /// The bucket, container, or host component. `None` for local paths.
  pub fn authority(&self) -> Option<&str> {
    let rest = self.raw.split_once("://")?.1;
    match rest.split_once('/') {
      Some((authority, _)) => Some(authority),
      None => Some(rest),
    }
  }

  /// The path remainder after the authority, without a leading slash. For
  /// local paths this is the path itself.
  pub fn key(&self) -> &str {
    match self.raw.split_once("://") {
      Some((_, rest)) => match rest.split_once('/') {
        Some((_, key)) => key,
        None => "",
      },
      None => &self.raw,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }
}

impl fmt::Display for Locator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

impl TryFrom<String> for Locator {
  type Error = TransferError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Locator::parse(value)
  }
}

impl From<Locator> for String {
  fn from(locator: Locator) -> Self {
    locator.raw
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_object_store_locator() {
    let locator = Locator::parse("s3://bucket/path/to/key.png").unwrap();
    assert_eq!(locator.scheme(), Scheme::S3);
    assert_eq!(locator.authority(), Some("bucket"));
    assert_eq!(locator.key(), "path/to/key.png");
  }

  #[test]
  fn bare_path_is_file_scheme() {
    let locator = Locator::parse("/data/in.csv").unwrap();
    assert_eq!(locator.scheme(), Scheme::File);
    assert_eq!(locator.authority(), None);
    assert_eq!(locator.key(), "/data/in.csv");
  }

  #[test]
  fn file_scheme_locator() {
    let locator = Locator::parse("file:///data/in.csv").unwrap();
    assert_eq!(locator.scheme(), Scheme::File);
  }

  #[test]
  fn unknown_scheme_is_a_construction_error() {
    let err = Locator::parse("globus://endpoint/file").unwrap_err();
    assert!(matches!(err, TransferError::SchemeMismatch { scheme, .. } if scheme == "globus"));
  }

  #[test]
  fn bucket_only_locator_has_empty_key() {
    let locator = Locator::parse("gs://bucket").unwrap();
    assert_eq!(locator.authority(), Some("bucket"));
    assert_eq!(locator.key(), "");
  }

  #[test]
  fn scheme_tokens_round_trip_through_parsing() {
    for scheme in [
      Scheme::File,
      Scheme::S3,
      Scheme::Gcs,
      Scheme::Azblob,
      Scheme::Http,
      Scheme::Https,
      Scheme::Sftp,
    ] {
      assert_eq!(Scheme::from_str(scheme.as_str()), Some(scheme));
    }
    assert_eq!(Scheme::Gcs.as_str(), "gs");
  }

  #[test]
  fn serializes_as_plain_string() {
    let locator = Locator::parse("s3://bucket/key").unwrap();
    let json = serde_json::to_string(&locator).unwrap();
    assert_eq!(json, "\"s3://bucket/key\"");
    let back: Locator = serde_json::from_str(&json).unwrap();
    assert_eq!(back, locator);
  }
}
