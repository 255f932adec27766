//! Sample CZI files for tests that run against the native engine.
//!
//! Samples are addressed by MD5 and fetched from a fixed list of mirrors,
//! each tried in turn. A download is kept only if its MD5 matches.
//!
//! A sample directory describes each case with two files next to the
//! (possibly not yet downloaded) CZI: `<name>.czi.md5` holding the MD5 and
//! `<name>.txt.json` holding the expected engine report.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use tracing::{debug, warn};

/// Mirrors serving `<base><md5>`, in the order they are tried.
pub const SAMPLE_MIRRORS: [&str; 2] = [
    "https://libczirwtestdata.z13.web.core.windows.net/CZICheckSamples/MD5/",
    "https://github.com/ptahmose/libCZI_testdata/raw/main/MD5/",
];

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("failed to download file from any base URL for MD5: {md5} ({})", .attempts.join("; "))]
    Unavailable { md5: String, attempts: Vec<String> },

    #[error("{path}: MD5 is {actual}, expected {expected}")]
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of bytes for a URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}

/// Plain HTTP GET via `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqFetch;

impl Fetch for UreqFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let resp = ureq::get(url).call().map_err(|e| format!("GET {url}: {e}"))?;
        let mut reader = resp.into_body().into_reader();
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| format!("GET {url}: {e}"))?;
        Ok(buf)
    }
}

pub fn md5_hex(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> SampleError + '_ {
    move |source| SampleError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Make sure `path` holds the sample with MD5 `md5`, downloading it if the
/// file is missing. An existing file is verified but never re-downloaded.
pub fn ensure_sample(path: &Path, md5: &str, fetch: &dyn Fetch) -> Result<(), SampleError> {
    let md5 = md5.trim().to_ascii_lowercase();

    if path.exists() {
        let bytes = fs::read(path).map_err(io_err(path))?;
        return verify(path, &md5, &bytes);
    }

    let mut attempts = Vec::new();
    for base in SAMPLE_MIRRORS {
        let url = format!("{base}{md5}");
        match fetch.fetch(&url) {
            Ok(bytes) => {
                if let Err(err) = verify(path, &md5, &bytes) {
                    warn!(%url, "discarding download: {err}");
                    attempts.push(err.to_string());
                    continue;
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(io_err(parent))?;
                }
                fs::write(path, &bytes).map_err(io_err(path))?;
                debug!(%url, path = %path.display(), "sample downloaded");
                return Ok(());
            }
            Err(err) => {
                debug!(%url, "mirror failed: {err}");
                attempts.push(err);
            }
        }
    }

    Err(SampleError::Unavailable { md5, attempts })
}

/// One sample: where the CZI lives, its MD5 and the report it must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCase {
    pub czi: PathBuf,
    pub md5: String,
    pub expected_json: String,
}

/// Every case in `dir`, ordered by file name ignoring case. An absent
/// directory yields no cases; an `.md5` file without its report is skipped.
pub fn sample_cases(dir: &Path) -> Result<Vec<SampleCase>, SampleError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut md5_files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.to_string_lossy().ends_with(".czi.md5"))
        .collect();
    md5_files.sort_by_key(|p| p.to_string_lossy().to_lowercase());

    let mut cases = Vec::new();
    for md5_file in md5_files {
        let text = md5_file.to_string_lossy();
        let base = &text[..text.len() - ".czi.md5".len()];
        let json_file = PathBuf::from(format!("{base}.txt.json"));
        if !json_file.is_file() {
            debug!(path = %md5_file.display(), "no expected report; skipping");
            continue;
        }
        cases.push(SampleCase {
            czi: PathBuf::from(format!("{base}.czi")),
            md5: fs::read_to_string(&md5_file)
                .map_err(io_err(&md5_file))?
                .trim()
                .to_string(),
            expected_json: fs::read_to_string(&json_file).map_err(io_err(&json_file))?,
        });
    }
    Ok(cases)
}

fn verify(path: &Path, expected: &str, bytes: &[u8]) -> Result<(), SampleError> {
    let actual = md5_hex(bytes);
    if actual == expected {
        Ok(())
    } else {
        Err(SampleError::Mismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
