use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result, api_error};
use crate::models::ExportResult;
use crate::util::guess_filename_from_url;

impl Client {
    /// Downloads the file behind an export's `download_url` to `target`.
    ///
    /// An empty `target` derives the file name from the URL. The API key is
    /// only sent when the download is served from the API host.
    pub fn download_export(&self, export: &ExportResult, target: &Path) -> Result<PathBuf> {
        let location = export
            .download_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Input(format!("{} export has no download URL", export.format)))?;

        let url = Url::parse(location)
            .or_else(|_| self.root.join(location))
            .map_err(|e| Error::Input(format!("invalid download URL `{}`: {}", location, e)))?;

        let target = if target.as_os_str().is_empty() {
            guess_filename_from_url(url.as_str())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("export.{}", export.format)))
        } else {
            target.to_path_buf()
        };

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Downloading {} to {}", url, target.display());

        let same_host = url.host_str() == self.root.host_str()
            && url.port_or_known_default() == self.root.port_or_known_default();
        let mut req = self.http.get(url);
        if same_host {
            req = self.apply_auth(req);
        }

        let mut resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(api_error(status, &text));
        }

        let pb = if self.progress {
            let pb = ProgressBar::new(resp.content_length().unwrap_or(0));
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            Some(pb)
        } else {
            None
        };

        let saved = save_body(&mut resp, &target, pb.as_ref());
        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        saved.map_err(|source| Error::Io {
            path: target.clone(),
            source,
        })?;

        Ok(target)
    }
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Streams `body` into `<target>.part` and renames it over `target` once
/// complete. On failure the part file is removed and `target` is untouched.
fn save_body(body: &mut impl Read, target: &Path, pb: Option<&ProgressBar>) -> std::io::Result<()> {
    let part = part_path(target);
    let saved = write_part(body, &part, pb).and_then(|()| std::fs::rename(&part, target));
    if saved.is_err() {
        let _ = std::fs::remove_file(&part);
    }
    saved
}

fn write_part(body: &mut impl Read, part: &Path, pb: Option<&ProgressBar>) -> std::io::Result<()> {
    let mut out = File::create(part)?;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = body.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        if let Some(pb) = pb {
            pb.inc(n as u64);
        }
    }
    out.flush()?;
    out.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    struct FailingBody {
        sent: bool,
    }

    impl Read for FailingBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"%PDF");
            Ok(4)
        }
    }

    #[test]
    fn part_file_sits_next_to_target() {
        assert_eq!(
            part_path(Path::new("out/an_1.pdf")),
            PathBuf::from("out/an_1.pdf.part")
        );
    }

    #[test]
    fn complete_body_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("an_1.pdf");
        std::fs::write(&target, b"old report").unwrap();

        save_body(&mut Cursor::new(b"%PDF-1.7".to_vec()), &target, None).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7");
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn interrupted_body_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("an_1.pdf");
        std::fs::write(&target, b"old report").unwrap();

        let err = save_body(&mut FailingBody { sent: false }, &target, None).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(std::fs::read(&target).unwrap(), b"old report");
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn interrupted_body_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh.pdf");

        assert!(save_body(&mut FailingBody { sent: false }, &target, None).is_err());

        assert!(!target.exists());
        assert!(!part_path(&target).exists());
    }
}
