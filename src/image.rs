use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::models::{AnalyzeRequest, DesignType};

pub(crate) fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

impl AnalyzeRequest {
    /// Analyse raw image bytes, sent inline as base64.
    pub fn from_image_bytes(
        bytes: &[u8],
        region: impl Into<String>,
        country: impl Into<String>,
        design_type: DesignType,
    ) -> Self {
        Self {
            image_base64: Some(encode_image(bytes)),
            ..Self::empty(region.into(), country.into(), design_type)
        }
    }

    /// Reads a local image and sends it inline.
    pub fn from_image_file(
        path: impl AsRef<Path>,
        region: impl Into<String>,
        country: impl Into<String>,
        design_type: DesignType,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(Error::Input(format!("image file {} is empty", path.display())));
        }
        Ok(Self::from_image_bytes(&bytes, region, country, design_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bytes_are_standard_base64() {
        let req = AnalyzeRequest::from_image_bytes(b"\x89PNG\r\n", "Asia", "India", DesignType::Dashboard);
        assert_eq!(req.image_base64.as_deref(), Some("iVBORw0K"));
        assert!(req.image_url.is_none());
    }

    #[test]
    fn reads_image_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let req = AnalyzeRequest::from_image_file(file.path(), "Europe", "Spain", DesignType::Other).unwrap();
        assert_eq!(req.image_base64.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn missing_or_empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(matches!(
            AnalyzeRequest::from_image_file(&missing, "Europe", "Spain", DesignType::Other),
            Err(Error::Io { .. })
        ));

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            AnalyzeRequest::from_image_file(empty.path(), "Europe", "Spain", DesignType::Other),
            Err(Error::Input(_))
        ));
    }
}
