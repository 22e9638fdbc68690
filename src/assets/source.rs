use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::{
    assets::decode::{FrameGraphic, Photo, decode_frame, decode_photo},
    foundation::error::{PhotostripError, PhotostripResult},
    layout::table::FrameGeometry,
};

/// Where an image comes from before it is decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:` URL, the form webcam screenshots and uploads arrive in.
    DataUrl(String),
    /// File on the local filesystem.
    File(PathBuf),
    /// Already-encoded bytes.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Interpret a user-supplied string: `data:` URLs are kept inline, anything else is a path.
    pub fn parse(s: &str) -> Self {
        if s.trim_start().starts_with("data:") {
            Self::DataUrl(s.trim().to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Resolve the source into encoded image bytes.
    pub fn read_bytes(&self) -> PhotostripResult<Vec<u8>> {
        match self {
            Self::DataUrl(url) => decode_data_url(url),
            Self::File(path) => read_file(path),
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::DataUrl(url) => format!("data url ({} bytes)", url.len()),
            Self::File(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("inline bytes ({} bytes)", bytes.len()),
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(p: &Path) -> Self {
        Self::File(p.to_path_buf())
    }
}

/// Load and decode a photo. Any failure is reported as [`PhotostripError::Decode`].
#[tracing::instrument(skip(source), fields(src = %source.describe()))]
pub fn load_photo(source: &ImageSource) -> PhotostripResult<Photo> {
    let bytes = source.read_bytes()?;
    let photo = decode_photo(&bytes)?;
    tracing::debug!(width = photo.width, height = photo.height, "photo decoded");
    Ok(photo)
}

/// Load and decode a frame graphic at the geometry's frame size.
#[tracing::instrument(skip(source, geometry), fields(src = %source.describe()))]
pub fn load_frame(source: &ImageSource, geometry: &FrameGeometry) -> PhotostripResult<FrameGraphic> {
    let bytes = source.read_bytes()?;
    decode_frame(&bytes, geometry)
}

fn read_file(path: &Path) -> PhotostripResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read image bytes from '{}'", path.display()))
        .map_err(|e| PhotostripError::decode(format!("{e:#}")))
}

/// Extract the payload of a `data:[<mediatype>][;base64],<data>` URL.
pub fn decode_data_url(url: &str) -> PhotostripResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PhotostripError::decode("data url must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PhotostripError::decode("data url is missing ','"))?;

    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        return base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PhotostripError::decode(format!("invalid base64 in data url: {e}")));
    }
    percent_decode(payload)
}

/// Decode `%XX` escapes; every `%` must be followed by two hex digits.
fn percent_decode(s: &str) -> PhotostripResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(PhotostripError::decode("invalid percent escape in data url"));
    }
    Ok(urlencoding::decode_binary(bytes).into_owned())
}

/// Encode bytes as a `data:` URL with the given media type.
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{media_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
