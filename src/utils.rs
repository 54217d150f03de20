use std::borrow::Cow;
use url::Url;

const MAX_FILENAME_LEN: usize = 100;

/// Derives a file name from the last segment of a URL's path.
///
/// Returns `None` when the segment is empty or has no extension, in which
/// case the caller synthesizes a name instead.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment));
    let name = sanitize_filename(&decoded);

    let (stem, extension) = name.rsplit_once('.')?;
    if stem.trim_matches('.').is_empty() || extension.is_empty() {
        return None;
    }
    Some(name)
}

/// Convert a decoded path segment to a safe file name
pub fn sanitize_filename(segment: &str) -> String {
    let name = segment.replace(['/', '\\', ':', '?', '*', '"', '<', '>', '|', '#'], "_");

    // Limit length on a char boundary, keeping the extension where possible
    if name.chars().count() <= MAX_FILENAME_LEN {
        return name;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.chars().count() < 10 => {
            let keep = MAX_FILENAME_LEN - ext.chars().count() - 1;
            format!("{}.{}", stem.chars().take(keep).collect::<String>(), ext)
        }
        _ => name.chars().take(MAX_FILENAME_LEN).collect(),
    }
}

/// Splits `photo.tar.gz` into `("photo.tar", Some("gz"))`
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
