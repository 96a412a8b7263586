//! Parsing of public object URLs back into storage coordinates.

/// Fixed segment that precedes `<bucket>/<key>` in every public object URL.
pub const PUBLIC_MARKER: &str = "/storage/v1/object/public/";

/// Storage coordinates recovered from a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath {
    pub bucket: String,
    pub key: String,
}

/// Extract `(bucket, key)` from a public object URL.
///
/// Works for URLs like
/// `https://<host>/storage/v1/object/public/<bucket>/<key>`.
///
/// Returns `None` when the marker is absent, no `/` follows it, or either
/// segment is empty. Callers must treat `None` as "no storage object to
/// delete", never as an error.
pub fn parse_public_url(public_url: &str) -> Option<StoragePath> {
    let idx = public_url.find(PUBLIC_MARKER)?;
    let after = &public_url[idx + PUBLIC_MARKER.len()..];

    let slash = after.find('/')?;
    let bucket = &after[..slash];
    let key = &after[slash + 1..];
    if bucket.is_empty() || key.is_empty() {
        return None;
    }

    Some(StoragePath {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bucket_and_key() {
        let url =
            "https://proj.supabase.co/storage/v1/object/public/tour-audio/tours/abc/intro/xyz.mp3";
        let parsed = parse_public_url(url).unwrap();

        assert_eq!(parsed.bucket, "tour-audio");
        assert_eq!(parsed.key, "tours/abc/intro/xyz.mp3");
    }

    #[test]
    fn test_foreign_host_url_yields_none() {
        assert_eq!(parse_public_url("https://cdn.example.com/files/xyz.mp3"), None);
    }

    #[test]
    fn test_marker_without_key_segment_yields_none() {
        // No slash after the bucket
        assert_eq!(
            parse_public_url("https://proj.supabase.co/storage/v1/object/public/tour-audio"),
            None
        );
    }

    #[test]
    fn test_empty_bucket_or_key_yields_none() {
        assert_eq!(
            parse_public_url("https://proj.supabase.co/storage/v1/object/public//a.mp3"),
            None
        );
        assert_eq!(
            parse_public_url("https://proj.supabase.co/storage/v1/object/public/tour-audio/"),
            None
        );
    }

    #[test]
    fn test_key_keeps_nested_slashes() {
        let parsed =
            parse_public_url("http://localhost:54321/storage/v1/object/public/b/x/y/z.png")
                .unwrap();
        assert_eq!(parsed.bucket, "b");
        assert_eq!(parsed.key, "x/y/z.png");
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(parse_public_url(""), None);
    }
}
