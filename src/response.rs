//! HTTP caching headers for rendered images.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use md5::{Digest as _, Md5};

use crate::format::ImageFormat;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Header values attached to an image response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_type: &'static str,
    pub cache_control: String,
    pub etag: String,
    pub last_modified: String,
    pub expires: String,
}

impl ResponseHeaders {
    /// Builds the headers for `body`.
    ///
    /// `Last-Modified` and `Expires` are relative to `now`, the moment the
    /// response is assembled, whether or not `body` came from the cache.
    pub fn assemble(
        body: &[u8],
        format: ImageFormat,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = TimeDelta::from_std(max_age)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(now);

        Self {
            content_type: format.content_type(),
            cache_control: format!("public, max-age={}", max_age.as_secs()),
            etag: etag(body),
            last_modified: http_date(now),
            expires: http_date(expires_at),
        }
    }

    /// `(name, value)` pairs in a stable order. Names are lowercase.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("content-type", self.content_type),
            ("cache-control", &self.cache_control),
            ("etag", &self.etag),
            ("last-modified", &self.last_modified),
            ("expires", &self.expires),
        ]
    }
}

/// MD5 hex of the body.
pub fn etag(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
    }

    #[test]
    fn http_date_format() {
        assert_eq!(http_date(fixed_now()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn etag_is_md5_of_body() {
        assert_eq!(etag(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn assembles_every_header() {
        let headers = ResponseHeaders::assemble(
            b"abc",
            ImageFormat::Png,
            Duration::from_secs(3600),
            fixed_now(),
        );
        assert_eq!(headers.content_type, "image/png");
        assert_eq!(headers.cache_control, "public, max-age=3600");
        assert_eq!(headers.etag, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(headers.last_modified, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(headers.expires, "Sun, 06 Nov 1994 09:49:37 GMT");
    }

    #[test]
    fn content_type_follows_requested_format() {
        let now = fixed_now();
        let ttl = Duration::from_secs(3600);
        let gif = ResponseHeaders::assemble(b"x", ImageFormat::Gif, ttl, now);
        let jpg = ResponseHeaders::assemble(b"x", ImageFormat::Jpg, ttl, now);
        assert_eq!(gif.content_type, "image/gif");
        assert_eq!(jpg.content_type, "image/jpeg");
        assert_eq!(gif.etag, jpg.etag);
    }

    #[test]
    fn dates_track_assembly_time() {
        let ttl = Duration::from_secs(3600);
        let first = ResponseHeaders::assemble(b"x", ImageFormat::Png, ttl, fixed_now());
        let later = fixed_now() + TimeDelta::seconds(90);
        let second = ResponseHeaders::assemble(b"x", ImageFormat::Png, ttl, later);
        assert_ne!(first.last_modified, second.last_modified);
        assert_eq!(second.last_modified, "Sun, 06 Nov 1994 08:51:07 GMT");
        assert_eq!(first.etag, second.etag);
    }
}
