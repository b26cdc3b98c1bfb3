use serde_json::Value;
use std::fmt;

/// HTTP methods the endpoint catalog uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One part of a multipart upload. Text fields carry their value as bytes
/// with no file name; file fields set both.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl MultipartField {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    #[must_use]
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }
}

/// Payload attached to a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<MultipartField>),
}

/// Description of one HTTP request, produced by endpoint request builders.
///
/// Pure data: no client handle, no base URL. The HTTP adapter resolves the
/// path and executes it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub body: RequestBody,
}

impl RequestSpec {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    #[must_use]
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Put,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    #[must_use]
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Patch,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn multipart(path: impl Into<String>, fields: Vec<MultipartField>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Multipart(fields),
        }
    }

    /// Append form-encoded query pairs to the path. Pairs with empty values
    /// are skipped so optional filters stay out of the cache key's URL.
    #[must_use]
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in pairs {
            if value.as_ref().is_empty() {
                continue;
            }
            serializer.append_pair(key.as_ref(), value.as_ref());
            any = true;
        }
        if any {
            let query = serializer.finish();
            let sep = if self.path.contains('?') { '&' } else { '?' };
            self.path = format!("{}{}{}", self.path, sep, query);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_constructors() {
        let spec = RequestSpec::get("/jobs");
        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(spec.path, "/jobs");
        assert_eq!(spec.body, RequestBody::Empty);

        let spec = RequestSpec::post("/auth/login", json!({"email": "a@b.c"}));
        assert_eq!(spec.method, HttpMethod::Post);
        assert!(matches!(spec.body, RequestBody::Json(_)));

        let spec = RequestSpec::delete("/jobs/3");
        assert_eq!(spec.method, HttpMethod::Delete);
        assert_eq!(spec.body, RequestBody::Empty);
    }

    #[test]
    fn test_query_pairs_are_encoded() {
        let spec = RequestSpec::get("/jobs").with_query([("q", "math teacher"), ("location", "NY")]);
        assert_eq!(spec.path, "/jobs?q=math+teacher&location=NY");
    }

    #[test]
    fn test_empty_query_values_are_skipped() {
        let spec = RequestSpec::get("/jobs").with_query([("q", ""), ("location", "")]);
        assert_eq!(spec.path, "/jobs");

        let spec = RequestSpec::get("/jobs").with_query([("q", "art"), ("location", "")]);
        assert_eq!(spec.path, "/jobs?q=art");
    }

    #[test]
    fn test_query_appends_to_existing() {
        let spec = RequestSpec::get("/jobs?page=2").with_query([("q", "music")]);
        assert_eq!(spec.path, "/jobs?page=2&q=music");
    }

    #[test]
    fn test_multipart_fields() {
        let text = MultipartField::text("caption", "resume");
        assert_eq!(text.data, b"resume");
        assert!(text.file_name.is_none());

        let file = MultipartField::file("resume", "cv.pdf", "application/pdf", vec![1, 2, 3]);
        assert_eq!(file.file_name.as_deref(), Some("cv.pdf"));
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));

        let spec = RequestSpec::multipart("/users/me/resume", vec![text, file]);
        assert_eq!(spec.method, HttpMethod::Post);
        assert!(matches!(&spec.body, RequestBody::Multipart(fields) if fields.len() == 2));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
