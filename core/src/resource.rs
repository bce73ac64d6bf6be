//! The `{scheme, host, path}` triple a request is addressed to.

/// Immutable description of where a request goes.
///
/// No validation happens here. The path must already be percent-encoded;
/// `url()` is a plain concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    scheme: String,
    host: String,
    path: String,
}

impl Resource {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `scheme://host` followed directly by `path`.
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_concatenates_parts() {
        let resource = Resource::new("http", "example.com", "/users/1");
        assert_eq!(resource.url(), "http://example.com/users/1");
    }

    #[test]
    fn host_may_carry_a_port() {
        let resource = Resource::new("https", "127.0.0.1:8443", "/items");
        assert_eq!(resource.url(), "https://127.0.0.1:8443/items");
    }

    #[test]
    fn path_is_not_encoded() {
        let resource = Resource::new("http", "example.com", "/a b?q=1");
        assert_eq!(resource.url(), "http://example.com/a b?q=1");
    }

    #[test]
    fn empty_path_yields_bare_origin() {
        let resource = Resource::new("http", "example.com", "");
        assert_eq!(resource.url(), "http://example.com");
        assert_eq!(resource.path(), "");
    }
}
