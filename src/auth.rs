use std::fmt;

/// Session cookie sent verbatim in the `cookie` header of every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie(String);

impl Cookie {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cookie {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Cookie {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Keep session values out of logs and panic messages.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cookie(<redacted>)")
    }
}
