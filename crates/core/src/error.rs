#[derive(Debug)]
pub enum Error {
    /// The input carries neither recognized form-link marker, or is not a URL at all.
    InvalidUrl(String),
    Network(String),
    Http(u16),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidUrl(s) => write!(f, "Invalid form link: {}", s),
            Error::Network(e) => write!(f, "Network error: {}", e),
            Error::Http(code) => write!(f, "HTTP error: {}", code),
        }
    }
}

impl std::error::Error for Error {}
