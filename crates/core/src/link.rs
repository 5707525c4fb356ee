//! Form link recognition and view/submit URL derivation.

use crate::error::Error;
use serde::Serialize;

/// Short links redirect to the canonical form host.
pub const SHORT_LINK_MARKER: &str = "forms.gle";
/// Canonical form-path marker.
pub const FORM_PATH_MARKER: &str = "docs.google.com/forms";

const EDIT_SEGMENT: &str = "edit";
const VIEW_SEGMENT: &str = "viewform";
const SUBMIT_SEGMENT: &str = "formResponse";

/// The two URLs one form exposes: the human-facing view page and the
/// endpoint that accepts a completed answer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormLink {
    pub view_url: String,
    pub submit_url: String,
}

/// Accept only links carrying one of the two recognized markers.
/// Rejection happens before any network call.
pub fn recognize(input: &str) -> Result<(), Error> {
    if input.contains(SHORT_LINK_MARKER) || input.contains(FORM_PATH_MARKER) {
        Ok(())
    } else {
        Err(Error::InvalidUrl(input.to_string()))
    }
}

/// Derive the view and submit URLs from a resolved link.
/// Substitution is textual, not structural — the target service's URLs
/// follow these literal path conventions.
pub fn normalize(resolved: &str) -> FormLink {
    let view_url = if resolved.contains(VIEW_SEGMENT) {
        resolved.to_string()
    } else {
        resolved.replace(EDIT_SEGMENT, VIEW_SEGMENT)
    };
    let submit_url = view_url.replace(VIEW_SEGMENT, SUBMIT_SEGMENT);
    FormLink {
        view_url,
        submit_url,
    }
}

/// Validate a user-supplied link, resolve a short link through its redirect,
/// and derive the view/submit URL pair.
#[cfg(feature = "fetch")]
pub fn resolve(client: &reqwest::blocking::Client, input: &str) -> Result<FormLink, Error> {
    recognize(input)?;

    let resolved = if input.contains(SHORT_LINK_MARKER) {
        let response = client
            .get(input)
            .send()
            .map_err(|e| Error::Network(e.to_string()))?;
        response.url().to_string()
    } else {
        input.to_string()
    };

    Ok(normalize(&resolved))
}
