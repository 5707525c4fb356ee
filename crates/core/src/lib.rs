pub mod dom;
pub mod error;
pub mod fields;
pub mod link;
pub mod synth;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod llm;
#[cfg(feature = "fetch")]
pub mod submit;

pub use error::Error;
pub use fields::{FieldDescriptor, FieldKind};
pub use link::FormLink;

use serde::Serialize;

/// Parse raw form markup and infer its submittable fields.
/// This is the primary pure entry point for formfill-core.
pub fn infer(html: &str) -> Vec<FieldDescriptor> {
    let tree = dom::parse_html(html);
    fields::infer_fields(&tree, html)
}

/// How much of the fetched markup is kept for diagnostics.
pub const SNIPPET_LIMIT: usize = 3000;

/// Everything the presentation layer needs from one inspection pass.
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub link: FormLink,
    pub html_snippet: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Resolve a form link, fetch its view page, and infer its fields.
#[cfg(feature = "fetch")]
pub fn inspect(client: &reqwest::blocking::Client, input_url: &str) -> Result<Inspection, Error> {
    let link = link::resolve(client, input_url)?;
    let html = fetch::fetch_html(client, &link.view_url)?;
    let fields = infer(&html);
    let html_snippet = html.chars().take(SNIPPET_LIMIT).collect();
    Ok(Inspection {
        link,
        html_snippet,
        fields,
    })
}
