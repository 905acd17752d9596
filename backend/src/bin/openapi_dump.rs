//! Print the OpenAPI document as JSON, or YAML with `--yaml`.

use std::io::Write;

use inquiry_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = ApiDoc::openapi();
    let rendered = if std::env::args().any(|arg| arg == "--yaml") {
        doc.to_yaml()?
    } else {
        doc.to_pretty_json()?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
