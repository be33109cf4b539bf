use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::error::CompileError;
use crate::template::Template;

/// Render `template` as compact JSON, or indented one tab per level.
pub fn to_bytes(template: &Template, indent: bool) -> Result<Vec<u8>, CompileError> {
    if !indent {
        return serde_json::to_vec(template).map_err(|e| CompileError::Serialize { source: e });
    }

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    template
        .serialize(&mut serializer)
        .map_err(|e| CompileError::Serialize { source: e })?;
    Ok(buf)
}
