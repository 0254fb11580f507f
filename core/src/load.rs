use crate::error::{Error, Result};
use crate::record::{validate_all, RawRecord, Record};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse a record payload without validating the records.
///
/// Accepts a bare JSON array, an object with a `docs` array, or the
/// `var documenterSearchIndex = {...}` script emitted by documentation
/// generators (trailing commas and `\'` escapes included).
pub fn parse_raw(input: &str) -> Result<Vec<RawRecord>> {
    let body = strip_assignment(input.trim_start_matches('\u{feff}').trim());
    let json: Value = serde_json::from_str(&sanitize_js(body))?;
    let items = match json {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => match obj.remove("docs") {
            Some(Value::Array(arr)) => arr,
            _ => return Err(Error::UnrecognizedFormat("object without a `docs` array".into())),
        },
        other => return Err(Error::UnrecognizedFormat(format!("top-level {}", kind(&other)))),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| serde_json::from_value::<RawRecord>(v).map_err(|e| Error::malformed(i, e.to_string())))
        .collect()
}

/// Parse and validate a record payload.
pub fn parse_records(input: &str) -> Result<Vec<Record>> {
    validate_all(parse_raw(input)?)
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let mut f = File::open(path.as_ref())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let records = parse_records(&buf)?;
    tracing::debug!(path = %path.as_ref().display(), records = records.len(), "loaded records");
    Ok(records)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop a leading `var name =` and a trailing `;`.
fn strip_assignment(input: &str) -> &str {
    let Some(open) = input.find(['{', '[']) else { return input };
    let head = &input[..open];
    let body = if head.trim_end().ends_with('=') { &input[open..] } else { input };
    body.trim_end().trim_end_matches(';').trim_end()
}

/// Rewrite the JavaScript-only bits of a generated index into JSON:
/// trailing commas before `]`/`}` and `\'` escapes inside strings.
fn sanitize_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                _ => out.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let rest = chars.clone().find(|c| !c.is_whitespace());
                if !matches!(rest, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use std::io::Write;

    const SCRIPT: &str = r##"var documenterSearchIndex = {"docs": [

{
    "location": "#",
    "page": "Readme",
    "title": "Readme",
    "category": "page",
    "text": ""
},

{
    "location": "autodocs/#",
    "page": "Docstrings",
    "title": "Docstrings",
    "category": "page",
    "text": "Package doesn\'t contain docs, really"
},

]}
"##;

    #[test]
    fn parses_documenter_script() {
        let recs = parse_records(SCRIPT).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].location, "#");
        assert_eq!(recs[1].text, "Package doesn't contain docs, really");
        assert_eq!(recs[1].category, Category::Page);
    }

    #[test]
    fn parses_bare_array_and_docs_object() {
        let arr = r##"[{"location":"#a","page":"P","title":"T","category":"section","text":"x"}]"##;
        assert_eq!(parse_records(arr).unwrap().len(), 1);
        let obj = format!(r#"{{"docs": {arr}}}"#);
        assert_eq!(parse_records(&obj).unwrap().len(), 1);
    }

    #[test]
    fn commas_inside_strings_survive() {
        let s = sanitize_js(r#"["a, ]", "b",]"#);
        assert_eq!(s, r#"["a, ]", "b"]"#);
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let s = sanitize_js(r#"["say \"hi\",", 1,]"#);
        assert_eq!(s, r#"["say \"hi\",", 1]"#);
    }

    #[test]
    fn wrong_field_type_is_malformed_record() {
        let arr = r##"[{"location":"#a","page":"P","title":"T","category":"page","text":""},{"location":7}]"##;
        assert!(matches!(parse_raw(arr), Err(Error::MalformedRecord { index: 1, .. })));
    }

    #[test]
    fn invalid_category_is_malformed_record() {
        let arr = r##"[{"location":"#a","page":"P","title":"T","category":"chapter","text":""}]"##;
        assert!(matches!(parse_records(arr), Err(Error::MalformedRecord { index: 0, .. })));
    }

    #[test]
    fn rejects_scalars_and_objects_without_docs() {
        assert!(matches!(parse_raw("42"), Err(Error::UnrecognizedFormat(_))));
        assert!(matches!(parse_raw(r#"{"pages": []}"#), Err(Error::UnrecognizedFormat(_))));
        assert!(matches!(parse_raw("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn loads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SCRIPT.as_bytes()).unwrap();
        let recs = load_records(f.path()).unwrap();
        assert_eq!(recs.len(), 2);
        assert!(matches!(load_records("/definitely/not/here.js"), Err(Error::Io(_))));
    }
}
