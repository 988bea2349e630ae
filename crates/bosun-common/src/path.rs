//! Dotted-path access over unstructured JSON trees
//!
//! Kubernetes objects handled by the dynamic client have no compile-time
//! schema; they are `serde_json::Value` trees navigated with explicit
//! path-based accessors. Paths look like `status.loadBalancer.ingress[0].ip`
//! or `data.msg`: keys separated by dots, list positions in brackets.

use serde_json::Value;
use thiserror::Error;

/// Errors from path parsing and traversal
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    /// The path string itself is malformed
    #[error("invalid field path {0:?}")]
    InvalidPath(String),

    /// A path segment does not exist in the document
    #[error("field {0:?} not found")]
    NotFound(String),

    /// An intermediate node is not a container of the required shape
    #[error("field {segment:?} is not {expected}")]
    TypeMismatch {
        segment: String,
        expected: &'static str,
    },
}

/// Result type for path operations
pub type Result<T> = std::result::Result<T, PathError>;

/// One parsed path segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{k}"),
            Segment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

fn parse_segments(path: &str) -> Result<Vec<Segment>> {
    if path.is_empty() {
        return Err(PathError::InvalidPath(path.to_string()));
    }

    let mut segments = Vec::new();
    let mut rest = path;

    loop {
        // Key part up to the next '.' or '['.
        let key_end = rest
            .find(['.', '['])
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        } else if !rest[key_end..].starts_with('[') {
            // An empty key is only allowed directly before an index.
            return Err(PathError::InvalidPath(path.to_string()));
        }
        rest = &rest[key_end..];

        // Any number of bracketed indexes.
        while let Some(stripped) = rest.strip_prefix('[') {
            let close = stripped
                .find(']')
                .ok_or_else(|| PathError::InvalidPath(path.to_string()))?;
            let idx: usize = stripped[..close]
                .parse()
                .map_err(|_| PathError::InvalidPath(path.to_string()))?;
            segments.push(Segment::Index(idx));
            rest = &stripped[close + 1..];
        }

        if rest.is_empty() {
            break;
        }
        rest = rest
            .strip_prefix('.')
            .ok_or_else(|| PathError::InvalidPath(path.to_string()))?;
        if rest.is_empty() {
            return Err(PathError::InvalidPath(path.to_string()));
        }
    }

    if segments.is_empty() {
        return Err(PathError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Read the value at `path` in `doc`.
///
/// Fails with `NotFound` if any segment is absent and `TypeMismatch` if an
/// intermediate node is not a container of the right shape.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = doc;

    for segment in parse_segments(path)? {
        match &segment {
            Segment::Key(key) => {
                let map = current.as_object().ok_or_else(|| PathError::TypeMismatch {
                    segment: segment.to_string(),
                    expected: "an object",
                })?;
                current = map
                    .get(key)
                    .ok_or_else(|| PathError::NotFound(segment.to_string()))?;
            }
            Segment::Index(idx) => {
                let list = current.as_array().ok_or_else(|| PathError::TypeMismatch {
                    segment: segment.to_string(),
                    expected: "a list",
                })?;
                current = list
                    .get(*idx)
                    .ok_or_else(|| PathError::NotFound(segment.to_string()))?;
            }
        }
    }

    Ok(current)
}

/// Write `value` at `path` in `doc`, creating intermediate containers.
///
/// Missing objects are created along the way; lists are padded with nulls up
/// to the requested index. Fails with `TypeMismatch` when an existing
/// intermediate node has the wrong shape.
pub fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<()> {
    let segments = parse_segments(path)?;
    let mut current = doc;

    for (i, segment) in segments.iter().enumerate() {
        let last = i == segments.len() - 1;

        match segment {
            Segment::Key(key) => {
                if current.is_null() {
                    *current = Value::Object(serde_json::Map::new());
                }
                let map = current
                    .as_object_mut()
                    .ok_or_else(|| PathError::TypeMismatch {
                        segment: segment.to_string(),
                        expected: "an object",
                    })?;
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                if last {
                    *slot = value;
                    return Ok(());
                }
                current = slot;
            }
            Segment::Index(idx) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                let list = current
                    .as_array_mut()
                    .ok_or_else(|| PathError::TypeMismatch {
                        segment: segment.to_string(),
                        expected: "a list",
                    })?;
                while list.len() <= *idx {
                    list.push(Value::Null);
                }
                if last {
                    list[*idx] = value;
                    return Ok(());
                }
                current = &mut list[*idx];
            }
        }
    }

    // parse_segments guarantees at least one segment, so the last-segment
    // arm above always returns.
    Err(PathError::InvalidPath(path.to_string()))
}

/// Parse a scalar string into a typed JSON value.
///
/// `true`/`false`, `null`, integers and floats get their native type;
/// everything else stays a string. Used by `set` entries unless `asString`
/// forces string typing.
pub fn parse_scalar(s: &str) -> Value {
    match s {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_nested() {
        let doc = json!({
            "status": {
                "loadBalancer": {
                    "ingress": [{"ip": "10.0.0.7"}]
                }
            }
        });

        let got = get_path(&doc, "status.loadBalancer.ingress[0].ip").unwrap();
        assert_eq!(got, &json!("10.0.0.7"));
    }

    #[test]
    fn test_get_path_not_found() {
        let doc = json!({"status": {}});
        assert_eq!(
            get_path(&doc, "status.phase"),
            Err(PathError::NotFound("phase".to_string()))
        );
        assert_eq!(
            get_path(&doc, "status.conditions[2]"),
            Err(PathError::NotFound("conditions".to_string()))
        );
    }

    #[test]
    fn test_get_path_type_mismatch() {
        let doc = json!({"spec": "scalar"});
        assert_eq!(
            get_path(&doc, "spec.replicas"),
            Err(PathError::TypeMismatch {
                segment: "replicas".to_string(),
                expected: "an object"
            })
        );
    }

    #[test]
    fn test_get_path_index_out_of_range() {
        let doc = json!({"items": [1]});
        assert_eq!(
            get_path(&doc, "items[3]"),
            Err(PathError::NotFound("[3]".to_string()))
        );
    }

    #[test]
    fn test_set_path_creates_intermediates() {
        let mut doc = json!({});
        set_path(&mut doc, "data.msg", json!("hello")).unwrap();
        set_path(&mut doc, "data.count", json!(3)).unwrap();

        assert_eq!(doc, json!({"data": {"msg": "hello", "count": 3}}));
    }

    #[test]
    fn test_set_path_list_padding() {
        let mut doc = json!({});
        set_path(&mut doc, "spec.ports[1].port", json!(443)).unwrap();

        assert_eq!(
            doc,
            json!({"spec": {"ports": [null, {"port": 443}]}})
        );
    }

    #[test]
    fn test_set_path_overwrites() {
        let mut doc = json!({"data": {"msg": "old"}});
        set_path(&mut doc, "data.msg", json!("new")).unwrap();
        assert_eq!(doc["data"]["msg"], "new");
    }

    #[test]
    fn test_set_path_type_mismatch() {
        let mut doc = json!({"data": "scalar"});
        assert!(matches!(
            set_path(&mut doc, "data.msg", json!("x")),
            Err(PathError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_paths() {
        let doc = json!({});
        for bad in ["", ".", "a..b", "a[", "a[x]", "a."] {
            assert!(
                matches!(get_path(&doc, bad), Err(PathError::InvalidPath(_))),
                "expected invalid: {bad}"
            );
        }
    }

    #[test]
    fn test_parse_scalar_inference() {
        assert_eq!(parse_scalar("true"), json!(true));
        assert_eq!(parse_scalar("false"), json!(false));
        assert_eq!(parse_scalar("null"), json!(null));
        assert_eq!(parse_scalar("42"), json!(42));
        assert_eq!(parse_scalar("-7"), json!(-7));
        assert_eq!(parse_scalar("1.25"), json!(1.25));
        assert_eq!(parse_scalar("hello"), json!("hello"));
        assert_eq!(parse_scalar("10m"), json!("10m"));
        assert_eq!(parse_scalar(""), json!(""));
    }
}
