//! Flat PipeWire object dump, parsed from `pw-cli ls` output.
//!
//! This stage is intentionally generic: object boundaries and `key = value`
//! attributes only, no semantic typing. Classification happens in
//! [`crate::annotate`].

use std::collections::BTreeMap;

use serde_json::Value;

pub type RawMap = BTreeMap<String, RawObject>;

#[derive(Clone, PartialEq, Debug)]
pub struct RawObject {
    pub id: String,
    pub type_name: String,
    pub attrs: BTreeMap<String, Value>,
}

impl RawObject {
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    /// Attribute coerced to an object id. Ids are usually quoted in the
    /// dump but occasionally arrive as bare numbers.
    pub fn id_attr(&self, key: &str) -> Option<String> {
        match self.attrs.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// `id <n>, type <TypeName>` at single-tab indentation.
fn parse_header(stripped: &str) -> Option<RawObject> {
    let (head, rest) = stripped.split_once(", ")?;
    let id = head.strip_prefix("id ")?;
    let type_name = rest.strip_prefix("type ")?;
    if id.is_empty() {
        return None;
    }
    Some(RawObject {
        id: id.to_string(),
        type_name: type_name.to_string(),
        attrs: BTreeMap::new(),
    })
}

/// Parse one raw dump into an ordered id → record map. Lines matching
/// neither the header nor the attribute shape are skipped silently; an
/// empty dump yields an empty map.
pub fn parse_object_dump(raw: &str) -> RawMap {
    let mut map = RawMap::new();
    let mut current: Option<RawObject> = None;

    for line in raw.lines() {
        if line.trim().is_empty() {
            if let Some(done) = current.take() {
                map.insert(done.id.clone(), done);
            }
            continue;
        }
        if line.starts_with('\t') && !line.starts_with("\t\t") {
            if let Some(done) = current.take() {
                map.insert(done.id.clone(), done);
            }
            current = parse_header(line.trim());
        } else if let Some(obj) = current.as_mut() {
            let Some((key, literal)) = line.trim().split_once(" = ") else {
                continue;
            };
            // Values use a restricted JSON-like literal grammar; anything
            // that does not decode is dropped with its line.
            let Ok(value) = serde_json::from_str::<Value>(literal.trim()) else {
                continue;
            };
            obj.attrs.insert(key.to_string(), value);
        }
    }
    if let Some(done) = current.take() {
        map.insert(done.id.clone(), done);
    }
    map
}
