//! YAML rendering
//!
//! Documents are built as insertion-ordered [`serde_yaml::Value`] trees and
//! written by the emitter below instead of `serde_yaml::to_string`, because
//! the consumers of these files rely on a layout serde_yaml does not
//! produce: keys stay in build order, block sequences are indented under
//! their key, short scalar lists are written inline, and absent sections
//! appear as an explicit `null`.

use serde_yaml::{Mapping, Value};

/// Lines longer than this are never produced by inlining a list
pub const LINE_WIDTH: usize = 120;
const INDENT: usize = 2;

/// Comment block written above a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub network: String,
    pub runtime: String,
    pub consensus: Option<String>,
    pub channel: Option<String>,
    pub notes: Vec<String>,
    pub reference: String,
}

/// Characters a YAML reader may treat as the end of a line.
fn breaks_line(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
}

/// Comment text stays on one line.
fn comment(text: &str) -> String {
    text.chars().map(|c| if breaks_line(c) { ' ' } else { c }).collect()
}

impl Header {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n", comment(&self.title)));
        out.push_str(&format!("# Network: {}\n", comment(&self.network)));
        out.push_str(&format!("# Generated for {}\n", comment(&self.runtime)));
        if let Some(consensus) = &self.consensus {
            out.push_str(&format!("# Consensus: {}\n", comment(consensus)));
        }
        if let Some(channel) = &self.channel {
            out.push_str(&format!("# Channel: {}\n", comment(channel)));
        }
        for note in &self.notes {
            out.push_str(&format!("# {}\n", comment(note)));
        }
        out.push_str("#\n");
        out.push_str(&format!("# Reference: {}\n", comment(&self.reference)));
        out.push('\n');
        out
    }
}

/// Header, blank line, body.
pub fn document(header: &Header, body: &Value) -> String {
    let mut out = header.render();
    out.push_str(&to_yaml(body));
    out
}

/// Render a value tree as block YAML.
pub fn to_yaml(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0),
        Value::Sequence(seq) if !seq.is_empty() => write_sequence(&mut out, seq, 0),
        other => {
            out.push_str(&inline(other).unwrap_or_default());
            out.push('\n');
        }
    }
    out
}

/// Single-line form for scalars, empty collections and short scalar lists
fn inline(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(scalar(s, false)),
        Value::Sequence(seq) if seq.is_empty() => Some("[]".to_string()),
        Value::Mapping(map) if map.is_empty() => Some("{}".to_string()),
        Value::Sequence(seq) => {
            let items = seq
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(scalar(s, true)),
                    Value::Null | Value::Bool(_) | Value::Number(_) => inline(item),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", items.join(", ")))
        }
        Value::Mapping(_) => None,
        Value::Tagged(tagged) => inline(&tagged.value),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => scalar(s, false),
        other => inline(other).unwrap_or_else(|| "?".to_string()),
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize) {
    for (i, (key, value)) in map.iter().enumerate() {
        // the first entry of a sequence item shares the `- ` line
        if i > 0 || !out.ends_with("- ") {
            pad(out, indent);
        }
        let key = key_text(key);
        out.push_str(&key);
        out.push(':');
        write_value_after_key(out, value, indent, indent + key.len() + 2);
    }
}

fn write_value_after_key(out: &mut String, value: &Value, indent: usize, column: usize) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + INDENT);
        }
        Value::Sequence(seq) if !seq.is_empty() => match inline(value) {
            Some(flow) if column + flow.len() <= LINE_WIDTH => {
                out.push(' ');
                out.push_str(&flow);
                out.push('\n');
            }
            _ => {
                out.push('\n');
                write_sequence(out, seq, indent + INDENT);
            }
        },
        Value::Tagged(tagged) => write_value_after_key(out, &tagged.value, indent, column),
        other => {
            out.push(' ');
            out.push_str(&inline(other).unwrap_or_default());
            out.push('\n');
        }
    }
}

fn write_sequence(out: &mut String, seq: &[Value], indent: usize) {
    for item in seq {
        pad(out, indent);
        out.push_str("- ");
        match item {
            Value::Mapping(map) if !map.is_empty() => write_mapping(out, map, indent + INDENT),
            Value::Sequence(inner) if !inner.is_empty() => {
                out.pop();
                out.push('\n');
                write_sequence(out, inner, indent + INDENT);
            }
            other => {
                out.push_str(&inline(other).unwrap_or_default());
                out.push('\n');
            }
        }
    }
}

const RESERVED: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~", ".inf", "-.inf", "+.inf",
    ".nan",
];

fn looks_numeric(s: &str) -> bool {
    if s.parse::<f64>().is_ok() || s.parse::<i64>().is_ok() {
        return true;
    }
    // 7051:7051 and 0x1f style values change type in YAML 1.1 readers
    let first = s.chars().next();
    (first.map_or(false, |c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, ':' | '_' | '.')))
        || s.starts_with("0x")
        || s.starts_with("0o")
}

fn needs_quotes(s: &str, in_flow: bool) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if RESERVED.contains(&s.to_ascii_lowercase().as_str()) || looks_numeric(s) {
        return true;
    }
    let first = s.chars().next().unwrap_or(' ');
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    if in_flow && s.chars().any(|c| ",[]{}:#".contains(c)) {
        return true;
    }
    s.chars().any(breaks_line)
}

/// Plain when unambiguous, single-quoted otherwise, double-quoted when the
/// text holds control or line-separator characters.
fn scalar(s: &str, in_flow: bool) -> String {
    if !needs_quotes(s, in_flow) {
        return s.to_string();
    }
    if s.chars().any(breaks_line) {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                '\u{85}' => out.push_str("\\N"),
                '\u{2028}' => out.push_str("\\L"),
                '\u{2029}' => out.push_str("\\P"),
                c if breaks_line(c) => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
        return out;
    }
    format!("'{}'", s.replace('\'', "''"))
}

/// Insertion-ordered mapping builder used by the document builders
#[derive(Debug, Default, Clone)]
pub struct MapBuilder {
    map: Mapping,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(Value::String(key.into()), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.map.insert(Value::String(key.into()), value.into());
    }

    pub fn build(self) -> Value {
        Value::Mapping(self.map)
    }
}

/// Sequence of strings
pub fn strings<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Sequence(items.into_iter().map(|s| Value::String(s.into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_layout() {
        let doc = MapBuilder::new()
            .entry("Organizations", Value::Sequence(vec![MapBuilder::new()
                .entry("Name", "Org1MSP")
                .entry("Policies", MapBuilder::new().entry("Rule", "OR('Org1MSP.admin')").build())
                .build()]))
            .entry("Application", MapBuilder::new().entry("Organizations", Value::Null).build())
            .entry("Empty", Value::Sequence(vec![]))
            .build();

        let expected = "\
Organizations:
  - Name: Org1MSP
    Policies:
      Rule: OR('Org1MSP.admin')
Application:
  Organizations: null
Empty: []
";
        assert_eq!(to_yaml(&doc), expected);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let doc = MapBuilder::new().entry("z", 1).entry("a", 2).entry("m", 3).build();
        assert_eq!(to_yaml(&doc), "z: 1\na: 2\nm: 3\n");
    }

    #[test]
    fn test_short_scalar_lists_are_inline() {
        let doc = MapBuilder::new()
            .entry("ports", strings(["7051:7051"]))
            .entry("networks", strings(["fabric-network"]))
            .build();
        assert_eq!(to_yaml(&doc), "ports: ['7051:7051']\nnetworks: [fabric-network]\n");
    }

    #[test]
    fn test_long_lists_fall_back_to_block() {
        let long: Vec<String> = (0..10).map(|i| format!("CORE_PEER_SETTING_{}=some-long-value", i)).collect();
        let doc = MapBuilder::new().entry("environment", strings(long)).build();
        let yaml = to_yaml(&doc);
        assert!(yaml.starts_with("environment:\n  - CORE_PEER_SETTING_0=some-long-value\n"));
        assert!(yaml.lines().all(|l| l.len() <= LINE_WIDTH));
    }

    #[test]
    fn test_ambiguous_scalars_are_quoted() {
        assert_eq!(scalar("3.7", false), "'3.7'");
        assert_eq!(scalar("true", false), "'true'");
        assert_eq!(scalar("7050:7050", false), "'7050:7050'");
        assert_eq!(scalar("", false), "''");
        assert_eq!(scalar("it's", false), "it's");
        assert_eq!(scalar("- dash", false), "'- dash'");
        assert_eq!(scalar("a: b", false), "'a: b'");
        assert_eq!(scalar("orderer.net.com:7050", true), "'orderer.net.com:7050'");
        assert_eq!(scalar("orderer.net.com:7050", false), "orderer.net.com:7050");
        assert_eq!(scalar("line\nbreak", false), "\"line\\nbreak\"");
        assert_eq!(scalar("2s", false), "2s");
        assert_eq!(scalar("10 MB", false), "10 MB");
    }

    #[test]
    fn test_output_parses_back_to_the_same_tree() {
        let doc = MapBuilder::new()
            .entry("version", "3.7")
            .entry("flag", true)
            .entry("count", 500)
            .entry("rule", "OR('A.admin','A.peer')")
            .entry("env", strings(["A=1", "B=[/x/y]", "quote's"]))
            .entry("labels", strings(["Org\u{2028}X", "a\u{2029}b", "next\u{85}line", "\u{feff}bom", "tab\there"]))
            .entry("Org\u{2028}Key", "value")
            .entry(
                "nested",
                Value::Sequence(vec![
                    Value::Sequence(vec![Value::from(1), Value::from(2)]),
                    MapBuilder::new().entry("k", Value::Null).build(),
                ]),
            )
            .build();
        let yaml = to_yaml(&doc);
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_header_block() {
        let header = Header {
            title: "Hyperledger Fabric configtx.yaml".into(),
            network: "net".into(),
            runtime: "Fabric v2.5/v3.0".into(),
            consensus: Some("etcdraft".into()),
            channel: None,
            notes: vec![],
            reference: "https://example.invalid/docs".into(),
        };
        let text = document(&header, &MapBuilder::new().entry("a", 1).build());
        assert_eq!(
            text,
            "# Hyperledger Fabric configtx.yaml\n# Network: net\n# Generated for Fabric v2.5/v3.0\n# Consensus: etcdraft\n#\n# Reference: https://example.invalid/docs\n\na: 1\n"
        );
    }

    #[test]
    fn test_header_keeps_names_on_one_line() {
        let header = Header {
            title: "t".into(),
            network: "Net\u{2028}# injected\nx".into(),
            runtime: "r".into(),
            consensus: None,
            channel: Some("ch\u{2029}1".into()),
            notes: vec![],
            reference: "ref".into(),
        };
        let text = document(&header, &MapBuilder::new().entry("a", 1).build());
        assert!(text.contains("# Network: Net # injected x\n"));
        assert!(text.contains("# Channel: ch 1\n"));
        let parsed: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, MapBuilder::new().entry("a", 1).build());
    }
}
