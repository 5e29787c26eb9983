use std::fmt;

use crate::node::{Property, Value};

impl Property {
    /// Serializes the property in the tab-indented, fully quoted layout Steam writes.
    pub fn to_vdf(&self) -> String {
        let mut out = String::new();
        write_property(&mut out, self, 0);
        out
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_vdf())
    }
}

fn write_property(out: &mut String, property: &Property, depth: usize) {
    indent(out, depth);
    quote(out, &property.key);
    match &property.value {
        Value::Leaf(value) => {
            out.push_str("\t\t");
            quote(out, value);
            out.push('\n');
        }
        Value::Branch(children) => {
            out.push('\n');
            indent(out, depth);
            out.push_str("{\n");
            for child in children {
                write_property(out, child, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat('\t').take(depth));
}

fn quote(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}
