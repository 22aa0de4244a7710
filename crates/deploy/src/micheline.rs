//! Micheline values as accepted by the Tezos node RPC.
//!
//! Micheline is the JSON surface syntax for Michelson data: integers render
//! as `{"int": "<decimal>"}`, strings as `{"string": ...}`, byte strings as
//! `{"bytes": "<hex>"}`, primitive applications as `{"prim": ..., "args":
//! [...], "annots": [...]}` and sequences as JSON arrays. This module only
//! builds values for origination scripts; it never parses Micheline back.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A Micheline expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Micheline {
    Int(i128),
    String(String),
    Bytes(Vec<u8>),
    Prim {
        prim: &'static str,
        args: Vec<Micheline>,
        annots: Vec<String>,
    },
    Seq(Vec<Micheline>),
}

impl Micheline {
    pub fn int(value: impl Into<i128>) -> Self {
        Micheline::Int(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Micheline::String(value.into())
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Micheline::Bytes(value.into())
    }

    /// A bare primitive with no arguments, e.g. `Unit` or `False`.
    pub fn prim(name: &'static str) -> Self {
        Micheline::Prim {
            prim: name,
            args: Vec::new(),
            annots: Vec::new(),
        }
    }

    /// A primitive applied to arguments, e.g. `Some x` or `Elt k v`.
    pub fn app(name: &'static str, args: Vec<Micheline>) -> Self {
        Micheline::Prim {
            prim: name,
            args,
            annots: Vec::new(),
        }
    }

    pub fn pair(left: Micheline, right: Micheline) -> Self {
        Micheline::app("Pair", vec![left, right])
    }

    /// A map entry, as found inside a sequence-encoded map.
    pub fn elt(key: Micheline, value: Micheline) -> Self {
        Micheline::app("Elt", vec![key, value])
    }

    pub fn seq(items: Vec<Micheline>) -> Self {
        Micheline::Seq(items)
    }

    pub fn none() -> Self {
        Micheline::prim("None")
    }

    pub fn some(value: Micheline) -> Self {
        Micheline::app("Some", vec![value])
    }

    pub fn bool(value: bool) -> Self {
        Micheline::prim(if value { "True" } else { "False" })
    }

    /// Folds a list of fields into a right-comb of binary `Pair`s:
    /// `[a, b, c]` becomes `Pair a (Pair b c)`. An empty list is `Unit`.
    pub fn right_comb(mut fields: Vec<Micheline>) -> Self {
        let Some(mut comb) = fields.pop() else {
            return Micheline::prim("Unit");
        };
        while let Some(field) = fields.pop() {
            comb = Micheline::pair(field, comb);
        }
        comb
    }
}

impl Serialize for Micheline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Micheline::Int(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("int", &value.to_string())?;
                map.end()
            }
            Micheline::String(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("string", value)?;
                map.end()
            }
            Micheline::Bytes(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bytes", &hex::encode(value))?;
                map.end()
            }
            Micheline::Prim { prim, args, annots } => {
                let len = 1 + usize::from(!args.is_empty()) + usize::from(!annots.is_empty());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("prim", prim)?;
                if !args.is_empty() {
                    map.serialize_entry("args", args)?;
                }
                if !annots.is_empty() {
                    map.serialize_entry("annots", annots)?;
                }
                map.end()
            }
            Micheline::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
