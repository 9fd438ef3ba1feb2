use super::{CodecError, CodecResult};
use crate::model::{Bullet, Meta, NodeKey};
use crate::tree::BulletTree;
use log::warn;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// Fields per line: `level|id|type|meta-json|content`.
pub const FIELD_COUNT: usize = 5;

const SEPARATOR: char = '|';
const LINE_BREAK: &str = "\n";
// `|` only ever occurs inside JSON strings, where the escape is equivalent.
const ESCAPED_SEPARATOR: &str = "\\u007c";

/// Incremental decoder fed one line at a time.
///
/// Keeps the most recent bullet per nesting level; a line at level `n`
/// attaches to the latest bullet at level `n - 1`, or to the root when
/// there is none. Levels are sparse keys, so memory follows the number of
/// distinct levels seen, not their values.
pub struct Decoder {
    tree: BulletTree,
    last_seen_at_level: HashMap<usize, NodeKey>,
    line_number: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            tree: BulletTree::new(),
            last_seen_at_level: HashMap::new(),
            line_number: 0,
        }
    }

    /// Decodes one line and appends its bullet.
    ///
    /// Blank lines are skipped but still counted for line numbers.
    ///
    /// # Errors
    /// - `MalformedLine` when the line has fewer than five fields.
    /// - `InvalidLevel` when the level is not a non-negative integer.
    /// - `MetaParseError` when the meta field is not a JSON object.
    /// - `Tree` when the id is duplicated or not persistable.
    pub fn push_line(&mut self, line: &str) -> CodecResult<()> {
        self.line_number += 1;
        if line.trim().is_empty() {
            return Ok(());
        }

        let fields: Vec<&str> = line.splitn(FIELD_COUNT, SEPARATOR).collect();
        let [level, id, kind, meta, content] = fields.as_slice() else {
            return Err(CodecError::MalformedLine {
                line_number: self.line_number,
                line: line.to_string(),
            });
        };
        let level: usize = level
            .trim()
            .parse()
            .map_err(|_| CodecError::InvalidLevel {
                line_number: self.line_number,
                line: line.to_string(),
            })?;
        let meta = parse_meta(meta).map_err(|source| CodecError::MetaParseError {
            line_number: self.line_number,
            line: line.to_string(),
            source,
        })?;

        let parent = self.parent_for(level);
        let key = self
            .tree
            .add_node(*id, *kind, meta, content, parent)
            .map_err(|source| CodecError::Tree {
                line_number: self.line_number,
                line: line.to_string(),
                source,
            })?;

        self.last_seen_at_level.insert(level, key);
        Ok(())
    }

    /// Returns the decoded tree; an empty document gets the seed bullet.
    pub fn finish(self) -> BulletTree {
        if self.tree.is_empty() {
            return BulletTree::with_default_bullet();
        }
        self.tree
    }

    fn parent_for(&self, level: usize) -> NodeKey {
        let Some(shallower) = level.checked_sub(1) else {
            return self.tree.root();
        };
        match self.last_seen_at_level.get(&shallower).copied() {
            Some(parent) => parent,
            None => {
                warn!(
                    "event=doc_decode module=codec status=fallback line={} level={} reason=no_parent_at_level",
                    self.line_number, level
                );
                self.tree.root()
            }
        }
    }
}

fn parse_meta(field: &str) -> Result<Meta, serde_json::Error> {
    if field.trim().is_empty() {
        return Ok(Meta::new());
    }
    serde_json::from_str(field)
}

/// Decodes a lazy, forward-only sequence of lines.
pub fn decode_lines<I, S>(lines: I) -> CodecResult<BulletTree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoder = Decoder::new();
    for line in lines {
        decoder.push_line(line.as_ref())?;
    }
    Ok(decoder.finish())
}

/// Decodes a whole document held in memory.
pub fn decode_str(text: &str) -> CodecResult<BulletTree> {
    decode_lines(text.lines())
}

/// Decodes lines streamed from `reader`; read failures abort the decode.
pub fn decode_reader<R: BufRead>(reader: R) -> CodecResult<BulletTree> {
    let mut decoder = Decoder::new();
    for line in reader.lines() {
        decoder.push_line(&line?)?;
    }
    Ok(decoder.finish())
}

/// Encodes one bullet at `level`.
pub fn encode_line(level: usize, bullet: &Bullet) -> String {
    format!(
        "{level}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
        bullet.id(),
        bullet.kind(),
        encode_meta(bullet.meta()),
        bullet.content()
    )
}

fn encode_meta(meta: &Meta) -> String {
    if meta.is_empty() {
        return String::new();
    }
    Value::Object(meta.clone())
        .to_string()
        .replace(SEPARATOR, ESCAPED_SEPARATOR)
}

/// Encodes every bullet in document order; top-level bullets are level 0.
pub fn encode(tree: &BulletTree) -> Vec<String> {
    tree.iter()
        .map(|item| encode_line(item.level, item.bullet))
        .collect()
}

/// Encodes the document as `\n`-joined lines without a trailing newline.
pub fn encode_to_string(tree: &BulletTree) -> String {
    encode(tree).join(LINE_BREAK)
}

/// Streams the encoded document into `writer`.
pub fn write_to<W: Write>(tree: &BulletTree, writer: &mut W) -> std::io::Result<()> {
    for (position, item) in tree.iter().enumerate() {
        if position > 0 {
            writer.write_all(LINE_BREAK.as_bytes())?;
        }
        writer.write_all(encode_line(item.level, item.bullet).as_bytes())?;
    }
    Ok(())
}
