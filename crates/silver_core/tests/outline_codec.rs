use serde_json::json;
use silver_core::{
    decode_lines, decode_reader, decode_str, encode, encode_to_string, BulletTree, CodecError,
    Meta, TreeError,
};
use std::io::{BufReader, Read};

fn shape(tree: &BulletTree) -> Vec<(usize, String, String)> {
    tree.iter()
        .map(|item| {
            (
                item.level,
                item.bullet.id().to_string(),
                item.bullet.content().to_string(),
            )
        })
        .collect()
}

#[test]
fn decode_builds_nesting_and_encode_restores_lines() {
    let lines = ["0|a|text||Hello", "1|b|text||World"];
    let tree = decode_lines(lines).unwrap();

    let a = tree.lookup("a").unwrap();
    let b = tree.lookup("b").unwrap();
    assert_eq!(tree.top_level(), &[a]);
    assert_eq!(tree.children(a).unwrap(), &[b]);
    assert_eq!(tree.parent(b).unwrap(), a);
    assert_eq!(tree.bullet(a).unwrap().content(), "Hello");
    assert_eq!(tree.bullet(b).unwrap().content(), "World");

    assert_eq!(encode(&tree), lines.to_vec());
}

#[test]
fn indent_middle_bullet_changes_encoded_levels() {
    let mut tree = decode_str("0|a|text||A\n0|b|text||B\n0|c|text||C").unwrap();
    let a = tree.lookup("a").unwrap();
    let b = tree.lookup("b").unwrap();

    assert!(tree.indent_bullet(b).unwrap());
    assert_eq!(tree.parent(b).unwrap(), a);
    assert_eq!(
        encode(&tree),
        vec!["0|a|text||A", "1|b|text||B", "0|c|text||C"]
    );
}

#[test]
fn three_field_line_is_malformed_and_yields_no_tree() {
    let err = decode_str("0|a|text||A\n0|b|text").unwrap_err();
    match err {
        CodecError::MalformedLine { line_number, line } => {
            assert_eq!(line_number, 2);
            assert_eq!(line, "0|b|text");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_levels_are_rejected_with_line_number() {
    for text in ["x|a|text||A", "-1|a|text||A", "0|a|text||A\n1.5|b|text||B"] {
        let err = decode_str(text).unwrap_err();
        assert!(
            matches!(err, CodecError::InvalidLevel { .. }),
            "{text}: {err}"
        );
    }
    let err = decode_str("0|a|text||A\n1.5|b|text||B").unwrap_err();
    assert_eq!(err.line_number(), Some(2));
}

#[test]
fn meta_must_be_a_json_object() {
    let err = decode_str("0|a|text|{\"done\":true}|A\n0|b|text|[1]|B").unwrap_err();
    assert!(matches!(
        err,
        CodecError::MetaParseError { line_number: 2, .. }
    ));
}

#[test]
fn duplicate_ids_in_a_document_are_rejected() {
    let err = decode_str("0|a|text||A\n1|a|text||again").unwrap_err();
    assert!(matches!(
        err,
        CodecError::Tree {
            line_number: 2,
            source: TreeError::DuplicateId(ref id),
            ..
        } if id == "a"
    ));
}

#[test]
fn content_keeps_extra_separators() {
    let tree = decode_str("0|a|text||left | right|end").unwrap();
    let a = tree.lookup("a").unwrap();
    assert_eq!(tree.bullet(a).unwrap().content(), "left | right|end");
}

#[test]
fn empty_document_decodes_to_seed_bullet() {
    for text in ["", "\n\n", "   "] {
        let tree = decode_str(text).unwrap();
        assert_eq!(encode_to_string(&tree), "0|hello-0|text||Hello!");
    }
}

#[test]
fn blank_lines_are_skipped_but_counted() {
    let tree = decode_str("0|a|text||A\n\n1|b|text||B").unwrap();
    assert_eq!(tree.len(), 2);

    let err = decode_str("0|a|text||A\n\nbroken").unwrap_err();
    assert_eq!(err.line_number(), Some(3));
}

#[test]
fn level_without_shallower_bullet_attaches_to_root() {
    let tree = decode_str("2|deep|text||Deep\n0|a|text||A").unwrap();
    let deep = tree.lookup("deep").unwrap();
    assert_eq!(tree.parent(deep).unwrap(), tree.root());
    assert_eq!(tree.depth(deep).unwrap(), 0);
}

#[test]
fn skipped_level_attaches_to_latest_bullet_one_level_up() {
    let text = "0|a|text||A\n1|b|text||B\n2|c|text||C\n0|d|text||D\n2|e|text||E";
    let tree = decode_str(text).unwrap();
    let b = tree.lookup("b").unwrap();
    let e = tree.lookup("e").unwrap();
    assert_eq!(tree.parent(e).unwrap(), b);
    assert_eq!(tree.children(b).unwrap().len(), 2);
    tree.validate().unwrap();
}

#[test]
fn huge_levels_decode_without_allocating_per_level() {
    let text = format!("0|a|text||A\n{}|b|text||B\n4000000000|c|text||C", usize::MAX);
    let tree = decode_str(&text).unwrap();
    let b = tree.lookup("b").unwrap();
    let c = tree.lookup("c").unwrap();
    assert_eq!(tree.parent(b).unwrap(), tree.root());
    assert_eq!(tree.parent(c).unwrap(), tree.root());
    assert_eq!(tree.len(), 3);
}

#[test]
fn shallower_line_becomes_parent_of_next_level() {
    let text = "0|a|text||A\n1|b|text||B\n2|c|text||C\n0|d|text||D\n1|e|text||E";
    let tree = decode_str(text).unwrap();
    let d = tree.lookup("d").unwrap();
    let e = tree.lookup("e").unwrap();
    assert_eq!(tree.parent(e).unwrap(), d);
    assert_eq!(
        shape(&tree),
        vec![
            (0, "a".to_string(), "A".to_string()),
            (1, "b".to_string(), "B".to_string()),
            (2, "c".to_string(), "C".to_string()),
            (0, "d".to_string(), "D".to_string()),
            (1, "e".to_string(), "E".to_string()),
        ]
    );
}

#[test]
fn round_trip_preserves_meta_types_and_content() {
    let mut tree = BulletTree::new();
    let root = tree.root();
    let mut meta = Meta::new();
    meta.insert("done".to_string(), json!(true));
    meta.insert("tags".to_string(), json!(["a", "b|c"]));
    let a = tree.add_node("a", "todo", meta.clone(), "Ship it", root).unwrap();
    tree.add_node("b", "", Meta::new(), "", a).unwrap();
    tree.add_node("c", "text", Meta::new(), "  padded  ", root).unwrap();

    let decoded = decode_str(&encode_to_string(&tree)).unwrap();

    assert_eq!(shape(&decoded), shape(&tree));
    let decoded_a = decoded.bullet(decoded.lookup("a").unwrap()).unwrap();
    assert_eq!(decoded_a.kind(), "todo");
    assert_eq!(decoded_a.meta(), &meta);
    let decoded_b = decoded.bullet(decoded.lookup("b").unwrap()).unwrap();
    assert_eq!(decoded_b.kind(), "");
}

struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.served {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stream closed",
            ));
        }
        self.served = true;
        let line = b"0|a|text||A\n";
        buf[..line.len()].copy_from_slice(line);
        Ok(line.len())
    }
}

#[test]
fn reader_failure_aborts_decode() {
    let reader = BufReader::with_capacity(64, FailingReader { served: false });
    let err = decode_reader(reader).unwrap_err();
    assert!(matches!(err, CodecError::Io(_)));
    assert_eq!(err.line_number(), None);
}

#[test]
fn reader_decode_matches_in_memory_decode() {
    let text = "0|a|text||A\n1|b|text||B\n0|c|text||C\n";
    let streamed = decode_reader(text.as_bytes()).unwrap();
    let in_memory = decode_str(text).unwrap();
    assert_eq!(shape(&streamed), shape(&in_memory));
}
