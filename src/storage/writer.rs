use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use tracing::instrument;

use crate::{domain::Tree, storage::reader::BYTE_ORDER_MARK};

impl Tree {
    /// Writes the whole document to `writer`.
    ///
    /// Every element is written in file order with its own terminator, after
    /// a byte order mark if the tree carries one. A tree parsed from
    /// well-formed input is written back byte for byte.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.has_byte_order_mark() {
            writer.write_all(BYTE_ORDER_MARK)?;
        }
        for &id in self.element_list() {
            write!(writer, "{}", self[id])?;
        }
        writer.flush()
    }

    /// Writes the whole document to a file, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    #[instrument(level = "debug", skip(self))]
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{parse_bytes, parse_file};

    const DOCUMENT: &[u8] =
        b"\xEF\xBB\xBF0 HEAD\r\n1 CHAR UTF-8\r\n0 @I1@ INDI\r\n1 NAME Zo\xC3\xAB /Brown/\r\n0 TRLR\r\n";

    #[test]
    fn writes_back_byte_for_byte() {
        let tree = parse_bytes(DOCUMENT).unwrap();
        let mut out = Vec::new();
        tree.write_to(&mut out).unwrap();
        assert_eq!(out, DOCUMENT);
    }

    #[test]
    fn save_then_parse() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tree.ged");

        let mut tree = parse_bytes(DOCUMENT).unwrap();
        let record = tree.resolve("@I1@").unwrap();
        tree.create_child(record, "NOTE", None, "line one\r\nline two");
        tree.save(&path).unwrap();

        let reread = parse_file(&path).unwrap();
        let record = reread.resolve("@I1@").unwrap();
        let note = *reread.children(record).last().unwrap();
        assert_eq!(reread.multi_line_value(note), "line one\r\nline two");
        assert!(reread.has_byte_order_mark());
    }
}
