// Artifact naming and ZIP packaging

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::ir::Artifact;

pub const CHART_EXTENSION: &str = "html";

/// Hands out chart file names for one archive.
///
/// Names are the question's first `limit` characters. Path separators and
/// control characters become `_` so the archive stays flat, and a name that
/// is already taken gets `_2`, `_3`, ... before the extension.
#[derive(Debug, Default)]
pub struct ArtifactNamer {
    limit: usize,
    taken: HashSet<String>,
}

impl ArtifactNamer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            taken: HashSet::new(),
        }
    }

    pub fn name_for(&mut self, question: &str) -> String {
        let stem = chart_stem(question, self.limit);
        let mut name = format!("{}.{}", stem, CHART_EXTENSION);
        let mut n = 1;
        while self.taken.contains(&name) {
            n += 1;
            name = format!("{}_{}.{}", stem, n, CHART_EXTENSION);
        }
        if n > 1 {
            warn!(question, file_name = name.as_str(), "Truncated chart name collided; added suffix");
        }
        self.taken.insert(name.clone());
        name
    }
}

/// First `limit` characters of the question, made safe for a flat archive
pub fn chart_stem(question: &str, limit: usize) -> String {
    question
        .chars()
        .take(limit)
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}

/// Write every artifact into one deflate-compressed ZIP held in memory.
///
/// The returned cursor is rewound to the start of the archive.
pub fn package(artifacts: &[Artifact]) -> Result<Cursor<Vec<u8>>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for artifact in artifacts {
        zip.start_file(artifact.name.as_str(), options)
            .context(format!("Failed to add '{}' to archive", artifact.name))?;
        zip.write_all(&artifact.bytes)
            .context(format!("Failed to write '{}' to archive", artifact.name))?;
    }

    let mut buffer = zip.finish().context("Failed to finish archive")?;
    buffer.set_position(0);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_chart_stem_truncates_by_chars() {
        let q = "x".repeat(51);
        assert_eq!(chart_stem(&q, 50).chars().count(), 50);
        assert_eq!(chart_stem("あいう", 2), "あい");
        assert_eq!(chart_stem("short", 50), "short");
    }

    #[test]
    fn test_chart_stem_flattens_separators() {
        assert_eq!(chart_stem("yes/no\\maybe\n", 50), "yes_no_maybe_");
    }

    #[test]
    fn test_namer_disambiguates_collisions() {
        let mut namer = ArtifactNamer::new(3);
        assert_eq!(namer.name_for("abcX"), "abc.html");
        assert_eq!(namer.name_for("abcY"), "abc_2.html");
        assert_eq!(namer.name_for("abcZ"), "abc_3.html");
        assert_eq!(namer.name_for("xyz"), "xyz.html");
    }

    #[test]
    fn test_namer_suffix_does_not_steal_real_name() {
        let mut namer = ArtifactNamer::new(50);
        assert_eq!(namer.name_for("a_2"), "a_2.html");
        assert_eq!(namer.name_for("a"), "a.html");
        assert_eq!(namer.name_for("a"), "a_3.html");
    }

    #[test]
    fn test_package_is_rewound_and_flat() {
        let artifacts = vec![
            Artifact { name: "one.html".to_string(), bytes: b"<p>1</p>".to_vec() },
            Artifact { name: "file_name.xlsx".to_string(), bytes: vec![1, 2, 3] },
        ];
        let buffer = package(&artifacts).unwrap();
        assert_eq!(buffer.position(), 0);

        let mut archive = ZipArchive::new(buffer).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive.by_name("one.html").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "<p>1</p>");

        let entry = archive.by_name("file_name.xlsx").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_package_empty() {
        let buffer = package(&[]).unwrap();
        let archive = ZipArchive::new(buffer).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
