use crate::chunking::chunk_text;
use crate::error::{IndexError, Result};
use crate::models::{BankingDocument, IndexingOptions};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Finds every `.jsonl` corpus file under `folder`, recursively, in a stable
/// order.
pub fn discover_corpus_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_jsonl = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

        if is_jsonl {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Loads a line-delimited corpus file. Blank lines are skipped; malformed
/// lines are logged with their line number and skipped rather than failing
/// the whole load.
pub fn load_documents(path: &Path) -> Result<Vec<BankingDocument>> {
    if !path.is_file() {
        return Err(IndexError::InvalidInput(format!(
            "corpus file not found: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)?;
    let mut documents = Vec::new();

    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<BankingDocument>(line) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    line = number + 1,
                    %error,
                    "skipping invalid corpus line"
                );
            }
        }
    }

    Ok(documents)
}

/// Writes documents back out as line-delimited JSON, creating parent
/// directories as needed.
pub fn save_documents(documents: &[BankingDocument], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = String::new();
    for document in documents {
        out.push_str(&serde_json::to_string(document)?);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Appends `incoming` to `existing`, dropping incoming records whose title
/// already appears. Advisory only; titles are not a hard uniqueness key.
pub fn merge_documents(
    existing: Vec<BankingDocument>,
    incoming: Vec<BankingDocument>,
) -> Vec<BankingDocument> {
    let mut titles: HashSet<String> = existing.iter().map(|doc| doc.title.clone()).collect();
    let mut merged = existing;

    for document in incoming {
        if titles.insert(document.title.clone()) {
            merged.push(document);
        }
    }

    merged
}

/// Chunks every document's `title + content` in document order. The returned
/// order is the row order of the index built from these chunks.
pub fn collect_chunks(
    documents: &[BankingDocument],
    options: &IndexingOptions,
) -> Result<Vec<String>> {
    let mut all_chunks = Vec::new();

    for document in documents {
        let chunks = chunk_text(
            &document.full_text(),
            options.chunk_size,
            options.chunk_overlap,
        )?;
        all_chunks.extend(chunks);
    }

    Ok(all_chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_corpus_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("banking_documents.jsonl"))
            .and_then(|mut file| file.write_all(b"{\"title\":\"a\",\"content\":\"b\"}\n"))?;
        File::create(nested.join("scraped_banking_data.jsonl"))
            .and_then(|mut file| file.write_all(b"{\"title\":\"c\",\"content\":\"d\"}\n"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"ignored"))?;

        let files = discover_corpus_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("corpus.jsonl");
        fs::write(
            &path,
            "{\"title\":\"Savings\",\"content\":\"Earns interest.\"}\n\
             not json at all\n\
             \n\
             {\"title\":\"EMI\",\"content\":\"Fixed monthly repayment.\"}\n",
        )?;

        let documents = load_documents(&path)?;
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].title, "Savings");
        assert_eq!(documents[1].title, "EMI");
        Ok(())
    }

    #[test]
    fn loading_a_missing_file_fails() {
        let result = load_documents(Path::new("/definitely/not/here.jsonl"));
        assert!(matches!(result, Err(IndexError::InvalidInput(_))));
    }

    #[test]
    fn save_and_reload_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("data").join("corpus.jsonl");
        let documents = vec![
            BankingDocument::new("Savings", "A savings account earns interest."),
            BankingDocument::new("EMI", "EMI is a fixed monthly loan repayment."),
        ];

        save_documents(&documents, &path)?;
        let reloaded = load_documents(&path)?;
        assert_eq!(reloaded, documents);
        Ok(())
    }

    #[test]
    fn merge_deduplicates_by_title() {
        let existing = vec![BankingDocument::new("Savings", "old text")];
        let incoming = vec![
            BankingDocument::new("Savings", "new text"),
            BankingDocument::new("KYC", "Know Your Customer rules."),
        ];

        let merged = merge_documents(existing, incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "old text");
        assert_eq!(merged[1].title, "KYC");
    }

    #[test]
    fn collect_chunks_preserves_document_order() {
        let documents = vec![
            BankingDocument::new("Savings", "A savings account earns interest."),
            BankingDocument::new("EMI", "EMI is a fixed monthly loan repayment."),
        ];

        let chunks = collect_chunks(&documents, &IndexingOptions::default()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("Savings"));
        assert!(chunks[1].starts_with("EMI"));
    }
}
