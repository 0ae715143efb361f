//! Documentation workflows: generate, check, list, remove, summarize.
//!
//! Each operation validates its input before touching the model or the
//! ledger, so an invalid-input error never leaves partial state behind. The
//! one intentional asymmetry is `check`: a successful accuracy report marks the
//! entry stale but leaves `source_hash` alone, so the next check asks the
//! model again.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::entry::{DocEntry, DocStatus, StatusCounts, ledger_key, source_hash};
use crate::core::error::DocgenError;
use crate::core::llm::TextGenerator;
use crate::core::store::LedgerStore;
use crate::core::tui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub doc_path: PathBuf,
    /// `false` when an existing ledger entry was refreshed.
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    UpToDate,
    Stale { report: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub entries: Vec<DocEntry>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub deleted_doc: Option<PathBuf>,
}

pub struct Workflow<G> {
    store: LedgerStore,
    generator: G,
}

impl<G: TextGenerator> Workflow<G> {
    pub fn new(store: LedgerStore, generator: G) -> Self {
        Self { store, generator }
    }

    /// Write `<output_dir>/<stem>.md` for `source` and record it as current.
    pub fn generate(
        &self,
        source: &Path,
        output_dir: &Path,
    ) -> Result<GenerateOutcome, DocgenError> {
        let content = read_source(source)?;
        // A corrupt ledger must fail before the model is paid for or the
        // existing markdown is overwritten.
        self.store.load()?;
        let filename = display_name(source);
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DocgenError::InvalidInput(format!("Not a file: {}", source.display()))
            })?;

        tui::info(&format!("Generating docs for {}...", filename));
        let docs = self.generator.generate(&content, &filename)?;

        fs::create_dir_all(output_dir)?;
        let doc_path = output_dir.join(format!("{}.md", stem));
        fs::write(&doc_path, docs)?;

        let entry = DocEntry::new(
            &ledger_key(source),
            &doc_path.to_string_lossy(),
            &source_hash(content.as_bytes()),
        );
        let created = self.store.add(entry)?;
        tracing::info!(
            source = %source.display(),
            doc = %doc_path.display(),
            created,
            "documentation generated"
        );

        Ok(GenerateOutcome { doc_path, created })
    }

    /// Compare `source` against its recorded hash and, if it drifted, ask the
    /// model whether the existing docs still hold.
    pub fn check(&self, source: &Path) -> Result<CheckOutcome, DocgenError> {
        require_file(source)?;

        let key = ledger_key(source);
        let entry = self.store.find(&key)?.ok_or_else(|| {
            DocgenError::InvalidInput(format!(
                "No documentation found for: {}",
                source.display()
            ))
        })?;

        let doc_path = Path::new(&entry.doc_file);
        if !doc_path.exists() {
            return Err(DocgenError::MissingDocFile(entry.doc_file.clone()));
        }

        let source_bytes = fs::read(source)?;
        if source_hash(&source_bytes) == entry.source_hash {
            tracing::debug!(source = %key, "hash unchanged; skipping remote check");
            return Ok(CheckOutcome::UpToDate);
        }

        let content = String::from_utf8(source_bytes).map_err(|_| {
            DocgenError::InvalidInput(format!(
                "File is not valid UTF-8: {}",
                source.display()
            ))
        })?;
        let existing_docs = fs::read_to_string(doc_path)?;

        tui::info(&format!(
            "Source changed, checking accuracy for {}...",
            display_name(source)
        ));
        let report = self.generator.check_accuracy(&content, &existing_docs)?;

        let marked = self.store.mark_stale(&key)?;
        tracing::info!(source = %key, marked, "documentation marked stale");

        Ok(CheckOutcome::Stale { report })
    }

    /// Ledger entries, optionally filtered by a case-insensitive status name.
    pub fn list(&self, status: Option<&str>) -> Result<Listing, DocgenError> {
        let filter = status.map(str::parse::<DocStatus>).transpose()?;
        let entries = self.store.get(filter)?;
        let counts = StatusCounts::of(&entries);
        Ok(Listing { entries, counts })
    }

    /// Stop tracking `source`; optionally delete its markdown file as well.
    pub fn remove(&self, source: &Path, delete_doc: bool) -> Result<RemoveOutcome, DocgenError> {
        let key = ledger_key(source);
        let entry = self.store.find(&key)?.ok_or_else(|| {
            DocgenError::InvalidInput(format!(
                "No documentation found for: {}",
                source.display()
            ))
        })?;

        let removed = self.store.delete(&key)?;

        let mut deleted_doc = None;
        if delete_doc {
            let doc_path = PathBuf::from(&entry.doc_file);
            if doc_path.is_file() {
                fs::remove_file(&doc_path)?;
                deleted_doc = Some(doc_path);
            }
        }
        tracing::info!(source = %key, removed, "ledger entry removed");

        Ok(RemoveOutcome {
            removed,
            deleted_doc,
        })
    }

    /// One-paragraph summary of `source`. Does not touch the ledger.
    pub fn summarize(&self, source: &Path) -> Result<String, DocgenError> {
        let content = read_source(source)?;
        let filename = display_name(source);
        tui::info(&format!("Summarizing {}...", filename));
        self.generator.summarize(&content, &filename)
    }
}

fn display_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}

/// `source` must exist and be a regular file.
pub fn require_file(source: &Path) -> Result<(), DocgenError> {
    if !source.exists() {
        return Err(DocgenError::InvalidInput(format!(
            "File not found: {}",
            source.display()
        )));
    }
    if !source.is_file() {
        return Err(DocgenError::InvalidInput(format!(
            "Not a file: {}",
            source.display()
        )));
    }
    Ok(())
}

/// Read a source file that must exist, be a regular file, and contain text.
fn read_source(source: &Path) -> Result<String, DocgenError> {
    require_file(source)?;
    let bytes = fs::read(source)?;
    let content = String::from_utf8(bytes).map_err(|_| {
        DocgenError::InvalidInput(format!("File is not valid UTF-8: {}", source.display()))
    })?;
    if content.trim().is_empty() {
        return Err(DocgenError::InvalidInput(format!(
            "File is empty: {}",
            source.display()
        )));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::{TempDir, tempdir};

    #[derive(Default)]
    struct FakeGenerator {
        calls: RefCell<Vec<&'static str>>,
        fail: bool,
    }

    impl FakeGenerator {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn respond(&self, op: &'static str, text: &str) -> Result<String, DocgenError> {
            self.calls.borrow_mut().push(op);
            if self.fail {
                return Err(DocgenError::Remote("quota exceeded".into()));
            }
            Ok(text.to_string())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate(&self, _source: &str, filename: &str) -> Result<String, DocgenError> {
            self.respond("generate", &format!("# {}\n\nGenerated docs.", filename))
        }

        fn check_accuracy(&self, _source: &str, _docs: &str) -> Result<String, DocgenError> {
            self.respond("check", "hello() now returns a value")
        }

        fn summarize(&self, _source: &str, _filename: &str) -> Result<String, DocgenError> {
            self.respond("summarize", "Prints a greeting.")
        }
    }

    struct Fixture {
        tmp: TempDir,
        workflow: Workflow<FakeGenerator>,
    }

    impl Fixture {
        fn new(generator: FakeGenerator) -> Self {
            let tmp = tempdir().unwrap();
            let store = LedgerStore::in_dir(&tmp.path().join(".docgen"));
            Self {
                workflow: Workflow::new(store, generator),
                tmp,
            }
        }

        fn source(&self, name: &str, content: &str) -> PathBuf {
            let path = self.tmp.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn out(&self) -> PathBuf {
            self.tmp.path().join("docs")
        }
    }

    #[test]
    fn generate_writes_doc_and_records_current_entry() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("example.py", "def hello(): pass");

        let outcome = fx.workflow.generate(&source, &fx.out()).unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.doc_path, fx.out().join("example.md"));
        assert_eq!(
            fs::read_to_string(&outcome.doc_path).unwrap(),
            "# example.py\n\nGenerated docs."
        );

        let entries = fx.workflow.store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_file, source.to_string_lossy());
        assert_eq!(entries[0].doc_file, outcome.doc_path.to_string_lossy());
        assert_eq!(entries[0].status, DocStatus::Current);
        assert_eq!(entries[0].source_hash, source_hash(b"def hello(): pass"));
    }

    #[test]
    fn regenerate_updates_entry_in_place() {
        let fx = Fixture::new(FakeGenerator::default());
        let other = fx.source("other.py", "x = 1");
        let source = fx.source("example.py", "def hello(): pass");
        fx.workflow.generate(&other, &fx.out()).unwrap();
        fx.workflow.generate(&source, &fx.out()).unwrap();
        fx.workflow.store.mark_stale(&source.to_string_lossy()).unwrap();

        fs::write(&source, "def hello(): return 1").unwrap();
        let custom = fx.tmp.path().join("custom_docs");
        let outcome = fx.workflow.generate(&source, &custom).unwrap();

        assert!(!outcome.created);
        let entries = fx.workflow.store.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].source_file, source.to_string_lossy());
        assert_eq!(entries[1].status, DocStatus::Current);
        assert_eq!(entries[1].doc_file, custom.join("example.md").to_string_lossy());
        assert_eq!(entries[1].source_hash, source_hash(b"def hello(): return 1"));
    }

    #[test]
    fn generate_rejects_bad_input_without_remote_call_or_ledger_write() {
        let fx = Fixture::new(FakeGenerator::default());
        let empty = fx.source("empty.py", "  \n\t\n");
        let missing = fx.tmp.path().join("nonexistent.py");
        let dir = fx.tmp.path().join("pkg");
        fs::create_dir(&dir).unwrap();

        for (path, message) in [
            (&empty, "File is empty"),
            (&missing, "File not found"),
            (&dir, "Not a file"),
        ] {
            let err = fx.workflow.generate(path, &fx.out()).unwrap_err();
            assert!(err.is_invalid_input(), "{err}");
            assert!(err.to_string().starts_with(message), "{err}");
        }

        assert!(fx.workflow.generator.calls().is_empty());
        assert!(!fx.workflow.store.path().exists());
        assert!(!fx.out().exists());
    }

    #[test]
    fn generate_remote_failure_leaves_ledger_untouched() {
        let fx = Fixture::new(FakeGenerator::failing());
        let source = fx.source("example.py", "def hello(): pass");

        let err = fx.workflow.generate(&source, &fx.out()).unwrap_err();

        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "LLM error: quota exceeded");
        assert!(fx.workflow.store.load().unwrap().is_empty());
        assert!(!fx.out().join("example.md").exists());
    }

    #[test]
    fn generate_with_corrupt_ledger_fails_before_remote_call_or_doc_write() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("a.py", "a = 1");
        fs::create_dir_all(fx.out()).unwrap();
        fs::write(fx.out().join("a.md"), "HAND EDITED").unwrap();
        fs::create_dir_all(fx.workflow.store.path().parent().unwrap()).unwrap();
        fs::write(fx.workflow.store.path(), "{ not json").unwrap();

        let err = fx.workflow.generate(&source, &fx.out()).unwrap_err();

        assert!(matches!(err, DocgenError::LedgerCorrupt { .. }), "{err}");
        assert!(fx.workflow.generator.calls().is_empty());
        assert_eq!(
            fs::read_to_string(fx.out().join("a.md")).unwrap(),
            "HAND EDITED"
        );
        assert_eq!(
            fs::read_to_string(fx.workflow.store.path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn check_with_unchanged_source_skips_remote_call() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("example.py", "def hello(): pass");
        fx.workflow.generate(&source, &fx.out()).unwrap();
        let before = fs::read_to_string(fx.workflow.store.path()).unwrap();

        let outcome = fx.workflow.check(&source).unwrap();

        assert_eq!(outcome, CheckOutcome::UpToDate);
        assert_eq!(fx.workflow.generator.calls(), vec!["generate"]);
        assert_eq!(fs::read_to_string(fx.workflow.store.path()).unwrap(), before);
    }

    #[test]
    fn check_with_changed_source_marks_stale_and_reports() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("example.py", "def hello(): pass");
        fx.workflow.generate(&source, &fx.out()).unwrap();
        fs::write(&source, "def hello(): return 1").unwrap();

        let outcome = fx.workflow.check(&source).unwrap();

        assert_eq!(
            outcome,
            CheckOutcome::Stale {
                report: "hello() now returns a value".into()
            }
        );
        let entry = fx
            .workflow
            .store
            .find(&source.to_string_lossy())
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, DocStatus::Stale);
        assert_eq!(entry.source_hash, source_hash(b"def hello(): pass"));
    }

    #[test]
    fn repeated_check_calls_remote_again_because_hash_is_not_refreshed() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("example.py", "def hello(): pass");
        fx.workflow.generate(&source, &fx.out()).unwrap();
        fs::write(&source, "def hello(): return 1").unwrap();

        fx.workflow.check(&source).unwrap();
        fx.workflow.check(&source).unwrap();

        assert_eq!(
            fx.workflow.generator.calls(),
            vec!["generate", "check", "check"]
        );
    }

    #[test]
    fn check_failures_are_classified() {
        let fx = Fixture::new(FakeGenerator::default());
        let untracked = fx.source("example.py", "def hello(): pass");

        let err = fx.workflow.check(&fx.tmp.path().join("nope.py")).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().starts_with("File not found"));

        let err = fx.workflow.check(&untracked).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().starts_with("No documentation found for"));

        let outcome = fx.workflow.generate(&untracked, &fx.out()).unwrap();
        fs::remove_file(&outcome.doc_path).unwrap();
        let err = fx.workflow.check(&untracked).unwrap_err();
        assert!(matches!(err, DocgenError::MissingDocFile(_)));
        assert_eq!(err.exit_code(), 1);

        assert_eq!(fx.workflow.generator.calls(), vec!["generate"]);
    }

    #[test]
    fn check_remote_failure_does_not_mark_stale() {
        let fx = Fixture::new(FakeGenerator::failing());
        let source = fx.source("example.py", "def hello(): return 1");
        let doc = fx.source("example.md", "# example");
        fx.workflow
            .store
            .add(DocEntry::new(
                &source.to_string_lossy(),
                &doc.to_string_lossy(),
                "stale-hash",
            ))
            .unwrap();

        let err = fx.workflow.check(&source).unwrap_err();

        assert!(matches!(err, DocgenError::Remote(_)));
        let entries = fx.workflow.store.load().unwrap();
        assert_eq!(entries[0].status, DocStatus::Current);
    }

    #[test]
    fn list_filters_case_insensitively_and_counts() {
        let fx = Fixture::new(FakeGenerator::default());
        fx.workflow
            .store
            .save(&[
                DocEntry::new("utils.py", "docs/utils.md", "abc123"),
                DocEntry {
                    status: DocStatus::Stale,
                    ..DocEntry::new("main.py", "docs/main.md", "def456")
                },
            ])
            .unwrap();

        let all = fx.workflow.list(None).unwrap();
        assert_eq!(all.counts.total, 2);
        assert_eq!(all.counts.current, 1);
        assert_eq!(all.counts.stale, 1);

        let current = fx.workflow.list(Some("CURRENT")).unwrap();
        assert_eq!(current.entries.len(), 1);
        assert_eq!(current.entries[0].source_file, "utils.py");

        let err = fx.workflow.list(Some("invalid")).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn remove_untracks_and_optionally_deletes_doc() {
        let fx = Fixture::new(FakeGenerator::default());
        let a = fx.source("a.py", "a = 1");
        let b = fx.source("b.py", "b = 2");
        let doc_a = fx.workflow.generate(&a, &fx.out()).unwrap().doc_path;
        let doc_b = fx.workflow.generate(&b, &fx.out()).unwrap().doc_path;

        let outcome = fx.workflow.remove(&a, false).unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.deleted_doc, None);
        assert!(doc_a.exists());

        let outcome = fx.workflow.remove(&b, true).unwrap();
        assert_eq!(outcome.deleted_doc, Some(doc_b.clone()));
        assert!(!doc_b.exists());

        assert!(fx.workflow.store.load().unwrap().is_empty());
        assert!(fx.workflow.remove(&a, false).unwrap_err().is_invalid_input());
    }

    #[test]
    fn summarize_never_touches_the_ledger() {
        let fx = Fixture::new(FakeGenerator::default());
        let source = fx.source("cat.py", "print('meow')");

        let summary = fx.workflow.summarize(&source).unwrap();

        assert_eq!(summary, "Prints a greeting.");
        assert_eq!(fx.workflow.generator.calls(), vec!["summarize"]);
        assert!(!fx.workflow.store.path().exists());
    }
}
