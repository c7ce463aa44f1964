use folder2vec::core::config::Config;
use folder2vec::{build_catalog, run, Embedding, EmbeddingProvider, Error, Mode, Outcome, Result, RunOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic stand-in for a sentence embedding model: one axis per topic,
/// scored by keyword hits.
struct KeywordProvider;

const TOPICS: [&[&str]; 3] = [
    &["color", "red", "blue", "green"],
    &["animal", "cat", "dog", "bird"],
    &["recipe", "cook", "bake", "flour"],
];

impl EmbeddingProvider for KeywordProvider {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                TOPICS
                    .iter()
                    .map(|words| words.iter().filter(|w| text.contains(*w)).count() as f32)
                    .collect()
            })
            .collect())
    }
}

fn markdown_config(exclude: &[&str]) -> Config {
    let yaml = format!(
        "include_exts: [.md]\nexclude_dirs: [{}]\n",
        exclude.join(", ")
    );
    Config::from_yaml_str(&yaml, Path::new(".")).unwrap()
}

fn options(mode: Mode) -> RunOptions {
    RunOptions {
        mode,
        parallel: false,
    }
}

/// Every file under `root` as a sorted list of root-relative paths
fn snapshot(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// colors/, animals/ and a loose doc.md about colors
fn colors_and_animals() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("colors")).unwrap();
    fs::create_dir_all(root.join("animals")).unwrap();
    fs::write(root.join("doc.md"), "Red, blue and green are my favourite colors.").unwrap();
    temp_dir
}

fn collect_run(root: &Path, config: &Config, opts: RunOptions) -> Result<Vec<(PathBuf, PathBuf, Outcome)>> {
    let mut records = Vec::new();
    run(root, config, opts, || Ok(KeywordProvider), |assignment, outcome| {
        records.push((
            assignment.file_path.clone(),
            assignment.target_directory.clone(),
            outcome.clone(),
        ));
    })?;
    Ok(records)
}

#[test]
fn test_file_assigned_to_most_similar_directory() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;

    let records = collect_run(&root, &markdown_config(&[]), options(Mode::Preview))?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, root.join("doc.md"));
    assert_eq!(records[0].1, root.join("colors"));
    assert_eq!(records[0].2, Outcome::Planned);
    Ok(())
}

#[test]
fn test_exclusion_overrides_match_quality() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;

    let config = markdown_config(&["colors"]);
    let catalog = build_catalog(&root, &config)?;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].label, "animals");

    let records = collect_run(&root, &config, options(Mode::Preview))?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].1, root.join("animals"));
    Ok(())
}

#[test]
fn test_excluded_files_never_classified_or_moved() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;
    fs::create_dir_all(root.join("archive/nested"))?;
    fs::write(root.join("archive/cat.md"), "a cat")?;
    fs::write(root.join("archive/nested/dog.md"), "a dog")?;

    let records = collect_run(&root, &markdown_config(&["archive"]), options(Mode::Apply))?;
    for (file, target, _) in &records {
        assert!(!file.starts_with(root.join("archive")));
        assert!(!target.starts_with(root.join("archive")));
    }
    assert!(root.join("archive/cat.md").exists());
    assert!(root.join("archive/nested/dog.md").exists());
    assert!(root.join("colors/doc.md").exists());
    Ok(())
}

#[test]
fn test_empty_root_exits_before_loading_provider() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("doc.md"), "red").unwrap();

    let result = run(
        temp_dir.path(),
        &markdown_config(&[]),
        options(Mode::Preview),
        || -> Result<KeywordProvider> { panic!("provider must not be loaded") },
        |_, _| panic!("nothing should be reported before the catalog exists"),
    );
    match result {
        Err(e @ Error::EmptyCatalog(_)) => {
            assert!(e.is_clean_exit());
            assert!(e.to_string().contains("No subdirectories found"));
        }
        other => panic!("expected EmptyCatalog, got {:?}", other),
    }
    assert!(temp_dir.path().join("doc.md").exists());
}

#[test]
fn test_no_eligible_files_exits_before_loading_provider() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("colors")).unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "red").unwrap();

    let result = run(
        temp_dir.path(),
        &markdown_config(&[]),
        options(Mode::Preview),
        || -> Result<KeywordProvider> { panic!("provider must not be loaded") },
        |_, _| panic!("nothing should be reported without eligible files"),
    );
    assert!(matches!(result, Err(Error::EmptyFileSet(_))));
}

#[test]
fn test_provider_failure_is_fatal() {
    let temp_dir = colors_and_animals();

    let result = run(
        temp_dir.path(),
        &markdown_config(&[]),
        options(Mode::Apply),
        || -> Result<KeywordProvider> {
            Err(Error::ProviderUnavailable("no weights".to_string()))
        },
        |_, _| {},
    );
    match result {
        Err(e) => assert!(e.is_fatal()),
        Ok(_) => panic!("run should fail without a provider"),
    }
    assert!(temp_dir.path().join("doc.md").exists());
}

#[test]
fn test_preview_never_mutates() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("animals/pets"))?;
    fs::write(root.join("animals/pets/paint.md"), "blue paint")?;
    fs::write(root.join("colors/kitten.md"), "a cat")?;

    let before = snapshot(root);
    let records = collect_run(root, &markdown_config(&[]), options(Mode::Preview))?;
    assert_eq!(records.len(), 3);
    assert_eq!(snapshot(root), before);
    Ok(())
}

#[test]
fn test_apply_moves_then_second_run_is_noop() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = fs::canonicalize(temp_dir.path())?;
    for dir in ["colors", "animals", "recipes/baking"] {
        fs::create_dir_all(root.join(dir))?;
    }
    fs::write(root.join("palette.md"), "red and blue")?;
    fs::write(root.join("colors/pets.md"), "my cat and my dog")?;
    fs::write(root.join("animals/bread.md"), "bake with flour")?;

    let config = markdown_config(&[]);
    let first = collect_run(&root, &config, options(Mode::Apply))?;
    let moved = first
        .iter()
        .filter(|(_, _, o)| matches!(o, Outcome::Moved { .. }))
        .count();
    assert_eq!(moved, 3);
    assert!(root.join("colors/palette.md").exists());
    assert!(root.join("animals/pets.md").exists());
    // "baking" has no keyword hits, so its zero vector never wins
    assert!(root.join("recipes/bread.md").exists());

    let after_first = snapshot(&root);
    let second = collect_run(&root, &config, options(Mode::Apply))?;
    assert_eq!(second.len(), 3);
    assert!(second.iter().all(|(_, _, o)| *o == Outcome::AlreadyInPlace));
    assert_eq!(snapshot(&root), after_first);
    Ok(())
}

#[test]
fn test_file_already_in_best_directory_is_not_moved() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;
    fs::remove_file(root.join("doc.md"))?;
    fs::write(root.join("animals/dog.md"), "the dog chased the cat")?;

    let mut moved = 0;
    let summary = run(
        &root,
        &markdown_config(&[]),
        options(Mode::Apply),
        || Ok(KeywordProvider),
        |_, outcome| {
            if let Outcome::Moved { .. } = outcome {
                moved += 1;
            }
        },
    )?;
    assert_eq!(moved, 0);
    assert_eq!(summary.moved, 0);
    assert_eq!(summary.unchanged, 1);
    assert!(root.join("animals/dog.md").exists());
    Ok(())
}

#[test]
fn test_unreadable_file_does_not_abort_run() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;
    fs::write(root.join("binary.md"), [0xc3u8, 0x28, 0xff])?;
    fs::write(root.join("zoo.md"), "bird and dog")?;

    let summary = run(
        &root,
        &markdown_config(&[]),
        options(Mode::Apply),
        || Ok(KeywordProvider),
        |_, _| {},
    )?;
    assert_eq!(summary.files, 3);
    assert_eq!(summary.skipped_files, 1);
    assert_eq!(summary.moved, 2);
    assert!(root.join("binary.md").exists());
    assert!(root.join("colors/doc.md").exists());
    assert!(root.join("animals/zoo.md").exists());
    Ok(())
}

#[test]
fn test_failed_move_is_counted_and_run_continues() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;
    // A non-empty directory occupies the destination of doc.md
    fs::create_dir_all(root.join("colors/doc.md"))?;
    fs::write(root.join("colors/doc.md/keep.txt"), "keep")?;
    fs::write(root.join("zoo.md"), "bird and dog")?;

    let mut moved = Vec::new();
    let summary = run(
        &root,
        &markdown_config(&[]),
        options(Mode::Apply),
        || Ok(KeywordProvider),
        |assignment, outcome| {
            if let Outcome::Moved { .. } = outcome {
                moved.push(assignment.file_path.clone());
            }
        },
    )?;

    assert_eq!(summary.files, 2);
    assert_eq!(summary.failed_moves, 1);
    assert_eq!(summary.moved, 1);
    assert_eq!(moved, vec![root.join("zoo.md")]);
    assert_eq!(fs::read_to_string(root.join("doc.md"))?, "Red, blue and green are my favourite colors.");
    assert!(root.join("colors/doc.md/keep.txt").exists());
    assert!(root.join("animals/zoo.md").exists());
    Ok(())
}

#[test]
fn test_parallel_run_assigns_the_same_directories() -> Result<()> {
    let temp_dir = colors_and_animals();
    let root = fs::canonicalize(temp_dir.path())?;
    for i in 0..12 {
        let text = if i % 2 == 0 { "green" } else { "dog" };
        fs::write(root.join(format!("note{}.md", i)), text)?;
    }

    let config = markdown_config(&[]);
    let mut sequential = collect_run(&root, &config, options(Mode::Preview))?;
    let mut parallel = collect_run(
        &root,
        &config,
        RunOptions {
            mode: Mode::Preview,
            parallel: true,
        },
    )?;
    sequential.sort_by(|a, b| a.0.cmp(&b.0));
    parallel.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(sequential, parallel);
    Ok(())
}

#[test]
fn test_duplicate_labels_resolve_to_first_in_traversal_order() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = fs::canonicalize(temp_dir.path())?;
    fs::create_dir_all(root.join("a/colors"))?;
    fs::create_dir_all(root.join("b/colors"))?;
    fs::write(root.join("doc.md"), "blue")?;

    let config = markdown_config(&[]);
    let first = collect_run(&root, &config, options(Mode::Preview))?;
    let second = collect_run(&root, &config, options(Mode::Preview))?;
    assert_eq!(first[0].1, root.join("a/colors"));
    assert_eq!(first, second);
    Ok(())
}
