// tests/pipeline_test.rs
use std::cell::RefCell;
use std::time::Duration;

use gup::cli::{run_pipeline, Outcome, Pipeline, Variant};
use gup::config::Settings;
use gup::git::{ConfigScope, ConfigStore, MemoryConfig, MockRepository, Repository, MODEL_KEY, TIMEOUT_KEY};
use gup::llm::{ModelInfo, TextGenerator};
use gup::ui::ScriptedPrompter;
use gup::LlmError;

const URL: &str = "git@example.com:ada/app.git";

/// Generator with a fixed model list and one canned reply
struct StubGenerator {
    available: bool,
    models: Vec<ModelInfo>,
    reply: RefCell<Option<Result<String, LlmError>>>,
    calls: RefCell<Vec<(String, Duration)>>,
}

impl StubGenerator {
    fn new(models: &[&str], reply: Result<String, LlmError>) -> Self {
        StubGenerator {
            available: true,
            models: models
                .iter()
                .map(|id| ModelInfo {
                    id: id.to_string(),
                    label: format!("Stub: {}", id),
                })
                .collect(),
            reply: RefCell::new(Some(reply)),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn unavailable() -> Self {
        let mut generator = StubGenerator::new(&[], Err(LlmError::EmptyOutput));
        generator.available = false;
        generator
    }
}

impl TextGenerator for StubGenerator {
    fn is_available(&self) -> bool {
        self.available
    }

    fn list_models(&self, _timeout: Duration) -> Result<Vec<ModelInfo>, LlmError> {
        Ok(self.models.clone())
    }

    fn generate(&self, model: &str, _prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        self.calls.borrow_mut().push((model.to_string(), timeout));
        self.reply.borrow_mut().take().unwrap_or(Err(LlmError::EmptyOutput))
    }
}

fn configured_identity() -> MemoryConfig {
    MemoryConfig::new()
        .with(ConfigScope::Local, "user.name", "Ada")
        .with(ConfigScope::Local, "user.email", "ada@example.com")
}

fn released_repo() -> MockRepository {
    MockRepository::new()
        .with_commits()
        .with_latest_tag("v1.2.3")
        .with_branch("main")
        .with_remote("origin", URL)
        .with_changes(&["src/lib.rs", "README.md"])
}

fn run(
    variant: Variant,
    repo: &MockRepository,
    config: &mut MemoryConfig,
    generator: &StubGenerator,
    answers: &[&str],
) -> Outcome {
    let settings = Settings::default();
    let mut prompter = ScriptedPrompter::new(answers.iter().copied());
    let outcome = run_pipeline(Pipeline {
        variant,
        settings: &settings,
        repo,
        config,
        generator,
        prompter: &mut prompter,
    })
    .unwrap();
    assert_eq!(prompter.remaining(), 0, "unused answers");
    outcome
}

#[test]
fn test_gup_release_with_generated_message() {
    let repo = released_repo();
    let mut config = configured_identity();
    let generator = StubGenerator::new(&["gemini-2.0-flash"], Ok("Add parser module".to_string()));

    let outcome = run(Variant::Gup, &repo, &mut config, &generator, &["", "1"]);

    assert_eq!(outcome, Outcome::Released { tag: "v1.2.4".to_string() });
    assert_eq!(outcome.exit_code(), 0);

    let commits = repo.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].identity.name, "Ada");
    assert!(commits[0]
        .message
        .starts_with("Add parser module\n\nVersion: v1.2.4\nTimestamp: "));

    let tags = repo.annotated_tags();
    assert_eq!(tags[0].0, "v1.2.4");
    assert_eq!(tags[0].1, commits[0].message);

    assert_eq!(
        repo.pushes(),
        vec!["origin refs/heads/main", "origin refs/tags/v1.2.4"]
    );
    assert_eq!(
        config.get(ConfigScope::Local, MODEL_KEY).unwrap().as_deref(),
        Some("gemini-2.0-flash")
    );
}

#[test]
fn test_existing_tags_are_skipped() {
    let repo = released_repo().with_tag("v1.2.4").with_tag("v1.2.5");
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gup, &repo, &mut config, &generator, &["1"]);
    assert_eq!(outcome, Outcome::Released { tag: "v1.2.6".to_string() });
}

#[test]
fn test_generator_timeout_keeps_fallback() {
    let repo = released_repo();
    let mut config = configured_identity().with(ConfigScope::Global, TIMEOUT_KEY, "30");
    let generator = StubGenerator::new(&["gpt-4o"], Err(LlmError::Timeout(30)));

    run(Variant::Gup, &repo, &mut config, &generator, &["", "1"]);

    assert!(repo.commits()[0].message.starts_with("Update 2 project files\n\n"));
    assert_eq!(
        generator.calls.borrow()[0],
        ("gpt-4o".to_string(), Duration::from_secs(30))
    );
}

#[test]
fn test_out_of_range_timeout_is_clamped() {
    let repo = released_repo();
    let mut config = configured_identity().with(ConfigScope::Local, TIMEOUT_KEY, "600");
    let generator = StubGenerator::new(&["gpt-4o"], Ok("Tidy".to_string()));

    run(Variant::Gup, &repo, &mut config, &generator, &["", "1"]);
    assert_eq!(generator.calls.borrow()[0].1, Duration::from_secs(60));
}

#[test]
fn test_without_generator_regenerate_is_not_offered() {
    let repo = released_repo();
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    // "5" is not a valid choice, so the review screen is shown again
    let outcome = run(Variant::Gup, &repo, &mut config, &generator, &["5", "1"]);

    assert_eq!(outcome, Outcome::Released { tag: "v1.2.4".to_string() });
    assert!(repo.commits()[0].message.starts_with("Update 2 project files\n\n"));
}

#[test]
fn test_cancel_leaves_repository_untouched() {
    let repo = released_repo();
    let mut config = configured_identity();
    let generator = StubGenerator::new(&["gemini-2.0-flash"], Ok("Add parser".to_string()));

    let outcome = run(Variant::Gup, &repo, &mut config, &generator, &["", "4"]);

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(outcome.exit_code(), 0);
    assert!(repo.commits().is_empty());
    assert!(repo.annotated_tags().is_empty());
    assert!(repo.pushes().is_empty());
}

#[test]
fn test_nothing_to_commit() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("v1.0.0")
        .with_branch("main");
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gup, &repo, &mut config, &generator, &[]);
    assert_eq!(outcome, Outcome::NothingToCommit);
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn test_bootstrap_without_files_has_no_staged_changes() {
    let repo = MockRepository::new().with_branch("main");
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gitgo, &repo, &mut config, &generator, &[]);
    assert_eq!(outcome, Outcome::NoStagedChanges);
    assert!(repo.commits().is_empty());
}

#[test]
fn test_gitgo_bootstrap_release_with_prompted_identity() {
    let repo = MockRepository::new()
        .with_branch("main")
        .with_remote("origin", URL)
        .with_changes(&["README.md"]);
    let mut config = MemoryConfig::new();
    let generator = StubGenerator::unavailable();

    let outcome = run(
        Variant::Gitgo,
        &repo,
        &mut config,
        &generator,
        &["Ada", "ada@example.com", "", "1"],
    );

    assert_eq!(outcome, Outcome::Released { tag: "v0.0.1".to_string() });
    let commit = &repo.commits()[0];
    assert!(commit.message.starts_with("Initial commit\n\nVersion: v0.0.1\n"));
    assert_eq!(commit.identity.email, "ada@example.com");
    // prompted identities are used, not saved
    assert_eq!(config.get(ConfigScope::Local, "user.name").unwrap(), None);
}

#[test]
fn test_gitgo_typed_message_is_normalized() {
    let repo = released_repo();
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();
    let long = "Refactor ".repeat(12);

    run(Variant::Gitgo, &repo, &mut config, &generator, &[long.as_str(), "1"]);

    let message = &repo.commits()[0].message;
    let summary = message.lines().next().unwrap();
    assert!(summary.chars().count() <= 72);
    assert!(summary.starts_with("Refactor Refactor"));
}

#[test]
fn test_edited_message_body_is_committed_verbatim() {
    let repo = released_repo();
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();
    let edited = "Add parser\n    indented line\nsecond\n";

    run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "3", edited, "1"]);

    let message = &repo.commits()[0].message;
    assert!(message.starts_with("Add parser\n    indented line\nsecond\n\nVersion: v1.2.4\nTimestamp: "));
    assert_eq!(&repo.annotated_tags()[0].1, message);
}

#[test]
fn test_detached_head_pushes_default_branch() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("v2.0.0")
        .with_remote("origin", URL)
        .with_changes(&["a.txt"]);
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "1"]);
    assert_eq!(
        repo.pushes(),
        vec!["origin refs/heads/main", "origin refs/tags/v2.0.1"]
    );
}

#[test]
fn test_push_failure_keeps_local_release() {
    let repo = released_repo().with_push_error("authentication failed");
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "1"]);

    assert_eq!(
        outcome,
        Outcome::PushFailed {
            tag: "v1.2.4".to_string(),
            branch: "main".to_string(),
            commands: [
                "git push -u origin main".to_string(),
                "git push origin v1.2.4".to_string()
            ],
        }
    );
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(repo.commits().len(), 1);
    assert!(repo.tag_exists("v1.2.4").unwrap());
}

#[test]
fn test_missing_remote_blank_url_releases_locally() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("v1.0.0")
        .with_branch("main")
        .with_changes(&["a.txt"]);
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "1", ""]);

    assert_eq!(outcome, Outcome::LocalOnly { tag: "v1.0.1".to_string() });
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(repo.commits().len(), 1);
    assert!(repo.pushes().is_empty());
}

#[test]
fn test_unreachable_remote_commits_nothing() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("v1.0.0")
        .with_branch("main")
        .with_changes(&["a.txt"]);
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(
        Variant::Gitgo,
        &repo,
        &mut config,
        &generator,
        &["Fix typo", "1", "https://example.invalid/nope.git"],
    );

    assert_eq!(
        outcome,
        Outcome::RemoteRejected {
            url: "https://example.invalid/nope.git".to_string()
        }
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(repo.commits().is_empty());
    assert!(repo.annotated_tags().is_empty());
    assert!(repo.remotes().unwrap().is_empty());
}

#[test]
fn test_reachable_remote_is_added_and_pushed() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("v1.0.0")
        .with_branch("main")
        .with_reachable_url(URL)
        .with_changes(&["a.txt"]);
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "1", URL]);

    assert_eq!(outcome, Outcome::Released { tag: "v1.0.1".to_string() });
    assert_eq!(repo.remotes().unwrap()[0].url, URL);
    assert_eq!(repo.pushes().len(), 2);
}

#[test]
fn test_unparsable_latest_tag_starts_from_zero() {
    let repo = MockRepository::new()
        .with_commits()
        .with_latest_tag("release-7")
        .with_branch("main")
        .with_remote("origin", URL)
        .with_changes(&["a.txt"]);
    let mut config = configured_identity();
    let generator = StubGenerator::unavailable();

    let outcome = run(Variant::Gitgo, &repo, &mut config, &generator, &["Fix typo", "1"]);
    assert_eq!(outcome, Outcome::Released { tag: "v0.0.1".to_string() });
}
