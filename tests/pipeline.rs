//! End-to-end tests against real git repositories.
//!
//! Each test builds a throwaway repository with the `git` binary. When git
//! is not installed the tests print a note and return early.

use std::fs;
use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;
use tempfile::TempDir;

use repo_hotspots::{
    AnalysisError, Category, ChangeMode, CompiledConfig, GitCli, TimeWindow, analyze,
    analyze_with, find_repository_root,
};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str], date: &str) {
    let status = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "core.hooksPath=/dev/null"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .output()
        .expect("git should run");
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn commit_all(root: &Path, message: &str, date: &str) {
    git(root, &["add", "-A"], date);
    git(root, &["commit", "-q", "-m", message], date);
}

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"], "2015-01-01T00:00:00");
    dir
}

fn unbounded() -> CompiledConfig {
    CompiledConfig {
        months_back: -1,
        ..CompiledConfig::empty()
    }
}

#[test]
fn two_file_scenario_with_commit_counts() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "a.py", &"x = 1\n".repeat(9));
    commit_all(root, "first", "2020-01-01T00:00:00");
    write(root, "a.py", &"x = 1\n".repeat(10));
    commit_all(root, "second", "2020-02-01T00:00:00");
    // b.yaml exists but was never committed
    write(root, "b.yaml", "a: 1\nb: 2\nc: 3\n");

    let analysis = analyze(root, &unbounded()).unwrap();
    let rows: Vec<(&str, u64, u64)> = analysis
        .table
        .rows
        .iter()
        .map(|r| (r.path.as_str(), r.complexity, r.changes))
        .collect();

    assert_eq!(rows, vec![("a.py", 10, 2), ("b.yaml", 3, 0)]);
    assert_eq!(analysis.table.rows[1].category, Category::ConfigFormat);
}

#[test]
fn lines_changed_sums_additions_and_deletions() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "src/m.py", "a\nb\nc\n");
    commit_all(root, "add", "2021-01-01T00:00:00");
    write(root, "src/m.py", "a\nc\nd\ne\n");
    commit_all(root, "edit", "2021-02-01T00:00:00");

    let config = CompiledConfig {
        changes: ChangeMode::Lines,
        ..unbounded()
    };
    let analysis = analyze(root, &config).unwrap();

    // 3 added, then 1 deleted + 2 added
    assert_eq!(analysis.table.rows[0].path, "src/m.py");
    assert_eq!(analysis.table.rows[0].changes, 6);
}

#[test]
fn windowing_never_increases_changes() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "a.py", "1\n");
    commit_all(root, "old", "2016-03-01T00:00:00");
    write(root, "a.py", "1\n2\n");
    commit_all(root, "newer", "2022-03-01T00:00:00");
    write(root, "a.py", "1\n2\n3\n");
    commit_all(root, "newest", "2023-03-01T00:00:00");

    let repository = find_repository_root(root).unwrap();
    let history = GitCli::new(&repository);
    let cutoff = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    for mode in [ChangeMode::Commits, ChangeMode::Lines] {
        let config = CompiledConfig {
            changes: mode,
            ..CompiledConfig::empty()
        };
        let all = analyze_with(&repository, &repository, &config, &history, TimeWindow::Unbounded)
            .unwrap();
        let recent = analyze_with(
            &repository,
            &repository,
            &config,
            &history,
            TimeWindow::Since(cutoff),
        )
        .unwrap();

        assert!(recent.table.rows[0].changes <= all.table.rows[0].changes);
        assert!(recent.table.rows[0].changes < all.table.rows[0].changes, "{}", mode);
    }
}

#[test]
fn rename_counts_once_for_destination() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "old_name.py", &"line\n".repeat(20));
    commit_all(root, "add", "2021-01-01T00:00:00");
    git(root, &["mv", "old_name.py", "new_name.py"], "2021-02-01T00:00:00");
    commit_all(root, "rename", "2021-02-01T00:00:00");

    let analysis = analyze(root, &unbounded()).unwrap();
    assert_eq!(analysis.table.rows.len(), 1);
    assert_eq!(analysis.table.rows[0].path, "new_name.py");
    assert_eq!(analysis.table.rows[0].changes, 1);
}

#[test]
fn depth_zero_aggregation_over_real_tree() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "src/x.py", &"l\n".repeat(5));
    write(root, "src/y.py", &"l\n".repeat(7));
    commit_all(root, "one", "2021-01-01T00:00:00");
    write(root, "src/y.py", &"l\n".repeat(7).replacen('l', "m", 1));
    commit_all(root, "two", "2021-01-02T00:00:00");
    write(root, "src/x.py", &"l\n".repeat(5).replacen('l', "m", 1));
    write(root, "src/y.py", &"l\n".repeat(7));
    commit_all(root, "three", "2021-01-03T00:00:00");

    let config = CompiledConfig {
        depth: Some(0),
        ..unbounded()
    };
    let analysis = analyze(root, &config).unwrap();

    assert_eq!(analysis.table.rows.len(), 1);
    let node = &analysis.table.rows[0];
    assert_eq!(node.path, "src/");
    assert_eq!(node.category, Category::Directory);
    assert_eq!((node.complexity, node.changes), (12, 5));
}

#[cfg(unix)]
#[test]
fn symlinked_root_matches_real_root() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "pkg/a.py", "1\n2\n");
    write(root, "pkg/sub/b.py", "1\n");
    commit_all(root, "add", "2021-01-01T00:00:00");

    let links = TempDir::new().unwrap();
    let link = links.path().join("linked");
    std::os::unix::fs::symlink(root, &link).unwrap();

    let config = CompiledConfig {
        depth: Some(1),
        ..unbounded()
    };
    let real = analyze(root, &config).unwrap();
    let linked = analyze(&link, &config).unwrap();

    assert_eq!(real.table.rows, linked.table.rows);
    let paths: Vec<&str> = real.table.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["pkg/a.py", "pkg/sub/"]);
}

#[test]
fn excluded_directories_never_reach_the_table() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "app/main.js", "run()\n");
    write(root, "app/lib/vendor/node_modules/dep/index.js", "x\n");
    write(root, "node_modules/top/index.js", "x\n");
    write(root, "package-lock.json", "{}\n");
    commit_all(root, "add", "2021-01-01T00:00:00");

    let mut config = unbounded();
    config.exclude_dirs.insert("node_modules".to_string());
    config.exclude_files.insert("package-lock.json".to_string());

    let analysis = analyze(root, &config).unwrap();
    let paths: Vec<&str> = analysis.table.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["app/main.js"]);
}

#[test]
fn repository_without_commits_fails() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    write(dir.path(), "a.py", "x\n");

    let result = analyze(dir.path(), &unbounded());
    assert!(matches!(result, Err(AnalysisError::History(_))));
}

#[cfg(unix)]
#[test]
fn glob_characters_in_names_do_not_leak_lines_changed() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "pages/[id].tsx", "export default Page\n");
    write(root, "pages/i.tsx", &"line\n".repeat(100));
    write(root, "pages/a*b.tsx", &"x\n".repeat(3));
    write(root, "pages/aXb.tsx", &"y\n".repeat(40));
    commit_all(root, "pages", "2021-01-01T00:00:00");

    for mode in [ChangeMode::Lines, ChangeMode::Commits] {
        let config = CompiledConfig {
            changes: mode,
            ..unbounded()
        };
        let analysis = analyze(root, &config).unwrap();
        let changes: Vec<(&str, u64)> = analysis
            .table
            .rows
            .iter()
            .map(|r| (r.path.as_str(), r.changes))
            .collect();

        let expected = match mode {
            ChangeMode::Lines => vec![
                ("pages/[id].tsx", 1),
                ("pages/a*b.tsx", 3),
                ("pages/aXb.tsx", 40),
                ("pages/i.tsx", 100),
            ],
            ChangeMode::Commits => vec![
                ("pages/[id].tsx", 1),
                ("pages/a*b.tsx", 1),
                ("pages/aXb.tsx", 1),
                ("pages/i.tsx", 1),
            ],
        };
        assert_eq!(changes, expected, "{}", mode);
    }
}

#[test]
fn submodule_git_file_is_not_a_row() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = init_repo();
    let root = dir.path();
    write(root, "main.py", "run()\n");
    commit_all(root, "add", "2021-01-01T00:00:00");
    // worktrees and submodules mark their root with a `.git` file
    write(root, "vendored/.git", "gitdir: ../.git/modules/vendored\n");
    write(root, "vendored/lib.py", "x\n");

    let analysis = analyze(root, &unbounded()).unwrap();
    let paths: Vec<&str> = analysis.table.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["main.py", "vendored/lib.py"]);
}
