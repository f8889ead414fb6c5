//! Coverage snapshots: every profile of one coverage run, keyed by file name,
//! with statement totals for the whole snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{CovdeltaError, Result};
use crate::model::{percent, Profile};

/// The package (directory) a file belongs to, e.g. `a/b/c.go` → `a/b`.
/// A bare file name belongs to `.`.
#[must_use]
pub fn package_of(file_name: &str) -> &str {
    match file_name.rfind('/') {
        Some(0) => "/",
        Some(pos) => &file_name[..pos],
        None => ".",
    }
}

/// Remove a literal leading `prefix` and the path separator following it.
/// A name that ends up empty is the package root, `.`. Names that do not
/// start with `prefix` are returned unchanged.
#[must_use]
pub fn trim_path(name: &str, prefix: &str) -> String {
    let Some(rest) = name.strip_prefix(prefix) else {
        return name.to_string();
    };
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        ".".to_string()
    } else {
        rest.to_string()
    }
}

/// One coverage snapshot. Totals always equal the sums over `files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Coverage {
    files: BTreeMap<String, Profile>,
    total_stmt: u64,
    covered_stmt: u64,
    missed_stmt: u64,
}

impl Coverage {
    /// Build a snapshot from parsed profiles. Every file may appear only once.
    pub fn build(profiles: impl IntoIterator<Item = Profile>) -> Result<Self> {
        let mut cov = Coverage::default();
        for profile in profiles {
            if cov.files.contains_key(&profile.file_name) {
                return Err(CovdeltaError::DuplicateFile(profile.file_name));
            }
            cov.add(profile);
        }
        Ok(cov)
    }

    fn add(&mut self, profile: Profile) {
        self.total_stmt += profile.total_stmt;
        self.covered_stmt += profile.covered_stmt;
        self.missed_stmt = self.total_stmt - self.covered_stmt;
        self.files.insert(profile.file_name.clone(), profile);
    }

    pub fn files(&self) -> &BTreeMap<String, Profile> {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&Profile> {
        self.files.get(name)
    }

    pub fn total_stmt(&self) -> u64 {
        self.total_stmt
    }

    pub fn covered_stmt(&self) -> u64 {
        self.covered_stmt
    }

    pub fn missed_stmt(&self) -> u64 {
        self.missed_stmt
    }

    /// Percentage of covered statements, 0 for an empty snapshot.
    #[must_use]
    pub fn percent(&self) -> f64 {
        percent(self.covered_stmt, self.total_stmt)
    }

    /// Split the snapshot into one snapshot per package directory.
    pub fn by_package(&self) -> BTreeMap<String, Coverage> {
        let mut packages: BTreeMap<String, Coverage> = BTreeMap::new();
        for profile in self.files.values() {
            packages
                .entry(package_of(&profile.file_name).to_string())
                .or_default()
                .add(profile.clone());
        }
        packages
    }

    /// Keep only the files matching `keep`, recomputing the totals.
    pub fn retain_files(&mut self, mut keep: impl FnMut(&Profile) -> bool) {
        let files = std::mem::take(&mut self.files);
        *self = Coverage::default();
        for profile in files.into_values().filter(|p| keep(p)) {
            self.add(profile);
        }
    }

    /// Rewrite every file name with [`trim_path`].
    ///
    /// If two names collapse onto the same trimmed name, the first one in name
    /// order wins and the totals are recomputed without the other.
    pub fn trim_prefix(&mut self, prefix: &str) {
        let files = std::mem::take(&mut self.files);
        *self = Coverage::default();
        for mut profile in files.into_values() {
            let trimmed = trim_path(&profile.file_name, prefix);
            if self.files.contains_key(&trimmed) {
                log::warn!(
                    "Dropping {:?}: trimming {:?} collides with an existing file",
                    profile.file_name,
                    prefix
                );
                continue;
            }
            profile.file_name = trimmed;
            self.add(profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Mode};
    use proptest::prelude::*;

    fn profile(name: &str, stmts: &[(u32, u64)]) -> Profile {
        let blocks = stmts
            .iter()
            .enumerate()
            .map(|(i, &(num_stmt, count))| Block {
                start_line: i as u32 + 1,
                start_col: 1,
                end_line: i as u32 + 2,
                end_col: 1,
                num_stmt,
                count,
            })
            .collect();
        Profile::new(name.to_string(), Mode::Count, blocks)
    }

    fn sample() -> Coverage {
        Coverage::build(vec![
            profile("example.com/app/main.go", &[(5, 1), (5, 0)]),
            profile("example.com/app/util.go", &[(2, 3)]),
            profile("example.com/app/db/store.go", &[(4, 0), (6, 2)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("example.com/app/main.go"), "example.com/app");
        assert_eq!(package_of("main.go"), ".");
        assert_eq!(package_of("/main.go"), "/");
    }

    #[test]
    fn test_trim_path() {
        assert_eq!(trim_path("example.com/app/main.go", "example.com/app"), "main.go");
        assert_eq!(trim_path("example.com/app/main.go", "example.com/app/"), "main.go");
        assert_eq!(trim_path("example.com/app", "example.com/app"), ".");
        assert_eq!(trim_path("other.org/x.go", "example.com/app"), "other.org/x.go");
        assert_eq!(trim_path("/abs/x.go", "example.com"), "/abs/x.go");
    }

    #[test]
    fn test_build_totals() {
        let cov = sample();
        assert_eq!(cov.files().len(), 3);
        assert_eq!(cov.total_stmt(), 22);
        assert_eq!(cov.covered_stmt(), 13);
        assert_eq!(cov.missed_stmt(), 9);
        assert!((cov.percent() - 59.0909).abs() < 1e-3);
    }

    #[test]
    fn test_build_duplicate_file() {
        let err = Coverage::build(vec![
            profile("example.com/app/main.go", &[(1, 1)]),
            profile("example.com/app/main.go", &[(1, 0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CovdeltaError::DuplicateFile(name) if name == "example.com/app/main.go"));
    }

    #[test]
    fn test_empty_percent() {
        let cov = Coverage::build(Vec::new()).unwrap();
        assert_eq!(cov.percent(), 0.0);
    }

    #[test]
    fn test_by_package() {
        let pkgs = sample().by_package();
        assert_eq!(pkgs.len(), 2);

        let app = &pkgs["example.com/app"];
        assert_eq!(app.files().len(), 2);
        assert_eq!(app.total_stmt(), 12);
        assert_eq!(app.covered_stmt(), 7);
        assert_eq!(app.missed_stmt(), 5);

        let db = &pkgs["example.com/app/db"];
        assert_eq!(db.total_stmt(), 10);
        assert_eq!(db.covered_stmt(), 6);
    }

    #[test]
    fn test_retain_files() {
        let mut cov = sample();
        cov.retain_files(|p| !p.file_name.ends_with("store.go"));
        assert_eq!(cov.files().len(), 2);
        assert_eq!(cov.total_stmt(), 12);
        assert_eq!(cov.covered_stmt(), 7);
    }

    #[test]
    fn test_trim_prefix() {
        let mut cov = sample();
        cov.trim_prefix("example.com/app");

        let names: Vec<&str> = cov.files().keys().map(String::as_str).collect();
        assert_eq!(names, ["db/store.go", "main.go", "util.go"]);
        for (name, profile) in cov.files() {
            assert_eq!(name, &profile.file_name);
        }
        assert_eq!(cov.total_stmt(), 22);

        let pkgs = cov.by_package();
        assert!(pkgs.contains_key("."));
        assert!(pkgs.contains_key("db"));
    }

    #[test]
    fn test_trim_prefix_exact_match() {
        let mut cov = Coverage::build(vec![profile("example.com/app", &[(1, 1)])]).unwrap();
        cov.trim_prefix("example.com/app");
        assert!(cov.file(".").is_some());
    }

    #[test]
    fn test_trim_prefix_collision_keeps_first() {
        let mut cov = Coverage::build(vec![
            profile("a/x.go", &[(1, 1)]),
            profile("ax.go", &[(4, 0)]),
        ])
        .unwrap();
        cov.trim_prefix("a");

        assert_eq!(cov.files().len(), 1);
        assert_eq!(cov.total_stmt(), 1);
        assert_eq!(cov.covered_stmt(), 1);
    }

    fn arb_coverage() -> impl Strategy<Value = Coverage> {
        prop::collection::btree_map(
            "(lib|lib/sub|cmd/tool)/[a-z]{1,6}\\.go",
            prop::collection::vec((1u32..20, 0u64..3), 0..6),
            0..10,
        )
        .prop_map(|files| {
            let profiles: Vec<Profile> = files
                .iter()
                .map(|(name, stmts)| profile(name, stmts))
                .collect();
            Coverage::build(profiles).unwrap()
        })
    }

    proptest! {
        #[test]
        fn totals_are_consistent(cov in arb_coverage()) {
            prop_assert_eq!(cov.total_stmt(), cov.covered_stmt() + cov.missed_stmt());
            if cov.total_stmt() > 0 {
                prop_assert!((0.0..=100.0).contains(&cov.percent()));
            } else {
                prop_assert_eq!(cov.percent(), 0.0);
            }
        }

        #[test]
        fn by_package_partitions_files(cov in arb_coverage()) {
            let pkgs = cov.by_package();

            let grouped: usize = pkgs.values().map(|p| p.files().len()).sum();
            prop_assert_eq!(grouped, cov.files().len());

            for (pkg, pkg_cov) in &pkgs {
                let members: Vec<&Profile> = cov
                    .files()
                    .values()
                    .filter(|p| package_of(&p.file_name) == pkg)
                    .collect();
                prop_assert_eq!(members.len(), pkg_cov.files().len());
                prop_assert_eq!(
                    pkg_cov.total_stmt(),
                    members.iter().map(|p| p.total_stmt).sum::<u64>()
                );
                prop_assert_eq!(
                    pkg_cov.covered_stmt(),
                    members.iter().map(|p| p.covered_stmt).sum::<u64>()
                );
            }
        }

        #[test]
        fn trim_prefix_is_idempotent_once_nothing_matches(cov in arb_coverage()) {
            let mut trimmed = cov.clone();
            trimmed.trim_prefix("lib/");
            prop_assume!(trimmed.files().keys().all(|name| !name.starts_with("lib/")));

            let mut again = trimmed.clone();
            again.trim_prefix("lib/");
            prop_assert_eq!(again, trimmed);
        }

        #[test]
        fn trim_prefix_without_match_is_noop(cov in arb_coverage()) {
            let mut trimmed = cov.clone();
            trimmed.trim_prefix("vendor/");
            prop_assert_eq!(trimmed, cov);
        }
    }
}
