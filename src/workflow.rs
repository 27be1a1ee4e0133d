//! Upgrade workflow coordination
//!
//! This module provides:
//! - Workflow coordination: read manifest → validate → fetch diff → reconcile → apply
//! - Ownership of the diff and metadata caches, with forced refresh
//! - Upgrade state handling (reset when a pair is not tracked upstream)
//! - Dry-run mode support through the manifest store
//!
//! The workflow is built from its sources up front; nothing is wired in
//! after construction.

use crate::annotate::{annotate, Annotation};
use crate::config::Settings;
use crate::diff::{DiffData, DiffParser, VersionPairCache};
use crate::domain::{PackageChange, PackageInfo, RequirementResult};
use crate::error::{AppError, DiffError, RegistryError, ValidationError};
use crate::manifest::{installed_packages, read_manifest, ManifestDocument, ManifestStore};
use crate::progress::Progress;
use crate::reconcile::{
    apply_in_place, reconcile, resolve_pair, ApplyReport, InstalledPackages, Selection,
    VersionPair,
};
use crate::registry::{
    DiffSource, DirectoryClient, HttpClient, HttpDiffSource, PackageInfoSource,
};
use crate::state::{MetadataCache, UpgradeState};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Reconciliation of one manifest against one target release
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Manifest that was analyzed
    pub manifest_path: PathBuf,
    /// Framework release the analysis started from (explicit, persisted or declared)
    pub current_version: String,
    /// Diff pair that was used
    pub pair: VersionPair,
    /// Upstream changes for the pair
    pub changes: Vec<PackageChange>,
    /// Required edits, dependencies first
    pub results: Vec<RequirementResult>,
}

/// Result of an apply run
#[derive(Debug, Clone)]
pub struct ApplyRun {
    /// Analysis the selection was made from
    pub analysis: Analysis,
    /// Results that were selected for applying
    pub selected: Vec<RequirementResult>,
    /// Per-package outcome
    pub report: ApplyReport,
    /// Whether the manifest file was rewritten
    pub file_modified: bool,
    /// Whether this was a dry-run
    pub dry_run: bool,
}

/// Result of annotating a manifest
#[derive(Debug, Clone)]
pub struct InfoRun {
    /// Manifest that was annotated
    pub manifest_path: PathBuf,
    /// One entry per declared dependency
    pub annotations: Vec<Annotation>,
    /// Metadata fetch error, if cached data had to be used
    pub error: Option<String>,
}

/// Coordinates diff fetching, reconciliation and manifest edits
pub struct UpgradeWorkflow {
    settings: Settings,
    diff_source: Box<dyn DiffSource>,
    info_source: Box<dyn PackageInfoSource>,
    parser: DiffParser,
    store: ManifestStore,
    diff_cache: Mutex<VersionPairCache>,
    info_cache: Mutex<HashMap<String, PackageInfo>>,
    show_progress: bool,
}

impl UpgradeWorkflow {
    /// Create a workflow talking to the configured remote sources
    pub fn new(settings: Settings, dry_run: bool) -> Result<Self, AppError> {
        let client = HttpClient::with_timeout(settings.timeout())
            .map_err(|e| RegistryError::network_error("HTTP client", e.to_string()))?;
        let diff_source = HttpDiffSource::with_base_url(client.clone(), &settings.diff_base_url);
        let info_source = DirectoryClient::with_url(client, &settings.metadata_url);
        Ok(Self::with_sources(
            settings,
            Box::new(diff_source),
            Box::new(info_source),
            dry_run,
        ))
    }

    /// Create a workflow with explicit sources
    pub fn with_sources(
        settings: Settings,
        diff_source: Box<dyn DiffSource>,
        info_source: Box<dyn PackageInfoSource>,
        dry_run: bool,
    ) -> Self {
        Self {
            parser: DiffParser::new(&settings.manifest_filename),
            settings,
            diff_source,
            info_source,
            store: ManifestStore::new(dry_run),
            diff_cache: Mutex::new(VersionPairCache::new()),
            info_cache: Mutex::new(HashMap::new()),
            show_progress: false,
        }
    }

    /// Show a spinner while waiting on the network
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Settings in effect
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Path of the manifest inside a project directory
    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.settings.manifest_filename)
    }

    /// Number of version pairs currently cached
    pub fn cached_pairs(&self) -> usize {
        self.diff_cache().len()
    }

    /// Reconcile the project manifest against `target`.
    ///
    /// The `from` side is, in order: `from`, the release recorded in `state`
    /// for the same target, or the declared framework version. The request
    /// is validated before anything is fetched. When the diff source does not
    /// track the pair, `state` is disabled.
    pub async fn analyze(
        &self,
        project_dir: &Path,
        target: &str,
        from: Option<&str>,
        state: &mut UpgradeState,
    ) -> Result<Analysis, AppError> {
        let manifest_path = self.manifest_path(project_dir);
        let text = read_manifest(&manifest_path)?;
        let document = match ManifestDocument::parse(&text) {
            Ok(document) => Some(document),
            Err(e) => {
                warn!("treating unreadable manifest as empty: {}", e);
                None
            }
        };

        let declared = document
            .as_ref()
            .and_then(|doc| doc.version_of(&self.settings.framework_package))
            .map(|(_, version)| version.to_string());
        let current_version = from
            .map(str::to_string)
            .or_else(|| state.original_for(target).map(str::to_string))
            .or(declared)
            .ok_or_else(|| ValidationError::UnknownFrameworkVersion {
                package: self.settings.framework_package.clone(),
            })?;

        let pair = resolve_pair(
            &current_version,
            target,
            self.settings.baseline_version.as_deref(),
        )?;

        let changes = match self.changes_for(&pair.from, &pair.to).await {
            Ok(changes) => changes,
            Err(e) => {
                if e.is_not_found() {
                    warn!("{}..{} is not tracked upstream, resetting upgrade state", pair.from, pair.to);
                    state.disable();
                }
                return Err(e.into());
            }
        };

        let installed = document
            .as_ref()
            .map(InstalledPackages::from_document)
            .unwrap_or_default();
        let results = reconcile(&installed, &changes);
        info!(
            from = %pair.from,
            to = %pair.to,
            changes = changes.len(),
            required = results.len(),
            "analysis complete"
        );

        Ok(Analysis {
            manifest_path,
            current_version: crate::version::clean(&current_version).to_string(),
            pair,
            changes,
            results,
        })
    }

    /// Analyze, then apply the selected results in one locked edit cycle.
    ///
    /// Results are recomputed against the manifest as read under the lock,
    /// so edits made since the analysis are never overwritten.
    pub async fn apply(
        &self,
        project_dir: &Path,
        target: &str,
        from: Option<&str>,
        selection: &Selection,
        state: &mut UpgradeState,
    ) -> Result<ApplyRun, AppError> {
        let analysis = self.analyze(project_dir, target, from, state).await?;

        let edit = self
            .store
            .edit(&analysis.manifest_path, |document| {
                let installed = InstalledPackages::from_document(document);
                let selected = selection.filter(&reconcile(&installed, &analysis.changes));
                let report = apply_in_place(document, &selected);
                (selected, report)
            })
            .await?;
        let (selected, report) = edit.value;

        info!(
            applied = report.applied_count(),
            failed = report.failed.len(),
            written = edit.file_modified,
            "apply complete"
        );

        Ok(ApplyRun {
            analysis,
            selected,
            report,
            file_modified: edit.file_modified,
            dry_run: self.store.is_dry_run(),
        })
    }

    /// Annotate every declared dependency with directory metadata.
    ///
    /// When the metadata API fails, previously fetched entries are used and
    /// the error is reported alongside the annotations.
    pub async fn info(&self, project_dir: &Path, include_dev: bool) -> Result<InfoRun, AppError> {
        let manifest_path = self.manifest_path(project_dir);
        let text = read_manifest(&manifest_path)?;
        let packages: Vec<(String, String)> =
            installed_packages(&text, include_dev).into_iter().collect();

        self.seed_metadata(project_dir);
        let (infos, error) = self.fetch_metadata(&packages).await;
        if error.is_none() {
            let cache = MetadataCache {
                packages: self.info_cache().clone().into_iter().collect(),
            };
            if let Err(e) = cache.save(project_dir) {
                warn!("could not persist metadata cache: {}", e);
            }
        }
        Ok(InfoRun {
            manifest_path,
            annotations: annotate(&text, &infos, include_dev),
            error: error.map(|e| e.to_string()),
        })
    }

    /// Forget cached diffs and metadata, including the metadata persisted
    /// for `project_dir`, so the next run refetches everything
    pub fn refresh_metadata(&self, project_dir: &Path) -> Result<(), AppError> {
        self.diff_cache().clear();
        self.info_cache().clear();
        MetadataCache::clear(project_dir)?;
        info!("caches cleared");
        Ok(())
    }

    /// Load metadata persisted by earlier runs into the in-memory cache
    fn seed_metadata(&self, project_dir: &Path) {
        match MetadataCache::load(project_dir) {
            Ok(persisted) => {
                let mut cache = self.info_cache();
                for (name, info) in persisted.packages {
                    cache.entry(name).or_insert(info);
                }
            }
            Err(e) => warn!("ignoring unreadable metadata cache: {}", e),
        }
    }

    async fn changes_for(&self, from: &str, to: &str) -> Result<Vec<PackageChange>, DiffError> {
        if let Some(hit) = self.diff_cache().get(from, to) {
            return Ok(hit.changes.clone());
        }

        let mut progress = Progress::new(self.show_progress);
        progress.spinner(&format!("Fetching upgrade diff {}..{}", from, to));
        let fetched = self.diff_source.fetch_diff(from, to).await;
        progress.finish_and_clear();

        let changes = self.parser.parse(&fetched?);
        self.diff_cache()
            .put(from, to, DiffData::new(from, to, changes.clone()));
        Ok(changes)
    }

    async fn fetch_metadata(
        &self,
        packages: &[(String, String)],
    ) -> (HashMap<String, PackageInfo>, Option<RegistryError>) {
        let mut progress = Progress::new(self.show_progress);
        progress.spinner(&format!(
            "Querying {} for {} packages",
            self.info_source.source_name(),
            packages.len()
        ));
        let fetched = self.info_source.fetch_info(packages).await;
        progress.finish_and_clear();

        let mut cache = self.info_cache();
        match fetched {
            Ok(infos) => {
                cache.extend(infos.iter().map(|(k, v)| (k.clone(), v.clone())));
                (infos, None)
            }
            Err(e) => {
                warn!("metadata fetch failed, using cached entries: {}", e);
                let cached = packages
                    .iter()
                    .filter_map(|(name, _)| cache.get(name).map(|info| (name.clone(), info.clone())))
                    .collect();
                (cached, Some(e))
            }
        }
    }

    fn diff_cache(&self) -> MutexGuard<'_, VersionPairCache> {
        match self.diff_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn info_cache(&self) -> MutexGuard<'_, HashMap<String, PackageInfo>> {
        match self.info_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArchStatus, ChangeType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const DIFF: &str = r#"diff --git a/RnDiffApp/package.json b/RnDiffApp/package.json
--- a/RnDiffApp/package.json
+++ b/RnDiffApp/package.json
@@ -1,8 +1,9 @@
   "dependencies": {
-    "react": "18.2.0",
-    "react-native": "0.74.0"
+    "@react-native/new-app-screen": "0.75.1",
+    "react": "18.3.1",
+    "react-native": "0.75.1"
   },
"#;

    struct StaticDiff {
        text: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DiffSource for StaticDiff {
        fn source_name(&self) -> &str {
            "static"
        }

        async fn fetch_diff(&self, from: &str, to: &str) -> Result<String, DiffError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text
                .map(str::to_string)
                .ok_or_else(|| DiffError::not_found(from, to))
        }
    }

    /// Answers the first `successes` calls, then fails
    struct StaticInfo {
        successes: usize,
        calls: AtomicUsize,
    }

    impl StaticInfo {
        fn new(successes: usize) -> Self {
            Self {
                successes,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PackageInfoSource for StaticInfo {
        fn source_name(&self) -> &'static str {
            "static"
        }

        async fn fetch_info(
            &self,
            packages: &[(String, String)],
        ) -> Result<HashMap<String, PackageInfo>, RegistryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.successes {
                return Err(RegistryError::network_error("static", "offline"));
            }
            Ok(packages
                .iter()
                .map(|(name, _)| {
                    (
                        name.clone(),
                        PackageInfo {
                            new_architecture: ArchStatus::Supported,
                            ..PackageInfo::default()
                        },
                    )
                })
                .collect())
        }
    }

    fn workflow(text: Option<&'static str>, dry_run: bool) -> (UpgradeWorkflow, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let workflow = UpgradeWorkflow::with_sources(
            Settings::default(),
            Box::new(StaticDiff {
                text,
                calls: calls.clone(),
            }),
            Box::new(StaticInfo::new(usize::MAX)),
            dry_run,
        );
        (workflow, calls)
    }

    fn project(manifest: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), manifest).unwrap();
        dir
    }

    const MANIFEST: &str = "{\"dependencies\":{\"react-native\":\"0.74.0\"}}";

    #[tokio::test]
    async fn test_analyze_end_to_end() {
        let dir = project(MANIFEST);
        let (workflow, _) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        let analysis = workflow
            .analyze(dir.path(), "0.75.1", None, &mut state)
            .await
            .unwrap();
        assert_eq!(analysis.pair.from, "0.74.0");
        assert_eq!(analysis.results.len(), 1);
        assert_eq!(analysis.results[0].package_name, "react-native");
        assert_eq!(analysis.results[0].change_type, ChangeType::VersionChange);
    }

    #[tokio::test]
    async fn test_apply_end_to_end() {
        let dir = project(MANIFEST);
        let (workflow, _) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        let run = workflow
            .apply(dir.path(), "0.75.1", None, &Selection::all(), &mut state)
            .await
            .unwrap();
        assert_eq!(run.report.applied_count(), 1);
        assert!(run.file_modified);

        let written = std::fs::read_to_string(dir.path().join("package.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"dependencies": {"react-native": "0.75.1"}})
        );
    }

    #[tokio::test]
    async fn test_apply_dry_run_leaves_file() {
        let dir = project(MANIFEST);
        let (workflow, _) = workflow(Some(DIFF), true);
        let mut state = UpgradeState::default();

        let run = workflow
            .apply(dir.path(), "0.75.1", None, &Selection::all(), &mut state)
            .await
            .unwrap();
        assert!(run.dry_run);
        assert!(!run.file_modified);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("package.json")).unwrap(),
            MANIFEST
        );
    }

    #[tokio::test]
    async fn test_downgrade_rejected_before_fetch() {
        let dir = project(MANIFEST);
        let (workflow, calls) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        let err = workflow
            .analyze(dir.path(), "0.73.0", None, &mut state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Downgrade { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_framework_version() {
        let dir = project("{\"dependencies\":{}}");
        let (workflow, _) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        let err = workflow
            .analyze(dir.path(), "0.75.1", None, &mut state)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::UnknownFrameworkVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_untracked_pair_resets_state() {
        let dir = project(MANIFEST);
        let (workflow, _) = workflow(None, false);
        let mut state = UpgradeState::default();
        state.enable("0.99.0", "0.74.0");

        let err = workflow
            .analyze(dir.path(), "0.99.0", None, &mut state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Diff(DiffError::NotFound { .. })));
        assert!(!state.enabled);
        assert!(state.target_version.is_none());
    }

    #[tokio::test]
    async fn test_diff_cache_and_refresh() {
        let dir = project(MANIFEST);
        let (workflow, calls) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        workflow.analyze(dir.path(), "0.75.1", None, &mut state).await.unwrap();
        workflow.analyze(dir.path(), "0.75.1", None, &mut state).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(workflow.cached_pairs(), 1);

        workflow.refresh_metadata(dir.path()).unwrap();
        assert_eq!(workflow.cached_pairs(), 0);
        workflow.analyze(dir.path(), "0.75.1", None, &mut state).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persisted_original_version_is_used() {
        let dir = project("{\"dependencies\":{\"react-native\":\"0.75.1\",\"react\":\"18.2.0\"}}");
        let (workflow, _) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();
        state.enable("0.75.1", "0.74.0");

        let analysis = workflow
            .analyze(dir.path(), "0.75.1", None, &mut state)
            .await
            .unwrap();
        assert_eq!(analysis.pair.from, "0.74.0");
        assert!(!analysis.pair.synthetic_baseline);
        let names: Vec<_> = analysis.results.iter().map(|r| r.package_name.as_str()).collect();
        assert_eq!(names, vec!["react"]);
    }

    #[tokio::test]
    async fn test_same_version_uses_baseline() {
        let dir = project("{\"dependencies\":{\"react-native\":\"0.75.1\"}}");
        let (workflow, _) = workflow(Some(DIFF), false);
        let mut state = UpgradeState::default();

        let analysis = workflow
            .analyze(dir.path(), "0.75.1", None, &mut state)
            .await
            .unwrap();
        assert_eq!(analysis.pair.from, "0.75.0");
        assert!(analysis.pair.synthetic_baseline);
    }

    #[tokio::test]
    async fn test_info_falls_back_to_cache() {
        let dir = project("{\"dependencies\":{\"react-native-svg\":\"15.2.0\"}}");
        let workflow = UpgradeWorkflow::with_sources(
            Settings::default(),
            Box::new(StaticDiff {
                text: Some(DIFF),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(StaticInfo::new(1)),
            false,
        );

        let run = workflow.info(dir.path(), false).await.unwrap();
        assert!(run.error.is_none());
        assert_eq!(run.annotations[0].status(), ArchStatus::Supported);

        let run = workflow.info(dir.path(), false).await.unwrap();
        assert!(run.error.is_some());
        assert_eq!(run.annotations[0].status(), ArchStatus::Supported);

        workflow.refresh_metadata(dir.path()).unwrap();
        let run = workflow.info(dir.path(), false).await.unwrap();
        assert!(run.error.is_some());
        assert!(!run.annotations[0].info.is_listed());
    }

    #[tokio::test]
    async fn test_info_falls_back_to_persisted_cache() {
        let dir = project("{\"dependencies\":{\"react-native-svg\":\"15.2.0\"}}");
        let online = UpgradeWorkflow::with_sources(
            Settings::default(),
            Box::new(StaticDiff {
                text: Some(DIFF),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(StaticInfo::new(1)),
            true,
        );
        online.info(dir.path(), false).await.unwrap();
        assert!(MetadataCache::path_for(dir.path()).is_file());

        let offline = UpgradeWorkflow::with_sources(
            Settings::default(),
            Box::new(StaticDiff {
                text: Some(DIFF),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(StaticInfo::new(0)),
            true,
        );
        let run = offline.info(dir.path(), false).await.unwrap();
        assert!(run.error.is_some());
        assert_eq!(run.annotations[0].status(), ArchStatus::Supported);

        offline.refresh_metadata(dir.path()).unwrap();
        assert!(!MetadataCache::path_for(dir.path()).exists());
        let run = offline.info(dir.path(), false).await.unwrap();
        assert!(!run.annotations[0].info.is_listed());
    }
}
