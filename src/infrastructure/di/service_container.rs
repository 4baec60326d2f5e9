//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::SortService;
use crate::config::Settings;
use crate::domain::Collator;
use crate::infrastructure::chrome::ChromeBookmarksFile;
use crate::infrastructure::traits::SortObserver;
use crate::infrastructure::InfraResult;

/// Container holding the loaded bookmarks file and the services built on it.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Bookmarks file being sorted
    pub bookmarks: Arc<ChromeBookmarksFile>,

    /// Title collation built from the settings
    pub collator: Arc<dyn Collator>,

    /// Progress and completion output
    pub observer: Arc<dyn SortObserver>,
}

impl ServiceContainer {
    /// Load `settings.bookmarks_file` and build the configured collator.
    pub fn new(settings: Settings, observer: Arc<dyn SortObserver>) -> InfraResult<Self> {
        let bookmarks = ChromeBookmarksFile::load(&settings.bookmarks_file)?;
        let collator = settings.collator()?;
        Ok(Self::with_deps(settings, Arc::new(bookmarks), collator, observer))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        bookmarks: Arc<ChromeBookmarksFile>,
        collator: Arc<dyn Collator>,
        observer: Arc<dyn SortObserver>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            bookmarks,
            collator,
            observer,
        }
    }

    /// Sort service whose `sort_all` covers every top-level root of the file.
    pub fn sort_service(&self, dry_run: bool) -> SortService {
        SortService::new(
            self.bookmarks.clone(),
            self.collator.clone(),
            self.observer.clone(),
            self.settings.sort_options(self.bookmarks.root_ids(), dry_run),
        )
    }
}
