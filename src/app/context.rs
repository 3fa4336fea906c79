use crate::adapters::TemplateEngine;
use crate::domain::{FileTypeRegistry, PathResolver, Settings, SubmitLayout};
use crate::ports::{FileListSource, ProcessRunner, RowCountSource, RunConfigStore};

/// Application context holding dependencies for command execution.
pub struct AppContext<F, R, S, P>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    settings: Settings,
    file_lists: F,
    rows: R,
    runconfigs: S,
    runner: P,
    templates: TemplateEngine,
}

impl<F, R, S, P> AppContext<F, R, S, P>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    pub fn new(
        settings: Settings,
        file_lists: F,
        rows: R,
        runconfigs: S,
        runner: P,
        templates: TemplateEngine,
    ) -> Self {
        Self { settings, file_lists, rows, runconfigs, runner, templates }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn file_lists(&self) -> &F {
        &self.file_lists
    }

    pub fn rows(&self) -> &R {
        &self.rows
    }

    pub fn runconfigs(&self) -> &S {
        &self.runconfigs
    }

    pub fn runner(&self) -> &P {
        &self.runner
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    /// Submit-file layout rooted at the configured submit root.
    pub fn submit_layout(&self) -> SubmitLayout {
        SubmitLayout::new(self.settings.paths.submit_root())
    }

    /// Resolver over the data root using the standard file types.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.settings.paths.desdata(), FileTypeRegistry::standard())
    }
}
