//! Session pooling and the user-facing entry points.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use inkdraw_channel::SaveMethod;
use inkdraw_core::{Settings, StoreError};
use inkdraw_store::{AutosaveStore, Resource, ResourceStore, SVG_MIME, parse_resource_ref};
use inkdraw_store::title::make_image_title;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedSemaphorePermit, RwLock, Semaphore};

use crate::session::{EditorSession, SessionError};
use crate::strings::Localization;
use crate::view::{
    AlertSink, DrawingView, InsertDrawingOptions, SaveCallbacks, save_callback,
};

const SVG_EXTENSION: &str = ".svg";
const TITLE_TEMPLATE: &str = "{{short_text}}";

/// Which hosting surface a session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    EmbeddedPanel,
    DetachedWindow,
}

/// Builds a fresh hosting surface when the pool has no idle one.
pub type ViewFactory = Arc<dyn Fn() -> Arc<dyn DrawingView> + Send + Sync>;

struct PoolEntry {
    view: Arc<dyn DrawingView>,
    in_use: Arc<AtomicBool>,
}

/// Reuse-or-create pool of hosting surfaces for one `HostKind`.
///
/// Views survive their sessions and are handed out again once idle. A
/// capped pool additionally holds callers on a semaphore, so the embedded
/// panel can never show two live dialogs.
struct HostPool {
    factory: ViewFactory,
    entries: Mutex<Vec<PoolEntry>>,
    limit: Option<Arc<Semaphore>>,
}

/// Exclusive hold on a pooled view for the duration of one session.
struct ViewLease {
    view: Arc<dyn DrawingView>,
    in_use: Arc<AtomicBool>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Drop for ViewLease {
    fn drop(&mut self) {
        self.in_use.store(false, Ordering::Release);
    }
}

impl HostPool {
    fn new(factory: ViewFactory, cap: Option<usize>) -> Self {
        Self {
            factory,
            entries: Mutex::new(Vec::new()),
            limit: cap.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Acquire an idle view or create one, waiting on the cap if any.
    async fn acquire(&self) -> ViewLease {
        // The semaphore is never closed, so acquisition cannot fail.
        let permit = match &self.limit {
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        let mut entries = self.entries.lock().await;
        for entry in entries.iter() {
            if entry.view.is_open() {
                continue;
            }
            if !entry.in_use.swap(true, Ordering::Acquire) {
                return ViewLease {
                    view: Arc::clone(&entry.view),
                    in_use: Arc::clone(&entry.in_use),
                    _permit: permit,
                };
            }
        }

        let view = (self.factory)();
        let in_use = Arc::new(AtomicBool::new(true));
        entries.push(PoolEntry {
            view: Arc::clone(&view),
            in_use: Arc::clone(&in_use),
        });
        ViewLease {
            view,
            in_use,
            _permit: permit,
        }
    }
}

/// The host application's note-editing surface.
#[async_trait]
pub trait NoteEditor: Send + Sync {
    /// Current user selection, `None` when nothing is selected.
    async fn selected_text(&self) -> anyhow::Result<Option<String>>;

    /// Insert text at the cursor, replacing the selection if any.
    async fn insert_text(&self, text: &str) -> anyhow::Result<()>;
}

/// Session-manager error.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no hosting surface is registered for {0:?}")]
    NoHost(HostKind),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("note editor error: {0}")]
    Editor(#[source] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Options for `edit_drawing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDrawingOptions {
    /// Whether the session may also save the drawing as a new resource.
    pub allow_save_as_copy: bool,
}

/// Owns the host pools and runs every user-facing drawing flow.
pub struct SessionManager {
    resources: Arc<ResourceStore>,
    autosave: Arc<AutosaveStore>,
    note_editor: Arc<dyn NoteEditor>,
    alerts: Arc<dyn AlertSink>,
    settings: RwLock<Settings>,
    pools: HashMap<HostKind, HostPool>,
    strings: &'static Localization,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        resources: Arc<ResourceStore>,
        autosave: Arc<AutosaveStore>,
        note_editor: Arc<dyn NoteEditor>,
        alerts: Arc<dyn AlertSink>,
        strings: &'static Localization,
    ) -> Self {
        Self {
            resources,
            autosave,
            note_editor,
            alerts,
            settings: RwLock::new(Settings::default()),
            pools: HashMap::new(),
            strings,
        }
    }

    /// Register the surface factory for one host kind. The embedded panel
    /// is capped at a single live instance; windows are created freely.
    pub fn register_host(&mut self, kind: HostKind, factory: ViewFactory) {
        let cap = match kind {
            HostKind::EmbeddedPanel => Some(1),
            HostKind::DetachedWindow => None,
        };
        self.pools.insert(kind, HostPool::new(factory, cap));
    }

    /// Replace the settings applied to sessions started afterwards. A
    /// session already open keeps its snapshot.
    pub async fn update_settings(&self, settings: Settings) {
        *self.settings.write().await = settings;
    }

    fn pool(&self, kind: HostKind) -> Result<&HostPool, ManagerError> {
        self.pools.get(&kind).ok_or(ManagerError::NoHost(kind))
    }

    async fn run_session(
        &self,
        kind: HostKind,
        options: InsertDrawingOptions,
    ) -> Result<bool, ManagerError> {
        let pool = self.pool(kind)?;
        let lease = pool.acquire().await;
        let config = self.settings.read().await.editor_config();

        lease
            .view
            .set_can_fullscreen(config.can_fullscreen)
            .await
            .map_err(SessionError::from)?;

        let session = EditorSession::new(
            Arc::clone(&lease.view),
            config,
            Arc::clone(&self.autosave),
            Arc::clone(&self.alerts),
            self.strings,
        );
        Ok(session.prompt_for_drawing(options).await?)
    }

    fn drawing_title(&self, text: &str) -> String {
        let title = make_image_title(TITLE_TEMPLATE, text.trim());
        if title.is_empty() {
            self.strings.default_image_title.to_string()
        } else {
            title
        }
    }

    /// Create a resource from `data` and insert its markup into the note,
    /// without opening any dialog.
    ///
    /// # Errors
    /// Returns an error if resource creation or the note insertion fails.
    pub async fn insert_new_drawing(&self, data: &str) -> Result<Resource, ManagerError> {
        let title = self.drawing_title("");
        let resource = self.resources.create(data, &title, SVG_EXTENSION).await?;
        self.note_editor
            .insert_text(&resource.markup_link())
            .await
            .map_err(ManagerError::Editor)?;
        Ok(resource)
    }

    /// Open an editing session for an existing resource.
    ///
    /// The reference must parse and name an SVG attachment; anything else
    /// alerts the user and returns `Ok(None)` without mutating anything.
    /// Returns the resource last written when the session saved.
    ///
    /// # Errors
    /// Returns an error when host storage or the hosting surface fails.
    pub async fn edit_drawing(
        &self,
        reference: &str,
        options: EditDrawingOptions,
        kind: HostKind,
    ) -> Result<Option<Resource>, ManagerError> {
        let Some(resource) = self
            .resources
            .fetch_by_ref(reference, SVG_EXTENSION, SVG_MIME)
            .await?
        else {
            self.alerts
                .alert(&self.strings.invalid_resource(reference))
                .await;
            return Ok(None);
        };

        if resource.mime != SVG_MIME {
            self.alerts
                .alert(&self.strings.not_editable(reference, &resource.mime))
                .await;
            return Ok(None);
        }

        let initial_data = self.resources.read_text(&resource).await?;

        // All saves target whatever this slot currently holds; a save-as-copy
        // rebinds it, so later overwrites hit the copy.
        let current = Arc::new(Mutex::new(resource));

        let overwrite = {
            let resources = Arc::clone(&self.resources);
            let current = Arc::clone(&current);
            save_callback(move |data| {
                let resources = Arc::clone(&resources);
                let current = Arc::clone(&current);
                async move {
                    let resource = current.lock().await.clone();
                    resources.update(&resource, &data).await?;
                    Ok(())
                }
            })
        };

        let save_as_new = options.allow_save_as_copy.then(|| {
            let resources = Arc::clone(&self.resources);
            let note_editor = Arc::clone(&self.note_editor);
            let current = Arc::clone(&current);
            save_callback(move |data| {
                let resources = Arc::clone(&resources);
                let note_editor = Arc::clone(&note_editor);
                let current = Arc::clone(&current);
                async move {
                    let title = current.lock().await.title.clone();
                    let copy = resources.create(&data, &title, SVG_EXTENSION).await?;
                    note_editor.insert_text(&copy.markup_link()).await?;
                    *current.lock().await = copy;
                    Ok(())
                }
            })
        });

        let saved = self
            .run_session(kind, InsertDrawingOptions {
                initial_data: Some(initial_data),
                save_callbacks: SaveCallbacks {
                    overwrite,
                    save_as_new,
                },
                initial_save_method: None,
            })
            .await?;

        if saved {
            Ok(Some(current.lock().await.clone()))
        } else {
            Ok(None)
        }
    }

    /// Open an insert session: a blank drawing whose first save creates the
    /// resource and inserts its markup into the note.
    async fn insert_drawing_session(
        &self,
        kind: HostKind,
        title_text: &str,
    ) -> Result<Option<Resource>, ManagerError> {
        let title = self.drawing_title(title_text);

        // Bound once the first save-as-new creates the resource.
        let created: Arc<Mutex<Option<Resource>>> = Arc::new(Mutex::new(None));

        let create = {
            let resources = Arc::clone(&self.resources);
            let note_editor = Arc::clone(&self.note_editor);
            let created = Arc::clone(&created);
            save_callback(move |data| {
                let resources = Arc::clone(&resources);
                let note_editor = Arc::clone(&note_editor);
                let created = Arc::clone(&created);
                let title = title.clone();
                async move {
                    let resource = resources.create(&data, &title, SVG_EXTENSION).await?;
                    note_editor.insert_text(&resource.markup_link()).await?;
                    *created.lock().await = Some(resource);
                    Ok(())
                }
            })
        };

        let overwrite = {
            let resources = Arc::clone(&self.resources);
            let created = Arc::clone(&created);
            save_callback(move |data| {
                let resources = Arc::clone(&resources);
                let created = Arc::clone(&created);
                async move {
                    let resource = created.lock().await.clone();
                    match resource {
                        Some(resource) => {
                            resources.update(&resource, &data).await?;
                            Ok(())
                        }
                        None => anyhow::bail!("the drawing has not been saved yet"),
                    }
                }
            })
        };

        let saved = self
            .run_session(kind, InsertDrawingOptions {
                initial_data: None,
                save_callbacks: SaveCallbacks {
                    overwrite,
                    save_as_new: Some(create),
                },
                // There is nothing to overwrite yet, so the first save has
                // exactly one legal method and the choice screen is skipped.
                initial_save_method: Some(SaveMethod::SaveAsNew),
            })
            .await?;

        if saved {
            Ok(created.lock().await.clone())
        } else {
            Ok(None)
        }
    }

    /// Main entry point behind the insert-drawing commands.
    ///
    /// A selection naming an existing resource opens an overwrite-only edit
    /// session on it; any other selection (or none) opens an insert session,
    /// with the selected text feeding the new drawing's title.
    ///
    /// # Errors
    /// Returns an error when host storage, the note editor or the hosting
    /// surface fails.
    pub async fn edit_or_insert_drawing(
        &self,
        kind: HostKind,
    ) -> Result<Option<Resource>, ManagerError> {
        let selection = self
            .note_editor
            .selected_text()
            .await
            .map_err(ManagerError::Editor)?
            .unwrap_or_default();
        let selection = selection.trim();

        if parse_resource_ref(selection).is_some() {
            return self
                .edit_drawing(selection, EditDrawingOptions::default(), kind)
                .await;
        }

        self.insert_drawing_session(kind, selection).await
    }

    /// Insert the autosaved drawing into the note as a new resource.
    ///
    /// The slot is left intact; only `delete_autosave` clears it.
    ///
    /// # Errors
    /// Returns an error when reading the slot or creating the resource
    /// fails.
    pub async fn restore_autosave(&self) -> Result<Option<Resource>, ManagerError> {
        match self.autosave.read().await? {
            None => {
                self.alerts.alert(self.strings.no_autosave).await;
                Ok(None)
            }
            Some(data) => Ok(Some(self.insert_new_drawing(&data).await?)),
        }
    }

    /// Remove the autosave slot.
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be removed.
    pub async fn delete_autosave(&self) -> Result<(), ManagerError> {
        Ok(self.autosave.clear().await?)
    }

    pub(crate) async fn alert_error(&self, error: &ManagerError) {
        tracing::error!("command failed: {error}");
        self.alerts.alert(&error.to_string()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingAlerts, TestView, scratch_autosave};
    use inkdraw_channel::{
        ButtonId, DialogResult, MessageChannel, WebViewMessage, WebViewResponse,
    };
    use inkdraw_core::{AttachmentMeta, AttachmentStore};
    use inkdraw_store::{MemoryAttachmentStore, TemporaryDirectory};

    #[derive(Default)]
    struct TestNoteEditor {
        selection: std::sync::Mutex<Option<String>>,
        inserted: std::sync::Mutex<Vec<String>>,
    }

    impl TestNoteEditor {
        fn select(&self, text: &str) {
            *self.selection.lock().unwrap() = Some(text.to_string());
        }

        fn inserted(&self) -> Vec<String> {
            self.inserted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NoteEditor for TestNoteEditor {
        async fn selected_text(&self) -> anyhow::Result<Option<String>> {
            Ok(self.selection.lock().unwrap().clone())
        }

        async fn insert_text(&self, text: &str) -> anyhow::Result<()> {
            self.inserted.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Fixture {
        manager: Arc<SessionManager>,
        host_store: Arc<MemoryAttachmentStore>,
        note_editor: Arc<TestNoteEditor>,
        alerts: Arc<RecordingAlerts>,
        autosave: Arc<AutosaveStore>,
        views: Arc<std::sync::Mutex<Vec<Arc<TestView>>>>,
    }

    async fn fixture() -> Fixture {
        let host_store = Arc::new(MemoryAttachmentStore::new());
        let tempdir = Arc::new(TemporaryDirectory::create().await.unwrap());
        let resources = Arc::new(ResourceStore::new(
            Arc::clone(&host_store) as Arc<dyn AttachmentStore>,
            tempdir,
        ));
        let (autosave, _root) = scratch_autosave();
        let autosave = Arc::new(autosave);
        let note_editor = Arc::new(TestNoteEditor::default());
        let alerts = Arc::new(RecordingAlerts::default());

        let views: Arc<std::sync::Mutex<Vec<Arc<TestView>>>> = Arc::default();
        let factory_views = Arc::clone(&views);
        let factory: ViewFactory = Arc::new(move || {
            let view = Arc::new(TestView::new());
            factory_views.lock().unwrap().push(Arc::clone(&view));
            view as Arc<dyn DrawingView>
        });

        let mut manager = SessionManager::new(
            resources,
            Arc::clone(&autosave),
            Arc::clone(&note_editor) as Arc<dyn NoteEditor>,
            Arc::clone(&alerts) as Arc<dyn AlertSink>,
            crate::strings::default_locale(),
        );
        manager.register_host(HostKind::EmbeddedPanel, Arc::clone(&factory));
        manager.register_host(HostKind::DetachedWindow, factory);

        Fixture {
            manager: Arc::new(manager),
            host_store,
            note_editor,
            alerts,
            autosave,
            views,
        }
    }

    /// Wait until the pool has created at least `count` views.
    async fn nth_view(
        views: &Arc<std::sync::Mutex<Vec<Arc<TestView>>>>,
        count: usize,
    ) -> Arc<TestView> {
        for _ in 0..10_000 {
            {
                let views = views.lock().unwrap();
                if views.len() >= count {
                    return Arc::clone(&views[count - 1]);
                }
            }
            tokio::task::yield_now().await;
        }
        panic!("view {count} was never created");
    }

    fn seed_svg(store: &MemoryAttachmentStore, id: &str, data: &str) {
        store.insert_raw(
            AttachmentMeta {
                id: id.to_string(),
                mime: SVG_MIME.to_string(),
                title: "Drawing.svg".to_string(),
                file_extension: Some("svg".to_string()),
                created_time: Some(1),
                updated_time: Some(1),
            },
            data.as_bytes().to_vec(),
        );
    }

    #[tokio::test]
    async fn insert_flow_creates_one_resource_and_links_it() {
        let f = fixture().await;

        let task = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        let view = nth_view(&f.views, 1).await;
        let editor = view.editor_endpoint();

        // The first save creates the resource without any choice screen.
        let response = editor
            .request(WebViewMessage::SaveSvg {
                data: "<svg>new</svg>".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            response,
            WebViewResponse::Save {
                waiting_for_save_type: false
            }
        );

        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        let resource = task.await.unwrap().unwrap().expect("drawing was saved");

        assert_eq!(f.host_store.len(), 1);
        assert_eq!(
            f.host_store.get_file(&resource.id).await.unwrap(),
            b"<svg>new</svg>"
        );
        assert_eq!(f.note_editor.inserted(), [resource.markup_link()]);
    }

    #[tokio::test]
    async fn insert_flow_second_save_overwrites_the_created_resource() {
        let f = fixture().await;

        let task = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        let view = nth_view(&f.views, 1).await;
        let editor = view.editor_endpoint();
        editor
            .request(WebViewMessage::SaveSvg {
                data: "v1".to_string(),
            })
            .await
            .unwrap();
        editor
            .request(WebViewMessage::SaveSvg {
                data: "v2".to_string(),
            })
            .await
            .unwrap();

        view.resolve_dialog(DialogResult {
            button: ButtonId::Ok,
        });
        let resource = task.await.unwrap().unwrap().unwrap();

        assert_eq!(f.host_store.len(), 1);
        assert_eq!(f.host_store.get_file(&resource.id).await.unwrap(), b"v2");
        // The note gained exactly one link.
        assert_eq!(f.note_editor.inserted().len(), 1);
    }

    #[tokio::test]
    async fn selection_naming_a_resource_opens_an_overwrite_only_edit() {
        let f = fixture().await;
        let id = "0123456789abcdef0123456789abcdef";
        seed_svg(&f.host_store, id, "<svg>old</svg>");
        f.note_editor.select(&format!(":/{id}"));

        let task = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        let view = nth_view(&f.views, 1).await;
        let editor = view.editor_endpoint();

        // A save-method change must be refused in this entry point.
        editor
            .request(WebViewMessage::SetSaveMethod {
                method: SaveMethod::SaveAsNew,
            })
            .await
            .unwrap();
        editor
            .request(WebViewMessage::SaveSvg {
                data: "<svg>edited</svg>".to_string(),
            })
            .await
            .unwrap();

        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        let resource = task.await.unwrap().unwrap().unwrap();

        assert_eq!(resource.id, id);
        assert_eq!(f.host_store.len(), 1, "no copy was created");
        assert_eq!(
            f.host_store.get_file(id).await.unwrap(),
            b"<svg>edited</svg>"
        );
        assert!(f.note_editor.inserted().is_empty());
    }

    #[tokio::test]
    async fn unknown_reference_alerts_and_opens_nothing() {
        let f = fixture().await;

        let result = f
            .manager
            .edit_drawing(
                ":/deadbeef",
                EditDrawingOptions::default(),
                HostKind::EmbeddedPanel,
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(f.views.lock().unwrap().is_empty());
        let alerts = f.alerts.messages();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains(":/deadbeef"));
    }

    #[tokio::test]
    async fn non_svg_attachment_is_not_editable() {
        let f = fixture().await;
        let id = "feedfacefeedfacefeedfacefeedface";
        f.host_store.insert_raw(
            AttachmentMeta {
                id: id.to_string(),
                mime: "image/png".to_string(),
                title: "photo.png".to_string(),
                file_extension: Some("png".to_string()),
                created_time: Some(1),
                updated_time: Some(1),
            },
            vec![1, 2, 3],
        );

        let result = f
            .manager
            .edit_drawing(
                &format!(":/{id}"),
                EditDrawingOptions::default(),
                HostKind::EmbeddedPanel,
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(f.views.lock().unwrap().is_empty());
        let alerts = f.alerts.messages();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("image/png"));
    }

    #[tokio::test]
    async fn panel_pool_never_opens_two_dialogs() {
        let f = fixture().await;

        let first = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };
        let view = nth_view(&f.views, 1).await;

        let second = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        // The second request must wait for the first session, not open a
        // second surface.
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(f.views.lock().unwrap().len(), 1);
        assert!(!second.is_finished());

        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        assert!(first.await.unwrap().unwrap().is_none());

        // The second session reuses the same pooled view.
        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        assert!(second.await.unwrap().unwrap().is_none());
        assert_eq!(f.views.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn window_sessions_run_concurrently_on_separate_views() {
        let f = fixture().await;

        let first = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::DetachedWindow).await })
        };
        let first_view = nth_view(&f.views, 1).await;

        let second = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::DetachedWindow).await })
        };
        let second_view = nth_view(&f.views, 2).await;

        second_view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        assert!(second.await.unwrap().unwrap().is_none());

        first_view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        assert!(first.await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_with_empty_slot_alerts() {
        let f = fixture().await;

        let result = f.manager.restore_autosave().await.unwrap();

        assert!(result.is_none());
        assert_eq!(f.alerts.messages().len(), 1);
        assert!(f.host_store.is_empty());
    }

    #[tokio::test]
    async fn restore_inserts_the_backup_without_a_dialog() {
        let f = fixture().await;
        f.autosave.write("<svg>backup</svg>").await.unwrap();

        let resource = f.manager.restore_autosave().await.unwrap().unwrap();

        assert!(f.views.lock().unwrap().is_empty(), "no dialog opened");
        assert_eq!(
            f.host_store.get_file(&resource.id).await.unwrap(),
            b"<svg>backup</svg>"
        );
        assert_eq!(f.note_editor.inserted(), [resource.markup_link()]);

        // Restoring leaves the slot intact.
        assert_eq!(
            f.autosave.read().await.unwrap(),
            Some("<svg>backup</svg>".to_string())
        );

        f.manager.delete_autosave().await.unwrap();
        assert_eq!(f.autosave.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn updated_settings_apply_to_the_next_session() {
        let f = fixture().await;
        f.manager
            .update_settings(Settings {
                autosave_interval_minutes: 5,
                ..Settings::default()
            })
            .await;

        let task = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        let view = nth_view(&f.views, 1).await;
        let response = view
            .editor_endpoint()
            .request(WebViewMessage::GetInitialData)
            .await
            .unwrap();
        match response {
            WebViewResponse::InitialData {
                autosave_interval_ms,
                ..
            } => assert_eq!(autosave_interval_ms, 300_000),
            other => panic!("unexpected response {other:?}"),
        }

        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        assert!(task.await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn selected_text_feeds_the_new_drawing_title() {
        let f = fixture().await;
        f.note_editor.select("A mountain range at sunset");

        let task = {
            let manager = Arc::clone(&f.manager);
            tokio::spawn(async move { manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await })
        };

        let view = nth_view(&f.views, 1).await;
        view.editor_endpoint()
            .request(WebViewMessage::SaveSvg {
                data: "<svg/>".to_string(),
            })
            .await
            .unwrap();
        view.resolve_dialog(DialogResult {
            button: ButtonId::Cancel,
        });
        let resource = task.await.unwrap().unwrap().unwrap();

        // Title is templated from the selection, truncated to 16 chars.
        assert_eq!(resource.title, "A mountain range.svg");
    }
}
