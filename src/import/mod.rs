//! Import Pipeline
//!
//! Turns dropped files into asset records and commits them through the
//! [`AssetStore`]:
//!
//! - **block tab, one image**: single-file mode, one record, one event
//! - **block tab, several images**: batch mode; every file is read first
//!   (concurrently), then all records are allocated and written in one
//!   commit. Any failure aborts the whole batch before the write.
//! - **environment tab**: each `.gltf` file is its own commit; a file whose
//!   name collides (ignoring ASCII case) with an existing model is skipped and
//!   the rest proceed.
//!
//! Callers hold the store mutably for the whole call, so nothing can
//! allocate between our `allocate` and `upsert`.

mod decode;
mod file;

use crate::asset::{AssetId, BlockAsset, EnvironmentAsset};
use crate::error::{AssetError, AssetResult};
use crate::registry::{AssetKind, Category};
use crate::scene::{self, SceneHooks};
use crate::storage::KeyValueStore;
use crate::store::AssetStore;
use crate::texture::TextureExport;

pub use decode::{decode_data_uri, image_to_data_uri};
pub use file::{derive_name, read_all, DroppedFile, FileSource};

/// Name given to generated textures when the caller supplies none
pub const GENERATED_TEXTURE_NAME: &str = "generated-texture";

/// Which asset tab the files were dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTab {
    Blocks,
    Environment,
}

/// A file that was not imported
#[derive(Debug)]
pub struct ImportIssue {
    pub file: String,
    pub error: AssetError,
}

/// Outcome of an import that was at least partly committed
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Ids and names of created records, in drop order
    pub created: Vec<(AssetId, String)>,
    /// Files left out, with the reason
    pub skipped: Vec<ImportIssue>,
    /// Problems after the commit that did not undo it
    pub warnings: Vec<String>,
}

impl ImportReport {
    fn skip(&mut self, file: &str, error: AssetError) {
        log::warn!("skipped {}: {}", file, error);
        self.skipped.push(ImportIssue {
            file: file.to_string(),
            error,
        });
    }
}

/// Import files dropped on `tab`
///
/// Files of the wrong type for the tab are reported as skipped. Returns `Err`
/// only when nothing was committed because of a failure covering the whole
/// drop (a rejected block batch, an exhausted id range, a storage failure in
/// single-file mode).
pub fn import_files<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    scene: &mut dyn SceneHooks,
    tab: ImportTab,
    files: Vec<DroppedFile>,
) -> AssetResult<ImportReport> {
    let mut report = ImportReport::default();
    let accepted: Vec<DroppedFile> = files
        .into_iter()
        .filter_map(|f| {
            let ok = match tab {
                ImportTab::Blocks => f.is_image(),
                ImportTab::Environment => f.is_gltf(),
            };
            if ok {
                Some(f)
            } else {
                let reason = match tab {
                    ImportTab::Blocks => "not an image",
                    ImportTab::Environment => "not a .gltf file",
                };
                report.skip(&f.name, AssetError::decode(&f.name, reason));
                None
            }
        })
        .collect();

    match tab {
        ImportTab::Blocks if accepted.len() > 1 => import_block_batch(store, accepted, &mut report)?,
        ImportTab::Blocks => {
            if let Some(file) = accepted.into_iter().next() {
                import_block_single(store, file, &mut report)?;
            }
        }
        ImportTab::Environment => import_models(store, scene, accepted, &mut report),
    }
    Ok(report)
}

fn import_block_single<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    file: DroppedFile,
    report: &mut ImportReport,
) -> AssetResult<()> {
    let prepared = file
        .read()
        .and_then(|bytes| prepare_block(&file, &bytes));
    let (name, uri) = match prepared {
        Ok(p) => p,
        Err(e) => {
            report.skip(&file.name, e);
            return Ok(());
        }
    };

    let id = store.allocate(Category::CustomBlock)?;
    match store.upsert(Category::CustomBlock, BlockAsset::custom(id, &name, uri)) {
        Ok(()) => {
            log::info!("imported block \"{}\" as {}", name, id);
            report.created.push((id, name));
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            report.skip(&file.name, e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn import_block_batch<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    files: Vec<DroppedFile>,
    report: &mut ImportReport,
) -> AssetResult<()> {
    let contents = read_all(&files);

    let mut prepared = Vec::with_capacity(files.len());
    for (file, content) in files.iter().zip(contents) {
        let (name, uri) = content.and_then(|bytes| prepare_block(file, &bytes))?;
        prepared.push((name, uri));
    }

    let ids = store.allocate_many(Category::CustomBlock, prepared.len())?;
    let records: Vec<BlockAsset> = ids
        .iter()
        .zip(&prepared)
        .map(|(id, (name, uri))| BlockAsset::custom(*id, name, uri))
        .collect();

    if let Err(e) = store.upsert_many(Category::CustomBlock, records) {
        log::warn!("block batch of {} file(s) rejected: {}", files.len(), e);
        return Err(e);
    }
    log::info!("imported {} blocks ({}..={})", ids.len(), ids[0], ids[ids.len() - 1]);
    report
        .created
        .extend(ids.into_iter().zip(prepared.into_iter().map(|(name, _)| name)));
    Ok(())
}

fn prepare_block(file: &DroppedFile, bytes: &[u8]) -> AssetResult<(String, String)> {
    let name = derive_name(&file.name)?;
    let uri = image_to_data_uri(&file.name, bytes, file.mime.as_deref())?;
    Ok((name, uri))
}

fn import_models<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    scene: &mut dyn SceneHooks,
    files: Vec<DroppedFile>,
    report: &mut ImportReport,
) {
    let contents = read_all(&files);

    for (file, content) in files.iter().zip(contents) {
        let bytes = match content {
            Ok(bytes) => bytes,
            Err(e) => {
                report.skip(&file.name, e);
                continue;
            }
        };
        let name = match derive_name(&file.name) {
            Ok(name) => name,
            Err(e) => {
                report.skip(&file.name, e);
                continue;
            }
        };
        if let Some(existing) = store.models().find_by_name_ignore_case(&name) {
            let category = Category::classify(AssetKind::Environment, existing.id).unwrap_or(Category::CustomEnvironment);
            report.skip(
                &file.name,
                AssetError::DuplicateName {
                    category,
                    name: existing.name.clone(),
                },
            );
            continue;
        }

        let committed = store
            .allocate(Category::CustomEnvironment)
            .map(|id| EnvironmentAsset::custom(id, &name, bytes))
            .and_then(|record| {
                store.upsert(Category::CustomEnvironment, record.clone())?;
                Ok(record)
            });
        let record = match committed {
            Ok(record) => record,
            Err(e) => {
                report.skip(&file.name, e);
                continue;
            }
        };

        log::info!("imported model \"{}\" as {}", record.name, record.id);
        if let Some(warning) = scene::report("add_custom_model", scene.add_custom_model(&record)) {
            report.warnings.push(format!("{}: {}", record.name, warning));
        }
        report.created.push((record.id, record.name));
    }
}

/// Turn a finished texture into a new custom block
pub fn import_generated<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    name: Option<&str>,
    texture: TextureExport,
) -> AssetResult<BlockAsset> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(GENERATED_TEXTURE_NAME)
        .to_string();

    let id = store.allocate(Category::CustomBlock)?;
    let block = BlockAsset {
        id,
        name,
        texture_uri: texture.main,
        side_textures: texture.sides,
        is_custom: true,
    };
    store.upsert(Category::CustomBlock, block.clone())?;
    log::info!(
        "created block \"{}\" ({}) from texture session, {} side texture(s)",
        block.name,
        id,
        block.side_textures.len()
    );
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::FaceKey;
    use crate::scene::testing::RecordingScene;
    use crate::storage::{Collection, MemoryStorage};
    use crate::store::AssetEvent;
    use crate::texture::{FaceTarget, HistoryConfig, RasterBuffer, TextureFace, TextureSession};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn png(color: [u8; 4]) -> Vec<u8> {
        RasterBuffer::filled(2, 2, color).to_png().unwrap()
    }

    fn image(name: &str) -> DroppedFile {
        DroppedFile::from_bytes(name, Some("image/png"), png([10, 20, 30, 255]))
    }

    fn gif(color: [u8; 4]) -> Vec<u8> {
        let img = ::image::DynamicImage::ImageRgba8(::image::RgbaImage::from_pixel(2, 2, ::image::Rgba(color)));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ::image::ImageFormat::Gif)
            .unwrap();
        bytes
    }

    fn gltf(name: &str) -> DroppedFile {
        DroppedFile::from_bytes(name, None, br#"{"asset":{"version":"2.0"}}"#.to_vec())
    }

    fn store() -> AssetStore<MemoryStorage> {
        AssetStore::open(MemoryStorage::new()).unwrap()
    }

    fn custom_blocks(store: &AssetStore<MemoryStorage>) -> Vec<(AssetId, String)> {
        store
            .list::<BlockAsset>(Category::CustomBlock)
            .into_iter()
            .map(|b| (b.id, b.name.clone()))
            .collect()
    }

    #[test]
    fn test_single_image() {
        let mut store = store();
        let report = import_files(&mut store, &mut RecordingScene::default(), ImportTab::Blocks, vec![image("grass_top.png")])
            .unwrap();

        assert_eq!(report.created, vec![(100, "grass_top".to_string())]);
        let block = store.get::<BlockAsset>(100).unwrap();
        assert!(block.texture_uri.starts_with("data:image/png;base64,"));
        assert!(block.is_custom);
    }

    #[test]
    fn test_single_duplicate_is_skipped() {
        let mut store = store();
        let report =
            import_files(&mut store, &mut RecordingScene::default(), ImportTab::Blocks, vec![image("dirt.png")]).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].error, AssetError::DuplicateName { .. }));
        assert!(custom_blocks(&store).is_empty());
    }

    #[test]
    fn test_batch_contiguous_ids_one_event() {
        let mut store = store();
        store
            .upsert(Category::CustomBlock, BlockAsset::custom(100, "old", "x"))
            .unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            store.subscribe(move |e| events.borrow_mut().push(e.clone()));
        }
        let writes = store.storage().write_count();

        let files = vec![image("a.png"), image("b.png"), image("c.png")];
        let report = import_files(&mut store, &mut RecordingScene::default(), ImportTab::Blocks, files).unwrap();

        let ids: Vec<AssetId> = report.created.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![101, 102, 103]);
        assert_eq!(store.storage().write_count(), writes + 1);
        assert_eq!(
            *events.borrow(),
            vec![AssetEvent::Upserted {
                category: Category::CustomBlock,
                ids: vec![101, 102, 103]
            }]
        );
    }

    #[test]
    fn test_gif_imports_alone_and_in_batch() {
        let mut store = store();
        let leaf = DroppedFile::from_bytes("leaf.gif", Some("image/gif"), gif([0, 128, 0, 255]));
        let report = import_files(&mut store, &mut RecordingScene::default(), ImportTab::Blocks, vec![leaf]).unwrap();
        assert_eq!(report.created, vec![(100, "leaf".to_string())]);
        assert!(store
            .get::<BlockAsset>(100)
            .unwrap()
            .texture_uri
            .starts_with("data:image/gif;base64,"));

        // Untagged, recognised by extension
        let batch = vec![image("a.png"), DroppedFile::from_bytes("moss.GIF", None, gif([20, 90, 20, 255]))];
        let report = import_files(&mut store, &mut RecordingScene::default(), ImportTab::Blocks, batch).unwrap();
        assert_eq!(report.created, vec![(101, "a".to_string()), (102, "moss".to_string())]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_batch_duplicate_creates_nothing() {
        let mut store = store();
        let writes = store.storage().write_count();

        let err = import_files(
            &mut store,
            &mut RecordingScene::default(),
            ImportTab::Blocks,
            vec![image("grass.png"), image("grass.png")],
        )
        .unwrap_err();

        assert!(matches!(err, AssetError::DuplicateName { .. }));
        assert!(custom_blocks(&store).is_empty());
        assert_eq!(store.storage().write_count(), writes);
    }

    #[test]
    fn test_batch_decode_failure_aborts() {
        let mut store = store();
        let broken = DroppedFile::from_bytes("broken.png", Some("image/png"), b"not a png".to_vec());
        let err = import_files(
            &mut store,
            &mut RecordingScene::default(),
            ImportTab::Blocks,
            vec![image("fine.png"), broken],
        )
        .unwrap_err();

        assert!(matches!(err, AssetError::Decode { ref file, .. } if file == "broken.png"));
        assert!(custom_blocks(&store).is_empty());
    }

    #[test]
    fn test_batch_range_exhausted() {
        let mut store = store();
        store
            .upsert(Category::CustomBlock, BlockAsset::custom(198, "late", "x"))
            .unwrap();

        let err = import_files(
            &mut store,
            &mut RecordingScene::default(),
            ImportTab::Blocks,
            vec![image("a.png"), image("b.png")],
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::RangeExhausted { .. }));
        assert_eq!(custom_blocks(&store).len(), 1);
    }

    #[test]
    fn test_batch_persistence_failure() {
        let mut store = store();
        store.storage_mut().reject_writes(Collection::CustomBlocks);

        let err = import_files(
            &mut store,
            &mut RecordingScene::default(),
            ImportTab::Blocks,
            vec![image("a.png"), image("b.png")],
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Persistence { .. }));
        assert!(custom_blocks(&store).is_empty());
    }

    #[test]
    fn test_wrong_type_for_tab_is_skipped() {
        let mut store = store();
        let report = import_files(
            &mut store,
            &mut RecordingScene::default(),
            ImportTab::Blocks,
            vec![gltf("robot.gltf"), image("tile.png")],
        )
        .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file, "robot.gltf");
    }

    #[test]
    fn test_models_partial_success() {
        let mut store = store();
        let mut scene = RecordingScene::default();
        let files = vec![gltf("robot.gltf"), gltf("ROBOT.gltf"), gltf("Oak_Tree.GLTF"), gltf("lamp.gltf")];

        let report = import_files(&mut store, &mut scene, ImportTab::Environment, files).unwrap();

        assert_eq!(
            report.created,
            vec![(300, "robot".to_string()), (301, "lamp".to_string())]
        );
        let skipped: Vec<&str> = report.skipped.iter().map(|i| i.file.as_str()).collect();
        assert_eq!(skipped, vec!["ROBOT.gltf", "Oak_Tree.GLTF"]);
        assert_eq!(scene.calls, vec!["add_custom_model robot", "add_custom_model lamp"]);

        let robot = store.get::<EnvironmentAsset>(300).unwrap();
        assert_eq!(robot.model.byte_len(), br#"{"asset":{"version":"2.0"}}"#.len());
    }

    #[test]
    fn test_scene_failure_keeps_model() {
        let mut store = store();
        let mut scene = RecordingScene {
            fail_add_model: true,
            ..Default::default()
        };

        let report = import_files(&mut store, &mut scene, ImportTab::Environment, vec![gltf("robot.gltf")]).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.warnings.len(), 1);

        let reopened = AssetStore::open(store.into_storage()).unwrap();
        assert!(reopened.models().find_by_name("robot").is_some());
    }

    #[test]
    fn test_generated_texture() {
        let mut store = store();
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.fill(0, 0, [50, 60, 70, 255]).unwrap();
        session.set_target(FaceTarget::Face(TextureFace::Top));
        session.fill(0, 0, [0, 255, 0, 255]).unwrap();

        let block = import_generated(&mut store, None, session.export().unwrap()).unwrap();
        assert_eq!(block.name, GENERATED_TEXTURE_NAME);
        assert_eq!(block.id, 100);
        assert_eq!(block.side_textures.len(), 1);
        assert!(block.side_textures.contains_key(&FaceKey::PosY));

        // Same default name again collides
        let err = import_generated(&mut store, Some("  "), session.export().unwrap()).unwrap_err();
        assert!(matches!(err, AssetError::DuplicateName { .. }));

        let named = import_generated(&mut store, Some("mossy"), session.export().unwrap()).unwrap();
        assert_eq!(named.id, 101);
    }
}
