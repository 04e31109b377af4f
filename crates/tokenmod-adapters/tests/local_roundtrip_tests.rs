//! Disk-backed pipeline runs: local filesystem plus file session store.

use std::{fs, sync::Arc};

use tempfile::TempDir;
use tokenmod_adapters::{FileSessionStore, LocalFileSystem, TransformCatalog};
use tokenmod_core::{
    application::{PipelineService, RevertService, SessionRecorder, ports::SessionStore},
    domain::PipelineOptions,
};

const CARD: &str = "export const colors = {\n  base: 'bg-white',\n};\n\n\
export function Card() {\n  return <div className=\"bg-white border-gray-200\" />;\n}\n";

#[test]
fn recorded_run_reverts_from_disk() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    let card = src.join("Card.tsx");
    fs::write(&card, CARD).unwrap();
    fs::create_dir(src.join("node_modules")).unwrap();
    fs::write(src.join("node_modules/Ignored.tsx"), CARD).unwrap();

    let store = Arc::new(FileSessionStore::new(temp.path().join("logs")));
    let recorder = SessionRecorder::new(store.clone());
    let phases = TransformCatalog::builtin().unwrap().standard_phases().unwrap();
    let service = PipelineService::new(Box::new(LocalFileSystem::new()), phases).unwrap();

    let options = PipelineOptions::default();
    recorder.start_session(&options).unwrap();
    let run = service.run(&src, &options, Some(&recorder)).unwrap();
    let session = recorder.end_session().unwrap();

    assert!(run.success);
    assert_eq!(run.processed_files, 1);
    let rewritten = fs::read_to_string(&card).unwrap();
    assert!(rewritten.contains("  base: 'bg-white',\n  surface: 'var(--color-surface)',\n"));
    assert!(rewritten.contains("className=\"bg-surface border-default\""));
    assert!(rewritten.contains("  border: 'var(--color-border)',\n};"));

    let loaded = store.load_session(&session.session_id).unwrap();
    assert_eq!(loaded, session);
    assert_eq!(store.list_sessions().unwrap(), vec![session.session_id.clone()]);

    let revert = RevertService::new(store, Box::new(LocalFileSystem::new()));
    let outcome = revert.apply(&session.session_id).unwrap();

    assert!(outcome.success());
    assert_eq!(fs::read_to_string(&card).unwrap(), CARD);
    assert_eq!(fs::read_to_string(&outcome.backups[0]).unwrap(), rewritten);
}
