/// Multi-document behaviour: tab registry, close handling and file I/O.
mod common;

use std::time::Instant;

use notebook_pro_core::{EditableSurface, MemorySurface};

use common::{at, registry};

// ── A. Closing ─────────────────────────────────────────────────────────────

#[test]
fn test_close_cancels_pending_capture() {
    let t0 = Instant::now();
    let mut reg = registry();
    let id = reg.open_untitled(MemorySurface::new());
    let doc = reg.get_mut(id).unwrap();
    doc.edit(t0, |s| s.type_text("draft")).unwrap();
    assert!(reg.next_deadline().is_some());

    let surface = reg.close(id).unwrap();
    assert_eq!(surface.plain_text(), "draft");
    assert_eq!(reg.next_deadline(), None);
    assert_eq!(reg.tick_all(at(t0, 1000)), 0);
}

#[test]
fn test_tabs_keep_separate_histories() {
    let t0 = Instant::now();
    let mut reg = registry();
    let a = reg.open("a.txt", MemorySurface::new());
    let b = reg.open("b.txt", MemorySurface::new());

    reg.get_mut(a).unwrap().surface_mut().type_text("alpha").unwrap();
    reg.get_mut(b).unwrap().surface_mut().type_text("beta").unwrap();
    reg.poll_all(t0);
    assert_eq!(reg.tick_all(at(t0, 400)), 2);

    reg.get_mut(a).unwrap().undo();
    assert_eq!(reg.get(a).unwrap().surface().plain_text(), "");
    assert_eq!(reg.get(b).unwrap().surface().plain_text(), "beta");
    assert_eq!(reg.get(a).unwrap().display_label(), "a.txt*");
}

#[test]
fn test_exit_prompt_lists_unsaved_documents() {
    let mut reg = registry();
    let ids: Vec<_> = (0..7).map(|_| reg.open_untitled(MemorySurface::new())).collect();
    for id in &ids {
        reg.get_mut(*id).unwrap().mark_modified();
    }
    reg.get_mut(ids[0]).unwrap().mark_saved();

    let mut shown = None;
    let leave = reg.request_close(|summary| {
        shown = Some(summary.to_string());
        false
    });
    assert!(!leave);
    assert_eq!(
        shown.as_deref(),
        Some("Untitled 2, Untitled 3, Untitled 4, Untitled 5, Untitled 6 ... (+1 more)")
    );
}

// ── B. Files ───────────────────────────────────────────────────────────────

#[test]
fn test_open_edit_save_round_trip() {
    let t0 = Instant::now();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.txt");
    std::fs::write(&path, "milk\r\neggs").unwrap();

    let mut reg = registry();
    let id = reg.open_file(&path, MemorySurface::new()).unwrap();
    let doc = reg.get_mut(id).unwrap();
    assert_eq!(doc.label(), "todo.txt");
    assert_eq!(doc.surface().plain_text(), "milk\neggs");

    let end = doc.surface().len_chars();
    doc.surface_mut()
        .set_selection(notebook_pro_core::Selection::caret(end));
    doc.edit(t0, |s| s.type_text("\nbread")).unwrap();
    assert!(doc.tick(at(t0, 400)));
    assert!(reg.request_close(|_| true));

    let doc = reg.get_mut(id).unwrap();
    doc.save().unwrap();
    assert!(!doc.is_dirty());
    assert_eq!(std::fs::read(&path).unwrap(), b"milk\r\neggs\r\nbread");
    assert!(reg.request_close(|_| panic!("nothing unsaved")));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut reg = registry();
    assert!(reg
        .open_file(&dir.path().join("missing.txt"), MemorySurface::new())
        .is_err());
    assert!(reg.is_empty());
}
