use desktop_app_contract::{AppRegistry, ApplicationId};
use desktop_runtime::{
    CommandError, DesktopAction, DesktopCommand, DesktopConfig, DesktopRuntime, InstanceId,
    ResolveError, RuntimeEffect,
};
use futures::executor::block_on;
use platform_host::{FileStoreService, FsEntry, FsEntryKind, FsErrorKind, SandboxedFileStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("{prefix}_{}_{}", process::id(), nanos));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn runtime(prefix: &str) -> (DesktopRuntime, PathBuf) {
    let root = temp_dir(prefix);
    fs::create_dir_all(root.join("Desktop")).expect("desktop folder");
    let config = DesktopConfig {
        sandbox_root: root.clone(),
        ..DesktopConfig::default()
    };
    let runtime = DesktopRuntime::from_config(config).expect("boot runtime");
    (runtime, root)
}

fn desktop_names(runtime: &DesktopRuntime) -> Vec<&str> {
    runtime
        .state()
        .desktop_items
        .iter()
        .map(|entry| entry.name.as_str())
        .collect()
}

#[test]
fn boot_seeds_pinned_apps_from_config() {
    let (runtime, root) = runtime("runtime_boot");
    assert_eq!(
        runtime.state().pinned_apps,
        vec![ApplicationId::trusted("notebook")]
    );
    assert!(runtime.state().instances.is_empty());
    let _ = fs::remove_dir_all(root);
}

#[test]
fn project_root_rejects_listing_outside_the_sandbox() {
    let parent = temp_dir("runtime_scenario");
    let root = parent.join("project");
    fs::create_dir_all(&root).expect("project root");
    let store = SandboxedFileStore::from_root(&root).expect("store");

    let err = block_on(store.list("../../etc")).expect_err("escape rejected");
    assert_eq!(err.kind(), FsErrorKind::SecurityViolation);

    let _ = fs::remove_dir_all(parent);
}

#[test]
fn three_opens_stack_in_order_and_focus_raises_the_first() {
    let (mut runtime, root) = runtime("runtime_stack");
    let notebook = runtime.registry().by_id("notebook").expect("notebook").clone();

    let ids: Vec<InstanceId> = (0..3)
        .map(|_| runtime.open(notebook.clone(), json!({})))
        .collect();
    let z = |runtime: &DesktopRuntime, id| runtime.state().instance(id).expect("instance").z_index;
    assert!(z(&runtime, ids[0]) < z(&runtime, ids[1]));
    assert!(z(&runtime, ids[1]) < z(&runtime, ids[2]));

    runtime.dispatch(DesktopAction::Focus {
        instance_id: ids[0],
    });
    assert!(z(&runtime, ids[0]) > z(&runtime, ids[2]));
    assert_eq!(runtime.state().active_instance_id, Some(ids[0]));

    runtime.dispatch(DesktopAction::Close {
        instance_id: ids[0],
    });
    assert_eq!(runtime.state().active_instance_id, Some(ids[2]));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn opening_a_folder_entry_launches_an_explorer_instance() {
    let (mut runtime, root) = runtime("runtime_open_folder");
    let entry = FsEntry::new("Desktop", "/Desktop", FsEntryKind::Folder);

    block_on(runtime.run_command(DesktopCommand::OpenEntry {
        entry,
        open_with: None,
    }))
    .expect("open folder");

    let active = runtime.state().active_instance().expect("new instance");
    assert_eq!(active.app_id.as_str(), "fileExplorer");
    assert_eq!(active.initial_data, json!({ "initialPath": "/Desktop" }));
    let instance_id = active.instance_id;
    assert!(runtime
        .take_effects()
        .contains(&RuntimeEffect::FocusInstanceInput(instance_id)));
    assert!(runtime.take_effects().is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn failed_resolution_creates_no_instance() {
    let (mut runtime, root) = runtime("runtime_open_cycle");
    fs::write(
        root.join("Desktop/loop.shortcut"),
        r#"{ "targetPath": "/Desktop/loop.shortcut" }"#,
    )
    .expect("write loop");

    let err = block_on(runtime.run_command(DesktopCommand::OpenEntry {
        entry: FsEntry::new("loop.shortcut", "/Desktop/loop.shortcut", FsEntryKind::File),
        open_with: None,
    }))
    .expect_err("cycle");

    assert!(matches!(
        err,
        CommandError::Resolve(ResolveError::CycleDetected { .. })
    ));
    assert!(runtime.state().instances.is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn new_folder_and_text_file_pick_free_names_and_refresh_the_desktop() {
    let (mut runtime, root) = runtime("runtime_new_items");
    let parent = "/Desktop".to_string();

    for _ in 0..2 {
        block_on(runtime.run_command(DesktopCommand::NewFolder {
            parent: parent.clone(),
        }))
        .expect("new folder");
    }
    block_on(runtime.run_command(DesktopCommand::NewTextFile { parent })).expect("new file");

    assert_eq!(
        desktop_names(&runtime),
        vec!["New Folder", "New Folder (1)", "New Text File.txt"]
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn paste_copies_the_clipboard_entry_and_keeps_it_for_repeat_pastes() {
    let (mut runtime, root) = runtime("runtime_paste");
    fs::create_dir_all(root.join("Docs")).expect("docs");
    fs::write(root.join("Docs/a.txt"), "hello").expect("source");

    let err = block_on(runtime.run_command(DesktopCommand::Paste {
        dest_dir: "/Desktop".to_string(),
    }))
    .expect_err("nothing copied yet");
    assert_eq!(err, CommandError::EmptyClipboard);

    runtime.dispatch(DesktopAction::CopyToClipboard {
        entry: FsEntry::new("a.txt", "/Docs/a.txt", FsEntryKind::File),
    });
    for _ in 0..2 {
        block_on(runtime.run_command(DesktopCommand::Paste {
            dest_dir: "/Desktop".to_string(),
        }))
        .expect("paste");
    }

    assert_eq!(desktop_names(&runtime), vec!["a (1).txt", "a.txt"]);
    assert!(runtime.state().clipboard.is_some());
    assert_eq!(
        fs::read_to_string(root.join("Desktop/a.txt")).expect("copied"),
        "hello"
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn rename_delete_and_shortcut_commands_round_through_the_store() {
    let (mut runtime, root) = runtime("runtime_mutations");
    fs::write(root.join("Desktop/draft.txt"), "").expect("draft");

    block_on(runtime.run_command(DesktopCommand::Rename {
        path: "/Desktop/draft.txt".to_string(),
        new_name: "final.txt".to_string(),
    }))
    .expect("rename");
    block_on(runtime.run_command(DesktopCommand::CreateShortcut {
        target_path: "/Desktop/final.txt".to_string(),
    }))
    .expect("shortcut");
    assert_eq!(
        desktop_names(&runtime),
        vec!["final.txt", "final.txt.shortcut"]
    );

    let err = block_on(runtime.run_command(DesktopCommand::Rename {
        path: "/Desktop/final.txt".to_string(),
        new_name: "../../escape.txt".to_string(),
    }))
    .expect_err("escape");
    assert!(matches!(
        err,
        CommandError::Fs(ref fs_err) if fs_err.kind() == FsErrorKind::SecurityViolation
    ));

    block_on(runtime.run_command(DesktopCommand::Delete {
        path: "/Desktop/final.txt.shortcut".to_string(),
    }))
    .expect("delete");
    assert_eq!(desktop_names(&runtime), vec!["final.txt"]);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn properties_command_opens_a_titled_instance() {
    let (mut runtime, root) = runtime("runtime_properties");
    block_on(runtime.run_command(DesktopCommand::OpenProperties {
        entry: FsEntry::new("Desktop", "/Desktop", FsEntryKind::Folder),
    }))
    .expect("properties");

    let instance = runtime.state().active_instance().expect("instance");
    assert_eq!(instance.app_id.as_str(), "properties");
    assert_eq!(instance.title, "Properties: Desktop");
    assert_eq!(instance.initial_data, json!({ "path": "/Desktop" }));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn follow_ups_are_applied_in_arrival_order_by_pump() {
    let root = temp_dir("runtime_pump");
    fs::create_dir_all(root.join("Desktop")).expect("desktop");
    let store = Rc::new(SandboxedFileStore::from_root(&root).expect("store"));
    let registry = AppRegistry::builtin().expect("catalog");
    let mut runtime = DesktopRuntime::new(DesktopConfig::default(), registry, store);

    let context = runtime.command_context();
    block_on(context.execute(DesktopCommand::NewFolder {
        parent: "/Desktop".to_string(),
    }))
    .expect("first");
    block_on(context.execute(DesktopCommand::RefreshDesktop)).expect("second");
    assert!(runtime.state().desktop_items.is_empty(), "nothing applied before pump");

    assert_eq!(runtime.pump(), 2);
    assert_eq!(desktop_names(&runtime), vec!["New Folder"]);
    assert_eq!(runtime.pump(), 0);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn commands_finishing_after_shutdown_report_a_closed_mailbox() {
    let (runtime, root) = runtime("runtime_shutdown");
    let context = runtime.command_context();
    let state = runtime.shutdown();
    assert!(state.instances.is_empty());

    let err = block_on(context.execute(DesktopCommand::RefreshDesktop)).expect_err("closed");
    assert_eq!(err, CommandError::MailboxClosed);

    let _ = fs::remove_dir_all(root);
}
