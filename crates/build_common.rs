// README-to-rustdoc helper shared by the herald crates.
// Pull it into a build.rs with: include!("../build_common.rs");
//
// The including file must import:
//   use std::env;
//   use std::fs;
//   use std::path::Path;

/// Write `OUT_DIR/README_GENERATED.md`, a copy of the crate README whose
/// links resolve inside rustdoc.
///
/// * `](src/engine.rs)` becomes `](engine)`, a module link.
/// * Links into the workspace (`](../../...)`) have no rustdoc target, so
///   only their text is kept.
fn process_readme_for_rustdoc(crate_dir: &str) {
    println!("cargo:rerun-if-changed=README.md");

    let readme_path = Path::new(crate_dir).join("README.md");
    let content = fs::read_to_string(&readme_path).unwrap_or_default();

    let rustdoc_content = unlink_workspace_refs(
        &content.replace("](src/", "](").replace(".rs)", ")"),
    );

    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(Path::new(&out_dir).join("README_GENERATED.md"), rustdoc_content).unwrap();
}

/// `[workspace README](../../README.md)` -> `workspace README`.
fn unlink_workspace_refs(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut rest = markdown;
    while let Some(link) = rest.find("](../../") {
        let Some(open) = rest[..link].rfind('[') else {
            break;
        };
        let Some(close) = rest[link..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[open + 1..link]);
        rest = &rest[link + close + 1..];
    }
    out.push_str(rest);
    out
}
