//! Build script: bundles the boundary files under `fixtures/geo/`.
//!
//! Every `*.json` / `*.geojson` file is copied into `OUT_DIR/geo/` and listed
//! in `OUT_DIR/bundled_geo.rs`, a `&[(file name, contents)]` expression the
//! app pulls in with `include!`. When the fixtures are missing, an empty
//! base map is bundled so the app still builds.

use std::env;
use std::fs;
use std::path::Path;

const BASE_MAP: &str = "SEA_Map.json";

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let geo_out = Path::new(&out_dir).join("geo");
    fs::create_dir_all(&geo_out).unwrap();

    let src_dir = Path::new("../fixtures/geo");
    let mut names = Vec::new();
    if let Ok(entries) = fs::read_dir(src_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_geo = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json") | Some("geojson")
            );
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if !is_geo {
                continue;
            }
            fs::copy(&path, geo_out.join(&name)).unwrap_or_else(|e| {
                panic!("Failed to copy {}: {}", path.display(), e);
            });
            names.push(name);
        }
    }
    if !names.iter().any(|n| n == BASE_MAP) {
        fs::write(
            geo_out.join(BASE_MAP),
            r#"{"type":"FeatureCollection","features":[]}"#,
        )
        .unwrap();
        names.push(BASE_MAP.to_string());
        println!(
            "cargo:warning=Fixture {} not found, bundling an empty map",
            BASE_MAP
        );
    }
    names.sort();

    let entries: Vec<String> = names
        .iter()
        .map(|n| {
            format!(
                "    ({:?}, include_str!({:?})),",
                n,
                geo_out.join(n).display().to_string()
            )
        })
        .collect();
    fs::write(
        Path::new(&out_dir).join("bundled_geo.rs"),
        format!("&[\n{}\n]\n", entries.join("\n")),
    )
    .unwrap();

    println!("cargo:rerun-if-changed=../fixtures/geo");
    println!("cargo:rerun-if-changed=build.rs");
}
