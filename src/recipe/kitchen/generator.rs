// src/recipe/kitchen/generator.rs

//! Build-directory generators
//!
//! `buildinfo.cmake` exposes resolved dependencies to the project's
//! `CMakeLists.txt`:
//!
//! ```cmake
//! include(${CMAKE_BINARY_DIR}/buildinfo.cmake)
//! larder_basic_setup()
//! target_link_libraries(mylib ${LARDER_LIBS})
//! ```

use crate::error::Result;
use crate::recipe::format::{Generator, RecipeManifest};
use crate::recipe::lifecycle::{resolve_in_order, ResolvedDependency};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File written by the CMake generator
pub const BUILDINFO_FILE: &str = "buildinfo.cmake";

fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn cmake_var(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `buildinfo.cmake` for `deps`, given in declared order
pub fn render_buildinfo(owner: &str, deps: &[&ResolvedDependency]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Generated by larder for {}\n\n", owner));

    let mut all_includes = Vec::new();
    let mut all_lib_dirs = Vec::new();
    let mut all_libs = Vec::new();

    for dep in deps {
        let var = cmake_var(&dep.reference.name);
        let includes: Vec<String> = dep.include_dirs().iter().map(|p| cmake_path(p)).collect();
        let lib_dirs: Vec<String> = dep.lib_dirs().iter().map(|p| cmake_path(p)).collect();

        out.push_str(&format!("# {}\n", dep.reference));
        out.push_str(&format!(
            "set(LARDER_{}_ROOT \"{}\")\n",
            var,
            cmake_path(&dep.root)
        ));
        out.push_str(&format!(
            "set(LARDER_INCLUDE_DIRS_{} {})\n",
            var,
            quoted_list(&includes)
        ));
        out.push_str(&format!(
            "set(LARDER_LIB_DIRS_{} {})\n",
            var,
            quoted_list(&lib_dirs)
        ));
        out.push_str(&format!(
            "set(LARDER_LIBS_{} {})\n\n",
            var,
            dep.interface.libs.join(" ")
        ));

        all_includes.extend(includes);
        all_lib_dirs.extend(lib_dirs);
        all_libs.extend(dep.interface.libs.iter().cloned());
    }

    out.push_str(&format!(
        "set(LARDER_INCLUDE_DIRS {})\n",
        quoted_list(&all_includes)
    ));
    out.push_str(&format!(
        "set(LARDER_LIB_DIRS {})\n",
        quoted_list(&all_lib_dirs)
    ));
    out.push_str(&format!("set(LARDER_LIBS {})\n\n", all_libs.join(" ")));

    out.push_str("macro(larder_basic_setup)\n");
    out.push_str("    include_directories(${LARDER_INCLUDE_DIRS})\n");
    out.push_str("    link_directories(${LARDER_LIB_DIRS})\n");
    out.push_str("endmacro()\n");
    out
}

/// Write every generator the manifest requests into `build_dir`
pub fn write_generators(
    manifest: &RecipeManifest,
    build_dir: &Path,
    deps: &[ResolvedDependency],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if manifest.generators.is_empty() {
        return Ok(written);
    }

    let ordered = resolve_in_order(&manifest.requires, deps)?;
    fs::create_dir_all(build_dir)?;

    for generator in &manifest.generators {
        match generator {
            Generator::Cmake => {
                let path = build_dir.join(BUILDINFO_FILE);
                let content = render_buildinfo(&manifest.package.display_name(), &ordered);
                fs::write(&path, content)?;
                debug!("Wrote {}", path.display());
                written.push(path);
            }
        }
    }
    Ok(written)
}
