//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` components of `path`.
///
/// An absolute path is resolved against the filesystem one component at a
/// time: while the prefix exists, symbolic links in it are followed before a
/// following `..` is applied, so `a/link/..` lands in the link target's
/// parent. The part of the path that does not exist is collapsed lexically.
///
/// A relative path is collapsed lexically only. Leading `..` components are
/// kept and an empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    match path.is_absolute() {
        true => resolve_absolute(path),
        false => collapse(path),
    }
}

fn resolve_absolute(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => result.push(comp.as_os_str()),
            Component::CurDir => (),
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => {
                result.push(name);
                if let Ok(real) = std::fs::canonicalize(&result) {
                    result = real;
                }
            }
        }
    }
    result
}

fn collapse(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    // number of normal components that can still be popped by a `..`
    let mut depth = 0usize;
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => result.push(comp.as_os_str()),
            Component::CurDir => (),
            Component::ParentDir => {
                if depth > 0 {
                    result.pop();
                    depth -= 1;
                } else if result.has_root() == false {
                    result.push("..");
                }
            }
            Component::Normal(name) => {
                result.push(name);
                depth += 1;
            }
        }
    }
    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Resolves `path` against the directory `base`.
///
/// An absolute `path` ignores `base`. A relative `base` yields a relative
/// result (relative to the current working directory).
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    match path.is_absolute() {
        true => normalize(path),
        false => normalize(&base.join(path)),
    }
}

/// Checks if the `file` ends with one of the `extensions` (ascii case-insensitive).
pub fn has_extension(file: &Path, extensions: &[&str]) -> bool {
    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
