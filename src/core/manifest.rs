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

//! The declarative project manifest (`Edam.toml`).
//!
//! A manifest only describes a project; [Manifest::build] replays it onto a
//! [Model] through the regular mutation API, so a manifest is rejected with
//! the same errors the API raises.

use super::attribute::AttributeRegistry;
use super::design::DesignBuilder;
use super::file::FileBuilder;
use super::filetype::FileKind;
use super::fileset::{FileSetBuilder, DEFAULT_FILESET};
use super::library::LibraryBuilder;
use super::model::{DesignId, EntityRef, FileSetId, LibraryId, Model, ProjectId};
use super::project::{ProjectBuilder, DEFAULT_DESIGN};
use super::setting;
use super::version::{SystemRdlVersion, SystemVerilogVersion, VerilogVersion, VhdlVersion};
use crate::error::Error;
use crate::util::filesystem;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const MANIFEST_FILE: &str = "Edam.toml";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Model(#[from] Error),
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    project: ProjectEntry,
    #[serde(default, rename = "design", skip_serializing_if = "Vec::is_empty")]
    designs: Vec<DesignEntry>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(rename = "vhdl-version", skip_serializing_if = "Option::is_none")]
    vhdl_version: Option<VhdlVersion>,
    #[serde(rename = "verilog-version", skip_serializing_if = "Option::is_none")]
    verilog_version: Option<VerilogVersion>,
    #[serde(rename = "sv-version", skip_serializing_if = "Option::is_none")]
    sv_version: Option<SystemVerilogVersion>,
    #[serde(rename = "srdl-version", skip_serializing_if = "Option::is_none")]
    srdl_version: Option<SystemRdlVersion>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    attributes: toml::Table,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DesignEntry {
    name: String,
    #[serde(rename = "top-level", skip_serializing_if = "Option::is_none")]
    top_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<PathBuf>,
    #[serde(default)]
    default: bool,
    #[serde(rename = "vhdl-library", skip_serializing_if = "Option::is_none")]
    vhdl_library: Option<String>,
    #[serde(rename = "vhdl-version", skip_serializing_if = "Option::is_none")]
    vhdl_version: Option<VhdlVersion>,
    #[serde(rename = "verilog-version", skip_serializing_if = "Option::is_none")]
    verilog_version: Option<VerilogVersion>,
    #[serde(rename = "sv-version", skip_serializing_if = "Option::is_none")]
    sv_version: Option<SystemVerilogVersion>,
    #[serde(rename = "srdl-version", skip_serializing_if = "Option::is_none")]
    srdl_version: Option<SystemRdlVersion>,
    #[serde(default, rename = "external-libraries", skip_serializing_if = "Vec::is_empty")]
    external_libraries: Vec<String>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    attributes: toml::Table,
    #[serde(default, rename = "library", skip_serializing_if = "Vec::is_empty")]
    libraries: Vec<LibraryEntry>,
    #[serde(default, rename = "fileset", skip_serializing_if = "Vec::is_empty")]
    filesets: Vec<FileSetEntry>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LibraryEntry {
    name: String,
    #[serde(rename = "vhdl-version", skip_serializing_if = "Option::is_none")]
    vhdl_version: Option<VhdlVersion>,
    #[serde(default, rename = "depends-on", skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    attributes: toml::Table,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSetEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(rename = "top-level", skip_serializing_if = "Option::is_none")]
    top_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<PathBuf>,
    #[serde(default)]
    default: bool,
    #[serde(rename = "vhdl-library", skip_serializing_if = "Option::is_none")]
    vhdl_library: Option<String>,
    #[serde(rename = "vhdl-version", skip_serializing_if = "Option::is_none")]
    vhdl_version: Option<VhdlVersion>,
    #[serde(rename = "verilog-version", skip_serializing_if = "Option::is_none")]
    verilog_version: Option<VerilogVersion>,
    #[serde(rename = "sv-version", skip_serializing_if = "Option::is_none")]
    sv_version: Option<SystemVerilogVersion>,
    #[serde(rename = "srdl-version", skip_serializing_if = "Option::is_none")]
    srdl_version: Option<SystemRdlVersion>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    attributes: toml::Table,
    #[serde(default, rename = "file", skip_serializing_if = "Vec::is_empty")]
    files: Vec<FileEntry>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "vhdl-library", skip_serializing_if = "Option::is_none")]
    vhdl_library: Option<String>,
    #[serde(rename = "vhdl-version", skip_serializing_if = "Option::is_none")]
    vhdl_version: Option<VhdlVersion>,
    #[serde(rename = "verilog-version", skip_serializing_if = "Option::is_none")]
    verilog_version: Option<VerilogVersion>,
    #[serde(rename = "sv-version", skip_serializing_if = "Option::is_none")]
    sv_version: Option<SystemVerilogVersion>,
    #[serde(rename = "srdl-version", skip_serializing_if = "Option::is_none")]
    srdl_version: Option<SystemRdlVersion>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    attributes: toml::Table,
}

impl FromStr for Manifest {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io(path.to_path_buf(), e))?;
        Ok(Self::from_str(&text)?)
    }

    pub fn project_name(&self) -> &str {
        &self.project.name
    }

    /// Creates the described project in `model`.
    ///
    /// Entities are created in the order they are written, so a fileset's
    /// `parent` must name an earlier fileset of the same design. On error,
    /// entities created before the failing entry are left in `model`.
    pub fn build(&self, model: &mut Model, registry: &AttributeRegistry) -> Result<ProjectId, Error> {
        let entry = &self.project;
        let mut builder = ProjectBuilder::new(&entry.name);
        if let Some(root) = &entry.root {
            builder = builder.root(root);
        }
        if let Some(v) = entry.vhdl_version {
            builder = builder.vhdl_version(v);
        }
        if let Some(v) = entry.verilog_version {
            builder = builder.verilog_version(v);
        }
        if let Some(v) = entry.sv_version {
            builder = builder.sv_version(v);
        }
        if let Some(v) = entry.srdl_version {
            builder = builder.srdl_version(v);
        }
        let project = model.create_project(builder);
        set_attributes(model, registry, project.into(), &entry.attributes)?;

        for design in &self.designs {
            design.build(model, registry, project)?;
        }
        debug!("built {} from manifest", model.describe(project));
        Ok(project)
    }

    /// Reads the manifest at `path` and builds its project, taking a relative
    /// project root as relative to the manifest's directory.
    pub fn load(path: &Path, model: &mut Model, registry: &AttributeRegistry) -> Result<ProjectId, ManifestError> {
        let manifest = Self::from_file(path)?;
        let project = manifest.build(model, registry)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let root = filesystem::resolve_against(dir, model.project(project).root());
        model.project_mut(project).set_root(root);
        Ok(project)
    }
}

impl DesignEntry {
    fn build(&self, model: &mut Model, registry: &AttributeRegistry, project: ProjectId) -> Result<DesignId, Error> {
        let design = match self.name == DEFAULT_DESIGN {
            true => {
                let d = model.project(project).default_design();
                let design = model.design_mut(d);
                if let Some(top) = &self.top_level {
                    design.set_top_level(Some(top.clone()));
                }
                if let Some(dir) = &self.directory {
                    design.set_directory(dir);
                }
                d
            }
            false => {
                let mut builder = DesignBuilder::new(&self.name).project(project);
                if let Some(top) = &self.top_level {
                    builder = builder.top_level(top);
                }
                if let Some(dir) = &self.directory {
                    builder = builder.directory(dir);
                }
                model.create_design(builder)?
            }
        };
        let entity = EntityRef::from(design);
        set_versions(
            model,
            entity,
            self.vhdl_version,
            self.verilog_version,
            self.sv_version,
            self.srdl_version,
        )?;
        if self.default == true {
            model.set_default_design(project, design)?;
        }
        for name in &self.external_libraries {
            model.design_mut(design).add_external_library(name);
        }
        set_attributes(model, registry, entity, &self.attributes)?;

        for lib in &self.libraries {
            let mut builder = LibraryBuilder::new(&lib.name).design(design);
            if let Some(v) = lib.vhdl_version {
                builder = builder.vhdl_version(v);
            }
            let id = model.create_vhdl_library(builder)?;
            set_attributes(model, registry, id.into(), &lib.attributes)?;
        }
        for lib in &self.libraries {
            let id = library_named(model, design, &lib.name)?;
            for dep in &lib.depends_on {
                let dep = library_named(model, design, dep)?;
                model.add_library_dependency(id, dep)?;
            }
        }
        if let Some(name) = &self.vhdl_library {
            let lib = match model.design(design).library_by_name(name) {
                Some(lib) => lib,
                None => model.create_vhdl_library(LibraryBuilder::new(name).design(design))?,
            };
            model.set_setting::<setting::VhdlLibrary>(design, Some(lib))?;
        }

        let mut names = HashMap::new();
        names.insert(DEFAULT_FILESET.to_string(), model.design(design).default_fileset());
        for fs in &self.filesets {
            let id = fs.build(model, registry, design, &names)?;
            names.insert(fs.name.clone(), id);
        }
        Ok(design)
    }
}

impl FileSetEntry {
    fn build(
        &self,
        model: &mut Model,
        registry: &AttributeRegistry,
        design: DesignId,
        names: &HashMap<String, FileSetId>,
    ) -> Result<FileSetId, Error> {
        let parent = match &self.parent {
            Some(p) => match names.get(p) {
                Some(id) => Some(*id),
                None => return Err(Error::FileSetNotFound(p.clone(), model.describe(design))),
            },
            None => None,
        };
        let fileset = match (self.name == DEFAULT_FILESET, parent) {
            (true, None) => {
                let id = model.design(design).default_fileset();
                let fs = model.fileset_mut(id);
                if let Some(top) = &self.top_level {
                    fs.set_top_level(Some(top.clone()));
                }
                if let Some(dir) = &self.directory {
                    fs.set_directory(dir);
                }
                id
            }
            (_, parent) => {
                let mut builder = FileSetBuilder::new(&self.name);
                builder = match parent {
                    Some(p) => builder.parent(p),
                    None => builder.design(design),
                };
                if let Some(top) = &self.top_level {
                    builder = builder.top_level(top);
                }
                if let Some(dir) = &self.directory {
                    builder = builder.directory(dir);
                }
                model.create_fileset(builder)?
            }
        };
        let entity = EntityRef::from(fileset);
        set_versions(
            model,
            entity,
            self.vhdl_version,
            self.verilog_version,
            self.sv_version,
            self.srdl_version,
        )?;
        if let Some(name) = &self.vhdl_library {
            let lib = model.get_or_create_vhdl_library(fileset, name)?;
            model.set_setting::<setting::VhdlLibrary>(entity, Some(lib))?;
        }
        if self.default == true {
            model.set_default_fileset(design, fileset)?;
        }
        set_attributes(model, registry, entity, &self.attributes)?;

        for file in &self.files {
            file.build(model, registry, fileset)?;
        }
        Ok(fileset)
    }
}

impl FileEntry {
    fn build(&self, model: &mut Model, registry: &AttributeRegistry, fileset: FileSetId) -> Result<(), Error> {
        let mut builder = FileBuilder::new(&self.path).fileset(fileset);
        if let Some(kind) = &self.kind {
            builder = builder.kind(FileKind::from_str(kind)?);
        }
        if let Some(name) = &self.vhdl_library {
            builder = builder.vhdl_library(model.get_or_create_vhdl_library(fileset, name)?);
        }
        if let Some(v) = self.vhdl_version {
            builder = builder.vhdl_version(v);
        }
        if let Some(v) = self.verilog_version {
            builder = builder.verilog_version(v);
        }
        if let Some(v) = self.sv_version {
            builder = builder.sv_version(v);
        }
        if let Some(v) = self.srdl_version {
            builder = builder.srdl_version(v);
        }
        let file = model.create_file(builder)?;
        set_attributes(model, registry, file.into(), &self.attributes)
    }
}

fn set_versions(
    model: &mut Model,
    entity: EntityRef,
    vhdl: Option<VhdlVersion>,
    verilog: Option<VerilogVersion>,
    sv: Option<SystemVerilogVersion>,
    srdl: Option<SystemRdlVersion>,
) -> Result<(), Error> {
    if vhdl.is_some() {
        model.set_setting::<setting::VhdlVersion>(entity, vhdl)?;
    }
    if verilog.is_some() {
        model.set_setting::<setting::VerilogVersion>(entity, verilog)?;
    }
    if sv.is_some() {
        model.set_setting::<setting::SvVersion>(entity, sv)?;
    }
    if srdl.is_some() {
        model.set_setting::<setting::SrdlVersion>(entity, srdl)?;
    }
    Ok(())
}

fn library_named(model: &Model, design: DesignId, name: &str) -> Result<LibraryId, Error> {
    model
        .design(design)
        .library_by_name(name)
        .ok_or_else(|| Error::LibraryNotFound(name.to_string(), model.describe(design)))
}

fn set_attributes(
    model: &mut Model,
    registry: &AttributeRegistry,
    entity: EntityRef,
    table: &toml::Table,
) -> Result<(), Error> {
    table
        .iter()
        .try_for_each(|(key, value)| model.set_attribute_by_name(registry, entity, key, value))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::attribute::Attribute;
    use crate::core::filetype::FileTypeFilter;
    use crate::core::fileset::SubFileSets;
    use std::fs;

    struct Owner;
    impl Attribute for Owner {
        type Value = String;
        const KEY: &'static str = "owner";
    }

    struct Seed;
    impl Attribute for Seed {
        type Value = i64;
        const KEY: &'static str = "seed";
    }

    fn registry() -> AttributeRegistry {
        AttributeRegistry::new().declare::<Owner>().declare::<Seed>()
    }

    const EXAMPLE: &str = r#"
[project]
name = "soc"
vhdl-version = "2008"
verilog-version = "2005"

[project.attributes]
owner = "hw-team"

[[design]]
name = "default"
top-level = "soc_top"
directory = "hw"

[[design.library]]
name = "common"

[[design.library]]
name = "core"
depends-on = ["common"]

[[design.fileset]]
name = "default"
directory = "rtl"
vhdl-library = "core"

[[design.fileset.file]]
path = "pkg.vhd"
vhdl-library = "common"

[[design.fileset.file]]
path = "top.vhd"

[[design.fileset]]
name = "ip"
parent = "default"
directory = "ip"

[[design.fileset.file]]
path = "fifo.v"

[[design.fileset.file]]
path = "constraints.sdc"
kind = "ConstraintFile"

[design.fileset.file.attributes]
seed = 7

[[design]]
name = "sim"
default = false
vhdl-version = "93"

[[design.fileset]]
name = "tb"
default = true

[[design.fileset.file]]
path = "tb.vhd"
vhdl-library = "work"
"#;

    #[test]
    fn parse_and_build() {
        let manifest = Manifest::from_str(EXAMPLE).unwrap();
        assert_eq!(manifest.project_name(), "soc");

        let mut m = Model::new();
        let p = manifest.build(&mut m, &registry()).unwrap();
        assert_eq!(m.project(p).name(), "soc");
        assert_eq!(m.project(p).len(), 2);
        assert_eq!(m.attribute::<Owner>(p).unwrap(), "hw-team");

        let d = m.project(p).default_design();
        assert_eq!(m.design(d).top_level(), Some("soc_top"));
        let common = m.design(d).library_by_name("common").unwrap();
        let core = m.design(d).library_by_name("core").unwrap();
        assert_eq!(m.library_compile_order(d), Ok(vec![common, core]));

        let files: Vec<_> = m
            .design_files(d, FileTypeFilter::Any, None)
            .unwrap()
            .map(|f| m.file(f).path().to_path_buf())
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("fifo.v"),
                PathBuf::from("constraints.sdc"),
                PathBuf::from("pkg.vhd"),
                PathBuf::from("top.vhd"),
            ]
        );
        let top = m.design_files(d, FileKind::VhdlSource.into(), None).unwrap().last().unwrap();
        assert_eq!(m.setting::<setting::VhdlLibrary>(top), Ok(core));
        assert_eq!(m.library(common).files().len(), 1);
        assert_eq!(m.setting::<setting::VhdlVersion>(top), Ok(VhdlVersion::Vhdl2008));

        let sdc = m.design_files(d, FileKind::Constraint.into(), None).unwrap().next().unwrap();
        assert_eq!(m.attribute::<Seed>(sdc), Ok(&7));
        assert_eq!(m.attribute::<Owner>(sdc).unwrap(), "hw-team");
        assert_eq!(
            m.file_resolved_path(sdc),
            Ok(PathBuf::from("hw/rtl/ip/constraints.sdc"))
        );

        let sim = m.project(p).design_by_name("sim").unwrap();
        let tb = m.design(sim).default_fileset();
        assert_eq!(m.fileset(tb).name(), "tb");
        let tb_file = m
            .fileset_files(tb, FileTypeFilter::Any, SubFileSets::All)
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(m.setting::<setting::VhdlVersion>(tb_file), Ok(VhdlVersion::Vhdl93));
        assert_eq!(m.design(sim).library_by_name("work").is_some(), true);
    }

    #[test]
    fn reject_unknown_keys() {
        let text = "[project]\nname = \"p\"\ncolor = \"red\"\n";
        assert_eq!(Manifest::from_str(text).is_err(), true);

        let text = "[project]\nname = \"p\"\nvhdl-version = \"2013\"\n";
        assert_eq!(Manifest::from_str(text).is_err(), true);
    }

    #[test]
    fn reject_bad_attributes() {
        let mut m = Model::new();
        let manifest = Manifest::from_str("[project]\nname = \"p\"\n[project.attributes]\ncolor = \"red\"\n").unwrap();
        assert_eq!(
            manifest.build(&mut m, &registry()),
            Err(Error::NotAnAttribute(String::from("color")))
        );

        let manifest = Manifest::from_str("[project]\nname = \"p\"\n[project.attributes]\nseed = \"seven\"\n").unwrap();
        assert_eq!(
            manifest.build(&mut m, &registry()),
            Err(Error::AttributeValueType(String::from("seed"), "integer"))
        );
    }

    #[test]
    fn reject_bad_structure() {
        let mut m = Model::new();
        let text = r#"
[project]
name = "p"

[[design]]
name = "d"

[[design.fileset]]
name = "child"
parent = "missing"
"#;
        let manifest = Manifest::from_str(text).unwrap();
        assert_eq!(
            manifest.build(&mut m, &registry()),
            Err(Error::FileSetNotFound(String::from("missing"), String::from("design \"d\"")))
        );

        let text = r#"
[project]
name = "q"

[[design]]
name = "d"

[[design.library]]
name = "a"
depends-on = ["b"]
"#;
        let manifest = Manifest::from_str(text).unwrap();
        assert_eq!(
            manifest.build(&mut m, &registry()),
            Err(Error::LibraryNotFound(String::from("b"), String::from("design \"d\"")))
        );

        let text = r#"
[project]
name = "r"

[[design]]
name = "default"

[[design.fileset]]
name = "default"

[[design.fileset.file]]
path = "notes.txt"
kind = "NoSuchFile"
"#;
        let manifest = Manifest::from_str(text).unwrap();
        assert_eq!(
            manifest.build(&mut m, &registry()),
            Err(Error::UnknownFileType(String::from("NoSuchFile")))
        );
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("rtl")).unwrap();
        fs::write(dir.path().join("rtl/top.sv"), "module top; endmodule\n").unwrap();
        let text = r#"
[project]
name = "p"
sv-version = "2017"

[[design]]
name = "default"

[[design.fileset]]
name = "default"
directory = "rtl"

[[design.fileset.file]]
path = "top.sv"
"#;
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(&path, text).unwrap();

        let mut m = Model::new();
        let p = Manifest::load(&path, &mut m, &registry()).unwrap();
        assert_eq!(m.project_resolved_path(p), filesystem::normalize(dir.path()));
        assert_eq!(m.validate_project(p), Ok(()));

        let missing = dir.path().join("missing").join(MANIFEST_FILE);
        match Manifest::load(&missing, &mut m, &registry()) {
            Err(ManifestError::Io(p, _)) => assert_eq!(p, missing),
            other => panic!("expected an io error, got {:?}", other),
        }
    }
}
