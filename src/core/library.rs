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

//! VHDL libraries: groupings of VHDL files that cut across the fileset tree.
//!
//! Every design keeps a dependency graph over its libraries, which gives the
//! order libraries must be compiled in.

use super::attribute::AttributeBag;
use super::model::{DesignId, FileId, LibraryId, Model, ProjectId};
use super::setting::Settings;
use super::version::VhdlVersion;
use crate::error::Error;
use crate::util::graph::EdgeStatus;
use std::fmt::Display;
use tracing::debug;

#[derive(Debug)]
pub struct VhdlLibrary {
    name: String,
    pub(crate) project: Option<ProjectId>,
    pub(crate) design: Option<DesignId>,
    pub(crate) files: Vec<FileId>,
    pub(crate) settings: Settings,
    pub(crate) attributes: AttributeBag,
}

impl VhdlLibrary {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn design(&self) -> Option<DesignId> {
        self.design
    }

    /// The member files, in the order they joined the library.
    pub fn files(&self) -> &[FileId] {
        &self.files
    }
}

impl Display for VhdlLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryBuilder {
    name: String,
    project: Option<ProjectId>,
    design: Option<DesignId>,
    settings: Settings,
}

impl LibraryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: None,
            design: None,
            settings: Settings::new(),
        }
    }

    pub fn project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    pub fn design(mut self, design: DesignId) -> Self {
        self.design = Some(design);
        self
    }

    pub fn vhdl_version(mut self, v: VhdlVersion) -> Self {
        self.settings = self.settings.with_vhdl_version(Some(v));
        self
    }
}

impl Model {
    /// Creates a VHDL library and registers it with its design. A library
    /// given only a project goes to the project's default design.
    pub fn create_vhdl_library(&mut self, builder: LibraryBuilder) -> Result<LibraryId, Error> {
        let design = builder
            .design
            .or_else(|| builder.project.map(|p| self.project(p).default_design()));
        let id = LibraryId(self.libraries.len());
        self.libraries.push(VhdlLibrary {
            name: builder.name,
            project: builder.project,
            design: None,
            files: Vec::new(),
            settings: builder.settings,
            attributes: AttributeBag::new(),
        });
        if let Some(d) = design {
            if let Err(e) = self.design_add_vhdl_library(d, id) {
                self.libraries.pop();
                return Err(e);
            }
        }
        Ok(id)
    }

    /// Registers `library` with `design`. Library names are unique per design.
    pub fn design_add_vhdl_library(&mut self, design: DesignId, library: LibraryId) -> Result<(), Error> {
        let d = self.design(design);
        let lib = self.library(library);
        if d.libraries().any(|l| l == library) {
            return Err(Error::LibraryAlreadyAdded(d.name().to_string(), lib.name().to_string()));
        }
        if d.library_by_name(lib.name()).is_some() {
            return Err(Error::DuplicateLibrary(d.name().to_string(), lib.name().to_string()));
        }
        if let Some(other) = lib.design {
            return Err(Error::LibraryAlreadyOwned(
                lib.name().to_string(),
                self.design(other).name().to_string(),
            ));
        }
        if let (Some(have), Some(want)) = (lib.project, d.project) {
            if have != want {
                return Err(self.project_mismatch(library.into(), have, want));
            }
        }
        // loose members must already sit in this design
        for &file in lib.files() {
            let (have, project) = self.entity_links(file.into());
            if let Some(have) = have.filter(|&h| h != design) {
                return Err(self.design_mismatch(file.into(), have, design));
            }
            if let (Some(have), Some(want)) = (project, d.project) {
                if have != want {
                    return Err(self.project_mismatch(file.into(), have, want));
                }
            }
        }

        let name = lib.name().to_string();
        let project = d.project;
        let d = &mut self.designs[design.0];
        d.libraries.insert(name.clone(), library);
        d.library_graph.add_node(name, library);
        let lib = &mut self.libraries[library.0];
        lib.design = Some(design);
        if lib.project.is_none() {
            lib.project = project;
        }
        debug!("added {} to {}", self.describe(library), self.describe(design));
        Ok(())
    }

    pub fn design_add_vhdl_libraries(
        &mut self,
        design: DesignId,
        libraries: impl IntoIterator<Item = LibraryId>,
    ) -> Result<(), Error> {
        libraries
            .into_iter()
            .try_for_each(|l| self.design_add_vhdl_library(design, l))
    }

    /// Assigns `design` to `library`, see [Model::design_add_vhdl_library].
    pub fn set_library_design(&mut self, library: LibraryId, design: DesignId) -> Result<(), Error> {
        if self.library(library).design == Some(design) {
            return Ok(());
        }
        self.design_add_vhdl_library(design, library)
    }

    /// Assigns `project` to `library`, which must agree with the project of
    /// its design.
    pub fn set_library_project(&mut self, library: LibraryId, project: ProjectId) -> Result<(), Error> {
        let lib = self.library(library);
        let have = lib
            .project
            .or_else(|| lib.design.and_then(|d| self.design(d).project));
        if let Some(have) = have {
            if have != project {
                return Err(self.project_mismatch(library.into(), have, project));
            }
        }
        self.libraries[library.0].project = Some(project);
        Ok(())
    }

    /// Records that `library` depends on `dependency`. Both must belong to the
    /// same design.
    pub fn add_library_dependency(&mut self, library: LibraryId, dependency: LibraryId) -> Result<(), Error> {
        let lib = self.library(library);
        let dep = self.library(dependency);
        if library == dependency {
            return Err(Error::SelfDependency(lib.name().to_string()));
        }
        let design = lib
            .design
            .ok_or_else(|| Error::MissingDesign(self.describe(library)))?;
        if dep.design != Some(design) {
            return Err(Error::LibraryNotFound(dep.name().to_string(), self.describe(design)));
        }
        let (from, to) = (dep.name().to_string(), lib.name().to_string());
        match self.designs[design.0].library_graph.add_edge_by_key(&from, &to, ()) {
            EdgeStatus::Success => {
                debug!("{} depends on {}", self.describe(library), self.describe(dependency));
                Ok(())
            }
            EdgeStatus::AlreadyExists => Ok(()),
            EdgeStatus::SelfLoop => Err(Error::SelfDependency(to)),
            EdgeStatus::MissingSource => Err(Error::LibraryNotFound(from, self.describe(design))),
            EdgeStatus::MissingTarget => Err(Error::LibraryNotFound(to, self.describe(design))),
        }
    }

    fn library_neighbors(&self, library: LibraryId, upstream: bool) -> Vec<LibraryId> {
        let lib = self.library(library);
        let design = match lib.design {
            Some(d) => self.design(d),
            None => return Vec::new(),
        };
        let key = lib.name().to_string();
        let keys = match upstream {
            true => design.library_graph.predecessors_by_key(&key),
            false => design.library_graph.successors_by_key(&key),
        };
        // edges are listed newest first
        keys.into_iter()
            .rev()
            .filter_map(|k| design.library_by_name(k))
            .collect()
    }

    /// The libraries `library` depends on directly.
    pub fn library_dependencies(&self, library: LibraryId) -> Vec<LibraryId> {
        self.library_neighbors(library, true)
    }

    /// The libraries depending directly on `library`.
    pub fn library_dependents(&self, library: LibraryId) -> Vec<LibraryId> {
        self.library_neighbors(library, false)
    }

    /// Orders the design's libraries so every library comes after the
    /// libraries it depends on. Unrelated libraries keep registration order.
    pub fn library_compile_order(&self, design: DesignId) -> Result<Vec<LibraryId>, Error> {
        let d = self.design(design);
        match d.library_graph.topological_values() {
            Ok(order) => Ok(order.into_iter().copied().collect()),
            Err(stuck) => Err(Error::LibraryCycle(
                d.name().to_string(),
                stuck.into_iter().cloned().collect(),
            )),
        }
    }

    /// Enumerates the member files of `library`.
    pub fn library_files(&self, library: LibraryId) -> impl Iterator<Item = FileId> + '_ {
        self.library(library).files.iter().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::design::DesignBuilder;
    use crate::core::file::FileBuilder;
    use crate::core::project::ProjectBuilder;
    use crate::core::setting;

    #[test]
    fn register_with_design() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p"));
        let d = m.create_design(DesignBuilder::new("d").project(p)).unwrap();
        let lib = m.create_vhdl_library(LibraryBuilder::new("osvvm").design(d)).unwrap();
        assert_eq!(m.design(d).library_by_name("osvvm"), Some(lib));
        assert_eq!(m.library(lib).project(), Some(p));
        assert_eq!(m.library(lib).to_string(), "osvvm");

        // a project alone picks its default design
        let dd = m.project(p).default_design();
        let work = m.create_vhdl_library(LibraryBuilder::new("work").project(p)).unwrap();
        assert_eq!(m.library(work).design(), Some(dd));

        assert_eq!(
            m.create_vhdl_library(LibraryBuilder::new("osvvm").design(d)),
            Err(Error::DuplicateLibrary(String::from("d"), String::from("osvvm")))
        );
        assert_eq!(
            m.design_add_vhdl_library(d, lib),
            Err(Error::LibraryAlreadyAdded(String::from("d"), String::from("osvvm")))
        );
        assert_eq!(
            m.set_library_design(lib, dd),
            Err(Error::LibraryAlreadyOwned(String::from("osvvm"), String::from("d")))
        );
        assert_eq!(m.set_library_design(lib, d), Ok(()));
        assert_eq!(m.design(d).libraries().count(), 1);
    }

    #[test]
    fn loose_library() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p"));
        let q = m.create_project(ProjectBuilder::new("q"));
        let lib = m.create_vhdl_library(LibraryBuilder::new("uvvm")).unwrap();
        assert_eq!(m.library(lib).design(), None);
        let d = m.create_design(DesignBuilder::new("d").project(q)).unwrap();
        m.set_library_project(lib, p).unwrap();
        assert_eq!(
            m.design_add_vhdl_libraries(d, [lib]),
            Err(Error::ProjectMismatch(String::from("VHDL library \"uvvm\""), String::from("p"), String::from("q")))
        );
        assert_eq!(
            m.set_library_project(lib, q),
            Err(Error::ProjectMismatch(String::from("VHDL library \"uvvm\""), String::from("p"), String::from("q")))
        );
    }

    #[test]
    fn loose_members_follow_design() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let e = m.create_design(DesignBuilder::new("e")).unwrap();
        let lib = m.create_vhdl_library(LibraryBuilder::new("lib")).unwrap();
        let f = m.create_file(FileBuilder::new("x.vhd").design(d).vhdl_library(lib)).unwrap();
        assert_eq!(
            m.design_add_vhdl_library(e, lib),
            Err(Error::DesignMismatch(String::from("file \"x.vhd\""), String::from("d"), String::from("e")))
        );
        assert_eq!(m.library(lib).design(), None);
        assert_eq!(m.design_add_vhdl_library(d, lib), Ok(()));
        assert_eq!(m.library(lib).files(), &[f]);
    }

    #[test]
    fn version_falls_back_to_design() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p").vhdl_version(VhdlVersion::Vhdl2008));
        let d = m.create_design(DesignBuilder::new("d").project(p)).unwrap();
        let a = m.create_vhdl_library(LibraryBuilder::new("a").design(d)).unwrap();
        let b = m
            .create_vhdl_library(LibraryBuilder::new("b").design(d).vhdl_version(VhdlVersion::Vhdl93))
            .unwrap();
        assert_eq!(m.setting::<setting::VhdlVersion>(a), Ok(VhdlVersion::Vhdl2008));
        assert_eq!(m.setting::<setting::VhdlVersion>(b), Ok(VhdlVersion::Vhdl93));
        assert_eq!(
            m.setting::<setting::VerilogVersion>(a),
            Err(Error::SettingNotApplicable("Verilog version", String::from("VHDL library \"a\"")))
        );
    }

    #[test]
    fn compile_order() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let top = m.create_vhdl_library(LibraryBuilder::new("top").design(d)).unwrap();
        let osvvm = m.create_vhdl_library(LibraryBuilder::new("osvvm").design(d)).unwrap();
        let common = m.create_vhdl_library(LibraryBuilder::new("common").design(d)).unwrap();
        let tb = m.create_vhdl_library(LibraryBuilder::new("tb").design(d)).unwrap();
        m.add_library_dependency(top, common).unwrap();
        m.add_library_dependency(tb, top).unwrap();
        m.add_library_dependency(tb, osvvm).unwrap();
        // repeating an edge is harmless
        m.add_library_dependency(tb, osvvm).unwrap();

        assert_eq!(m.library_compile_order(d), Ok(vec![osvvm, common, top, tb]));
        assert_eq!(m.library_dependencies(tb), vec![top, osvvm]);
        assert_eq!(m.library_dependents(common), vec![top]);

        m.add_library_dependency(common, tb).unwrap();
        assert_eq!(
            m.library_compile_order(d),
            Err(Error::LibraryCycle(
                String::from("d"),
                vec![String::from("top"), String::from("common"), String::from("tb")]
            ))
        );
    }

    #[test]
    fn bad_dependencies() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let e = m.create_design(DesignBuilder::new("e")).unwrap();
        let a = m.create_vhdl_library(LibraryBuilder::new("a").design(d)).unwrap();
        let b = m.create_vhdl_library(LibraryBuilder::new("b").design(e)).unwrap();
        let loose = m.create_vhdl_library(LibraryBuilder::new("loose")).unwrap();
        assert_eq!(m.add_library_dependency(a, a), Err(Error::SelfDependency(String::from("a"))));
        assert_eq!(
            m.add_library_dependency(a, b),
            Err(Error::LibraryNotFound(String::from("b"), String::from("design \"d\"")))
        );
        assert_eq!(
            m.add_library_dependency(loose, a),
            Err(Error::MissingDesign(String::from("VHDL library \"loose\"")))
        );
    }

    #[test]
    fn member_files() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let lib = m.create_vhdl_library(LibraryBuilder::new("lib").design(d)).unwrap();
        let f = m.create_file(FileBuilder::new("a.vhd").design(d).vhdl_library(lib)).unwrap();
        let g = m.create_file(FileBuilder::new("b.vhd").design(d).vhdl_library("lib")).unwrap();
        m.create_file(FileBuilder::new("c.vhd").design(d)).unwrap();
        assert_eq!(m.library_files(lib).collect::<Vec<_>>(), vec![f, g]);
    }
}
