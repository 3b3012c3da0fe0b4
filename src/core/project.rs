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

use super::attribute::AttributeBag;
use super::design::DesignRef;
use super::model::{DesignId, Model, ProjectId};
use super::setting::Settings;
use super::version::{SystemRdlVersion, SystemVerilogVersion, VerilogVersion, VhdlVersion};
use crate::error::Error;
use crate::util::filesystem;
use indexmap::IndexMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DESIGN: &str = "default";

/// The root of the hierarchy, anchored at a root directory.
#[derive(Debug)]
pub struct Project {
    name: String,
    root: PathBuf,
    pub(crate) designs: IndexMap<String, DesignId>,
    pub(crate) default_design: DesignId,
    pub(crate) settings: Settings,
    pub(crate) attributes: AttributeBag,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    /// Iterates over the registered designs in registration order.
    pub fn designs(&self) -> impl Iterator<Item = DesignId> + '_ {
        self.designs.values().copied()
    }

    pub fn design_by_name(&self, name: &str) -> Option<DesignId> {
        self.designs.get(name).copied()
    }

    pub fn default_design(&self) -> DesignId {
        self.default_design
    }

    /// Number of registered designs.
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectBuilder {
    name: String,
    root: PathBuf,
    settings: Settings,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: PathBuf::from("."),
            settings: Settings::new(),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn vhdl_version(mut self, v: VhdlVersion) -> Self {
        self.settings = self.settings.with_vhdl_version(Some(v));
        self
    }

    pub fn verilog_version(mut self, v: VerilogVersion) -> Self {
        self.settings = self.settings.with_verilog_version(Some(v));
        self
    }

    pub fn sv_version(mut self, v: SystemVerilogVersion) -> Self {
        self.settings = self.settings.with_sv_version(Some(v));
        self
    }

    pub fn srdl_version(mut self, v: SystemRdlVersion) -> Self {
        self.settings = self.settings.with_srdl_version(Some(v));
        self
    }
}

impl Model {
    /// Creates a project along with its default design (named `default`).
    pub fn create_project(&mut self, builder: ProjectBuilder) -> ProjectId {
        let id = ProjectId(self.projects.len());
        let design = self.alloc_design(DEFAULT_DESIGN.to_string(), Some(id));
        let mut designs = IndexMap::new();
        designs.insert(DEFAULT_DESIGN.to_string(), design);
        self.projects.push(Project {
            name: builder.name,
            root: builder.root,
            designs,
            default_design: design,
            settings: builder.settings,
            attributes: AttributeBag::new(),
        });
        debug!("created project {:?}", self.project(id).name());
        id
    }

    /// Registers `design` with `project`.
    ///
    /// This is the same operation as [Model::set_design_project].
    pub fn project_add_design(&mut self, project: ProjectId, design: DesignId) -> Result<(), Error> {
        self.set_design_project(design, project)
    }

    pub fn project_add_designs(
        &mut self,
        project: ProjectId,
        designs: impl IntoIterator<Item = DesignId>,
    ) -> Result<(), Error> {
        designs
            .into_iter()
            .try_for_each(|d| self.project_add_design(project, d))
    }

    /// Looks up a design registered with `project`.
    pub fn find_design(&self, project: ProjectId, design: &DesignRef) -> Result<DesignId, Error> {
        let p = self.project(project);
        let found = match design {
            DesignRef::Name(n) => p.design_by_name(n),
            DesignRef::Id(id) => p.designs().find(|d| d == id),
        };
        found.ok_or_else(|| {
            let name = match design {
                DesignRef::Name(n) => n.clone(),
                DesignRef::Id(id) => self.design(*id).name().to_string(),
            };
            Error::DesignNotFound(name, p.name().to_string())
        })
    }

    /// Designates one of the project's registered designs as its default.
    pub fn set_default_design(&mut self, project: ProjectId, design: impl Into<DesignRef>) -> Result<(), Error> {
        let design = self.find_design(project, &design.into())?;
        self.projects[project.0].default_design = design;
        debug!(
            "default design of {} is now {}",
            self.describe(project),
            self.describe(design)
        );
        Ok(())
    }

    /// The project's root directory, with `.` and `..` collapsed.
    ///
    /// A relative root stays relative to the current working directory.
    pub fn project_resolved_path(&self, project: ProjectId) -> PathBuf {
        filesystem::normalize(self.project(project).root())
    }

    /// Checks the project and then every one of its designs.
    pub fn validate_project(&self, project: ProjectId) -> Result<(), Error> {
        let p = self.project(project);
        debug!("validating {}", self.describe(project));
        if p.name().is_empty() {
            return Err(Error::MissingName("project"));
        }
        if p.root().as_os_str().is_empty() {
            return Err(Error::MissingPath(self.describe(project)));
        }
        let path = self.project_resolved_path(project);
        check_directory(&path, || self.describe(project))?;

        if p.is_empty() {
            return Err(Error::NoDesigns(p.name().to_string()));
        }
        let default = self.design(p.default_design());
        if p.design_by_name(default.name()) != Some(p.default_design()) {
            return Err(Error::DefaultDesignNotRegistered(p.name().to_string()));
        }
        p.designs().try_for_each(|d| self.validate_design(d))
    }
}

/// Requires `path` to be an existing directory.
pub(crate) fn check_directory(path: &Path, describe: impl Fn() -> String) -> Result<(), Error> {
    if path.exists() == false {
        Err(Error::PathNotFound(describe(), path.to_path_buf()))
    } else if path.is_dir() == false {
        Err(Error::NotADirectory(describe(), path.to_path_buf()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::design::DesignBuilder;
    use crate::core::file::FileBuilder;
    use std::fs;

    #[test]
    fn default_design_exists() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p"));
        let d = m.project(p).default_design();
        assert_eq!(m.project(p).len(), 1);
        assert_eq!(m.design(d).name(), "default");
        assert_eq!(m.design(d).project(), Some(p));
        assert_eq!(m.project(p).design_by_name("default"), Some(d));
        assert_eq!(m.project(p).to_string(), "p");
    }

    #[test]
    fn add_designs() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p"));
        let a = m.create_design(DesignBuilder::new("a")).unwrap();
        let b = m.create_design(DesignBuilder::new("b")).unwrap();
        m.project_add_designs(p, [a, b]).unwrap();
        assert_eq!(m.project(p).designs().collect::<Vec<_>>().len(), 3);
        assert_eq!(m.design(b).project(), Some(p));

        let dupe = m.create_design(DesignBuilder::new("a")).unwrap();
        assert_eq!(
            m.project_add_design(p, dupe),
            Err(Error::DuplicateDesign(String::from("p"), String::from("a")))
        );
        // re-adding the same design is a no-op
        assert_eq!(m.project_add_design(p, a), Ok(()));
        assert_eq!(m.project(p).len(), 3);
    }

    #[test]
    fn change_default_design() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p"));
        let a = m.create_design(DesignBuilder::new("a").project(p)).unwrap();
        m.set_default_design(p, "a").unwrap();
        assert_eq!(m.project(p).default_design(), a);

        // files given only a project land in the new default design
        let f = m.create_file(FileBuilder::new("x.vhdl").project(p)).unwrap();
        assert_eq!(m.file(f).design(), Some(a));

        let stray = m.create_design(DesignBuilder::new("stray")).unwrap();
        assert_eq!(
            m.set_default_design(p, stray),
            Err(Error::DesignNotFound(String::from("stray"), String::from("p")))
        );
        assert_eq!(
            m.set_default_design(p, "nope"),
            Err(Error::DesignNotFound(String::from("nope"), String::from("p")))
        );
    }

    #[test]
    fn resolved_root() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p").root("temp/./project/../project"));
        assert_eq!(m.project_resolved_path(p), PathBuf::from("temp/project"));
        assert_eq!(m.project_resolved_path(p), m.project_resolved_path(p));
    }

    #[test]
    fn validate_whole_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("rtl")).unwrap();
        fs::write(dir.path().join("rtl/top.v"), "module top; endmodule\n").unwrap();

        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p").root(dir.path()));
        let d = m.project(p).default_design();
        let fs = m.design(d).default_fileset();
        m.fileset_mut(fs).set_directory("rtl");
        m.create_file(FileBuilder::new("top.v").design(d)).unwrap();
        assert_eq!(m.validate_project(p), Ok(()));

        // a missing file deep in the tree surfaces through the project
        m.create_file(FileBuilder::new("gone.v").design(d)).unwrap();
        assert_eq!(
            m.validate_project(p),
            Err(Error::PathNotFound(
                String::from("file \"gone.v\""),
                filesystem::normalize(&dir.path().join("rtl/gone.v"))
            ))
        );
    }

    #[test]
    fn validate_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = Model::new();
        let missing = dir.path().join("missing");
        let p = m.create_project(ProjectBuilder::new("p").root(&missing));
        assert_eq!(
            m.validate_project(p),
            Err(Error::PathNotFound(String::from("project \"p\""), filesystem::normalize(&missing)))
        );

        let nameless = m.create_project(ProjectBuilder::new("").root(dir.path()));
        assert_eq!(m.validate_project(nameless), Err(Error::MissingName("project")));

        fs::write(dir.path().join("file.txt"), "").unwrap();
        let on_file = m.create_project(ProjectBuilder::new("q").root(dir.path().join("file.txt")));
        assert_eq!(m.validate_project(on_file).unwrap_err().is_validation(), true);
    }
}
