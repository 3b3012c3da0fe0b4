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

//! Classification of files into kinds (an "is-a" tree rooted at
//! [FileKind::File]) and orthogonal content types mixed onto those kinds.

use crate::error::Error;
use crate::util::filesystem;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    File,
    Text,
    Log,
    Xml,
    Source,
    HdlSource,
    Netlist,
    EdifNetlist,
    TclSource,
    VhdlSource,
    VerilogSource,
    SystemVerilogSource,
    SystemRdlSource,
    PythonSource,
    CocotbPython,
    Constraint,
    Project,
    CSource,
    CppSource,
    Setting,
    SimulationAnalysis,
    SimulationElaboration,
    SimulationStart,
    SimulationRun,
    WaveformConfig,
    WaveformDatabase,
    WaveformExchange,
}

impl FileKind {
    pub const ALL: [FileKind; 27] = [
        Self::File,
        Self::Text,
        Self::Log,
        Self::Xml,
        Self::Source,
        Self::HdlSource,
        Self::Netlist,
        Self::EdifNetlist,
        Self::TclSource,
        Self::VhdlSource,
        Self::VerilogSource,
        Self::SystemVerilogSource,
        Self::SystemRdlSource,
        Self::PythonSource,
        Self::CocotbPython,
        Self::Constraint,
        Self::Project,
        Self::CSource,
        Self::CppSource,
        Self::Setting,
        Self::SimulationAnalysis,
        Self::SimulationElaboration,
        Self::SimulationStart,
        Self::SimulationRun,
        Self::WaveformConfig,
        Self::WaveformDatabase,
        Self::WaveformExchange,
    ];

    /// The kind this kind directly specializes. Only [FileKind::File] has none.
    pub fn parent(&self) -> Option<FileKind> {
        match self {
            Self::File => None,
            Self::HdlSource | Self::Netlist | Self::TclSource | Self::PythonSource => Some(Self::Source),
            Self::SystemRdlSource | Self::CSource | Self::CppSource => Some(Self::Source),
            Self::EdifNetlist => Some(Self::Netlist),
            Self::VhdlSource | Self::VerilogSource | Self::SystemVerilogSource => Some(Self::HdlSource),
            Self::CocotbPython => Some(Self::PythonSource),
            _ => Some(Self::File),
        }
    }

    /// Checks if `self` is `ancestor` or one of its descendants.
    pub fn is_a(&self, ancestor: FileKind) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Checks if `kind` falls within this classification (is-a membership).
    pub fn contains(&self, kind: FileKind) -> bool {
        kind.is_a(*self)
    }

    /// The content types declared directly on this kind.
    pub fn contents(&self) -> &'static [ContentType] {
        match self {
            Self::Text | Self::Log | Self::Constraint => &[ContentType::HumanReadable],
            Self::VhdlSource | Self::VerilogSource | Self::SystemVerilogSource => &[ContentType::HumanReadable],
            Self::SystemRdlSource => &[ContentType::HumanReadable],
            Self::Xml => &[ContentType::Xml],
            Self::TclSource => &[ContentType::Tcl],
            Self::PythonSource => &[ContentType::Python],
            _ => &[],
        }
    }

    /// Checks if this kind, or any kind it specializes, carries `content`
    /// (directly or through a more specific content type).
    pub fn has_content(&self, content: ContentType) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind.contents().iter().any(|c| c.is_a(content)) {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Guesses the kind of a file from its extension.
    ///
    /// Unrecognized extensions fall back to [FileKind::File].
    pub fn detect(path: &Path) -> FileKind {
        let table: [(&[&str], FileKind); 17] = [
            (&["vhd", "vhdl"], Self::VhdlSource),
            (&["v", "vh"], Self::VerilogSource),
            (&["sv", "svh"], Self::SystemVerilogSource),
            (&["rdl"], Self::SystemRdlSource),
            (&["py"], Self::PythonSource),
            (&["tcl"], Self::TclSource),
            (&["xml"], Self::Xml),
            (&["txt"], Self::Text),
            (&["log"], Self::Log),
            (&["edf", "edif", "edn"], Self::EdifNetlist),
            (&["c", "h"], Self::CSource),
            (&["cpp", "cc", "cxx", "hpp"], Self::CppSource),
            (&["sdc", "xdc", "ucf", "pcf", "lpf"], Self::Constraint),
            (&["vcd", "evcd"], Self::WaveformExchange),
            (&["wcfg", "gtkw"], Self::WaveformConfig),
            (&["ghw", "wdb", "fst", "wlf"], Self::WaveformDatabase),
            (&["xpr", "qpf", "pro"], Self::Project),
        ];
        table
            .iter()
            .find(|(exts, _)| filesystem::has_extension(path, exts))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::File)
    }

    /// The kind's canonical name, as used by [FileKind::from_str].
    pub fn name(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Text => "TextFile",
            Self::Log => "LogFile",
            Self::Xml => "XMLFile",
            Self::Source => "SourceFile",
            Self::HdlSource => "HDLSourceFile",
            Self::Netlist => "NetlistFile",
            Self::EdifNetlist => "EDIFNetlistFile",
            Self::TclSource => "TCLSourceFile",
            Self::VhdlSource => "VHDLSourceFile",
            Self::VerilogSource => "VerilogSourceFile",
            Self::SystemVerilogSource => "SystemVerilogSourceFile",
            Self::SystemRdlSource => "SystemRDLSourceFile",
            Self::PythonSource => "PythonSourceFile",
            Self::CocotbPython => "CocotbPythonFile",
            Self::Constraint => "ConstraintFile",
            Self::Project => "ProjectFile",
            Self::CSource => "CSourceFile",
            Self::CppSource => "CppSourceFile",
            Self::Setting => "SettingFile",
            Self::SimulationAnalysis => "SimulationAnalysisFile",
            Self::SimulationElaboration => "SimulationElaborationFile",
            Self::SimulationStart => "SimulationStartFile",
            Self::SimulationRun => "SimulationRunFile",
            Self::WaveformConfig => "WaveformConfigFile",
            Self::WaveformDatabase => "WaveformDatabaseFile",
            Self::WaveformExchange => "WaveformExchangeFile",
        }
    }
}

impl FromStr for FileKind {
    type Err = Error;

    /// Looks up a kind by its canonical name (ascii case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::UnknownFileType(s.to_string()))
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A content format that can be mixed onto any [FileKind].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    HumanReadable,
    Xml,
    Yaml,
    Json,
    Ini,
    Toml,
    Tcl,
    Sdc,
    Python,
}

impl ContentType {
    pub const ALL: [ContentType; 9] = [
        Self::HumanReadable,
        Self::Xml,
        Self::Yaml,
        Self::Json,
        Self::Ini,
        Self::Toml,
        Self::Tcl,
        Self::Sdc,
        Self::Python,
    ];

    pub fn parent(&self) -> Option<ContentType> {
        match self {
            Self::HumanReadable => None,
            Self::Sdc => Some(Self::Tcl),
            _ => Some(Self::HumanReadable),
        }
    }

    pub fn is_a(&self, ancestor: ContentType) -> bool {
        let mut current = Some(*self);
        while let Some(content) = current {
            if content == ancestor {
                return true;
            }
            current = content.parent();
        }
        false
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HumanReadable => "HumanReadableContent",
            Self::Xml => "XMLContent",
            Self::Yaml => "YAMLContent",
            Self::Json => "JSONContent",
            Self::Ini => "INIContent",
            Self::Toml => "TOMLContent",
            Self::Tcl => "TCLContent",
            Self::Sdc => "SDCContent",
            Self::Python => "PythonContent",
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::UnknownFileType(s.to_string()))
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Selects which files an enumeration yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileTypeFilter {
    /// Matches every kind.
    #[default]
    Any,
    /// Matches the kind and all of its descendants.
    Kind(FileKind),
    /// Matches every kind carrying the content type (or a more specific one).
    Content(ContentType),
}

impl FileTypeFilter {
    pub fn matches(&self, kind: FileKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(k) => k.contains(kind),
            Self::Content(c) => kind.has_content(*c),
        }
    }
}

impl From<FileKind> for FileTypeFilter {
    fn from(value: FileKind) -> Self {
        Self::Kind(value)
    }
}

impl From<ContentType> for FileTypeFilter {
    fn from(value: ContentType) -> Self {
        Self::Content(value)
    }
}

impl FromStr for FileTypeFilter {
    type Err = Error;

    /// Accepts `Any`, a kind name, or a content-type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        match FileKind::from_str(s) {
            Ok(k) => Ok(Self::Kind(k)),
            Err(_) => Ok(Self::Content(ContentType::from_str(s)?)),
        }
    }
}
