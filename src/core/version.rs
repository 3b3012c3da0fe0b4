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

//! Language revisions of the HDLs a file, fileset, design, or project can
//! default to.

use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum VersionError {
    #[error("empty {0} version")]
    Empty(&'static str),
    #[error("unknown {0} version {1:?}")]
    Unknown(&'static str, String),
}

/// Strips separators and any of the `prefixes` from `s` after upper-casing it.
///
/// `"VHDL-2008"`, `"vhdl_2008"` and `"2008"` all reduce to `"2008"`.
fn reduce(s: &str, prefixes: &[&str]) -> String {
    let s: String = s
        .trim()
        .to_ascii_uppercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_' && c.is_whitespace() == false)
        .collect();
    for p in prefixes {
        if let Some(rest) = s.strip_prefix(p) {
            return rest.to_string();
        }
    }
    s
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VhdlVersion {
    Vhdl87,
    Vhdl93,
    Ams99,
    Vhdl2000,
    Vhdl2002,
    Vhdl2008,
    Ams2017,
    Vhdl2019,
}

impl VhdlVersion {
    /// Checks if this revision is one of the VHDL-AMS standards.
    pub fn is_ams(&self) -> bool {
        match self {
            Self::Ams99 | Self::Ams2017 => true,
            _ => false,
        }
    }
}

impl FromStr for VhdlVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(VersionError::Empty("VHDL"));
        }
        let year = reduce(s, &["VHDL"]);
        match year.strip_prefix("AMS") {
            Some(ams) => match ams {
                "99" | "1999" => Ok(Self::Ams99),
                "17" | "2017" => Ok(Self::Ams2017),
                _ => Err(VersionError::Unknown("VHDL", s.to_string())),
            },
            None => match year.as_str() {
                "87" | "1987" => Ok(Self::Vhdl87),
                "93" | "1993" => Ok(Self::Vhdl93),
                "00" | "2000" => Ok(Self::Vhdl2000),
                "02" | "2002" => Ok(Self::Vhdl2002),
                "08" | "2008" => Ok(Self::Vhdl2008),
                "19" | "2019" => Ok(Self::Vhdl2019),
                _ => Err(VersionError::Unknown("VHDL", s.to_string())),
            },
        }
    }
}

impl Display for VhdlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Vhdl87 => "VHDL-1987",
                Self::Vhdl93 => "VHDL-1993",
                Self::Ams99 => "VHDL-AMS-1999",
                Self::Vhdl2000 => "VHDL-2000",
                Self::Vhdl2002 => "VHDL-2002",
                Self::Vhdl2008 => "VHDL-2008",
                Self::Ams2017 => "VHDL-AMS-2017",
                Self::Vhdl2019 => "VHDL-2019",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerilogVersion {
    Verilog95,
    Verilog2001,
    Verilog2005,
}

impl FromStr for VerilogVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(VersionError::Empty("Verilog"));
        }
        match reduce(s, &["VERILOG", "V"]).as_str() {
            "95" | "1995" => Ok(Self::Verilog95),
            "01" | "2001" => Ok(Self::Verilog2001),
            "05" | "2005" => Ok(Self::Verilog2005),
            _ => Err(VersionError::Unknown("Verilog", s.to_string())),
        }
    }
}

impl Display for VerilogVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Verilog95 => "Verilog-1995",
                Self::Verilog2001 => "Verilog-2001",
                Self::Verilog2005 => "Verilog-2005",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemVerilogVersion {
    Sv2005,
    Sv2009,
    Sv2012,
    Sv2017,
}

impl FromStr for SystemVerilogVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(VersionError::Empty("SystemVerilog"));
        }
        match reduce(s, &["SYSTEMVERILOG", "SV"]).as_str() {
            "05" | "2005" => Ok(Self::Sv2005),
            "09" | "2009" => Ok(Self::Sv2009),
            "12" | "2012" => Ok(Self::Sv2012),
            "17" | "2017" => Ok(Self::Sv2017),
            _ => Err(VersionError::Unknown("SystemVerilog", s.to_string())),
        }
    }
}

impl Display for SystemVerilogVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Sv2005 => "SystemVerilog-2005",
                Self::Sv2009 => "SystemVerilog-2009",
                Self::Sv2012 => "SystemVerilog-2012",
                Self::Sv2017 => "SystemVerilog-2017",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemRdlVersion {
    SystemRdl10,
    SystemRdl20,
}

impl FromStr for SystemRdlVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(VersionError::Empty("SystemRDL"));
        }
        match reduce(s, &["SYSTEMRDL", "SRDL", "RDL"]).as_str() {
            "1" | "1.0" | "10" => Ok(Self::SystemRdl10),
            "2" | "2.0" | "20" => Ok(Self::SystemRdl20),
            _ => Err(VersionError::Unknown("SystemRDL", s.to_string())),
        }
    }
}

impl Display for SystemRdlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::SystemRdl10 => "SystemRDL-1.0",
                Self::SystemRdl20 => "SystemRDL-2.0",
            }
        )
    }
}

use serde::de;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Serializes a version through its `Display` form and reads it back with `FromStr`.
macro_rules! impl_version_serde {
    ($ty:ty, $expecting:literal) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<$ty, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                struct LayerVisitor;

                impl<'de> de::Visitor<'de> for LayerVisitor {
                    type Value = $ty;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        <$ty>::from_str(v).map_err(de::Error::custom)
                    }

                    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        self.visit_str(&v.to_string())
                    }

                    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        self.visit_str(&v.to_string())
                    }

                    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        self.visit_str(&format!("{:.1}", v))
                    }
                }

                deserializer.deserialize_any(LayerVisitor)
            }
        }
    };
}

impl_version_serde!(VhdlVersion, "a VHDL revision such as \"2008\"");
impl_version_serde!(VerilogVersion, "a Verilog revision such as \"2005\"");
impl_version_serde!(SystemVerilogVersion, "a SystemVerilog revision such as \"2017\"");
impl_version_serde!(SystemRdlVersion, "a SystemRDL revision such as \"2.0\"");

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vhdl_from_str() {
        assert_eq!(VhdlVersion::from_str("2008"), Ok(VhdlVersion::Vhdl2008));
        assert_eq!(VhdlVersion::from_str("08"), Ok(VhdlVersion::Vhdl2008));
        assert_eq!(VhdlVersion::from_str("VHDL-2008"), Ok(VhdlVersion::Vhdl2008));
        assert_eq!(VhdlVersion::from_str("vhdl_93"), Ok(VhdlVersion::Vhdl93));
        assert_eq!(VhdlVersion::from_str("VHDL-AMS-2017"), Ok(VhdlVersion::Ams2017));
        assert_eq!(VhdlVersion::from_str(" 2019 "), Ok(VhdlVersion::Vhdl2019));
        assert_eq!(VhdlVersion::from_str(""), Err(VersionError::Empty("VHDL")));
        assert_eq!(
            VhdlVersion::from_str("2010"),
            Err(VersionError::Unknown("VHDL", String::from("2010")))
        );
    }

    #[test]
    fn vhdl_display_round_trip() {
        let v = VhdlVersion::Ams99;
        assert_eq!(v.to_string(), "VHDL-AMS-1999");
        assert_eq!(VhdlVersion::from_str(&v.to_string()), Ok(v));
        assert_eq!(v.is_ams(), true);
        assert_eq!(VhdlVersion::Vhdl2008.is_ams(), false);
    }

    #[test]
    fn vhdl_ordering() {
        assert!(VhdlVersion::Vhdl93 < VhdlVersion::Vhdl2008);
        assert!(VhdlVersion::Vhdl2008 < VhdlVersion::Vhdl2019);
    }

    #[test]
    fn verilog_and_sv() {
        assert_eq!(VerilogVersion::from_str("2005"), Ok(VerilogVersion::Verilog2005));
        assert_eq!(VerilogVersion::from_str("v95"), Ok(VerilogVersion::Verilog95));
        assert_eq!(VerilogVersion::from_str("Verilog-2001"), Ok(VerilogVersion::Verilog2001));
        assert_eq!(VerilogVersion::from_str("2017").is_err(), true);

        assert_eq!(SystemVerilogVersion::from_str("SV2017"), Ok(SystemVerilogVersion::Sv2017));
        assert_eq!(SystemVerilogVersion::from_str("SystemVerilog-2012"), Ok(SystemVerilogVersion::Sv2012));
        assert_eq!(SystemVerilogVersion::from_str("09"), Ok(SystemVerilogVersion::Sv2009));
        assert_eq!(SystemVerilogVersion::from_str("1995").is_err(), true);
    }

    #[test]
    fn systemrdl() {
        assert_eq!(SystemRdlVersion::from_str("1.0"), Ok(SystemRdlVersion::SystemRdl10));
        assert_eq!(SystemRdlVersion::from_str("SystemRDL-2.0"), Ok(SystemRdlVersion::SystemRdl20));
        assert_eq!(SystemRdlVersion::from_str("2"), Ok(SystemRdlVersion::SystemRdl20));
        assert_eq!(SystemRdlVersion::from_str("3.0").is_err(), true);
    }

    #[test]
    fn deserialize_from_toml() {
        #[derive(serde_derive::Deserialize)]
        struct Table {
            vhdl: VhdlVersion,
            sv: SystemVerilogVersion,
            srdl: SystemRdlVersion,
        }
        let t: Table = toml::from_str("vhdl = \"2008\"\nsv = 2017\nsrdl = 2.0\n").unwrap();
        assert_eq!(t.vhdl, VhdlVersion::Vhdl2008);
        assert_eq!(t.sv, SystemVerilogVersion::Sv2017);
        assert_eq!(t.srdl, SystemRdlVersion::SystemRdl20);

        let t = toml::from_str::<Table>("vhdl = \"2010\"\nsv = 2017\nsrdl = 2.0\n");
        assert_eq!(t.is_err(), true);
    }
}
