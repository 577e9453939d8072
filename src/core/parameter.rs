//! Design parameters passed to tools (Verilog parameters/defines, VHDL
//! generics, plusargs).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a parameter reaches the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Verilog toplevel parameter
    Vlogparam,
    /// Verilog preprocessor define
    Vlogdefine,
    /// VHDL toplevel generic
    Generic,
    /// Simulator plusarg
    Plusarg,
    /// Command-line argument to the tool
    Cmdlinearg,
}

/// Declared data type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamDataType {
    Bool,
    Int,
    Real,
    Str,
    File,
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl ParamValue {
    /// Render the value for a tool script.
    ///
    /// Booleans become `1`/`0`, strings are wrapped in `quote`, numbers are
    /// printed as-is.
    pub fn to_script_string(&self, quote: &str) -> String {
        match self {
            ParamValue::Bool(true) => "1".to_string(),
            ParamValue::Bool(false) => "0".to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Real(r) => r.to_string(),
            ParamValue::Str(s) => format!("{quote}{s}{quote}"),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_script_string(""))
    }
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Data type
    pub datatype: ParamDataType,

    /// Value used when nothing overrides it
    #[serde(default)]
    pub default: Option<ParamValue>,

    /// Where the parameter is applied
    pub paramtype: ParamType,

    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// All parameters of a design, ordered by name.
pub type Parameters = BTreeMap<String, Parameter>;

/// Select the parameters of one type that carry a value.
pub fn select(params: &Parameters, paramtype: ParamType) -> BTreeMap<String, ParamValue> {
    params
        .iter()
        .filter(|(_, p)| p.paramtype == paramtype)
        .filter_map(|(name, p)| p.default.clone().map(|v| (name.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_string() {
        assert_eq!(ParamValue::Bool(true).to_script_string(""), "1");
        assert_eq!(ParamValue::Bool(false).to_script_string("\""), "0");
        assert_eq!(ParamValue::Int(42).to_script_string("\""), "42");
        assert_eq!(ParamValue::Str("abc".into()).to_script_string("\""), "\"abc\"");
        assert_eq!(ParamValue::Str("abc".into()).to_string(), "abc");
    }

    #[test]
    fn test_select_by_type() {
        let mut params = Parameters::new();
        params.insert(
            "WIDTH".into(),
            Parameter {
                datatype: ParamDataType::Int,
                default: Some(ParamValue::Int(8)),
                paramtype: ParamType::Vlogparam,
                description: String::new(),
            },
        );
        params.insert(
            "SIM".into(),
            Parameter {
                datatype: ParamDataType::Bool,
                default: Some(ParamValue::Bool(true)),
                paramtype: ParamType::Vlogdefine,
                description: String::new(),
            },
        );
        params.insert(
            "UNSET".into(),
            Parameter {
                datatype: ParamDataType::Str,
                default: None,
                paramtype: ParamType::Vlogparam,
                description: String::new(),
            },
        );

        let vlogparam = select(&params, ParamType::Vlogparam);
        assert_eq!(vlogparam.len(), 1);
        assert_eq!(vlogparam["WIDTH"], ParamValue::Int(8));

        let defines = select(&params, ParamType::Vlogdefine);
        assert_eq!(defines["SIM"], ParamValue::Bool(true));
    }

    #[test]
    fn test_untagged_value_parse() {
        let p: Parameter = toml::from_str(
            r#"
datatype = "str"
default = "hello"
paramtype = "generic"
"#,
        )
        .unwrap();
        assert_eq!(p.default, Some(ParamValue::Str("hello".into())));
        assert_eq!(p.paramtype, ParamType::Generic);
    }
}
