//! Parsers for `MOD.PARAM` style arguments.

use std::str::FromStr;

/// `MOD.PARAM`, naming one parameter of one mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    pub module: String,
    pub param: String,
}

impl FromStr for ParamRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, param) = s
            .split_once('.')
            .ok_or_else(|| format!("expected MOD.PARAM, got `{s}`"))?;
        if module.is_empty() || param.is_empty() {
            return Err(format!("expected MOD.PARAM, got `{s}`"));
        }
        Ok(Self { module: module.to_owned(), param: param.to_owned() })
    }
}

/// `MOD.PARAM=VALUE`. The value is kept raw; the panel converts it per the
/// parameter's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamAssign {
    pub target: ParamRef,
    pub value: String,
}

impl FromStr for ParamAssign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected MOD.PARAM=VALUE, got `{s}`"))?;
        Ok(Self { target: target.parse()?, value: value.to_owned() })
    }
}

/// Mods to select, in first-mention order: explicit `--mod` names, then any
/// mod referenced by a parameter argument.
pub fn selection<'a>(mods: &'a [String], refs: impl IntoIterator<Item = &'a ParamRef>) -> Vec<&'a str> {
    let mut names: Vec<&str> = Vec::new();
    let implied = refs.into_iter().map(|r| r.module.as_str());
    for name in mods.iter().map(String::as_str).chain(implied) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
#[path = "args_test.rs"]
mod tests;
