//! User scripts run around the build and run phases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single hook script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookScript {
    /// Display name
    pub name: String,

    /// Program followed by its arguments
    pub cmd: Vec<String>,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Hook scripts grouped by lifecycle point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hooks {
    pub pre_build: Vec<HookScript>,
    pub post_build: Vec<HookScript>,
    pub pre_run: Vec<HookScript>,
    pub post_run: Vec<HookScript>,
}

/// Point in the lifecycle at which hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    PreBuild,
    PostBuild,
    PreRun,
    PostRun,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::PreBuild => "pre_build",
            HookPoint::PostBuild => "post_build",
            HookPoint::PreRun => "pre_run",
            HookPoint::PostRun => "post_run",
        }
    }
}

impl Hooks {
    /// Scripts registered for a lifecycle point.
    pub fn scripts(&self, point: HookPoint) -> &[HookScript] {
        match point {
            HookPoint::PreBuild => &self.pre_build,
            HookPoint::PostBuild => &self.post_build,
            HookPoint::PreRun => &self.pre_run,
            HookPoint::PostRun => &self.post_run,
        }
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.pre_build.is_empty()
            && self.post_build.is_empty()
            && self.pre_run.is_empty()
            && self.post_run.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_parse() {
        let hooks: Hooks = toml::from_str(
            r#"
[[pre_build]]
name = "gen"
cmd = ["python", "gen_regs.py"]
env = { OUT = "regs.v" }
"#,
        )
        .unwrap();

        assert!(!hooks.is_empty());
        let pre = hooks.scripts(HookPoint::PreBuild);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].cmd, vec!["python", "gen_regs.py"]);
        assert_eq!(pre[0].env["OUT"], "regs.v");
        assert!(hooks.scripts(HookPoint::PostRun).is_empty());
    }

    #[test]
    fn test_unknown_hook_point_rejected() {
        let result: Result<Hooks, _> = toml::from_str("[[pre_configure]]\nname = \"x\"\ncmd = []\n");
        assert!(result.is_err());
    }
}
