//! Router declarations — named groupings of tool names.
//!
//! A router bundles related tools under one name. At setup time the compiler
//! validates every declaration and installs each router as a tool of its own;
//! invoking that tool reports the current, visibility-filtered metadata of
//! its members. Member lists may overlap arbitrarily across routers.

use serde::Deserialize;

/// A declared router, before compilation.
///
/// Example YAML:
/// ```yaml
/// routers:
///   - name: search_suite
///     description: "Everything related to searching"
///     tools:
///       - search
///       - reindex
///   - name: admin
///     tools:
///       - reindex
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RouterDef {
    /// Router name; becomes the installed tool's name. Unique per server.
    pub name: String,
    /// Optional description for the installed tool.
    #[serde(default)]
    pub description: Option<String>,
    /// Member tool names, in declaration order. May be empty.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl RouterDef {
    /// Create a declaration programmatically.
    pub fn new(name: impl Into<String>, tools: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tools,
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a declaration list from a YAML string (`routers:` key).
    pub fn list_from_yaml(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let wrapper: RouterListWrapper = serde_yaml::from_str(yaml)?;
        Ok(wrapper.routers)
    }

    /// Parse a declaration list from a YAML file.
    pub fn list_from_yaml_file(path: &str) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::list_from_yaml(&content)?)
    }

    /// Description used for the installed tool when none was declared.
    pub fn effective_description(&self) -> String {
        match &self.description {
            Some(description) => description.clone(),
            None => format!(
                "Lists the current metadata of {} grouped tool(s)",
                self.tools.len()
            ),
        }
    }
}

/// Wrapper for the YAML list form.
#[derive(Debug, Deserialize)]
struct RouterListWrapper {
    routers: Vec<RouterDef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_list_from_yaml() {
        let yaml = r#"
routers:
  - name: search_suite
    description: "Everything related to searching"
    tools:
      - search
      - reindex
  - name: admin
    tools:
      - reindex
  - name: empty_for_now
"#;
        let defs = RouterDef::list_from_yaml(yaml).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].name, "search_suite");
        assert_eq!(defs[0].tools, vec!["search", "reindex"]);
        assert_eq!(defs[1].description, None);
        assert!(defs[2].tools.is_empty());
    }

    #[test]
    fn test_list_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "routers:\n  - name: ops\n    tools:\n      - reindex\n"
        )
        .unwrap();
        let defs = RouterDef::list_from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "ops");
    }

    #[test]
    fn test_effective_description() {
        let declared = RouterDef::new("a", vec![]).with_description("Custom");
        assert_eq!(declared.effective_description(), "Custom");

        let derived = RouterDef::new("b", vec!["x".into(), "y".into()]);
        assert_eq!(
            derived.effective_description(),
            "Lists the current metadata of 2 grouped tool(s)"
        );
    }
}
