//! Template variables and Tera contexts.
//!
//! Each kind of template has a fixed set of variables. A catalog entry may
//! only declare placeholders from that set, and the probe context used at
//! registry construction contains exactly the declared ones.

use serde::Serialize;
use tera::Context;

/// Variables available to spider templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpiderVars {
    pub name: String,
    pub domain: String,
    pub classname: String,
    pub project_name: String,
    pub project_class: String,
}

impl SpiderVars {
    /// Placeholder names spider templates may use
    pub const PLACEHOLDERS: &'static [&'static str] =
        &["name", "domain", "classname", "project_name", "project_class"];

    /// Create spider variables, deriving the class names
    pub fn new(name: impl Into<String>, domain: impl Into<String>, project_name: impl Into<String>) -> Self {
        let name = name.into();
        let project_name = project_name.into();
        Self {
            classname: format!("{}Spider", class_name(&name)),
            project_class: class_name(&project_name),
            domain: domain.into(),
            name,
            project_name,
        }
    }

    /// Build a Tera context from the variables
    pub fn to_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("name", &self.name);
        context.insert("domain", &self.domain);
        context.insert("classname", &self.classname);
        context.insert("project_name", &self.project_name);
        context.insert("project_class", &self.project_class);
        context
    }
}

/// Variables available to project skeleton templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectVars {
    pub project_name: String,
    pub project_class: String,
}

impl ProjectVars {
    /// Placeholder names skeleton templates may use
    pub const PLACEHOLDERS: &'static [&'static str] = &["project_name", "project_class"];

    pub fn new(project_name: impl Into<String>) -> Self {
        let project_name = project_name.into();
        Self {
            project_class: class_name(&project_name),
            project_name,
        }
    }

    /// Build a Tera context from the variables
    pub fn to_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("project_class", &self.project_class);
        context
    }
}

/// Context holding only the given placeholders, each with a dummy value
pub(crate) fn probe_context(placeholders: &[String]) -> Context {
    let mut context = Context::new();
    for placeholder in placeholders {
        context.insert(placeholder.as_str(), "probe");
    }
    context
}

/// CamelCase form of a snake_case identifier (`my_shop` -> `MyShop`)
pub fn class_name(identifier: &str) -> String {
    identifier
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
