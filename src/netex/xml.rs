use crate::{Error, Result};
use minidom::Element;

/// Navigation helpers over `minidom` elements
///
/// Children are matched by local name only, the NeTEx and GML namespaces are not checked.
pub trait ElementExt {
    fn try_attribute(&self, name: &str) -> Result<String>;
    fn only_child(&self, name: &str) -> Option<&Element>;
    fn try_only_child(&self, name: &str) -> Result<&Element>;
    fn children_named<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a Element> + 'a>;
    /// First descendant with the given name, depth first
    fn descendant(&self, name: &str) -> Option<&Element>;
    /// Follows a path of child names
    fn path(&self, names: &[&str]) -> Option<&Element>;
    /// Trimmed text of a child, `None` when absent or blank
    fn child_text(&self, name: &str) -> Option<String>;
    /// `ref` attribute of a child
    fn child_ref(&self, name: &str) -> Option<String>;
    fn try_child_ref(&self, name: &str) -> Result<String>;
    fn child_bool(&self, name: &str) -> Option<bool>;
}

impl ElementExt for Element {
    fn try_attribute(&self, name: &str) -> Result<String> {
        self.attr(name)
            .map(|v| v.to_owned())
            .ok_or_else(|| Error::InvalidXml {
                element: self.name().to_owned(),
                reason: format!("missing attribute '{}'", name),
            })
    }

    fn only_child(&self, name: &str) -> Option<&Element> {
        self.children().find(|c| c.name() == name)
    }

    fn try_only_child(&self, name: &str) -> Result<&Element> {
        self.only_child(name).ok_or_else(|| Error::InvalidXml {
            element: describe(self),
            reason: format!("missing child '{}'", name),
        })
    }

    fn children_named<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a Element> + 'a> {
        Box::new(self.children().filter(move |c| c.name() == name))
    }

    fn descendant(&self, name: &str) -> Option<&Element> {
        for child in self.children() {
            if child.name() == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    fn path(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |element, name| element.only_child(name))
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.only_child(name)
            .map(|c| c.text().trim().to_owned())
            .filter(|t| !t.is_empty())
    }

    fn child_ref(&self, name: &str) -> Option<String> {
        self.only_child(name)
            .and_then(|c| c.attr("ref"))
            .map(|r| r.to_owned())
    }

    fn try_child_ref(&self, name: &str) -> Result<String> {
        self.child_ref(name).ok_or_else(|| Error::InvalidXml {
            element: describe(self),
            reason: format!("missing reference '{}'", name),
        })
    }

    fn child_bool(&self, name: &str) -> Option<bool> {
        self.child_text(name).map(|t| t == "true" || t == "1")
    }
}

/// Name and id of an element, for error messages
fn describe(element: &Element) -> String {
    match element.attr("id") {
        Some(id) => format!("{} {}", element.name(), id),
        None => element.name().to_owned(),
    }
}
