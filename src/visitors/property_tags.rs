use crate::docblock::property_from_tag;
use crate::project::Project;
use crate::types::{ClassInfo, DocTag, PropertyTag};

use super::ClassVisitor;

const PROPERTY_TAGS: [&str; 3] = ["property", "property-read", "property-write"];

/// Adds the properties declared by class-level `@property`,
/// `@property-read` and `@property-write` tags.
pub struct PropertyTagVisitor;

impl ClassVisitor for PropertyTagVisitor {
    fn visit(&self, class: &mut ClassInfo, _project: &Project) -> bool {
        let tags: Vec<PropertyTag> = PROPERTY_TAGS
            .iter()
            .flat_map(|name| class.tag(name))
            .filter_map(|tag| match tag {
                DocTag::Property(p) if !p.name.is_empty() => Some(p.clone()),
                _ => None,
            })
            .collect();

        let mut modified = false;
        for tag in &tags {
            let property = property_from_tag(tag, class.line);
            match class.properties.get(&property.name) {
                Some(existing) if !existing.is_virtual => continue,
                Some(existing) if *existing == property => continue,
                _ => {}
            }
            class.add_property(property);
            modified = true;
        }
        modified
    }
}
