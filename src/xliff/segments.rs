/*!
 * Access to the source/target pairs of a parsed XLIFF tree.
 *
 * In 1.2 documents `source` and `target` live directly inside `trans-unit`;
 * in 2.0 documents they live inside each `segment` of a `unit`.
 */

use super::tree::{Element, Node};
use super::version::XliffVersion;

/// Source elements of all segment containers, in document order
pub fn sources<'a>(root: &'a Element, version: XliffVersion) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_sources(root, version.container_tag(), &mut found);
    found
}

fn collect_sources<'a>(element: &'a Element, container: &str, found: &mut Vec<&'a Element>) {
    if element.local_name() == container {
        if let Some(source) = element.find_child(XliffVersion::SOURCE_TAG) {
            found.push(source);
        }
        return;
    }
    for child in element.child_elements() {
        collect_sources(child, container, found);
    }
}

/// Give every segment container a target built from its source.
///
/// Containers are visited in document order, the same order `sources` returns.
/// An existing target is replaced, otherwise the new one goes right after the
/// source with the same indentation. Returns the number of targets written.
pub fn write_targets<E, F>(root: &mut Element, version: XliffVersion, mut build: F) -> Result<usize, E>
where
    F: FnMut(&Element) -> Result<Element, E>,
{
    let mut written = 0;
    visit_containers(root, version.container_tag(), &mut |container| {
        let Some(source_index) = container.position_of_child(XliffVersion::SOURCE_TAG) else {
            return Ok(());
        };
        let target = match &container.children[source_index] {
            Node::Element(source) => build(source)?,
            _ => return Ok(()),
        };
        place_target(container, source_index, target);
        written += 1;
        Ok(())
    })?;
    Ok(written)
}

fn visit_containers<E>(
    element: &mut Element,
    container: &str,
    visit: &mut dyn FnMut(&mut Element) -> Result<(), E>,
) -> Result<(), E> {
    if element.local_name() == container {
        return visit(element);
    }
    for child in element.children.iter_mut() {
        if let Node::Element(child) = child {
            visit_containers(child, container, visit)?;
        }
    }
    Ok(())
}

fn place_target(container: &mut Element, source_index: usize, target: Element) {
    if let Some(existing) = container.position_of_child(XliffVersion::TARGET_TAG) {
        container.children[existing] = Node::Element(target);
        return;
    }

    let indent = match source_index.checked_sub(1).map(|i| &container.children[i]) {
        Some(Node::Text(raw)) if raw.trim().is_empty() && !raw.is_empty() => Some(raw.clone()),
        _ => None,
    };

    let mut insert_at = source_index + 1;
    if let Some(indent) = indent {
        container.children.insert(insert_at, Node::Text(indent));
        insert_at += 1;
    }
    container.children.insert(insert_at, Node::Element(target));
}
