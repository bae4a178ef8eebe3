// Static manifest tree traversal — seeds the engine with initial references.

use crate::config::FilterConfig;
use crate::manifest::ManifestNode;
use crate::urn::DerivativeUrn;

/// Walk the derivative tree, applying role/target filtering, and hand every
/// surviving reference to `submit`.
///
/// Explicitly targeting a GUID force-includes that node and its immediate
/// children regardless of role exclusion; filtering resumes normally two
/// levels below the matched node unless a deeper node is itself targeted.
pub fn walk(nodes: &[ManifestNode], filter: &FilterConfig, submit: &mut impl FnMut(DerivativeUrn)) {
    walk_level(nodes, filter, false, submit);
}

fn walk_level(
    nodes: &[ManifestNode],
    filter: &FilterConfig,
    force: bool,
    submit: &mut impl FnMut(DerivativeUrn),
) {
    for node in nodes {
        // Recomputed from this node alone; the inherited flag does not
        // accumulate down the subtree.
        let child_force = filter.is_explicit_target(node.guid.as_deref());

        let include = match node.guid.as_deref() {
            None => true,
            Some(guid) => {
                force
                    || (filter.target_allowed(guid)
                        && !filter.role_excluded(node.role.as_deref()))
            }
        };

        if include {
            if let Some(children) = &node.children {
                walk_level(children, filter, child_force, submit);
            }
            if let Some(urn) = &node.urn {
                submit(DerivativeUrn::new(urn.clone()));
            }
        }
    }
}
