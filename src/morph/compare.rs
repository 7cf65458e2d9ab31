use crate::host::{Host, NodeKind};

/// Whether `live` can be patched into `target` without being replaced.
///
/// Elements must have the same name. A virtual target written in lower case still matches the
/// upper-case name the host gave the live element.
pub fn same_kind<H: Host>(host: &H, live: &H::Node, target: &H::Node) -> bool {
	let kind = host.kind(live);
	if kind != host.kind(target) {
		return false;
	}
	if kind != NodeKind::Element {
		return true;
	}

	let live_name = host.node_name(live);
	let target_name = host.node_name(target);
	if live_name == target_name {
		return true;
	}
	match (live_name.bytes().next(), target_name.bytes().next()) {
		(Some(l), Some(t)) if host.is_virtual(target) && l.is_ascii_uppercase() && t.is_ascii_lowercase() => *live_name == target_name.to_ascii_uppercase(),
		_ => false,
	}
}
